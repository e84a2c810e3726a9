//! HTTP response wrapper

use async_stream::stream;
use bytes::{Bytes, BytesMut};
use futures::stream::{BoxStream, Stream, StreamExt};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::pin::Pin;

use crate::application::errors::HttpError;

/// Default chunk size for `iter_content`
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Body chunks read one at a time from the wire
pub type ByteChunks = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

enum Body {
    Buffered(Bytes),
    Streaming(reqwest::Response),
}

/// Response to a single request.
///
/// Status and headers are available right away. Every body accessor takes
/// the response by value, so a body can only be read once.
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
}

impl HttpResponse {
    /// Read the whole body up front
    pub(crate) async fn buffered(response: reqwest::Response) -> Result<Self, HttpError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Self {
            status,
            headers,
            body: Body::Buffered(body),
        })
    }

    /// Leave the body on the wire until it is asked for
    pub(crate) fn streaming(response: reqwest::Response) -> Self {
        Self {
            status: response.status(),
            headers: response.headers().clone(),
            body: Body::Streaming(response),
        }
    }

    /// Build a response around a body that is already in memory
    pub fn from_parts(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: Body::Buffered(body.into()),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text, if present and valid ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body as raw bytes
    pub async fn content(self) -> Result<Bytes, HttpError> {
        match self.body {
            Body::Buffered(bytes) => Ok(bytes),
            Body::Streaming(response) => Ok(response.bytes().await?),
        }
    }

    /// Body decoded as text. Streamed bodies honor the charset in
    /// `Content-Type`; buffered ones are read as UTF-8, lossily.
    pub async fn text(self) -> Result<String, HttpError> {
        match self.body {
            Body::Buffered(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Body::Streaming(response) => Ok(response.text().await?),
        }
    }

    /// Body decoded as JSON
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let bytes = self.content().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Body as a forward-only stream of `chunk_size` byte chunks; only the
    /// last chunk may be shorter
    pub fn iter_content(self, chunk_size: usize) -> Result<ByteChunks, HttpError> {
        if chunk_size == 0 {
            return Err(HttpError::InvalidChunkSize);
        }

        let source: BoxStream<'static, Result<Bytes, HttpError>> = match self.body {
            Body::Buffered(bytes) => futures::stream::iter(Some(Ok(bytes))).boxed(),
            Body::Streaming(response) => response
                .bytes_stream()
                .map(|chunk| chunk.map_err(HttpError::from))
                .boxed(),
        };

        Ok(rechunk(source, chunk_size))
    }
}

fn rechunk(mut source: BoxStream<'static, Result<Bytes, HttpError>>, chunk_size: usize) -> ByteChunks {
    Box::pin(stream! {
        let mut buffer = BytesMut::new();

        while let Some(chunk) = source.next().await {
            match chunk {
                Ok(chunk) => buffer.extend_from_slice(&chunk),
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }

            while buffer.len() >= chunk_size {
                yield Ok(buffer.split_to(chunk_size).freeze());
            }
        }

        if !buffer.is_empty() {
            yield Ok(buffer.freeze());
        }
    })
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("streaming", &matches!(self.body, Body::Streaming(_)))
            .finish()
    }
}
