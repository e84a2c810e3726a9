//! reqwest-backed HTTP client

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Method, RequestBuilder};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::{Headers, HttpClient, HttpResponse, Params, Timeout, DEFAULT_TIMEOUT};
use crate::application::errors::HttpError;

/// Request body for `post` and `delete`
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Bytes(Bytes),
    Text(String),
    /// Sent as `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

impl RequestBody {
    fn apply(self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            RequestBody::Bytes(bytes) => builder.body(bytes),
            RequestBody::Text(text) => builder.body(text),
            RequestBody::Form(pairs) => builder.form(&pairs),
            RequestBody::Json(value) => builder.json(&value),
        }
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(bytes.into())
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        RequestBody::Json(value)
    }
}

/// HTTP client sharing one reqwest session (connection pool) across requests.
///
/// A call that overrides the timeout runs on a session built with those
/// connect/read limits; such sessions are created once per distinct
/// timeout and reused.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    session: Client,
    timeout: Timeout,
    overrides: Arc<Mutex<HashMap<Timeout, Client>>>,
}

fn build_session(timeout: Timeout) -> Result<Client, HttpError> {
    Ok(Client::builder()
        .connect_timeout(timeout.connect())
        .read_timeout(timeout.read())
        .build()?)
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Timeout) -> Result<Self, HttpError> {
        Ok(Self {
            session: build_session(timeout)?,
            timeout,
            overrides: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Timeout used when a call does not pass its own
    pub fn timeout(&self) -> Timeout {
        self.timeout
    }

    /// Drop this handle. Clones keep using the session; its connection
    /// pool is closed when the last one is gone.
    pub fn release(self) {
        tracing::debug!("Releasing HTTP client handle");
    }

    fn session_for(&self, timeout: Option<Timeout>) -> Result<Client, HttpError> {
        let timeout = match timeout {
            Some(t) if t != self.timeout => t,
            _ => return Ok(self.session.clone()),
        };

        let mut overrides = self.overrides.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = overrides.get(&timeout) {
            return Ok(session.clone());
        }

        tracing::debug!("Building session for timeout {:?}", timeout);
        let session = build_session(timeout)?;
        overrides.insert(timeout, session.clone());
        Ok(session)
    }

    fn request(
        &self,
        method: Method,
        url: &str,
        headers: Option<&Headers>,
        timeout: Option<Timeout>,
    ) -> Result<RequestBuilder, HttpError> {
        tracing::debug!("{} {} (timeout {:?})", method, url, timeout.unwrap_or(self.timeout));

        let mut builder = self.session_for(timeout)?.request(method, url);

        if let Some(headers) = headers {
            for (name, value) in headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }

        Ok(builder)
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(
        &self,
        url: &str,
        headers: Option<&Headers>,
        params: Option<&Params>,
        stream: bool,
        timeout: Option<Timeout>,
    ) -> Result<HttpResponse, HttpError> {
        let mut builder = self.request(Method::GET, url, headers, timeout)?;
        if let Some(params) = params {
            builder = builder.query(params);
        }

        let response = builder.send().await?;

        if stream {
            Ok(HttpResponse::streaming(response))
        } else {
            HttpResponse::buffered(response).await
        }
    }

    async fn post(
        &self,
        url: &str,
        headers: Option<&Headers>,
        data: Option<RequestBody>,
        timeout: Option<Timeout>,
    ) -> Result<HttpResponse, HttpError> {
        let mut builder = self.request(Method::POST, url, headers, timeout)?;
        if let Some(data) = data {
            builder = data.apply(builder);
        }

        let response = builder.send().await?;
        Ok(HttpResponse::streaming(response))
    }

    async fn delete(
        &self,
        url: &str,
        headers: Option<&Headers>,
        data: Option<RequestBody>,
        timeout: Option<Timeout>,
    ) -> Result<HttpResponse, HttpError> {
        let mut builder = self.request(Method::DELETE, url, headers, timeout)?;
        if let Some(data) = data {
            builder = data.apply(builder);
        }

        let response = builder.send().await?;
        Ok(HttpResponse::streaming(response))
    }
}
