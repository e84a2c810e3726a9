//! HTTP client adapter - Uniform async get/post/delete over a pooled session

use async_trait::async_trait;
use std::collections::HashMap;

use crate::application::errors::HttpError;

pub mod client;
pub mod response;
pub mod timeout;

pub use client::{ReqwestHttpClient, RequestBody};
pub use response::{ByteChunks, HttpResponse, DEFAULT_CHUNK_SIZE};
pub use timeout::{Timeout, DEFAULT_TIMEOUT};

/// Request headers
pub type Headers = HashMap<String, String>;

/// Query parameters, sent in order
pub type Params = Vec<(String, String)>;

/// HTTP client trait - abstraction over the transport used by SDK call sites.
///
/// Every method suspends until the exchange completes. `timeout` falls back
/// to the client's configured timeout when `None`. Transport failures are
/// returned as `HttpError::Transport`, never retried.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET request. With `stream` set the body is left on the wire for
    /// `HttpResponse::iter_content`; otherwise it is read before returning.
    async fn get(
        &self,
        url: &str,
        headers: Option<&Headers>,
        params: Option<&Params>,
        stream: bool,
        timeout: Option<Timeout>,
    ) -> Result<HttpResponse, HttpError>;

    /// POST request
    async fn post(
        &self,
        url: &str,
        headers: Option<&Headers>,
        data: Option<RequestBody>,
        timeout: Option<Timeout>,
    ) -> Result<HttpResponse, HttpError>;

    /// DELETE request
    async fn delete(
        &self,
        url: &str,
        headers: Option<&Headers>,
        data: Option<RequestBody>,
        timeout: Option<Timeout>,
    ) -> Result<HttpResponse, HttpError>;
}
