//! Async adapters for the LINE Messaging API: an HTTP client over a pooled
//! reqwest session and a webhook dispatcher routing events to handlers.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::errors::{ConfigError, HandlerError, HttpError, LinebotError, WebhookError};
pub use application::webhook::{
    DispatchSummary, HandlerFailurePolicy, HandlerKey, HandlerResult, WebhookDispatcher, WebhookParser,
    WebhookPayload, SIGNATURE_HEADER,
};
pub use domain::entities::{Event, EventType, Message, MessageType, Source};
pub use infrastructure::config::Config;
pub use infrastructure::http::{
    HttpClient, HttpResponse, RequestBody, ReqwestHttpClient, Timeout, DEFAULT_CHUNK_SIZE, DEFAULT_TIMEOUT,
};
