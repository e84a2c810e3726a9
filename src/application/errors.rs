//! Application layer errors

use thiserror::Error;

use super::webhook::HandlerKey;

/// Error type a registered handler may fail with
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level errors surfaced by the `linebot` binary
#[derive(Error, Debug)]
pub enum LinebotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP adapter errors
#[derive(Error, Debug)]
pub enum HttpError {
    /// Connection failure, timeout or any other error from the transport,
    /// passed through untouched
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Webhook parsing and dispatch errors
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Handler for {key} failed: {source}")]
    Handler {
        key: HandlerKey,
        #[source]
        source: HandlerError,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
