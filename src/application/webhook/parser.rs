//! Webhook parser - Verifies and decodes webhook deliveries

use serde::Deserialize;

use super::signature;
use crate::application::errors::WebhookError;
use crate::domain::entities::Event;

/// A decoded webhook delivery
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookPayload {
    /// Bot user id the delivery was addressed to
    pub destination: Option<String>,
    pub events: Vec<Event>,
}

#[derive(Deserialize)]
struct RawPayload {
    destination: Option<String>,
    #[serde(default)]
    events: Vec<serde_json::Value>,
}

/// Verifies delivery signatures and turns request bodies into events
#[derive(Clone)]
pub struct WebhookParser {
    channel_secret: String,
    skip_signature_verification: bool,
}

impl WebhookParser {
    pub fn new(channel_secret: impl Into<String>) -> Self {
        Self {
            channel_secret: channel_secret.into(),
            skip_signature_verification: false,
        }
    }

    /// Accept every delivery regardless of its signature. For local tooling only.
    pub fn skip_signature_verification(mut self, skip: bool) -> Self {
        self.skip_signature_verification = skip;
        self
    }

    /// Check `signature` against `body` using the channel secret
    pub fn verify(&self, body: &str, signature: &str) -> bool {
        signature::verify(&self.channel_secret, body.as_bytes(), signature)
    }

    /// Verify and decode a delivery, keeping only its events
    pub fn parse(&self, body: &str, signature: &str) -> Result<Vec<Event>, WebhookError> {
        Ok(self.parse_payload(body, signature)?.events)
    }

    /// Verify and decode a delivery
    pub fn parse_payload(&self, body: &str, signature: &str) -> Result<WebhookPayload, WebhookError> {
        if !self.skip_signature_verification && !self.verify(body, signature) {
            return Err(WebhookError::InvalidSignature);
        }

        let raw: RawPayload = serde_json::from_str(body)?;
        let events = raw
            .events
            .into_iter()
            .map(|value| {
                let event = Event::deserialize(&value)?;
                Ok(event.with_raw(value))
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;

        tracing::debug!("Parsed webhook delivery with {} event(s)", events.len());

        Ok(WebhookPayload {
            destination: raw.destination,
            events,
        })
    }
}

impl std::fmt::Debug for WebhookParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookParser")
            .field("channel_secret", &"<redacted>")
            .field("skip_signature_verification", &self.skip_signature_verification)
            .finish()
    }
}
