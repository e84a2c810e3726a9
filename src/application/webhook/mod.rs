//! Webhook handling - Event-driven processing of platform deliveries

pub mod dispatcher;
pub mod handler_key;
pub mod parser;
pub mod signature;

pub use dispatcher::{DispatchSummary, Handler, HandlerFailurePolicy, HandlerResult, WebhookDispatcher};
pub use handler_key::HandlerKey;
pub use parser::{WebhookParser, WebhookPayload};
pub use signature::SIGNATURE_HEADER;
