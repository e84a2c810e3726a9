//! Application layer - Webhook handling
//!
//! This layer contains:
//! - Errors: Error types for every layer of the crate
//! - Webhook: Signature verification, payload parsing, event dispatching

pub mod errors;
pub mod webhook;
