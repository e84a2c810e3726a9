//! Domain layer - Core types shared by the client and the dispatcher
//!
//! This layer contains:
//! - Entities: Webhook events, messages and sources

pub mod entities;
