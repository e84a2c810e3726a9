//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Http: The HTTP client adapter over reqwest

pub mod config;
pub mod http;
