//! TrustCall Common Utilities
//!
//! Shared infrastructure for all TrustCall crates:
//! - Error types and result aliases
//! - Session clock and sampling throttle
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
