//! Gatrabali Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by the other Gatrabali crates:
//! - Function configuration (project, store backend, credentials, push, sync)
//! - Global error type covering every failure a handler can report
//! - Structured logging with tracing
//! - Platform directory helpers
//! - Collection, field, and notification constants

pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod constants;

// Re-export commonly used items at the crate root
pub use config::AppConfig;
pub use error::{GbError, GbResult};
pub use logging::init_logging;
pub use platform::Platform;
