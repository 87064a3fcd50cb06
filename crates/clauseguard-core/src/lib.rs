//! ClauseGuard Core Library
//!
//! Domain models, error types, configuration and constants shared by every
//! ClauseGuard crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
