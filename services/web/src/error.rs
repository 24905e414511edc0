//! services/web/src/error.rs
//!
//! Defines the startup error type for the web service. Request-time failures
//! never reach this type: they are rendered on the page or as a relay error.

use crate::config::ConfigError;

/// The primary error type for the `web` service binary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The string tables compiled into the binary failed to parse.
    #[error("Translation tables error: {0}")]
    Translations(#[from] serde_json::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
