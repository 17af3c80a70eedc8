//! Error types for the icon resolver

use std::io;
use thiserror::Error;

/// Result type for icon resolver operations
pub type Result<T> = std::result::Result<T, IconResolverError>;

/// Errors that can occur in the icon resolver
#[derive(Error, Debug)]
pub enum IconResolverError {
    /// A second cache was requested from an owner that already issued one
    #[error("Icon cache already constructed for this plugin instance")]
    CacheAlreadyConstructed,

    /// A custom rule pattern could not be compiled
    #[error("Malformed rule pattern '{pattern}': {source}")]
    MalformedRule {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The plugin lifecycle is not active
    #[error("Icon resolver is not active")]
    NotActive,

    /// The plugin lifecycle was activated twice
    #[error("Icon resolver is already active")]
    AlreadyActive,

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
