//! Common error types for the heatmap crates

use thiserror::Error;

/// Common result type for heatmap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across heatmap crates
///
/// Aggregation code (domains, alignment, unified scales) never returns these;
/// empty input degrades to documented defaults instead. Errors only surface
/// from I/O, document parsing and configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON document could not be parsed (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
