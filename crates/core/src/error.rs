//! Error types for subprompt.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! The tokenizer itself never fails; these cover the collaborators
//! (config, run log, metadata) and the typed weight parse.

use thiserror::Error;

/// The top-level error type for subprompt operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Run log errors ---
    #[error("Run log error: {0}")]
    RunLog(#[source] BoxError),

    // --- Metadata errors ---
    #[error("Metadata error: {0}")]
    Metadata(#[source] BoxError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Filesystem ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Source error carried by variants raised in other crates.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// A weight field that is not a valid floating-point number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{field}' is not a value, are you missing a space?")]
pub struct WeightParseError {
    pub field: String,
}
