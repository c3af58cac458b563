//! Error types for the invchat-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the invchat library.
#[derive(Error, Debug)]
pub enum InvchatError {
    /// Configuration could not be loaded or is incomplete.
    #[error("configuration error: {0}")]
    Config(String),

    /// The input directory is missing or cannot be listed.
    #[error("cannot read input directory {path}: {source}")]
    InputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Remote model error.
    #[error("model error: {0}")]
    Model(#[from] invchat_model::ModelError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialisation error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the invchat library.
pub type Result<T> = std::result::Result<T, InvchatError>;
