//! Remote model boundary for invchat.
//!
//! This crate provides a small interface over a hosted multimodal model:
//! - [`ModelBackend`], the "prompt in, text out" capability the rest of the
//!   workspace is written against
//! - [`GeminiBackend`], a blocking client for Google's `generateContent` API
//! - [`RetryPolicy`], bounded retries with exponential backoff
//! - [`ImageInput`], image bytes with a sniffed MIME type

mod backend;
mod error;
mod payload;
mod retry;

pub use backend::ModelBackend;
pub use backend::gemini::{GeminiBackend, GeminiConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT};
pub use error::ModelError;
pub use payload::ImageInput;
pub use retry::RetryPolicy;

#[cfg(any(test, feature = "testing"))]
pub use backend::scripted::{RecordedCall, ScriptedBackend};

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
