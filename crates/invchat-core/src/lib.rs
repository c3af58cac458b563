//! Core library for invchat.
//!
//! This crate provides:
//! - Invoice field extraction from images through a remote model
//! - Tolerant parsing of the model's replies (JSON or labeled lines)
//! - Locally computed aggregates over the extracted invoices
//! - Question answering over the collection through the same model

pub mod answer;
pub mod error;
pub mod extract;
pub mod models;

pub use answer::{Answerer, FALLBACK_ANSWER};
pub use error::{InvchatError, Result};
pub use extract::{ExtractProgress, Extractor, list_images, parse_response};
pub use models::config::InvchatConfig;
pub use models::invoice::{InvoiceCollection, InvoiceRecord};
pub use models::summary::CollectionSummary;

/// Re-export model boundary types.
pub use invchat_model::{GeminiBackend, GeminiConfig, ImageInput, ModelBackend, ModelError};
