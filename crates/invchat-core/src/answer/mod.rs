//! Answering natural-language questions about extracted invoices.

mod prompt;

pub use prompt::build_answer_prompt;

use chrono::{Local, NaiveDate};
use invchat_model::ModelBackend;
use tracing::{debug, warn};

use crate::models::invoice::InvoiceCollection;

/// Returned when the model could not be reached or gave no answer.
pub const FALLBACK_ANSWER: &str = "Sorry, I could not get an answer to that question.";

/// Returned for a blank question; the model is not called.
pub const EMPTY_QUESTION_HINT: &str = "Please ask a question about your invoices.";

/// Forwards questions plus the collection to the model.
///
/// Holds no conversation state: each answer depends only on the collection
/// and the question.
pub struct Answerer<B> {
    backend: B,
    today: Option<NaiveDate>,
}

impl<B: ModelBackend> Answerer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            today: None,
        }
    }

    /// Pin "today" instead of reading the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Answer `question` about `collection`.
    ///
    /// Returns the model's text unchanged apart from surrounding whitespace.
    /// Any failure yields [`FALLBACK_ANSWER`]; this never returns an error.
    pub fn answer(&self, collection: &InvoiceCollection, question: &str) -> String {
        if question.trim().is_empty() {
            return EMPTY_QUESTION_HINT.to_string();
        }

        let prompt = match build_answer_prompt(collection, question, self.today()) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!("Failed to build prompt: {}", e);
                return FALLBACK_ANSWER.to_string();
            }
        };
        debug!("Answer prompt is {} bytes", prompt.len());

        match self.backend.generate(&prompt) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!("Model request via {} failed: {}", self.backend.name(), e);
                FALLBACK_ANSWER.to_string()
            }
        }
    }
}
