//! Canned-reply backend for tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use super::ModelBackend;
use crate::{ImageInput, ModelError, Result};

/// A prompt the scripted backend received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    /// MIME type of the attached image, if any.
    pub image_mime: Option<String>,
    pub image_len: usize,
}

/// Replies from a queue, in order, and records every call.
///
/// When the queue is empty the `fallback` reply is used; without one the
/// call fails with [`ModelError::Http`].
#[derive(Default)]
pub struct ScriptedBackend {
    replies: RefCell<VecDeque<Result<String>>>,
    fallback: Option<String>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `text` every time the queue is empty.
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            fallback: Some(text.into()),
            ..Self::default()
        }
    }

    /// Queue a successful reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.replies.borrow_mut().push_back(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn fail(self, error: ModelError) -> Self {
        self.replies.borrow_mut().push_back(Err(error));
        self
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    fn next(&self, call: RecordedCall) -> Result<String> {
        self.calls.borrow_mut().push(call);
        match self.replies.borrow_mut().pop_front() {
            Some(reply) => reply,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| ModelError::Http("no scripted reply left".to_string())),
        }
    }
}

impl ModelBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        self.next(RecordedCall {
            prompt: prompt.to_string(),
            image_mime: None,
            image_len: 0,
        })
    }

    fn generate_with_image(&self, image: &ImageInput, prompt: &str) -> Result<String> {
        self.next(RecordedCall {
            prompt: prompt.to_string(),
            image_mime: Some(image.mime_type().to_string()),
            image_len: image.bytes().len(),
        })
    }
}
