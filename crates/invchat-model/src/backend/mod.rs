//! Model backend implementations.

pub mod gemini;

#[cfg(any(test, feature = "testing"))]
pub mod scripted;

use crate::{ImageInput, Result};

/// Trait for remote text-generation models.
///
/// This is the whole surface the rest of invchat sees of the provider:
/// "given a prompt, return text" and "given an image and a prompt, return
/// text". Implementations own their credentials, timeouts and retries.
pub trait ModelBackend {
    /// Short human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Generate a text reply for a text-only prompt.
    fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate a text reply for an image plus an instruction prompt.
    fn generate_with_image(&self, image: &ImageInput, prompt: &str) -> Result<String>;
}

impl<B: ModelBackend + ?Sized> ModelBackend for &B {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt)
    }

    fn generate_with_image(&self, image: &ImageInput, prompt: &str) -> Result<String> {
        (**self).generate_with_image(image, prompt)
    }
}

impl<B: ModelBackend + ?Sized> ModelBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt)
    }

    fn generate_with_image(&self, image: &ImageInput, prompt: &str) -> Result<String> {
        (**self).generate_with_image(image, prompt)
    }
}
