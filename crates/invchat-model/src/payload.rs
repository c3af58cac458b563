//! Image payloads sent alongside a prompt.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;

use crate::{ModelError, Result};

/// Raw image bytes plus the MIME type the provider should be told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    bytes: Vec<u8>,
    mime_type: String,
}

impl ImageInput {
    /// Wrap raw bytes, sniffing the format from the content.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes)
            .map_err(|e| ModelError::Image(format!("unrecognised image data: {}", e)))?;
        Ok(Self {
            mime_type: format.to_mime_type().to_string(),
            bytes,
        })
    }

    /// Read an image from disk.
    ///
    /// The MIME type is sniffed from the file content; the extension is only
    /// consulted when the content is not recognised.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        if bytes.is_empty() {
            return Err(ModelError::Image(format!("{} is empty", path.display())));
        }

        let format = match image::guess_format(&bytes) {
            Ok(format) => format,
            Err(_) => ImageFormat::from_path(path).map_err(|_| {
                ModelError::Image(format!("unsupported image format: {}", path.display()))
            })?,
        };

        Ok(Self {
            mime_type: format.to_mime_type().to_string(),
            bytes,
        })
    }

    /// Construct with an explicit MIME type.
    pub fn with_mime_type(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 (standard alphabet, padded) encoding of the bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}
