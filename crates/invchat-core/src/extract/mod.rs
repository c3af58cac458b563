//! Invoice field extraction through the remote model.

mod parser;
mod prompt;
pub mod rules;

pub use parser::parse_response;
pub use prompt::EXTRACTION_PROMPT;

use std::path::{Path, PathBuf};

use invchat_model::{ImageInput, ModelBackend};
use tracing::{info, warn};

use crate::error::{InvchatError, Result};
use crate::models::invoice::{InvoiceCollection, InvoiceRecord};

/// Hooks for reporting extraction progress.
pub trait ExtractProgress {
    /// Called once before the first image.
    fn start(&self, _total: usize) {}

    /// Called after each image with the record produced for it.
    fn image_done(&self, _record: &InvoiceRecord) {}

    /// Called once after the last image.
    fn finish(&self) {}
}

/// Progress reporter that does nothing.
pub struct NoProgress;

impl ExtractProgress for NoProgress {}

/// Turns invoice images into records, one model request per image.
pub struct Extractor<B> {
    backend: B,
    prompt: String,
}

impl<B: ModelBackend> Extractor<B> {
    /// Create an extractor using the standard instruction prompt.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            prompt: EXTRACTION_PROMPT.to_string(),
        }
    }

    /// Replace the instruction prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Extract every image in `paths`, in order.
    ///
    /// Never fails: an image that cannot be read or sent produces a record
    /// with an error marker, so the collection always has one record per
    /// path.
    pub fn extract(&self, paths: &[PathBuf]) -> InvoiceCollection {
        self.extract_with_progress(paths, &NoProgress)
    }

    /// [`extract`](Self::extract) with progress reporting.
    pub fn extract_with_progress(
        &self,
        paths: &[PathBuf],
        progress: &dyn ExtractProgress,
    ) -> InvoiceCollection {
        progress.start(paths.len());

        let records: Vec<InvoiceRecord> = paths
            .iter()
            .map(|path| {
                let record = self.extract_one(path);
                progress.image_done(&record);
                record
            })
            .collect();

        progress.finish();

        let collection = InvoiceCollection::new(records);
        info!(
            "Extracted {} invoice(s), {} failed",
            collection.len(),
            collection.failed_count()
        );
        collection
    }

    /// List the images in `dir` and extract them.
    ///
    /// Fails only if the directory itself cannot be read.
    pub fn extract_dir(&self, dir: &Path, extensions: &[String]) -> Result<InvoiceCollection> {
        let paths = list_images(dir, extensions)?;
        Ok(self.extract(&paths))
    }

    /// Extract a single image.
    pub fn extract_one(&self, path: &Path) -> InvoiceRecord {
        let source = source_name(path);
        info!("Processing {}", source);

        let image = match ImageInput::from_path(path) {
            Ok(image) => image,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return InvoiceRecord::failed(source, e.to_string());
            }
        };

        match self.backend.generate_with_image(&image, &self.prompt) {
            Ok(reply) => {
                let record = parse_response(&source, &reply);
                for warning in &record.warnings {
                    warn!("{}: {}", source, warning);
                }
                record
            }
            Err(e) => {
                warn!(
                    "Model request via {} failed for {}: {}",
                    self.backend.name(),
                    source,
                    e
                );
                InvoiceRecord::failed(source, e.to_string())
            }
        }
    }
}

/// Image files directly inside `dir`, sorted by file name.
///
/// A file counts as an image when its lowercase extension is in
/// `extensions`. Subdirectories are not descended into.
pub fn list_images(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let input_dir_error = |source| InvchatError::InputDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(input_dir_error)? {
        let path = entry.map_err(input_dir_error)?.path();
        if !path.is_file() {
            continue;
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext)) {
            paths.push(path);
        }
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
