use crate::utils::error::ExtractionError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A file part received in the `file` field of the upload form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Everything the validator needs from one multipart request.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub file: Option<UploadedFile>,
}

impl UploadRequest {
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file: Some(UploadedFile {
                file_name: file_name.into(),
                data,
            }),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// An uploaded image written to the upload directory for the lifetime of one request.
///
/// Dropping the value deletes the file. Removal is best effort: failures are logged and
/// never propagated, and a file that is already gone is not an error.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    file_name: String,
}

impl StagedFile {
    pub fn new(path: PathBuf, file_name: String) -> Self {
        Self { path, file_name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Staged file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove staged file"
            ),
        }
    }
}

/// Result of running OCR over a staged image.
#[derive(Debug)]
pub enum ExtractionOutcome {
    Extracted(String),
    Failed(ExtractionError),
}

impl ExtractionOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ExtractionOutcome::Failed(_))
    }

    /// 失敗一律視為「沒有文字」
    pub fn into_text(self) -> String {
        match self {
            ExtractionOutcome::Extracted(text) => text,
            ExtractionOutcome::Failed(_) => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub text: String,
    pub found_substances: Vec<String>,
}
