use crate::domain::model::ExtractionOutcome;
use crate::domain::ports::OcrEngine;
use crate::utils::error::ExtractionError;
use std::path::Path;
use std::sync::Arc;

/// Decodes a staged image and runs it through the configured OCR engine.
///
/// Nothing escapes this boundary as an error: unreadable files, decode failures, engine
/// errors and panics inside the OCR task all come back as [`ExtractionOutcome::Failed`].
#[derive(Clone)]
pub struct TextExtractor {
    engine: Arc<dyn OcrEngine>,
}

impl TextExtractor {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    pub async fn extract(&self, path: &Path) -> ExtractionOutcome {
        let engine = Arc::clone(&self.engine);
        let owned_path = path.to_path_buf();

        // OCR 是同步且吃 CPU 的工作，丟到 blocking pool
        let task =
            tokio::task::spawn_blocking(move || extract_blocking(engine.as_ref(), &owned_path));

        let outcome = match task.await {
            Ok(Ok(text)) => ExtractionOutcome::Extracted(text),
            Ok(Err(e)) => ExtractionOutcome::Failed(e),
            Err(e) => ExtractionOutcome::Failed(ExtractionError::TaskAborted(e.to_string())),
        };

        match &outcome {
            ExtractionOutcome::Extracted(text) => tracing::debug!(
                path = %path.display(),
                engine = self.engine.name(),
                chars = text.chars().count(),
                "Text extracted"
            ),
            ExtractionOutcome::Failed(e) => tracing::error!(
                path = %path.display(),
                engine = self.engine.name(),
                "Error extracting text: {}",
                e
            ),
        }

        outcome
    }
}

pub fn extract_blocking(engine: &dyn OcrEngine, path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path)?;
    let image =
        image::load_from_memory(&bytes).map_err(|e| ExtractionError::Decode(e.to_string()))?;
    engine.recognize(&image)
}
