use crate::core::extractor::TextExtractor;
use crate::core::matcher::BannedSubstanceSet;
use crate::core::{ExtractionOutcome, OcrEngine, Pipeline, StagedFile, Stager};
use crate::domain::model::UploadedFile;
use crate::utils::error::Result;
use std::sync::Arc;

/// Stage on disk, OCR the staged image, match against the banned-substance set.
pub struct OcrPipeline<S: Stager> {
    pub(crate) stager: S,
    pub(crate) extractor: TextExtractor,
    pub(crate) banned: Arc<BannedSubstanceSet>,
}

impl<S: Stager> OcrPipeline<S> {
    pub fn new(stager: S, engine: Arc<dyn OcrEngine>, banned: Arc<BannedSubstanceSet>) -> Self {
        Self {
            stager,
            extractor: TextExtractor::new(engine),
            banned,
        }
    }
}

#[async_trait::async_trait]
impl<S: Stager> Pipeline for OcrPipeline<S> {
    async fn stage(&self, file: &UploadedFile) -> Result<StagedFile> {
        self.stager.stage(&file.file_name, &file.data).await
    }

    async fn extract(&self, staged: &StagedFile) -> ExtractionOutcome {
        self.extractor.extract(staged.path()).await
    }

    fn find_substances(&self, text: &str) -> Vec<String> {
        self.banned.find_banned_substances(text)
    }

    fn substance_count(&self) -> usize {
        self.banned.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{LocalStager, MockOcrEngine};
    use crate::core::engine::ScanEngine;
    use crate::core::validator::UploadValidator;
    use crate::domain::model::UploadRequest;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn png_bytes() -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(image::RgbImage::new(16, 16))
            .write_to(&mut buffer, image::ImageOutputFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn pipeline(dir: &TempDir, ocr_text: &str) -> OcrPipeline<LocalStager> {
        OcrPipeline::new(
            LocalStager::new(dir.path()).unwrap(),
            Arc::new(MockOcrEngine::new(ocr_text)),
            Arc::new(BannedSubstanceSet::new(["clenbuterol", "testosterone"])),
        )
    }

    #[tokio::test]
    async fn test_end_to_end_scan_with_mock_ocr() {
        let dir = TempDir::new().unwrap();
        let engine = ScanEngine::new(
            pipeline(&dir, "Patient tested positive for Clenbuterol and Caffeine"),
            UploadValidator::default(),
        );

        let result = engine
            .run(UploadRequest::new("lab-result.PNG", png_bytes()))
            .await
            .unwrap();

        assert_eq!(result.found_substances, vec!["clenbuterol".to_string()]);
        // 上傳目錄要清空
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_image_yields_empty_text() {
        let dir = TempDir::new().unwrap();
        let engine = ScanEngine::new(
            pipeline(&dir, "Testosterone"),
            UploadValidator::default(),
        );

        let result = engine
            .run(UploadRequest::new("scan.jpg", b"not really a jpeg".to_vec()))
            .await
            .unwrap();

        assert_eq!(result.text, "");
        assert!(result.found_substances.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_substance_count() {
        let dir = TempDir::new().unwrap();
        assert_eq!(pipeline(&dir, "").substance_count(), 2);
    }
}
