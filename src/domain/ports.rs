use crate::domain::model::{ExtractionOutcome, StagedFile, UploadedFile};
use crate::utils::error::{ExtractionError, Result};
use async_trait::async_trait;
use image::DynamicImage;
use std::path::Path;

pub trait Stager: Send + Sync {
    fn stage(
        &self,
        file_name: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<StagedFile>> + Send;
    fn upload_dir(&self) -> &Path;
}

/// Black-box OCR: decoded image in, recognized text out.
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &'static str;
    fn recognize(&self, image: &DynamicImage) -> std::result::Result<String, ExtractionError>;
}

pub trait ConfigProvider: Send + Sync {
    fn upload_dir(&self) -> &str;
    fn banned_substances_path(&self) -> &str;
    fn substance_column(&self) -> &str;
    fn allowed_extensions(&self) -> &[String];
    fn max_upload_bytes(&self) -> usize;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn stage(&self, file: &UploadedFile) -> Result<StagedFile>;
    async fn extract(&self, staged: &StagedFile) -> ExtractionOutcome;
    fn find_substances(&self, text: &str) -> Vec<String>;
    fn substance_count(&self) -> usize;
}
