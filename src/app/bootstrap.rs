use crate::adapters::{load_banned_substances, LocalStager, MockOcrEngine, TesseractCli};
use crate::app::pipelines::OcrPipeline;
use crate::config::{OcrBackend, ServerConfig};
use crate::core::engine::ScanEngine;
use crate::core::validator::UploadValidator;
use crate::core::{ConfigProvider, OcrEngine, Stager};
use crate::utils::error::{Result, ScanError};
use std::sync::Arc;

pub type DefaultScanEngine = ScanEngine<OcrPipeline<LocalStager>>;

pub fn build_ocr_engine(config: &ServerConfig) -> Result<Arc<dyn OcrEngine>> {
    match config.ocr {
        OcrBackend::Cli => Ok(Arc::new(
            TesseractCli::new(&config.tesseract_cmd).with_languages(&config.ocr_languages),
        )),
        OcrBackend::Mock => {
            tracing::warn!("Using mock OCR backend, uploads will not be read");
            Ok(Arc::new(MockOcrEngine::new(&config.mock_ocr_text)))
        }
        #[cfg(feature = "tesseract")]
        OcrBackend::Bundled => {
            let engine = crate::adapters::BundledTesseract::new(
                config.tessdata_dir.as_deref().map(std::path::Path::new),
            )
            .map_err(|e| ScanError::ConfigError {
                message: e.to_string(),
            })?
            .with_languages(&config.ocr_languages);
            Ok(Arc::new(engine))
        }
        #[cfg(not(feature = "tesseract"))]
        OcrBackend::Bundled => Err(ScanError::ConfigError {
            message: "the bundled OCR backend needs a build with `--features tesseract`"
                .to_string(),
        }),
    }
}

/// Wire stager, OCR engine and banned-substance set into a ready-to-serve engine.
pub fn build_engine(config: &ServerConfig) -> Result<DefaultScanEngine> {
    let stager = LocalStager::new(config.upload_dir())?;
    let engine = build_ocr_engine(config)?;
    let banned = Arc::new(load_banned_substances(
        config.banned_substances_path(),
        config.substance_column(),
    ));

    if banned.is_empty() {
        tracing::warn!("Banned substance list is empty, every upload will report no matches");
    }

    tracing::info!(
        upload_dir = %stager.upload_dir().display(),
        ocr = engine.name(),
        substances = banned.len(),
        "Scan pipeline ready"
    );

    let pipeline = OcrPipeline::new(stager, engine, banned);
    Ok(ScanEngine::new_with_monitoring(
        pipeline,
        UploadValidator::new(config.allowed_extensions()),
        config.monitor,
    ))
}
