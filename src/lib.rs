pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use self::core::{
    engine::ScanEngine, matcher::BannedSubstanceSet, validator::UploadValidator,
};
pub use adapters::{LocalStager, MockOcrEngine, TesseractCli};
pub use app::{build_engine, router, OcrPipeline};
pub use config::{OcrBackend, ServerConfig};
pub use domain::model::{AnalysisResult, UploadRequest};
pub use utils::error::{Result, ScanError, UploadError};
