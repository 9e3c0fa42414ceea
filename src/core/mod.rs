pub mod engine;
pub mod extractor;
pub mod matcher;
pub mod validator;

pub use crate::domain::model::{AnalysisResult, ExtractionOutcome, StagedFile, UploadRequest};
pub use crate::domain::ports::{ConfigProvider, OcrEngine, Pipeline, Stager};
pub use crate::utils::error::Result;
