pub mod bootstrap;
pub mod error;
pub mod pipelines;
pub mod server;

pub use bootstrap::{build_engine, build_ocr_engine, DefaultScanEngine};
pub use error::{ApiError, ErrorBody};
pub use pipelines::OcrPipeline;
pub use server::{read_upload_request, router, serve, AppState, DEFAULT_MAX_UPLOAD_BYTES};
