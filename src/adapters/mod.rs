// Adapters layer: disk staging, OCR engines and reference data loading.

pub mod ocr;
pub mod reference;
pub mod storage;

pub use ocr::{MockOcrEngine, TesseractCli};
#[cfg(feature = "tesseract")]
pub use ocr::BundledTesseract;
pub use reference::{load_banned_substances, try_load_banned_substances};
pub use storage::{sanitize_filename, LocalStager};
