pub mod ocr_pipeline;

pub use ocr_pipeline::OcrPipeline;
