use crate::core::OcrEngine;
use crate::utils::error::ExtractionError;
use image::{DynamicImage, ImageOutputFormat};
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

pub const DEFAULT_TESSERACT_CMD: &str = "tesseract";
pub const DEFAULT_OCR_LANGUAGES: &str = "eng";

/// Re-encode a decoded image as PNG so every engine receives the same input format.
fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, ExtractionError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .map_err(|e| ExtractionError::Decode(format!("PNG re-encoding failed: {e}")))?;
    Ok(buffer.into_inner())
}

/// Runs the `tesseract` executable, feeding the image on stdin and reading text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: PathBuf,
    languages: String,
}

impl TesseractCli {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            languages: DEFAULT_OCR_LANGUAGES.to_string(),
        }
    }

    /// Set language(s) for OCR (e.g., "eng", "eng+fra")
    pub fn with_languages(mut self, languages: &str) -> Self {
        self.languages = languages.to_string();
        self
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new(DEFAULT_TESSERACT_CMD)
    }
}

impl OcrEngine for TesseractCli {
    fn name(&self) -> &'static str {
        "tesseract-cli"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, ExtractionError> {
        let png = encode_png(image)?;

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", &self.languages])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ExtractionError::OcrInit(format!(
                    "cannot start {}: {e}",
                    self.command.display()
                ))
            })?;

        // tesseract 讀完整張圖才會開始輸出，先寫完 stdin 再收 stdout
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&png)
                .map_err(|e| ExtractionError::OcrProcessing(format!("writing image: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ExtractionError::OcrProcessing(e.to_string()))?;

        if !output.status.success() {
            return Err(ExtractionError::OcrProcessing(format!(
                "{} exited with {}: {}",
                self.command.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Tesseract linked in-process through libtesseract.
/// Only available when compiled with the `tesseract` feature flag.
#[cfg(feature = "tesseract")]
pub struct BundledTesseract {
    tessdata_dir: Option<String>,
    languages: String,
}

#[cfg(feature = "tesseract")]
impl BundledTesseract {
    pub fn new(tessdata_dir: Option<&std::path::Path>) -> Result<Self, ExtractionError> {
        let tessdata_dir = match tessdata_dir {
            Some(dir) => {
                if !dir.join("eng.traineddata").exists() {
                    tracing::warn!(
                        "No eng.traineddata under {}, OCR may fail to initialize",
                        dir.display()
                    );
                }
                Some(
                    dir.to_str()
                        .ok_or_else(|| ExtractionError::OcrInit("Invalid tessdata path".into()))?
                        .to_string(),
                )
            }
            None => None,
        };

        Ok(Self {
            tessdata_dir,
            languages: DEFAULT_OCR_LANGUAGES.to_string(),
        })
    }

    pub fn with_languages(mut self, languages: &str) -> Self {
        self.languages = languages.to_string();
        self
    }
}

#[cfg(feature = "tesseract")]
impl OcrEngine for BundledTesseract {
    fn name(&self) -> &'static str {
        "tesseract-bundled"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, ExtractionError> {
        let png = encode_png(image)?;

        // libtesseract handle 不是 Sync，每次辨識建立一個
        let tess = tesseract::Tesseract::new(self.tessdata_dir.as_deref(), Some(&self.languages))
            .map_err(|e| ExtractionError::OcrInit(format!("{e:?}")))?;

        let mut tess = tess
            .set_image_from_mem(&png)
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

        tess.get_text()
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))
    }
}

/// Fixed-output engine for tests and for smoke-testing a deployment without Tesseract.
#[derive(Debug, Clone, Default)]
pub struct MockOcrEngine {
    pub text: String,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn recognize(&self, _image: &DynamicImage) -> Result<String, ExtractionError> {
        Ok(self.text.clone())
    }
}
