use thiserror::Error;

/// 上傳驗證失敗 (client 端錯誤，一律 400)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("No file selected")]
    EmptyFilename,

    #[error("File type not allowed")]
    UnsupportedType { extension: Option<String> },
}

/// OCR 路徑上的失敗；不會往外傳，只會降級成空字串
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Cannot read staged image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding failed: {0}")]
    Decode(String),

    #[error("OCR engine initialization failed: {0}")]
    OcrInit(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("OCR task aborted: {0}")]
    TaskAborted(String),
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Upload rejected: {0}")]
    UploadError(#[from] UploadError),

    #[error("Payload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Reference data error: {message}")]
    ReferenceDataError { message: String },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Client,
    Configuration,
    Storage,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScanError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScanError::UploadError(_) | ScanError::PayloadTooLarge { .. } => ErrorCategory::Client,
            ScanError::ConfigError { .. }
            | ScanError::ConfigValidationError { .. }
            | ScanError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ScanError::IoError(_)
            | ScanError::CsvError(_)
            | ScanError::ReferenceDataError { .. } => ErrorCategory::Storage,
            ScanError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Client => ErrorSeverity::Low,
            // 參考資料讀不到時服務仍可運作 (空集合)
            ErrorCategory::Storage if matches!(self, ScanError::ReferenceDataError { .. }) => {
                ErrorSeverity::Medium
            }
            ErrorCategory::Storage | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScanError::UploadError(UploadError::MissingFile) => {
                "Send the image in a multipart field named 'file'"
            }
            ScanError::UploadError(UploadError::EmptyFilename) => {
                "Choose a file before submitting the form"
            }
            ScanError::UploadError(UploadError::UnsupportedType { .. }) => {
                "Upload a png, jpg, jpeg or gif image"
            }
            ScanError::PayloadTooLarge { .. } => "Resize or compress the image and retry",
            ScanError::IoError(_) => "Check that the upload directory exists and is writable",
            ScanError::CsvError(_) | ScanError::ReferenceDataError { .. } => {
                "Check the banned substances CSV path and its header row"
            }
            ScanError::ConfigError { .. }
            | ScanError::ConfigValidationError { .. }
            | ScanError::InvalidConfigValueError { .. } => {
                "Review the command line flags, environment variables and TOML file"
            }
            ScanError::ProcessingError { .. } => {
                "Retry the request; inspect the server log if it keeps failing"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScanError::UploadError(e) => e.to_string(),
            ScanError::PayloadTooLarge { .. } => "File too large".to_string(),
            ScanError::ConfigError { .. }
            | ScanError::ConfigValidationError { .. }
            | ScanError::InvalidConfigValueError { .. } => {
                format!("Invalid configuration: {}", self)
            }
            _ => "File processing failed".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_error_messages() {
        assert_eq!(UploadError::MissingFile.to_string(), "No file uploaded");
        assert_eq!(UploadError::EmptyFilename.to_string(), "No file selected");
        assert_eq!(
            UploadError::UnsupportedType {
                extension: Some("exe".to_string())
            }
            .to_string(),
            "File type not allowed"
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = ScanError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/srv/uploads is read-only",
        ));
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.user_friendly_message(), "File processing failed");
    }

    #[test]
    fn test_client_errors_are_low_severity() {
        let err = ScanError::from(UploadError::EmptyFilename);
        assert_eq!(err.category(), ErrorCategory::Client);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.user_friendly_message(), "No file selected");

        let err = ScanError::PayloadTooLarge { limit: 16 };
        assert_eq!(err.user_friendly_message(), "File too large");
    }

    #[test]
    fn test_config_errors_are_critical() {
        let err = ScanError::InvalidConfigValueError {
            field: "upload_dir".to_string(),
            value: String::new(),
            reason: "Path cannot be empty".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("upload_dir"));
    }
}
