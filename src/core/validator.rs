use crate::domain::model::{UploadRequest, UploadedFile};
use crate::utils::error::UploadError;
use std::collections::HashSet;

pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Text after the last `.`; `None` when the name has no dot at all.
pub fn file_extension(file_name: &str) -> Option<&str> {
    file_name.rsplit_once('.').map(|(_, ext)| ext)
}

#[derive(Debug, Clone)]
pub struct UploadValidator {
    allowed_extensions: HashSet<String>,
}

impl UploadValidator {
    pub fn new<S: AsRef<str>>(allowed_extensions: &[S]) -> Self {
        Self {
            allowed_extensions: allowed_extensions
                .iter()
                .map(|ext| ext.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_allowed(&self, file_name: &str) -> bool {
        file_extension(file_name)
            .map(|ext| self.allowed_extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    /// 依序檢查：有沒有檔案、檔名是否為空、副檔名是否允許
    pub fn validate<'a>(
        &self,
        request: &'a UploadRequest,
    ) -> Result<&'a UploadedFile, UploadError> {
        let file = request.file.as_ref().ok_or(UploadError::MissingFile)?;

        if file.file_name.is_empty() {
            return Err(UploadError::EmptyFilename);
        }

        if !self.is_allowed(&file.file_name) {
            return Err(UploadError::UnsupportedType {
                extension: file_extension(&file.file_name).map(str::to_lowercase),
            });
        }

        Ok(file)
    }
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new(&DEFAULT_ALLOWED_EXTENSIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> UploadRequest {
        UploadRequest::new(name, b"image bytes".to_vec())
    }

    #[test]
    fn test_allowed_extensions_any_case() {
        let validator = UploadValidator::default();
        for name in [
            "scan.png", "scan.PNG", "photo.jpg", "photo.JpG", "photo.jpeg", "photo.JPEG",
            "anim.gif", "anim.Gif",
        ] {
            assert!(validator.validate(&request(name)).is_ok(), "{} should pass", name);
        }
    }

    #[test]
    fn test_uses_last_dot_only() {
        let validator = UploadValidator::default();
        assert!(validator.validate(&request("archive.tar.png")).is_ok());
        assert_eq!(
            validator.validate(&request("scan.png.exe")).unwrap_err(),
            UploadError::UnsupportedType {
                extension: Some("exe".to_string())
            }
        );
    }

    #[test]
    fn test_missing_file() {
        let validator = UploadValidator::default();
        assert_eq!(
            validator.validate(&UploadRequest::empty()).unwrap_err(),
            UploadError::MissingFile
        );
    }

    #[test]
    fn test_empty_filename() {
        let validator = UploadValidator::default();
        assert_eq!(
            validator.validate(&request("")).unwrap_err(),
            UploadError::EmptyFilename
        );
    }

    #[test]
    fn test_unsupported_types() {
        let validator = UploadValidator::default();
        assert_eq!(
            validator.validate(&request("report.exe")).unwrap_err(),
            UploadError::UnsupportedType {
                extension: Some("exe".to_string())
            }
        );
        // 沒有副檔名
        assert_eq!(
            validator.validate(&request("README")).unwrap_err(),
            UploadError::UnsupportedType { extension: None }
        );
        // 結尾的點代表空副檔名
        assert!(validator.validate(&request("scan.")).is_err());
        assert!(validator.validate(&request("scan.bmp")).is_err());
    }

    #[test]
    fn test_custom_allow_list() {
        let validator = UploadValidator::new(&["TIFF".to_string()]);
        assert!(validator.is_allowed("page.tiff"));
        assert!(!validator.is_allowed("page.png"));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("a.b.c"), Some("c"));
        assert_eq!(file_extension(".png"), Some("png"));
        assert_eq!(file_extension("noext"), None);
    }
}
