pub mod toml_config;

use crate::app::DEFAULT_MAX_UPLOAD_BYTES;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 載入 `.env` 到行程環境；已存在的環境變數優先。`None` 時從目前目錄往上找。
///
/// Must run before [`ServerConfig`] is parsed so the `env` fallbacks see the file's values.
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(path) => dotenv::from_path(path).ok().map(|()| path.to_path_buf()),
        None => dotenv::dotenv().ok(),
    }
}

/// Which OCR engine backs the text extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackend {
    /// Run the `tesseract` executable
    Cli,
    /// Link libtesseract in-process (requires the `tesseract` feature)
    Bundled,
    /// Return a fixed text, for smoke tests without Tesseract installed
    Mock,
}

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "substance-scan")]
#[command(about = "Scan uploaded images for banned substance names")]
pub struct ServerConfig {
    #[arg(long, env = "SCAN_BIND", default_value = "0.0.0.0:5000")]
    pub bind: String,

    #[arg(long, env = "SCAN_UPLOAD_DIR", default_value = "static/uploaded_files")]
    pub upload_dir: String,

    #[arg(
        long,
        env = "SCAN_BANNED_SUBSTANCES",
        default_value = "data/banned_substances.csv"
    )]
    pub banned_substances: String,

    #[arg(long, default_value = "substance_name")]
    pub substance_column: String,

    #[arg(long, env = "SCAN_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    #[arg(long, value_delimiter = ',', default_value = "png,jpg,jpeg,gif")]
    pub allowed_extensions: Vec<String>,

    #[arg(long, value_enum, env = "SCAN_OCR", default_value_t = OcrBackend::Cli)]
    pub ocr: OcrBackend,

    #[arg(long, env = "TESSERACT_CMD", default_value = "tesseract")]
    pub tesseract_cmd: String,

    #[arg(long, default_value = "eng")]
    pub ocr_languages: String,

    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata_dir: Option<String>,

    #[arg(long, default_value = "", help = "Text returned by the mock OCR backend")]
    pub mock_ocr_text: String,

    #[arg(short, long, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Log process CPU and memory usage")]
    pub monitor: bool,
}

impl ServerConfig {
    /// Defaults as if started with no flags (environment variables still apply).
    pub fn defaults() -> Self {
        Self::parse_from(["substance-scan"])
    }

    /// 若有指定 TOML 檔，以檔案內容覆蓋
    pub fn load(mut self) -> Result<Self> {
        if let Some(path) = self.config.clone() {
            let file_config = toml_config::TomlConfig::from_file(&path)?;
            file_config.apply_to(&mut self);
            tracing::debug!("Applied configuration file {}", path);
        }
        Ok(self)
    }

    pub fn bind_addr(&self) -> Result<std::net::SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| crate::utils::error::ScanError::InvalidConfigValueError {
                field: "bind".to_string(),
                value: self.bind.clone(),
                reason: format!("Invalid socket address: {}", e),
            })
    }
}

impl ConfigProvider for ServerConfig {
    fn upload_dir(&self) -> &str {
        &self.upload_dir
    }

    fn banned_substances_path(&self) -> &str {
        &self.banned_substances
    }

    fn substance_column(&self) -> &str {
        &self.substance_column
    }

    fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_bind_address("bind", &self.bind)?;
        validation::validate_path("upload_dir", &self.upload_dir)?;
        validation::validate_path("banned_substances", &self.banned_substances)?;
        validation::validate_non_empty_string("substance_column", &self.substance_column)?;
        validation::validate_positive_number("max_upload_bytes", self.max_upload_bytes, 1)?;
        validation::validate_extension_list("allowed_extensions", &self.allowed_extensions)?;
        validation::validate_non_empty_string("ocr_languages", &self.ocr_languages)?;

        if self.ocr == OcrBackend::Cli {
            validation::validate_path("tesseract_cmd", &self.tesseract_cmd)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_and_extensions() {
        let config = ServerConfig::parse_from(["substance-scan"]);
        assert_eq!(config.max_upload_bytes(), 16 * 1024 * 1024);
        assert_eq!(config.substance_column(), "substance_name");
        assert_eq!(
            config.allowed_extensions(),
            &["png", "jpg", "jpeg", "gif"].map(String::from)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_flags() {
        let config = ServerConfig::parse_from([
            "substance-scan",
            "--bind",
            "127.0.0.1:8080",
            "--allowed-extensions",
            "png,tiff",
            "--ocr",
            "mock",
            "--max-upload-bytes",
            "1024",
        ]);
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
        assert_eq!(config.allowed_extensions, vec!["png", "tiff"]);
        assert_eq!(config.ocr, OcrBackend::Mock);
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_env_file_fills_unset_variables_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let env_path = dir.path().join(".env");
        std::fs::write(
            &env_path,
            "SUBSTANCE_SCAN_TEST_DOTENV_DIR=/srv/scan/uploads\nSUBSTANCE_SCAN_TEST_DOTENV_KEEP=from-file\n",
        )
        .unwrap();
        std::env::set_var("SUBSTANCE_SCAN_TEST_DOTENV_KEEP", "from-shell");

        assert_eq!(load_env_file(Some(&env_path)), Some(env_path.clone()));
        assert_eq!(
            std::env::var("SUBSTANCE_SCAN_TEST_DOTENV_DIR").unwrap(),
            "/srv/scan/uploads"
        );
        assert_eq!(
            std::env::var("SUBSTANCE_SCAN_TEST_DOTENV_KEEP").unwrap(),
            "from-shell"
        );

        std::env::remove_var("SUBSTANCE_SCAN_TEST_DOTENV_DIR");
        std::env::remove_var("SUBSTANCE_SCAN_TEST_DOTENV_KEEP");
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(load_env_file(Some(&dir.path().join(".env"))), None);
    }

    #[test]
    fn test_validation_rejects_zero_limit() {
        let mut config = ServerConfig::parse_from(["substance-scan"]);
        config.max_upload_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_bind() {
        let mut config = ServerConfig::parse_from(["substance-scan"]);
        config.bind = "not-an-address".to_string();
        assert!(config.validate().is_err());
        assert!(config.bind_addr().is_err());
    }
}
