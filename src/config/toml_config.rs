use crate::config::{OcrBackend, ServerConfig};
use crate::utils::error::{Result, ScanError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub server: Option<ServerSection>,
    pub upload: Option<UploadSection>,
    pub reference: Option<ReferenceSection>,
    pub ocr: Option<OcrSection>,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadSection {
    pub dir: Option<String>,
    pub max_bytes: Option<usize>,
    pub allowed_extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceSection {
    pub path: Option<String>,
    pub column: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrSection {
    pub backend: Option<OcrBackend>,
    pub command: Option<String>,
    pub languages: Option<String>,
    pub tessdata_dir: Option<String>,
    pub mock_text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: Option<bool>,
    pub verbose: Option<bool>,
    pub log_json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScanError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScanError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${UPLOAD_DIR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScanError::ConfigError {
            message: format!("env placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 檔案中有寫的值覆蓋命令列預設值
    pub fn apply_to(&self, config: &mut ServerConfig) {
        if let Some(server) = &self.server {
            if let Some(bind) = &server.bind {
                config.bind = bind.clone();
            }
        }

        if let Some(upload) = &self.upload {
            if let Some(dir) = &upload.dir {
                config.upload_dir = dir.clone();
            }
            if let Some(max_bytes) = upload.max_bytes {
                config.max_upload_bytes = max_bytes;
            }
            if let Some(extensions) = &upload.allowed_extensions {
                config.allowed_extensions = extensions.clone();
            }
        }

        if let Some(reference) = &self.reference {
            if let Some(path) = &reference.path {
                config.banned_substances = path.clone();
            }
            if let Some(column) = &reference.column {
                config.substance_column = column.clone();
            }
        }

        if let Some(ocr) = &self.ocr {
            if let Some(backend) = ocr.backend {
                config.ocr = backend;
            }
            if let Some(command) = &ocr.command {
                config.tesseract_cmd = command.clone();
            }
            if let Some(languages) = &ocr.languages {
                config.ocr_languages = languages.clone();
            }
            if ocr.tessdata_dir.is_some() {
                config.tessdata_dir = ocr.tessdata_dir.clone();
            }
            if let Some(text) = &ocr.mock_text {
                config.mock_ocr_text = text.clone();
            }
        }

        if let Some(monitoring) = &self.monitoring {
            // 命令列旗標只能開啟，不會被檔案關閉
            config.monitor |= monitoring.enabled.unwrap_or(false);
            config.verbose |= monitoring.verbose.unwrap_or(false);
            config.log_json |= monitoring.log_json.unwrap_or(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::Validate;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[server]
bind = "127.0.0.1:8080"

[upload]
dir = "/var/lib/substance-scan/uploads"
max_bytes = 1048576
allowed_extensions = ["png", "jpg"]

[reference]
path = "/etc/substance-scan/wada.csv"
column = "name"

[ocr]
backend = "mock"
mock_text = "Ephedrine"

[monitoring]
enabled = true
"#;

        let file_config = TomlConfig::from_toml_str(toml_content).unwrap();
        let mut config = ServerConfig::parse_from(["substance-scan"]);
        file_config.apply_to(&mut config);

        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.upload_dir, "/var/lib/substance-scan/uploads");
        assert_eq!(config.max_upload_bytes, 1048576);
        assert_eq!(config.allowed_extensions, vec!["png", "jpg"]);
        assert_eq!(config.banned_substances, "/etc/substance-scan/wada.csv");
        assert_eq!(config.substance_column, "name");
        assert_eq!(config.ocr, OcrBackend::Mock);
        assert_eq!(config.mock_ocr_text, "Ephedrine");
        assert!(config.monitor);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let file_config = TomlConfig::from_toml_str("").unwrap();
        let mut config = ServerConfig::parse_from(["substance-scan"]);
        let before = config.clone();
        file_config.apply_to(&mut config);

        assert_eq!(config.bind, before.bind);
        assert_eq!(config.max_upload_bytes, before.max_upload_bytes);
        assert_eq!(config.ocr, before.ocr);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SUBSTANCE_SCAN_TEST_UPLOADS", "/tmp/scan-uploads");

        let toml_content = r#"
[upload]
dir = "${SUBSTANCE_SCAN_TEST_UPLOADS}"

[reference]
path = "${SUBSTANCE_SCAN_TEST_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.upload.unwrap().dir.unwrap(),
            "/tmp/scan-uploads"
        );
        assert_eq!(
            config.reference.unwrap().path.unwrap(),
            "${SUBSTANCE_SCAN_TEST_UNSET_VAR}"
        );

        std::env::remove_var("SUBSTANCE_SCAN_TEST_UPLOADS");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[upload\nmax_bytes = ").unwrap_err();
        assert!(matches!(err, ScanError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(TomlConfig::from_toml_str("[ocr]\nbackend = \"cloud\"\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nbind = \"0.0.0.0:9000\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.unwrap().bind.unwrap(), "0.0.0.0:9000");
    }

    #[test]
    fn test_server_config_load_applies_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[upload]\nmax_bytes = 2048\n")
            .unwrap();

        let mut config = ServerConfig::parse_from(["substance-scan"]);
        config.config = Some(temp_file.path().to_string_lossy().into_owned());

        let config = config.load().unwrap();
        assert_eq!(config.max_upload_bytes, 2048);
    }
}
