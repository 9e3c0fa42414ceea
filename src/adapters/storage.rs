use crate::core::{StagedFile, Stager};
use crate::utils::error::Result;
use std::future::Future;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const MAX_FILENAME_CHARS: usize = 100;

/// Strip path separators and unsafe characters from a client-supplied filename.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter(|&c| c != '/' && c != '\\' && c != '\0')
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    // 連續的點會被當成上層目錄
    let mut sanitized = sanitized;
    while sanitized.contains("..") {
        sanitized = sanitized.replace("..", ".");
    }
    let sanitized = sanitized.trim_start_matches('.');

    let sanitized: String = sanitized.chars().take(MAX_FILENAME_CHARS).collect();

    if sanitized.is_empty() {
        "upload".into()
    } else {
        sanitized
    }
}

/// Runs `write` against the staged path. The guard already owns the path, so a write that
/// fails halfway leaves nothing behind.
async fn write_staged<F, Fut>(staged: StagedFile, write: F) -> Result<StagedFile>
where
    F: FnOnce(PathBuf) -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    write(staged.path().to_path_buf()).await?;
    Ok(staged)
}

/// Stages uploads as `<uuid>_<sanitized name>` inside a single local directory.
#[derive(Debug, Clone)]
pub struct LocalStager {
    upload_dir: PathBuf,
}

impl LocalStager {
    /// Creates the directory if needed and resolves it to an absolute path.
    pub fn new(upload_dir: impl AsRef<Path>) -> Result<Self> {
        let upload_dir = upload_dir.as_ref();
        std::fs::create_dir_all(upload_dir)?;
        let upload_dir = std::fs::canonicalize(upload_dir)?;

        tracing::debug!(upload_dir = %upload_dir.display(), "Upload directory ready");
        Ok(Self { upload_dir })
    }
}

impl Stager for LocalStager {
    async fn stage(&self, file_name: &str, data: &[u8]) -> Result<StagedFile> {
        let staged_name = format!("{}_{}", Uuid::new_v4(), sanitize_filename(file_name));
        let staged = StagedFile::new(self.upload_dir.join(&staged_name), staged_name);

        let staged = write_staged(staged, |path| tokio::fs::write(path, data)).await?;

        tracing::debug!(
            path = %staged.path().display(),
            size = data.len(),
            "Upload staged"
        );
        Ok(staged)
    }

    fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }
}
