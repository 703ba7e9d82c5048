//! Where downloaded files end up.

use crate::error::{ClientError, ClientResult};
use hms_core::formatters::sanitize_filename;
use std::path::{Path, PathBuf};

pub trait DownloadSink: Send + Sync {
    /// Persists `bytes` under (a sanitised form of) `filename` and returns the saved path.
    fn save(&self, filename: &str, bytes: &[u8]) -> ClientResult<PathBuf>;
}

/// Writes into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, filename: &str, bytes: &[u8]) -> ClientResult<PathBuf> {
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .map(sanitize_filename)
            .filter(|n| !n.is_empty() && n.chars().any(|c| c != '.'))
            .unwrap_or_else(|| "download".to_owned());

        std::fs::create_dir_all(&self.dir).map_err(ClientError::Download)?;
        let path = self.dir.join(name);
        std::fs::write(&path, bytes).map_err(ClientError::Download)?;
        tracing::info!("saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}
