use crate::core::wizard::MAX_UPLOAD_BYTES;
use crate::domain::ports::Storage;
use crate::utils::error::{PipelineError, Result};
use std::path::{Path, PathBuf};

/// 本機檔案讀取，超過大小上限的檔案直接拒絕
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    max_file_size: u64,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            max_file_size: MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub async fn file_size(&self, path: &str) -> Result<u64> {
        let metadata = tokio::fs::metadata(self.resolve(path)).await?;
        Ok(metadata.len())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);

        let size = tokio::fs::metadata(&full_path).await?.len();
        if size > self.max_file_size {
            return Err(PipelineError::FileTooLarge {
                size,
                limit: self.max_file_size,
            });
        }

        tracing::debug!("Reading {} bytes from {}", size, full_path.display());
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }
}
