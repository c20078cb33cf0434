// Local filesystem adapter - input checks and per-run scratch directories

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::domain::errors::*;
use crate::ports::*;

/// Local filesystem adapter
pub struct FsLocalAdapter {
    scratch_root: PathBuf,
}

impl FsLocalAdapter {
    /// Create new filesystem adapter rooted at `scratch_root`
    pub fn new(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: scratch_root.into(),
        }
    }

    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }
}

#[async_trait]
impl FsPort for FsLocalAdapter {
    async fn file_exists(&self, file_path: &Path) -> Result<bool, DomainError> {
        Ok(fs::metadata(file_path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false))
    }

    async fn prepare_scratch(&self, run_id: &str) -> Result<PathBuf, DomainError> {
        let dir = self.scratch_root.join(run_id);
        fs::create_dir_all(&dir).await.map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to create scratch directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_prepare_scratch_is_namespaced() {
        let root = TempDir::new().unwrap();
        let adapter = FsLocalAdapter::new(root.path());

        let a = adapter.prepare_scratch("run-a").await.unwrap();
        let b = adapter.prepare_scratch("run-b").await.unwrap();
        assert_ne!(a, b);
        assert!(a.is_dir());
        assert!(b.starts_with(root.path()));
    }

    #[tokio::test]
    async fn test_prepare_scratch_creates_missing_root() {
        let root = TempDir::new().unwrap();
        let adapter = FsLocalAdapter::new(root.path().join("cache").join("importer"));

        let dir = adapter.prepare_scratch("run-c").await.unwrap();
        assert!(dir.is_dir());
        assert!(dir.ends_with("cache/importer/run-c"));

        // Blocked by a plain file where the root should be
        let blocked = root.path().join("blocked");
        std::fs::write(&blocked, b"").unwrap();
        let adapter = FsLocalAdapter::new(&blocked);
        assert!(matches!(
            adapter.prepare_scratch("run-d").await,
            Err(DomainError::FsFail(_))
        ));
    }

    #[tokio::test]
    async fn test_file_exists_ignores_directories() {
        let root = TempDir::new().unwrap();
        let adapter = FsLocalAdapter::new(root.path());
        let file = root.path().join("in.mp4");
        std::fs::write(&file, b"data").unwrap();

        assert!(adapter.file_exists(&file).await.unwrap());
        assert!(!adapter.file_exists(root.path()).await.unwrap());
        assert!(!adapter.file_exists(&root.path().join("missing.mp4")).await.unwrap());
    }
}
