// Local filesystem adapter - Run directory and manifest file operations

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::ports::*;

/// Filesystem adapter backed by `tokio::fs`
#[derive(Debug, Default)]
pub struct FsLocalAdapter;

impl FsLocalAdapter {
    /// Create new filesystem adapter
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FsPort for FsLocalAdapter {
    async fn create_directory(&self, dir_path: &Path) -> Result<(), DomainError> {
        tokio::fs::create_dir_all(dir_path).await.map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to create directory {}: {}",
                dir_path.display(),
                e
            ))
        })
    }

    async fn file_exists(&self, file_path: &Path) -> Result<bool, DomainError> {
        Ok(tokio::fs::try_exists(file_path).await?)
    }

    async fn resolve_path(&self, file_path: &Path) -> Result<PathBuf, DomainError> {
        if file_path.is_absolute() {
            return Ok(file_path.to_path_buf());
        }
        Ok(std::env::current_dir()?.join(file_path))
    }

    async fn write_text(&self, file_path: &Path, contents: &str) -> Result<(), DomainError> {
        tokio::fs::write(file_path, contents).await.map_err(|e| {
            DomainError::FsFail(format!("Failed to write {}: {}", file_path.display(), e))
        })
    }
}
