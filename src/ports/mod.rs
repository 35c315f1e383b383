// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for media duration probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Container-level duration of a media file
    async fn probe_duration(&self, file_path: &Path) -> Result<TimeSpec, DomainError>;
}

/// Port for media encoding: segment extraction and concatenation
#[async_trait]
pub trait MediaPort: Send + Sync {
    /// Re-encode the `[start, end)` window of `input` into `output`
    async fn extract_segment(
        &self,
        input: &Path,
        bounds: &SegmentBounds,
        output: &Path,
    ) -> Result<(), DomainError>;

    /// Join the files listed in the manifest at `manifest_path` into `output`
    async fn concat_segments(&self, manifest_path: &Path, output: &Path)
        -> Result<(), DomainError>;
}

/// Port for the remote video-to-video edit service
#[async_trait]
pub trait RemoteEditPort: Send + Sync {
    /// Transfer a local file to remote storage and return a fetchable URL
    async fn upload_file(&self, file_path: &Path) -> Result<String, DomainError>;

    /// Submit an edit job and block until its result is available
    async fn run_edit(&self, request: &EditRequest) -> Result<EditResult, DomainError>;
}

/// Port for fetching remote content to disk
#[async_trait]
pub trait DownloadPort: Send + Sync {
    /// Fetch `url` and persist its body at `destination`
    async fn download(&self, url: &str, destination: &Path) -> Result<(), DomainError>;
}

/// Port for file system operations
#[async_trait]
pub trait FsPort: Send + Sync {
    /// Create directory (including parent directories)
    async fn create_directory(&self, dir_path: &Path) -> Result<(), DomainError>;

    /// Check if file exists
    async fn file_exists(&self, file_path: &Path) -> Result<bool, DomainError>;

    /// Resolve a path to an absolute one
    async fn resolve_path(&self, file_path: &Path) -> Result<PathBuf, DomainError>;

    /// Write a text file, replacing any previous content
    async fn write_text(&self, file_path: &Path, contents: &str) -> Result<(), DomainError>;
}
