//! FFprobe adapter for media duration probing
//!
//! Reads the container-level `format=duration` entry rather than counting
//! frames, so the value matches what the muxer recorded.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    binary: PathBuf,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter, locating `ffprobe` on PATH
    pub fn new() -> Result<Self, DomainError> {
        let binary = which::which("ffprobe")
            .map_err(|_| DomainError::Config("ffprobe not found on PATH".to_string()))?;
        Ok(Self { binary })
    }

    /// Create an adapter around an explicit binary path
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Arguments that print only the bare duration value
    fn duration_args(file_path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "quiet".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            file_path.to_string_lossy().to_string(),
        ]
    }
}

/// Parse the bare duration printed by ffprobe
pub fn parse_duration_output(stdout: &str, file_path: &Path) -> Result<TimeSpec, DomainError> {
    let raw = stdout.trim();
    raw.parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite())
        .map(TimeSpec::from_seconds)
        .ok_or_else(|| {
            DomainError::ProbeFail(format!(
                "could not read duration of {} (ffprobe printed {:?})",
                file_path.display(),
                raw
            ))
        })
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe_duration(&self, file_path: &Path) -> Result<TimeSpec, DomainError> {
        let output = Command::new(&self.binary)
            .args(Self::duration_args(file_path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        // Exit status is not consulted: an unreadable file prints nothing,
        // which fails the parse below.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let duration = parse_duration_output(&stdout, file_path)?;
        debug!(path = %file_path.display(), seconds = duration.seconds, "Probed duration");
        Ok(duration)
    }
}
