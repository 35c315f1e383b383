//! FFmpeg execution adapter
//!
//! Segment extraction and stream concatenation through the `ffmpeg`
//! executable. Both re-encode with the fixed codec pair so the pieces can be
//! joined without mismatched stream parameters.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Builder for FFmpeg command lines
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
        }
    }

    /// Add input argument (before -i)
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add output argument (after -i)
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Seek in the input before decoding
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format_seconds(seconds))
    }

    /// Limit output duration
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format_seconds(seconds))
    }

    /// Read the input as a concat demuxer list
    pub fn concat_list(self) -> Self {
        self.input_arg("-f")
            .input_arg("concat")
            .input_arg("-safe")
            .input_arg("0")
    }

    /// Encode with the pipeline's fixed codec pair
    pub fn fixed_codecs(self) -> Self {
        self.output_arg("-c:v")
            .output_arg(VIDEO_CODEC)
            .output_arg("-c:a")
            .output_arg(AUDIO_CODEC)
    }

    /// Shift output timestamps so they start at zero
    pub fn zero_timestamps(self) -> Self {
        self.output_arg("-avoid_negative_ts").output_arg("make_zero")
    }

    /// Build the command arguments
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["-y".to_string()];
        args.extend(self.input_args.iter().cloned());
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());
        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());
        args
    }
}

/// Millisecond precision is what the seek/duration flags need
fn format_seconds(seconds: f64) -> String {
    format!("{:.3}", seconds)
}

/// Command line for extracting one segment
pub fn extract_command(input: &Path, bounds: &SegmentBounds, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .seek(bounds.start.seconds)
        .duration(bounds.duration())
        .fixed_codecs()
        .zero_timestamps()
}

/// Command line for joining the segments of a manifest
pub fn concat_command(manifest_path: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(manifest_path, output)
        .concat_list()
        .fixed_codecs()
}

/// FFmpeg-based execution adapter
pub struct FFmpegAdapter {
    binary: PathBuf,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter, locating `ffmpeg` on PATH
    pub fn new() -> Result<Self, DomainError> {
        let binary = which::which("ffmpeg")
            .map_err(|_| DomainError::Config("ffmpeg not found on PATH".to_string()))?;
        Ok(Self { binary })
    }

    /// Create an adapter around an explicit binary path
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run a command to completion, failing on non-zero exit
    async fn run(&self, command: &FfmpegCommand) -> Result<(), DomainError> {
        let args = command.build_args();
        debug!("ffmpeg {}", args.join(" "));

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(DomainError::tool_fail("ffmpeg", output.status, &output.stderr));
        }

        Ok(())
    }
}

#[async_trait]
impl MediaPort for FFmpegAdapter {
    async fn extract_segment(
        &self,
        input: &Path,
        bounds: &SegmentBounds,
        output: &Path,
    ) -> Result<(), DomainError> {
        info!(
            segment = %bounds.kind,
            start = bounds.start.seconds,
            end = bounds.end.seconds,
            output = %output.display(),
            "Extracting segment"
        );
        self.run(&extract_command(input, bounds, output)).await
    }

    async fn concat_segments(
        &self,
        manifest_path: &Path,
        output: &Path,
    ) -> Result<(), DomainError> {
        info!(manifest = %manifest_path.display(), output = %output.display(), "Concatenating segments");
        self.run(&concat_command(manifest_path, output)).await
    }
}
