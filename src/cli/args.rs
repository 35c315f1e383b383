//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::adapters::AppConfig;
use crate::domain::errors::DomainError;
use crate::domain::model::TimeSpec;
use crate::utils::logging::parse_level;

/// Arguments for an edit run. Every flag is optional; without flags the run
/// uses the configured source and interval and asks for the prompt on stdin.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Source video file path
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Interval start (seconds, MM:SS.ms, or HH:MM:SS.ms)
    #[arg(short, long)]
    pub start: Option<String>,

    /// Interval end (seconds, MM:SS.ms, or HH:MM:SS.ms)
    #[arg(short, long)]
    pub end: Option<String>,

    /// Directory that receives the timestamped run folder
    #[arg(short, long)]
    pub output_root: Option<PathBuf>,

    /// Edit instruction; asked for interactively when omitted
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Configuration file (default: ./v2v_edit.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    /// Apply CLI overrides on top of file and environment settings
    pub fn apply(&self, config: &mut AppConfig) -> Result<(), DomainError> {
        if let Some(input) = &self.input {
            config.source.path = input.clone();
        }
        if let Some(start) = &self.start {
            config.source.start = TimeSpec::parse(start)
                .map_err(|e| DomainError::BadArgs(format!("Invalid start time '{}': {}", start, e)))?
                .as_seconds();
        }
        if let Some(end) = &self.end {
            config.source.end = TimeSpec::parse(end)
                .map_err(|e| DomainError::BadArgs(format!("Invalid end time '{}': {}", end, e)))?
                .as_seconds();
        }
        if let Some(root) = &self.output_root {
            config.output.root = root.clone();
        }
        Ok(())
    }
}

/// Logging flags
#[derive(Args, Debug, Default)]
pub struct LogArgs {
    /// Logging level (overridden by RUST_LOG)
    #[arg(long, env = "V2V_LOG_LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

fn parse_log_level(value: &str) -> Result<String, String> {
    parse_level(value).map_err(|e| e.to_string())
}
