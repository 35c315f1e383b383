//! CLI module
//!
//! This module handles command-line argument parsing and command execution.

use clap::Parser;

pub mod args;
pub mod commands;

pub use args::{LogArgs, RunArgs};

/// Video interval editor
///
/// Cuts an interval out of a video, sends it to a remote video-to-video
/// edit model, and splices the edited clip back between the untouched
/// before/after parts.
#[derive(Parser, Debug)]
#[command(name = "v2v-edit")]
#[command(about = "Edit one interval of a video with a remote video-to-video model")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,

    #[command(flatten)]
    pub log: LogArgs,
}
