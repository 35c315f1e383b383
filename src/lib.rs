//! v2v-splice library
//!
//! Interval extraction, remote video-to-video editing and re-stitching,
//! organised as ports (async traits) with ffmpeg/ffprobe and HTTP adapters.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{ConcatManifest, EditResult, Interval, RunContext, SegmentKind, TimeSpec};
