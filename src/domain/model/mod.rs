// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::domain::errors::DomainError;

/// Video codec used for every encode the pipeline performs
pub const VIDEO_CODEC: &str = "libx264";
/// Audio codec used for every encode the pipeline performs
pub const AUDIO_CODEC: &str = "aac";

/// Suffix appended to the timestamp of each run directory
pub const RUN_DIR_SUFFIX: &str = "_v2v_edit";
/// Timestamp layout of the run identifier
pub const RUN_ID_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Time specification with precision - represents time in seconds with fractional precision
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Seconds as a float
    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Parse time string in various formats
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();

        // Plain seconds (float)
        if let Ok(seconds) = trimmed.parse::<f64>() {
            if seconds < 0.0 || !seconds.is_finite() {
                return Err(DomainError::BadArgs(format!(
                    "Time must be a non-negative number of seconds: {}",
                    trimmed
                )));
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        let (hours, minutes, seconds_part) = match parts.as_slice() {
            [m, s] => (0, parse_component(m, "minutes")?, s),
            [h, m, s] => {
                let minutes = parse_component(m, "minutes")?;
                if minutes >= 60 {
                    return Err(DomainError::BadArgs("Minutes must be less than 60".to_string()));
                }
                (parse_component(h, "hours")?, minutes, s)
            }
            _ => {
                return Err(DomainError::BadArgs(
                    "Invalid time format. Supported formats: seconds (e.g., 123.45), MM:SS.ms (e.g., 2:30.5), HH:MM:SS.ms (e.g., 1:02:30.5)".to_string(),
                ))
            }
        };

        let seconds = seconds_part
            .parse::<f64>()
            .map_err(|_| DomainError::BadArgs("Invalid seconds format".to_string()))?;
        if !(0.0..60.0).contains(&seconds) {
            return Err(DomainError::BadArgs("Seconds must be less than 60".to_string()));
        }

        Ok(Self::from_seconds(
            hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
        ))
    }

    /// Format as H:MM:SS.mmm (or M:SS.mmm below one hour)
    pub fn format_hms(&self) -> String {
        let total_ms = (self.seconds * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let seconds = (total_ms % 60_000) / 1000;
        let milliseconds = total_ms % 1000;

        if hours > 0 {
            format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
        } else {
            format!("{}:{:02}.{:03}", minutes, seconds, milliseconds)
        }
    }
}

fn parse_component(part: &str, name: &str) -> Result<u32, DomainError> {
    part.parse::<u32>()
        .map_err(|_| DomainError::BadArgs(format!("Invalid {} format", name)))
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

/// Which part of the source a segment file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Before,
    Interval,
    After,
    Edited,
    Final,
}

impl SegmentKind {
    /// File name of this segment inside a run directory
    pub fn file_name(&self) -> &'static str {
        match self {
            SegmentKind::Before => "before.mp4",
            SegmentKind::Interval => "interval.mp4",
            SegmentKind::After => "after.mp4",
            SegmentKind::Edited => "edited.mp4",
            SegmentKind::Final => "final.mp4",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SegmentKind::Before => "before",
            SegmentKind::Interval => "interval",
            SegmentKind::After => "after",
            SegmentKind::Edited => "edited",
            SegmentKind::Final => "final",
        };
        write!(f, "{}", name)
    }
}

/// Time window of the source that one extracted segment covers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentBounds {
    pub kind: SegmentKind,
    pub start: TimeSpec,
    pub end: TimeSpec,
}

impl SegmentBounds {
    /// Length of the window in seconds
    pub fn duration(&self) -> f64 {
        self.end.seconds - self.start.seconds
    }

    /// A window with no positive length cannot be extracted
    pub fn is_empty(&self) -> bool {
        self.duration() <= 0.0
    }
}

/// The [start, end) window of the source that gets sent for editing.
///
/// Construction does not validate `0 <= start < end`; see
/// [`crate::domain::rules::IntervalPolicy`] for the non-fatal checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub start: TimeSpec,
    pub end: TimeSpec,
}

impl Interval {
    /// Create a new interval
    pub fn new(start: TimeSpec, end: TimeSpec) -> Self {
        Self { start, end }
    }

    /// Create from raw seconds
    pub fn from_seconds(start: f64, end: f64) -> Self {
        Self::new(TimeSpec::from_seconds(start), TimeSpec::from_seconds(end))
    }

    /// Length of the interval in seconds
    pub fn duration(&self) -> f64 {
        self.end.seconds - self.start.seconds
    }

    /// Partition a source of `total` seconds into before / interval / after
    pub fn partition(&self, total: TimeSpec) -> SegmentPlan {
        SegmentPlan {
            before: SegmentBounds {
                kind: SegmentKind::Before,
                start: TimeSpec::from_seconds(0.0),
                end: self.start,
            },
            interval: SegmentBounds {
                kind: SegmentKind::Interval,
                start: self.start,
                end: self.end,
            },
            after: SegmentBounds {
                kind: SegmentKind::After,
                start: self.end,
                end: total,
            },
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}s → {:.1}s", self.start.seconds, self.end.seconds)
    }
}

/// The three windows that cover a source without gaps or overlaps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPlan {
    pub before: SegmentBounds,
    pub interval: SegmentBounds,
    pub after: SegmentBounds,
}

impl SegmentPlan {
    /// Segments in extraction order
    pub fn segments(&self) -> [SegmentBounds; 3] {
        [self.before, self.interval, self.after]
    }
}

/// Per-invocation output folder and the artifact paths inside it
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    pub id: String,
    pub dir: PathBuf,
}

impl RunContext {
    /// Derive the run identifier and directory from a point in time
    pub fn new<Tz>(output_root: impl AsRef<Path>, now: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let id = now.format(RUN_ID_FORMAT).to_string();
        let dir = output_root
            .as_ref()
            .join(format!("{}{}", id, RUN_DIR_SUFFIX));
        Self { id, dir }
    }

    /// Path of a segment file in this run
    pub fn segment(&self, kind: SegmentKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    pub fn before(&self) -> PathBuf {
        self.segment(SegmentKind::Before)
    }

    pub fn interval(&self) -> PathBuf {
        self.segment(SegmentKind::Interval)
    }

    pub fn after(&self) -> PathBuf {
        self.segment(SegmentKind::After)
    }

    pub fn edited(&self) -> PathBuf {
        self.segment(SegmentKind::Edited)
    }

    pub fn final_output(&self) -> PathBuf {
        self.segment(SegmentKind::Final)
    }

    /// Path of the concat manifest
    pub fn manifest(&self) -> PathBuf {
        self.dir.join("concat.txt")
    }
}

/// Ordered list of files handed to the concat demuxer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConcatManifest {
    pub entries: Vec<PathBuf>,
}

impl ConcatManifest {
    /// Keep only candidates that are given and present, preserving their order
    pub fn from_candidates<I, F>(candidates: I, exists: F) -> Self
    where
        I: IntoIterator<Item = Option<PathBuf>>,
        F: Fn(&Path) -> bool,
    {
        let entries = candidates
            .into_iter()
            .flatten()
            .filter(|path| exists(path))
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render in the concat demuxer's `file '<path>'` syntax
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|path| format!("file '{}'\n", escape_concat_path(path)))
            .collect()
    }
}

/// Quote a path for the concat demuxer; `'` becomes `'\''`
fn escape_concat_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', r"'\''")
}

/// Payload submitted to the remote video-to-video model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditRequest {
    pub prompt: String,
    pub video_url: String,
}

/// Opaque result returned by the remote edit service
#[derive(Debug, Clone, PartialEq)]
pub struct EditResult(pub serde_json::Value);

impl EditResult {
    /// Location of the produced clip, read from `video.url`
    pub fn video_url(&self) -> Result<String, DomainError> {
        let video = self
            .0
            .get("video")
            .ok_or_else(|| DomainError::MalformedResponse("result has no 'video' field".to_string()))?;
        video
            .get("url")
            .and_then(|url| url.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                DomainError::MalformedResponse("result has no string 'video.url' field".to_string())
            })
    }
}

/// Summary of one finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_dir: PathBuf,
    pub source_duration: f64,
    pub interval: Interval,
    pub edited_duration: Option<f64>,
    pub final_duration: Option<f64>,
}

impl RunReport {
    /// Difference between the final and the source duration, if known
    pub fn drift(&self) -> Option<f64> {
        self.final_duration.map(|d| d - self.source_duration)
    }

    /// Whether the final output stays within `tolerance` seconds of the source
    pub fn within_tolerance(&self, tolerance: f64) -> bool {
        self.drift().map_or(true, |d| d.abs() <= tolerance)
    }
}
