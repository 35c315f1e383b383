// Edit interactor - Orchestrates the split / remote edit / stitch pipeline

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// A user-visible pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStep {
    Extracting,
    Uploading,
    Editing { prompt: String },
    Downloading,
    Stitching,
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStep::Extracting => write!(f, "[1/5] Extracting clips..."),
            PipelineStep::Uploading => write!(f, "[2/5] Uploading interval clip..."),
            PipelineStep::Editing { prompt } => {
                write!(f, "[3/5] Running Kling O1 V2V Edit...\nPrompt: {}", prompt)
            }
            PipelineStep::Downloading => write!(f, "[4/5] Downloading edited clip"),
            PipelineStep::Stitching => write!(f, "[5/5] Stitching vid"),
        }
    }
}

/// Receives pipeline stages as they start
pub trait StepObserver: Send + Sync {
    fn on_step(&self, step: &PipelineStep);
}

/// Observer that discards every step
pub struct SilentObserver;

impl StepObserver for SilentObserver {
    fn on_step(&self, _step: &PipelineStep) {}
}

/// Request for one pipeline run
#[derive(Debug, Clone)]
pub struct EditRunRequest {
    pub source: PathBuf,
    pub interval: Interval,
    pub prompt: String,
    pub run: RunContext,
}

/// Interactor for the interval edit use case
pub struct EditInteractor {
    probe_port: Arc<dyn ProbePort>,
    media_port: Arc<dyn MediaPort>,
    remote_port: Arc<dyn RemoteEditPort>,
    download_port: Arc<dyn DownloadPort>,
    fs_port: Arc<dyn FsPort>,
}

impl EditInteractor {
    /// Create new edit interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        media_port: Arc<dyn MediaPort>,
        remote_port: Arc<dyn RemoteEditPort>,
        download_port: Arc<dyn DownloadPort>,
        fs_port: Arc<dyn FsPort>,
    ) -> Self {
        Self {
            probe_port,
            media_port,
            remote_port,
            download_port,
            fs_port,
        }
    }

    /// Create the timestamped run directory under `output_root`
    pub async fn prepare_run(
        &self,
        output_root: &Path,
        now: &DateTime<Local>,
    ) -> Result<RunContext, DomainError> {
        let run = RunContext::new(output_root, now);
        self.fs_port.create_directory(&run.dir).await?;
        info!(run_id = %run.id, dir = %run.dir.display(), "Run directory ready");
        Ok(run)
    }

    /// Execute the pipeline. The first failure aborts the run and leaves
    /// whatever artifacts were already written in the run directory.
    pub async fn execute(
        &self,
        request: &EditRunRequest,
        observer: &dyn StepObserver,
    ) -> Result<RunReport, DomainError> {
        let run = &request.run;

        observer.on_step(&PipelineStep::Extracting);
        let source_duration = self.probe_port.probe_duration(&request.source).await?;
        info!(
            source = %request.source.display(),
            seconds = source_duration.seconds,
            "Source probed"
        );
        let produced = self.extract_segments(request, source_duration).await?;

        observer.on_step(&PipelineStep::Uploading);
        let interval_url = self.remote_port.upload_file(&run.interval()).await?;
        info!(url = %interval_url, "Interval clip uploaded");

        observer.on_step(&PipelineStep::Editing {
            prompt: request.prompt.clone(),
        });
        let edit = EditRequest {
            prompt: request.prompt.clone(),
            video_url: interval_url,
        };
        let result = self.remote_port.run_edit(&edit).await?;
        let edited_url = result.video_url()?;

        observer.on_step(&PipelineStep::Downloading);
        self.download_port
            .download(&edited_url, &run.edited())
            .await?;

        observer.on_step(&PipelineStep::Stitching);
        self.stitch(run, &produced).await?;

        Ok(RunReport {
            run_dir: run.dir.clone(),
            source_duration: source_duration.seconds,
            interval: request.interval,
            edited_duration: self.probe_quietly(&run.edited()).await,
            final_duration: self.probe_quietly(&run.final_output()).await,
        })
    }

    /// Split the source into before / interval / after, returning the kinds
    /// this run wrote
    async fn extract_segments(
        &self,
        request: &EditRunRequest,
        source_duration: TimeSpec,
    ) -> Result<HashSet<SegmentKind>, DomainError> {
        for violation in IntervalPolicy::violations(&request.interval, source_duration) {
            warn!("{}; passing bounds to ffmpeg unchanged", violation);
        }

        let plan = request.interval.partition(source_duration);
        let extractable = SegmentSelector::extractable(&plan);

        for segment in plan.segments() {
            if !extractable.contains(&segment) {
                warn!(segment = %segment.kind, "Segment has no length, skipping extraction");
            }
        }

        let mut produced = HashSet::new();
        for segment in &extractable {
            self.media_port
                .extract_segment(&request.source, segment, &request.run.segment(segment.kind))
                .await?;
            produced.insert(segment.kind);
        }

        Ok(produced)
    }

    /// Write the concat manifest for segments this run produced and join them.
    /// Files left in the run directory by an earlier run are ignored.
    async fn stitch(
        &self,
        run: &RunContext,
        produced: &HashSet<SegmentKind>,
    ) -> Result<(), DomainError> {
        let mut candidates = Vec::new();
        let mut present = HashSet::new();
        for kind in [SegmentKind::Before, SegmentKind::Edited, SegmentKind::After] {
            if kind != SegmentKind::Edited && !produced.contains(&kind) {
                if self.fs_port.file_exists(&run.segment(kind)).await? {
                    warn!(segment = %kind, "Ignoring leftover file from an earlier run");
                }
                candidates.push(None);
                continue;
            }
            let path = self.fs_port.resolve_path(&run.segment(kind)).await?;
            if self.fs_port.file_exists(&path).await? {
                present.insert(path.clone());
            }
            candidates.push(Some(path));
        }

        let manifest = ConcatManifest::from_candidates(candidates, |p| present.contains(p));
        if manifest.is_empty() {
            warn!("No segments present; concat will run on an empty manifest");
        }

        self.fs_port
            .write_text(&run.manifest(), &manifest.render())
            .await?;
        self.media_port
            .concat_segments(&run.manifest(), &run.final_output())
            .await
    }

    /// Duration for the report; a failed probe only loses the number
    async fn probe_quietly(&self, path: &Path) -> Option<f64> {
        match self.probe_port.probe_duration(path).await {
            Ok(duration) => Some(duration.seconds),
            Err(e) => {
                warn!(path = %path.display(), "Could not probe for report: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests;
