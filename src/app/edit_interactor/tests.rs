// Unit tests for the edit interactor

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Local;
use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::adapters::FsLocalAdapter;

type CallLog = Arc<Mutex<Vec<String>>>;

fn record(log: &CallLog, entry: impl Into<String>) {
    log.lock().unwrap().push(entry.into());
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

struct MockProbe {
    durations: HashMap<String, f64>,
    log: CallLog,
}

#[async_trait]
impl ProbePort for MockProbe {
    async fn probe_duration(&self, file_path: &Path) -> Result<TimeSpec, DomainError> {
        let name = file_name(file_path);
        record(&self.log, format!("probe {}", name));
        self.durations
            .get(&name)
            .map(|s| TimeSpec::from_seconds(*s))
            .ok_or_else(|| DomainError::ProbeFail(name))
    }
}

struct MockMedia {
    fail_on: Option<SegmentKind>,
    log: CallLog,
}

#[async_trait]
impl MediaPort for MockMedia {
    async fn extract_segment(
        &self,
        _input: &Path,
        bounds: &SegmentBounds,
        output: &Path,
    ) -> Result<(), DomainError> {
        record(
            &self.log,
            format!("extract {} {}-{}", bounds.kind, bounds.start.seconds, bounds.end.seconds),
        );
        if self.fail_on == Some(bounds.kind) {
            return Err(DomainError::ToolFail {
                tool: "ffmpeg".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "Invalid data found when processing input".to_string(),
            });
        }
        std::fs::write(output, bounds.kind.to_string())?;
        Ok(())
    }

    async fn concat_segments(&self, manifest_path: &Path, output: &Path) -> Result<(), DomainError> {
        record(&self.log, format!("concat {}", file_name(manifest_path)));
        std::fs::write(output, "final")?;
        Ok(())
    }
}

struct MockRemote {
    result: serde_json::Value,
    log: CallLog,
}

#[async_trait]
impl RemoteEditPort for MockRemote {
    async fn upload_file(&self, file_path: &Path) -> Result<String, DomainError> {
        record(&self.log, format!("upload {}", file_name(file_path)));
        Ok("https://files.example.com/interval.mp4".to_string())
    }

    async fn run_edit(&self, request: &EditRequest) -> Result<EditResult, DomainError> {
        record(&self.log, format!("edit {} <{}>", request.video_url, request.prompt));
        Ok(EditResult(self.result.clone()))
    }
}

struct MockDownload {
    log: CallLog,
}

#[async_trait]
impl DownloadPort for MockDownload {
    async fn download(&self, url: &str, destination: &Path) -> Result<(), DomainError> {
        record(&self.log, format!("download {} -> {}", url, file_name(destination)));
        std::fs::write(destination, "edited")?;
        Ok(())
    }
}

#[derive(Default)]
struct RecordingObserver(Mutex<Vec<PipelineStep>>);

impl StepObserver for RecordingObserver {
    fn on_step(&self, step: &PipelineStep) {
        self.0.lock().unwrap().push(step.clone());
    }
}

struct Harness {
    interactor: EditInteractor,
    log: CallLog,
    root: TempDir,
}

fn harness(result: serde_json::Value, fail_on: Option<SegmentKind>) -> Harness {
    let log: CallLog = Arc::default();
    let durations = HashMap::from([
        ("source.mp4".to_string(), 10.0),
        ("edited.mp4".to_string(), 4.0),
        ("final.mp4".to_string(), 10.0),
    ]);
    let interactor = EditInteractor::new(
        Arc::new(MockProbe {
            durations,
            log: log.clone(),
        }),
        Arc::new(MockMedia {
            fail_on,
            log: log.clone(),
        }),
        Arc::new(MockRemote {
            result,
            log: log.clone(),
        }),
        Arc::new(MockDownload { log: log.clone() }),
        Arc::new(FsLocalAdapter::new()),
    );
    Harness {
        interactor,
        log,
        root: tempfile::tempdir().unwrap(),
    }
}

fn edited_result() -> serde_json::Value {
    json!({ "video": { "url": "https://cdn.example.com/edited.mp4" } })
}

async fn request(h: &Harness, start: f64, end: f64) -> EditRunRequest {
    let run = h
        .interactor
        .prepare_run(h.root.path(), &Local::now())
        .await
        .unwrap();
    EditRunRequest {
        source: h.root.path().join("source.mp4"),
        interval: Interval::from_seconds(start, end),
        prompt: "add falling snow".to_string(),
        run,
    }
}

fn calls(h: &Harness) -> Vec<String> {
    h.log.lock().unwrap().clone()
}

#[tokio::test]
async fn test_prepare_run_creates_timestamped_directory() {
    let h = harness(edited_result(), None);
    let run = h
        .interactor
        .prepare_run(h.root.path(), &Local::now())
        .await
        .unwrap();

    assert!(run.dir.is_dir());
    assert!(run.dir.starts_with(h.root.path()));
    assert!(file_name(&run.dir).ends_with("_v2v_edit"));
}

#[tokio::test]
async fn test_full_run_calls_steps_in_order() {
    let h = harness(edited_result(), None);
    let req = request(&h, 3.0, 7.0).await;
    let observer = RecordingObserver::default();

    let report = h.interactor.execute(&req, &observer).await.unwrap();

    assert_eq!(
        calls(&h),
        vec![
            "probe source.mp4",
            "extract before 0-3",
            "extract interval 3-7",
            "extract after 7-10",
            "upload interval.mp4",
            "edit https://files.example.com/interval.mp4 <add falling snow>",
            "download https://cdn.example.com/edited.mp4 -> edited.mp4",
            "concat concat.txt",
            "probe edited.mp4",
            "probe final.mp4",
        ]
    );
    assert_eq!(
        *observer.0.lock().unwrap(),
        vec![
            PipelineStep::Extracting,
            PipelineStep::Uploading,
            PipelineStep::Editing {
                prompt: "add falling snow".to_string()
            },
            PipelineStep::Downloading,
            PipelineStep::Stitching,
        ]
    );

    assert_eq!(report.source_duration, 10.0);
    assert_eq!(report.edited_duration, Some(4.0));
    assert_eq!(report.final_duration, Some(10.0));
    assert!(req.run.final_output().exists());
}

#[tokio::test]
async fn test_manifest_lists_before_edited_after() {
    let h = harness(edited_result(), None);
    let req = request(&h, 3.0, 7.0).await;

    h.interactor.execute(&req, &SilentObserver).await.unwrap();

    let manifest = std::fs::read_to_string(req.run.manifest()).unwrap();
    let lines: Vec<&str> = manifest.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("file '/") && lines[0].ends_with("before.mp4'"));
    assert!(lines[1].ends_with("edited.mp4'"));
    assert!(lines[2].ends_with("after.mp4'"));
    assert!(!manifest.contains("interval.mp4"));
}

#[tokio::test]
async fn test_interval_at_start_skips_before_segment() {
    let h = harness(edited_result(), None);
    let req = request(&h, 0.0, 4.0).await;

    h.interactor.execute(&req, &SilentObserver).await.unwrap();

    assert!(!calls(&h).iter().any(|c| c.starts_with("extract before")));
    let manifest = std::fs::read_to_string(req.run.manifest()).unwrap();
    let lines: Vec<&str> = manifest.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("edited.mp4'"));
    assert!(lines[1].ends_with("after.mp4'"));
}

#[tokio::test]
async fn test_interval_to_end_skips_after_segment() {
    let h = harness(edited_result(), None);
    let req = request(&h, 6.0, 10.0).await;

    h.interactor.execute(&req, &SilentObserver).await.unwrap();

    assert!(!calls(&h).iter().any(|c| c.starts_with("extract after")));
    let manifest = std::fs::read_to_string(req.run.manifest()).unwrap();
    assert!(!manifest.contains("after.mp4"));
    assert!(manifest.lines().next().unwrap().ends_with("before.mp4'"));
}

#[tokio::test]
async fn test_missing_video_field_aborts_before_download() {
    let h = harness(json!({ "status": "ok" }), None);
    let req = request(&h, 3.0, 7.0).await;

    let err = h.interactor.execute(&req, &SilentObserver).await.unwrap_err();

    assert!(matches!(err, DomainError::MalformedResponse(_)));
    assert!(!req.run.edited().exists());
    assert!(!req.run.final_output().exists());
    assert!(!calls(&h).iter().any(|c| c.starts_with("download") || c.starts_with("concat")));
    // earlier artifacts stay for inspection
    assert!(req.run.interval().exists());
}

#[tokio::test]
async fn test_extraction_failure_stops_pipeline() {
    let h = harness(edited_result(), Some(SegmentKind::Interval));
    let req = request(&h, 3.0, 7.0).await;

    let err = h.interactor.execute(&req, &SilentObserver).await.unwrap_err();

    assert!(matches!(err, DomainError::ToolFail { .. }));
    assert!(req.run.before().exists());
    assert!(!calls(&h).iter().any(|c| c.starts_with("extract after") || c.starts_with("upload")));
}

#[tokio::test]
async fn test_unprobeable_source_is_fatal() {
    let h = harness(edited_result(), None);
    let mut req = request(&h, 3.0, 7.0).await;
    req.source = h.root.path().join("missing.mp4");

    let err = h.interactor.execute(&req, &SilentObserver).await.unwrap_err();

    assert!(matches!(err, DomainError::ProbeFail(_)));
    assert_eq!(calls(&h), vec!["probe missing.mp4"]);
}

#[tokio::test]
async fn test_out_of_range_interval_still_runs() {
    let h = harness(edited_result(), None);
    let req = request(&h, 3.0, 12.0).await;

    h.interactor.execute(&req, &SilentObserver).await.unwrap();

    assert!(calls(&h).contains(&"extract interval 3-12".to_string()));
    assert!(!calls(&h).iter().any(|c| c.starts_with("extract after")));
}

#[tokio::test]
async fn test_reused_run_directory_ignores_leftover_segments() {
    let h = harness(edited_result(), None);
    let now = Local::now();
    let run = h.interactor.prepare_run(h.root.path(), &now).await.unwrap();
    let first = EditRunRequest {
        source: h.root.path().join("source.mp4"),
        interval: Interval::from_seconds(3.0, 7.0),
        prompt: "add falling snow".to_string(),
        run,
    };
    h.interactor.execute(&first, &SilentObserver).await.unwrap();
    assert!(first.run.after().exists());

    // same second, same directory
    let run = h.interactor.prepare_run(h.root.path(), &now).await.unwrap();
    assert_eq!(run, first.run);
    let second = EditRunRequest {
        interval: Interval::from_seconds(6.0, 10.0),
        run,
        ..first.clone()
    };
    h.interactor.execute(&second, &SilentObserver).await.unwrap();

    let manifest = std::fs::read_to_string(second.run.manifest()).unwrap();
    let lines: Vec<&str> = manifest.lines().collect();
    assert_eq!(lines.len(), 2, "manifest was:\n{}", manifest);
    assert!(lines[0].ends_with("before.mp4'"));
    assert!(lines[1].ends_with("edited.mp4'"));
}

#[test]
fn test_step_lines() {
    assert_eq!(PipelineStep::Extracting.to_string(), "[1/5] Extracting clips...");
    assert_eq!(PipelineStep::Uploading.to_string(), "[2/5] Uploading interval clip...");
    assert_eq!(
        PipelineStep::Editing {
            prompt: "x".to_string()
        }
        .to_string(),
        "[3/5] Running Kling O1 V2V Edit...\nPrompt: x"
    );
    assert_eq!(PipelineStep::Downloading.to_string(), "[4/5] Downloading edited clip");
    assert_eq!(PipelineStep::Stitching.to_string(), "[5/5] Stitching vid");
}
