//! Command implementations

use std::io::{self, Stdout, Write};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::adapters::AppConfig;
use crate::app::{AppContainer, DefaultAppContainer, EditRunRequest, PipelineStep, StepObserver};
use crate::cli::RunArgs;
use crate::domain::model::{Interval, RunReport};
use crate::domain::rules::DURATION_DRIFT_TOLERANCE;

/// Writes each pipeline step to the console
pub struct ConsoleObserver<W: Write + Send = Stdout> {
    out: Mutex<W>,
}

impl ConsoleObserver<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleObserver<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> StepObserver for ConsoleObserver<W> {
    fn on_step(&self, step: &PipelineStep) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        let written = if matches!(step, PipelineStep::Extracting) {
            writeln!(out).and_then(|_| writeln!(out, "{}", step))
        } else {
            writeln!(out, "{}", step)
        };
        if let Err(e) = written.and_then(|_| out.flush()) {
            warn!("Failed to write step line: {}", e);
        }
    }
}

/// Execute one edit run
pub async fn run(args: RunArgs, config: AppConfig) -> Result<()> {
    let container =
        DefaultAppContainer::new(&config).context("Failed to initialise the pipeline")?;
    let interactor = container.edit_interactor();

    let interval = config.interval();
    let run = interactor
        .prepare_run(&config.output.root, &Local::now())
        .await
        .context("Failed to create run directory")?;

    let mut stdout = io::stdout();
    write_banner(&mut stdout, &config.source.path, &interval, &run.dir)?;

    let prompt = match args.prompt {
        Some(prompt) => prompt.trim().to_string(),
        None => read_prompt(BufReader::new(tokio::io::stdin()), &mut stdout).await?,
    };
    info!(run_id = %run.id, prompt_chars = prompt.chars().count(), "Starting edit run");

    let request = EditRunRequest {
        source: config.source.path.clone(),
        interval,
        prompt,
        run,
    };
    let report = interactor
        .execute(&request, &ConsoleObserver::stdout())
        .await
        .with_context(|| format!("Edit run failed; partial artifacts in {}", request.run.dir.display()))?;

    write_completion(&mut stdout, &report)?;
    log_report(&report);

    Ok(())
}

/// Ask for the edit instruction; EOF yields an empty prompt
pub async fn read_prompt<R>(mut reader: R, out: &mut impl Write) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    write!(out, "Edit prompt: ").context("Failed to write prompt")?;
    out.flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    reader
        .read_line(&mut line)
        .await
        .context("Failed to read edit prompt from stdin")?;
    Ok(line.trim().to_string())
}

pub fn write_banner(
    out: &mut impl Write,
    source: &Path,
    interval: &Interval,
    run_dir: &Path,
) -> io::Result<()> {
    let rule = "=".repeat(60);
    writeln!(out, "{}", rule)?;
    writeln!(out, "VIDEO INTERVAL EDITOR")?;
    writeln!(out, "{}", rule)?;
    writeln!(out)?;
    writeln!(out, "Video: {}", source.display())?;
    writeln!(out, "Interval: {}", interval)?;
    writeln!(out, "Output: {}", run_dir.display())?;
    writeln!(out)
}

/// Completion lines plus the duration summary of a finished run
pub fn write_completion(out: &mut impl Write, report: &RunReport) -> io::Result<()> {
    writeln!(out, "DONE!")?;
    writeln!(out, "Output folder: {}", report.run_dir.display())?;
    writeln!(out)?;
    writeln!(out, "Source duration: {:.3}s", report.source_duration)?;
    writeln!(
        out,
        "Interval: {:.3}s → {:.3}s ({:.3}s)",
        report.interval.start.seconds,
        report.interval.end.seconds,
        report.interval.duration()
    )?;
    if let Some(edited) = report.edited_duration {
        writeln!(out, "Edited clip: {:.3}s", edited)?;
    }
    if let Some(final_duration) = report.final_duration {
        writeln!(out, "Final duration: {:.3}s", final_duration)?;
    }
    Ok(())
}

/// Log the report as one structured event and flag duration drift
fn log_report(report: &RunReport) {
    match serde_json::to_string(report) {
        Ok(json) => info!(report = %json, "Run report"),
        Err(e) => warn!("Failed to serialise run report: {}", e),
    }

    if let Some(drift) = report.drift() {
        if report.within_tolerance(DURATION_DRIFT_TOLERANCE) {
            info!(drift, "Final duration matches source");
        } else {
            warn!(
                drift,
                "Final duration differs from source; the edited clip changed length"
            );
        }
    }
}
