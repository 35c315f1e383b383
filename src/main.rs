//! v2v-edit
//!
//! Cuts an interval out of a video, submits it to a remote video-to-video
//! edit model, downloads the edited clip and splices it back between the
//! untouched parts.
//!
//! # Usage
//!
//! ```bash
//! FAL_API_KEY=... v2v-edit
//! v2v-edit --input talk.mp4 --start 00:12.5 --end 00:18 --prompt "make it night"
//! ```
//!
//! Artifacts land in `output/<YYYYMMDD_HHMMSS>_v2v_edit/`.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use v2v_splice::adapters::TomlConfigAdapter;
use v2v_splice::cli::{commands, Cli};
use v2v_splice::utils::{init_logging, LogFormat, LoggingConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = TomlConfigAdapter::load(cli.run.config.as_deref())?;
    cli.run.apply(&mut config)?;
    if let Some(level) = &cli.log.log_level {
        config.log_level = level.clone();
    }

    init_logging(&LoggingConfig {
        level: config.log_level.clone(),
        format: if cli.log.log_json {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        },
    });

    for layer in &config.layers {
        info!("Configuration from {}", layer);
    }
    info!("Starting v2v-edit");
    commands::run(cli.run, config).await?;
    info!("v2v-edit completed successfully");
    Ok(())
}
