// TOML config adapter - Layered configuration (env > file > defaults)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::adapters::fal_queue::{FalConfig, DEFAULT_MODEL, DEFAULT_QUEUE_URL, DEFAULT_STORAGE_URL};
use crate::domain::errors::*;
use crate::domain::model::Interval;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "v2v_edit.toml";

/// Environment variables holding the fal credential, in lookup order
pub const API_KEY_VARS: [&str; 2] = ["FAL_API_KEY", "FAL_KEY"];

/// Source video and interval bounds
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub path: PathBuf,
    pub start: f64,
    pub end: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("input.mp4"),
            start: 3.0,
            end: 7.0,
        }
    }
}

/// Where run directories are created
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub root: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./output"),
        }
    }
}

/// Remote edit service settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub model: String,
    pub queue_url: String,
    pub storage_url: String,
    pub poll_interval_ms: u64,
    /// Never read from the file; filled from the environment
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            queue_url: DEFAULT_QUEUE_URL.to_string(),
            storage_url: DEFAULT_STORAGE_URL.to_string(),
            poll_interval_ms: 1000,
            api_key: None,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub remote: RemoteConfig,
    /// Layers that changed the defaults, recorded for logging once the
    /// subscriber is installed
    #[serde(skip)]
    pub layers: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            source: SourceConfig::default(),
            output: OutputConfig::default(),
            remote: RemoteConfig::default(),
            layers: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))
    }

    /// Interval described by the source bounds
    pub fn interval(&self) -> Interval {
        Interval::from_seconds(self.source.start, self.source.end)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.remote.api_key = API_KEY_VARS
            .iter()
            .filter_map(|var| lookup(var))
            .find(|value| !value.trim().is_empty());

        if let Some(source) = lookup("V2V_SOURCE") {
            self.layers.push(format!("environment override V2V_SOURCE = {}", source));
            self.source.path = PathBuf::from(source);
        }
        if let Some(root) = lookup("V2V_OUTPUT_ROOT") {
            self.layers
                .push(format!("environment override V2V_OUTPUT_ROOT = {}", root));
            self.output.root = PathBuf::from(root);
        }
    }

    /// fal client settings; fails when no credential was found
    pub fn fal_config(&self) -> Result<FalConfig, DomainError> {
        let api_key = self.remote.api_key.clone().ok_or_else(|| {
            DomainError::Config(format!(
                "no fal API key; set {} (or {})",
                API_KEY_VARS[0], API_KEY_VARS[1]
            ))
        })?;

        Ok(FalConfig {
            api_key,
            model: self.remote.model.clone(),
            queue_url: self.remote.queue_url.clone(),
            storage_url: self.remote.storage_url.clone(),
            poll_interval: Duration::from_millis(self.remote.poll_interval_ms),
        })
    }
}

/// Loads [`AppConfig`] from TOML files and the process environment
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Load the file layer: an explicit path must exist, the default one may not
    pub fn load_file(explicit: Option<&Path>) -> Result<AppConfig, DomainError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(AppConfig::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            DomainError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let mut config = AppConfig::from_toml_str(&content)?;
        config.layers.push(format!("config file {}", path.display()));
        Ok(config)
    }

    /// File layer plus environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<AppConfig, DomainError> {
        let mut config = Self::load_file(explicit)?;
        config.apply_env(|var| std::env::var(var).ok());
        Ok(config)
    }
}
