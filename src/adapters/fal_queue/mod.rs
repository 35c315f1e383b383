//! fal queue adapter for the remote video-to-video edit
//!
//! Talks to the fal REST endpoints directly: the storage endpoint for the
//! upload, and the queue endpoint for submitting a job, polling its status and
//! fetching its result. Every request carries `Authorization: Key <key>`.
//!
//! Nothing here retries. No request timeout is set; a stalled job stalls the
//! run.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Default fal model for video-to-video edits
pub const DEFAULT_MODEL: &str = "fal-ai/kling-video/o1/video-to-video/edit";
/// Default queue endpoint
pub const DEFAULT_QUEUE_URL: &str = "https://queue.fal.run";
/// Default storage endpoint
pub const DEFAULT_STORAGE_URL: &str = "https://rest.alpha.fal.ai";

/// Configuration for the fal client
#[derive(Debug, Clone)]
pub struct FalConfig {
    /// API key sent as `Authorization: Key <key>`
    pub api_key: String,
    /// Model identifier, appended to the queue URL
    pub model: String,
    /// Base URL of the queue API
    pub queue_url: String,
    /// Base URL of the storage API
    pub storage_url: String,
    /// Delay between status polls
    pub poll_interval: Duration,
}

impl FalConfig {
    /// Config with the public endpoints and default model
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            queue_url: DEFAULT_QUEUE_URL.to_string(),
            storage_url: DEFAULT_STORAGE_URL.to_string(),
            poll_interval: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadInitiateResponse {
    upload_url: String,
    file_url: String,
}

#[derive(Debug, Deserialize)]
struct QueueSubmitResponse {
    request_id: String,
    status_url: String,
    response_url: String,
}

#[derive(Debug, Deserialize)]
struct QueueStatus {
    status: String,
    #[serde(default)]
    queue_position: Option<u64>,
    #[serde(default)]
    logs: Option<Vec<QueueLog>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueueLog {
    message: String,
}

/// fal-backed remote edit adapter
pub struct FalQueueAdapter {
    http: Client,
    config: FalConfig,
}

impl FalQueueAdapter {
    /// Create a new fal adapter
    pub fn new(config: FalConfig) -> Result<Self, DomainError> {
        if config.api_key.trim().is_empty() {
            return Err(DomainError::Config("fal API key is empty".to_string()));
        }
        let http = Client::builder().build()?;
        Ok(Self { http, config })
    }

    fn auth_header(&self) -> String {
        format!("Key {}", self.config.api_key)
    }

    /// Submit the job to the queue
    async fn submit(&self, request: &EditRequest) -> Result<QueueSubmitResponse, DomainError> {
        let url = format!(
            "{}/{}",
            self.config.queue_url.trim_end_matches('/'),
            self.config.model
        );
        debug!("Submitting edit job to {}", url);

        let response = self
            .http
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(request)
            .send()
            .await?;
        let response = ensure_success(response, "queue submit").await?;
        Ok(response.json().await?)
    }

    /// Poll the job status until it completes, forwarding new log lines
    async fn wait_for_completion(&self, job: &QueueSubmitResponse) -> Result<(), DomainError> {
        let mut logs_seen = 0usize;

        loop {
            let response = self
                .http
                .get(&job.status_url)
                .query(&[("logs", "1")])
                .header("Authorization", self.auth_header())
                .send()
                .await?;
            let response = ensure_success(response, "queue status").await?;
            let status: QueueStatus = response.json().await?;

            if let Some(logs) = &status.logs {
                for log in logs.iter().skip(logs_seen) {
                    info!(target: "v2v_splice::remote", request_id = %job.request_id, "{}", log.message);
                }
                logs_seen = logs_seen.max(logs.len());
            }

            match status.status.as_str() {
                "COMPLETED" => {
                    if let Some(error) = status.error {
                        return Err(DomainError::RemoteJob(error));
                    }
                    return Ok(());
                }
                "IN_QUEUE" => {
                    debug!(request_id = %job.request_id, position = ?status.queue_position, "Job queued");
                }
                other => {
                    debug!(request_id = %job.request_id, status = other, "Job running");
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Fetch the finished job's result
    async fn fetch_result(&self, job: &QueueSubmitResponse) -> Result<EditResult, DomainError> {
        let response = self
            .http
            .get(&job.response_url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;
        let response = match ensure_success(response, "queue result").await {
            Ok(response) => response,
            Err(DomainError::Network(message)) => return Err(DomainError::RemoteJob(message)),
            Err(e) => return Err(e),
        };
        Ok(EditResult(response.json().await?))
    }
}

/// Turn a non-2xx response into an error carrying status and body
async fn ensure_success(response: Response, what: &str) -> Result<Response, DomainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DomainError::Network(format!(
        "{} returned {}: {}",
        what, status, body
    )))
}

#[async_trait]
impl RemoteEditPort for FalQueueAdapter {
    async fn upload_file(&self, file_path: &Path) -> Result<String, DomainError> {
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| {
                DomainError::BadArgs(format!("not a file path: {}", file_path.display()))
            })?;
        let content_type = "video/mp4";

        let url = format!(
            "{}/storage/upload/initiate",
            self.config.storage_url.trim_end_matches('/')
        );
        let response = self
            .http
            .post(&url)
            .query(&[("storage_type", "fal-cdn-v3")])
            .header("Authorization", self.auth_header())
            .json(&json!({ "content_type": content_type, "file_name": file_name }))
            .send()
            .await?;
        let response = ensure_success(response, "upload initiate").await?;
        let target: UploadInitiateResponse = response.json().await?;

        let bytes = tokio::fs::read(file_path).await?;
        info!(path = %file_path.display(), bytes = bytes.len(), "Uploading file");

        let response = self
            .http
            .put(&target.upload_url)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;
        ensure_success(response, "upload").await?;

        Ok(target.file_url)
    }

    async fn run_edit(&self, request: &EditRequest) -> Result<EditResult, DomainError> {
        let job = self.submit(request).await?;
        info!(request_id = %job.request_id, model = %self.config.model, "Edit job submitted");

        self.wait_for_completion(&job).await?;
        info!(request_id = %job.request_id, "Edit job completed");

        self.fetch_result(&job).await
    }
}
