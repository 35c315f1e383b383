// HTTP download adapter - Fetches remote content to a local file

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::domain::errors::*;
use crate::ports::*;

/// Streams a URL's body to disk, following redirects
pub struct HttpDownloadAdapter {
    http: Client,
}

impl HttpDownloadAdapter {
    /// Create new download adapter
    pub fn new() -> Result<Self, DomainError> {
        let http = Client::builder().build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl DownloadPort for HttpDownloadAdapter {
    async fn download(&self, url: &str, destination: &Path) -> Result<(), DomainError> {
        let mut response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::Network(format!(
                "download of {} returned {}",
                url, status
            )));
        }

        let mut file = tokio::fs::File::create(destination).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        info!(url, path = %destination.display(), bytes = written, "Download complete");
        Ok(())
    }
}
