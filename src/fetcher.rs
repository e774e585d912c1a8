use crate::config::FetchConfig;
use crate::error::{DownloaderError, FetchError};
use crate::types::DownloadTask;
use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::time::{sleep, timeout};

/// Retrieves one task into `destination`, returning the number of bytes written.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, task: &DownloadTask, destination: &Path) -> Result<u64, FetchError>;
}

/// HTTP downloader. `timeout` bounds how long the request may stall: the
/// connect, the wait for response headers, and the wait for each body chunk.
/// Time spent in the rate limiter does not count against it.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    rate_limit: Option<u64>,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, DownloaderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            timeout: config.timeout,
            rate_limit: config.rate_limit,
        })
    }

    async fn stream_to(
        &self,
        resp: reqwest::Response,
        url: &str,
        part_path: &Path,
    ) -> Result<u64, FetchError> {
        let mut file = File::create(part_path).await?;
        let mut stream = resp.bytes_stream();
        let mut downloaded: u64 = 0;

        loop {
            let next = timeout(self.timeout, stream.next())
                .await
                .map_err(|_| FetchError::timeout(url))?;
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk.map_err(|e| FetchError::from_reqwest(e, url))?;

            if let Some(rate_limit) = self.rate_limit.filter(|r| *r > 0) {
                let delay = Duration::from_secs_f64(chunk.len() as f64 / rate_limit as f64);
                debug!(
                    "Rate limiting: chunk_size={} bytes, delay={:?}, rate={} bytes/s",
                    chunk.len(),
                    delay,
                    rate_limit
                );
                sleep(delay).await;
            }

            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
        }

        file.flush().await?;
        Ok(downloaded)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, task: &DownloadTask, destination: &Path) -> Result<u64, FetchError> {
        let url = task.identifier();
        info!("Starting download: {}", url);

        let resp = timeout(self.timeout, self.client.get(url).send())
            .await
            .map_err(|_| FetchError::timeout(url))?
            .map_err(|e| FetchError::from_reqwest(e, url))?;
        if !resp.status().is_success() {
            return Err(FetchError::Status {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let part_path = part_path(destination);
        let written = match self.stream_to(resp, url, &part_path).await {
            Ok(n) => n,
            Err(e) => {
                let _ = tokio::fs::remove_file(&part_path).await;
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&part_path, destination).await {
            let _ = tokio::fs::remove_file(&part_path).await;
            return Err(e.into());
        }

        debug!("Wrote {} bytes to {}", written, destination.display());
        Ok(written)
    }
}

/// `report.pdf` -> `report.pdf.part`, alongside the destination.
pub fn part_path(destination: &Path) -> PathBuf {
    let mut name: OsString = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("download"));
    name.push(".part");
    destination.with_file_name(name)
}
