use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a batch before or outside of per-task processing.
#[derive(Error, Debug)]
pub enum DownloaderError {
    #[error("Invalid destination {}: {reason}", path.display())]
    Configuration { path: PathBuf, reason: String },

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Failed to parse task list: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl DownloaderError {
    pub fn configuration<S: Into<String>>(path: impl Into<PathBuf>, reason: S) -> Self {
        DownloaderError::Configuration {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// A fault while retrieving a single task. Recorded on the task's report,
/// never propagated out of a batch.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("HTTP error: {status} for URL: {url}")]
    Status { status: u16, url: String },

    #[error("request failed: {0}")]
    Request(reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    pub fn timeout(url: &str) -> Self {
        FetchError::Timeout {
            url: url.to_string(),
        }
    }

    /// Classifies a reqwest error for `url`. Body errors carry no URL of their own.
    pub fn from_reqwest(e: reqwest::Error, url: &str) -> Self {
        if e.is_timeout() {
            FetchError::timeout(url)
        } else {
            FetchError::Request(e)
        }
    }
}
