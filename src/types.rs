use crate::error::DownloaderError;
use reqwest::Url;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Expected properties of a resource, known before it is fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskMetadata {
    pub size: Option<u64>,
    pub pages: Option<u32>,
    pub kind: Option<String>,
}

impl TaskMetadata {
    pub fn is_empty(&self) -> bool {
        self.size.is_none() && self.pages.is_none() && self.kind.is_none()
    }
}

impl fmt::Display for TaskMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(pages) = self.pages {
            parts.push(if pages == 1 {
                "1 page".to_string()
            } else {
                format!("{} pages", pages)
            });
        }
        if let Some(kind) = &self.kind {
            parts.push(kind.clone());
        }
        if parts.is_empty() {
            write!(f, "—")
        } else {
            write!(f, "{}", parts.join(" / "))
        }
    }
}

/// One resource to fetch. Fixed once the batch starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    identifier: String,
    output_path: PathBuf,
    metadata: TaskMetadata,
}

impl DownloadTask {
    pub fn new(
        identifier: impl Into<String>,
        output_path: impl Into<PathBuf>,
    ) -> Result<Self, DownloaderError> {
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            return Err(DownloaderError::InvalidTask(
                "identifier must not be empty".to_string(),
            ));
        }
        Ok(Self {
            identifier,
            output_path: output_path.into(),
            metadata: TaskMetadata::default(),
        })
    }

    /// Builds a task whose file name is the last segment of the URL path.
    pub fn from_url(url: &str) -> Result<Self, DownloaderError> {
        let name = file_name_from_url(url)?;
        Self::new(url, name)
    }

    pub fn with_metadata(mut self, metadata: TaskMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Destination as given; relative paths are resolved against the batch directory.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn metadata(&self) -> &TaskMetadata {
        &self.metadata
    }

    pub fn resolve(&self, destination_dir: &Path) -> PathBuf {
        destination_dir.join(&self.output_path)
    }

    pub fn file_name(&self) -> &str {
        self.output_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
    }
}

pub fn file_name_from_url(url: &str) -> Result<String, DownloaderError> {
    let parsed = Url::parse(url)
        .map_err(|e| DownloaderError::InvalidTask(format!("{}: {}", url, e)))?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .filter(|s| *s != "." && *s != "..")
        .map(str::to_string)
        .ok_or_else(|| DownloaderError::InvalidTask(format!("no file name in URL: {}", url)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Downloaded,
    AlreadyExists,
    Failed,
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DownloadStatus::Downloaded => "downloaded",
            DownloadStatus::AlreadyExists => "exists",
            DownloadStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of one task.
#[derive(Debug, Clone)]
pub struct DownloadReport {
    pub task: DownloadTask,
    pub status: DownloadStatus,
    pub size: Option<u64>,
    pub duration: Duration,
    pub error: Option<String>,
}

impl DownloadReport {
    pub fn downloaded(task: DownloadTask, size: u64, duration: Duration) -> Self {
        Self {
            task,
            status: DownloadStatus::Downloaded,
            size: Some(size),
            duration,
            error: None,
        }
    }

    pub fn already_exists(task: DownloadTask, size: u64, duration: Duration) -> Self {
        Self {
            task,
            status: DownloadStatus::AlreadyExists,
            size: Some(size),
            duration,
            error: None,
        }
    }

    pub fn failed(task: DownloadTask, error: impl ToString, duration: Duration) -> Self {
        Self {
            task,
            status: DownloadStatus::Failed,
            size: None,
            duration,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub downloaded: usize,
    pub already_exists: usize,
    pub failed: usize,
    pub total_bytes_downloaded: u64,
    pub total_duration: Duration,
    pub reports: Vec<DownloadReport>,
}

impl BatchSummary {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            reports: Vec::with_capacity(n),
            ..Self::default()
        }
    }

    pub fn record(&mut self, report: DownloadReport) {
        match report.status {
            DownloadStatus::Downloaded => {
                self.downloaded += 1;
                self.total_bytes_downloaded += report.size.unwrap_or(0);
            }
            DownloadStatus::AlreadyExists => self.already_exists += 1,
            DownloadStatus::Failed => self.failed += 1,
        }
        self.reports.push(report);
    }

    pub fn finalize(&mut self, total_duration: Duration) {
        self.total_duration = total_duration;
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn statuses(&self) -> Vec<DownloadStatus> {
        self.reports.iter().map(|r| r.status).collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DownloadReport> {
        self.reports
            .iter()
            .filter(|r| r.status == DownloadStatus::Failed)
    }
}
