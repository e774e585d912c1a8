//! Sequential batch downloads with live progress and a summary table.

pub mod cli;
pub mod config;
pub mod downloader;
pub mod error;
pub mod fetcher;
pub mod parser;
pub mod progress;
pub mod report;
pub mod types;

pub use config::{FetchConfig, ReportTheme};
pub use downloader::Downloader;
pub use error::{DownloaderError, FetchError};
pub use fetcher::{Fetcher, HttpFetcher};
pub use progress::{ConsoleProgress, Progress, ProgressSink, SilentProgress};
pub use types::{BatchSummary, DownloadReport, DownloadStatus, DownloadTask, TaskMetadata};
