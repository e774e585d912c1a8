use crate::config::FetchConfig;
use crate::error::DownloaderError;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::progress::{Progress, ProgressSink};
use crate::report;
use crate::types::{BatchSummary, DownloadReport, DownloadTask};
use log::{debug, error, info};
use std::path::Path;
use std::time::Instant;

pub struct Downloader<F> {
    fetcher: F,
    config: FetchConfig,
}

impl Downloader<HttpFetcher> {
    pub fn http(config: FetchConfig) -> Result<Self, DownloaderError> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::new(fetcher, config))
    }
}

impl<F: Fetcher> Downloader<F> {
    pub fn new(fetcher: F, config: FetchConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Processes `tasks` one at a time in input order.
    ///
    /// Only configuration problems are returned as errors, and always before
    /// the first fetch. A task that cannot be retrieved is recorded as failed
    /// and the batch moves on.
    pub async fn run<S>(
        &self,
        tasks: &[DownloadTask],
        destination_dir: &Path,
        sink: &mut S,
    ) -> Result<BatchSummary, DownloaderError>
    where
        S: ProgressSink + ?Sized,
    {
        let mut summary = BatchSummary::with_capacity(tasks.len());
        if tasks.is_empty() {
            info!("No tasks to download");
            sink.finish(&summary);
            return Ok(summary);
        }

        if let Some(task) = tasks.iter().find(|t| t.identifier().trim().is_empty()) {
            return Err(DownloaderError::InvalidTask(format!(
                "empty identifier for {}",
                task.output_path().display()
            )));
        }
        prepare_destination(destination_dir).await?;

        info!(
            "Downloading {} tasks into {}",
            tasks.len(),
            destination_dir.display()
        );
        let total = tasks.len();
        let start_time = Instant::now();
        sink.begin(total);

        for (i, task) in tasks.iter().enumerate() {
            let report = self.process(task, destination_dir).await;
            summary.record(report);
            sink.advance(&Progress {
                description: task.file_name().to_string(),
                completed: i + 1,
                total,
                elapsed: start_time.elapsed(),
            });
        }

        summary.finalize(start_time.elapsed());
        info!(
            "Batch finished: {} downloaded, {} already present, {} failed in {:.2?}",
            summary.downloaded, summary.already_exists, summary.failed, summary.total_duration
        );

        if self.config.write_stats_csv {
            match report::write_stats_csv(&summary, destination_dir) {
                Ok(path) => info!("Wrote stats to {}", path.display()),
                Err(e) => error!("Failed to write stats CSV: {}", e),
            }
        }

        sink.finish(&summary);
        Ok(summary)
    }

    async fn process(&self, task: &DownloadTask, destination_dir: &Path) -> DownloadReport {
        let start_time = Instant::now();
        let path = task.resolve(destination_dir);

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {
                debug!("Already present, skipping: {}", path.display());
                return DownloadReport::already_exists(
                    task.clone(),
                    meta.len(),
                    start_time.elapsed(),
                );
            }
            Ok(_) => {
                error!("Destination is not a regular file: {}", path.display());
                return DownloadReport::failed(
                    task.clone(),
                    format!("{} exists and is not a file", path.display()),
                    start_time.elapsed(),
                );
            }
            Err(_) => {}
        }

        match self.fetcher.fetch(task, &path).await {
            Ok(size) => {
                debug!("Downloaded {} ({} bytes)", task.identifier(), size);
                DownloadReport::downloaded(task.clone(), size, start_time.elapsed())
            }
            Err(e) => {
                error!("Download failed for {}: {}", task.identifier(), e);
                DownloadReport::failed(task.clone(), e, start_time.elapsed())
            }
        }
    }
}

/// Creates `dir` if needed and checks that files can be written into it.
pub async fn prepare_destination(dir: &Path) -> Result<(), DownloaderError> {
    if let Ok(meta) = tokio::fs::metadata(dir).await {
        if !meta.is_dir() {
            return Err(DownloaderError::configuration(dir, "not a directory"));
        }
    }

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DownloaderError::configuration(dir, format!("cannot create: {}", e)))?;

    // uniquely named and removed on drop, so no existing file is touched
    tempfile::Builder::new()
        .prefix(".batch-downloader-probe")
        .tempfile_in(dir)
        .map_err(|e| DownloaderError::configuration(dir, format!("not writable: {}", e)))?;
    Ok(())
}
