use async_trait::async_trait;
use batch_downloader::{
    BatchSummary, DownloadStatus, DownloadTask, Downloader, DownloaderError, FetchConfig,
    FetchError, Fetcher, Progress, ProgressSink, SilentProgress,
};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves bodies from a map; identifiers not in the map time out.
#[derive(Default)]
struct StubFetcher {
    bodies: HashMap<String, &'static str>,
    calls: AtomicUsize,
}

impl StubFetcher {
    fn with(bodies: &[(&str, &'static str)]) -> Self {
        Self {
            bodies: bodies.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, task: &DownloadTask, destination: &Path) -> Result<u64, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.bodies.get(task.identifier()) {
            Some(body) => {
                tokio::fs::write(destination, body).await?;
                Ok(body.len() as u64)
            }
            None => Err(FetchError::Timeout {
                url: task.identifier().to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct RecordingSink {
    begun: Option<usize>,
    updates: Vec<Progress>,
    finished: Option<usize>,
}

impl ProgressSink for RecordingSink {
    fn begin(&mut self, total: usize) {
        self.begun = Some(total);
    }

    fn advance(&mut self, progress: &Progress) {
        self.updates.push(progress.clone());
    }

    fn finish(&mut self, summary: &BatchSummary) {
        self.finished = Some(summary.total());
    }
}

fn task(key: &str) -> DownloadTask {
    DownloadTask::new(key, format!("{key}.pdf")).unwrap()
}

#[tokio::test]
async fn mixed_batch_records_each_outcome_in_order() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.pdf"), "existing").unwrap();

    let fetcher = StubFetcher::with(&[("b", "fresh body")]);
    let downloader = Downloader::new(fetcher, FetchConfig::default());
    let mut sink = RecordingSink::default();

    let tasks = vec![task("a"), task("b"), task("c")];
    let summary = downloader.run(&tasks, dir.path(), &mut sink).await.unwrap();

    assert_eq!(
        summary.statuses(),
        vec![
            DownloadStatus::AlreadyExists,
            DownloadStatus::Downloaded,
            DownloadStatus::Failed
        ]
    );
    assert_eq!(summary.total(), 3);
    assert_eq!(summary.reports[0].size, Some(8));
    assert_eq!(summary.reports[1].size, Some(10));
    assert_eq!(summary.reports[2].size, None);
    assert!(summary.reports[2]
        .error
        .as_deref()
        .unwrap()
        .contains("timed out"));
    assert_eq!(summary.total_bytes_downloaded, 10);

    // pre-existing file is never fetched
    assert_eq!(downloader.fetcher().calls(), 2);

    assert_eq!(sink.begun, Some(3));
    let counts: Vec<(usize, usize)> = sink.updates.iter().map(|p| (p.completed, p.total)).collect();
    assert_eq!(counts, vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(sink.updates[1].description, "b.pdf");
    assert!(sink.updates.windows(2).all(|w| w[0].elapsed <= w[1].elapsed));
    assert_eq!(sink.finished, Some(3));
}

#[tokio::test]
async fn one_failure_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = StubFetcher::with(&[("a", "1"), ("c", "333")]);
    let downloader = Downloader::new(fetcher, FetchConfig::default());

    let tasks = vec![task("a"), task("b"), task("c")];
    let summary = downloader
        .run(&tasks, dir.path(), &mut SilentProgress)
        .await
        .unwrap();

    assert_eq!((summary.downloaded, summary.failed), (2, 1));
    assert_eq!(downloader.fetcher().calls(), 3);
    assert!(dir.path().join("c.pdf").is_file());
    assert!(!dir.path().join("b.pdf").exists());
}

#[tokio::test]
async fn existing_files_are_never_fetched() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.pdf", "b.pdf"] {
        std::fs::write(dir.path().join(name), "x").unwrap();
    }
    let downloader = Downloader::new(StubFetcher::default(), FetchConfig::default());

    let summary = downloader
        .run(&[task("a"), task("b")], dir.path(), &mut SilentProgress)
        .await
        .unwrap();

    assert_eq!(summary.already_exists, 2);
    assert_eq!(downloader.fetcher().calls(), 0);
}

#[tokio::test]
async fn empty_batch_leaves_destination_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("never-created");
    let downloader = Downloader::new(StubFetcher::default(), FetchConfig::default());
    let mut sink = RecordingSink::default();

    let summary = downloader.run(&[], &dest, &mut sink).await.unwrap();

    assert!(summary.is_empty());
    assert!(!dest.exists());
    assert!(sink.updates.is_empty());
    assert_eq!(sink.finished, Some(0));
}

#[tokio::test]
async fn rerun_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let tasks = vec![task("a"), task("b")];

    let first = Downloader::new(
        StubFetcher::with(&[("a", "aa"), ("b", "bbb")]),
        FetchConfig::default(),
    );
    let summary = first
        .run(&tasks, dir.path(), &mut SilentProgress)
        .await
        .unwrap();
    assert_eq!(summary.downloaded, 2);

    let second = Downloader::new(StubFetcher::default(), FetchConfig::default());
    let summary = second
        .run(&tasks, dir.path(), &mut SilentProgress)
        .await
        .unwrap();

    assert_eq!(
        summary.statuses(),
        vec![DownloadStatus::AlreadyExists, DownloadStatus::AlreadyExists]
    );
    assert_eq!(summary.reports[1].size, Some(3));
    assert_eq!(second.fetcher().calls(), 0);
}

#[tokio::test]
async fn unusable_destination_fails_before_fetching() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a dir").unwrap();

    let downloader = Downloader::new(StubFetcher::with(&[("a", "1")]), FetchConfig::default());
    let mut sink = RecordingSink::default();
    let err = downloader
        .run(&[task("a")], &blocker.join("out"), &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, DownloaderError::Configuration { .. }), "{err}");
    assert_eq!(downloader.fetcher().calls(), 0);
    assert!(sink.finished.is_none());
}

#[tokio::test]
async fn directory_at_destination_is_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("a.pdf")).unwrap();
    let downloader = Downloader::new(StubFetcher::with(&[("a", "1")]), FetchConfig::default());

    let summary = downloader
        .run(&[task("a")], dir.path(), &mut SilentProgress)
        .await
        .unwrap();

    assert_eq!(summary.statuses(), vec![DownloadStatus::Failed]);
    assert_eq!(downloader.fetcher().calls(), 0);
}

#[tokio::test]
async fn stats_csv_is_written_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let config = FetchConfig {
        write_stats_csv: true,
        ..FetchConfig::default()
    };
    let downloader = Downloader::new(StubFetcher::with(&[("a", "1")]), config);

    downloader
        .run(&[task("a"), task("b")], dir.path(), &mut SilentProgress)
        .await
        .unwrap();

    let stats = std::fs::read_to_string(dir.path().join("download_stats.csv")).unwrap();
    assert_eq!(stats.lines().count(), 3);
    assert!(stats.lines().nth(2).unwrap().starts_with("b.pdf,failed,"));
}
