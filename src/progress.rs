use crate::config::ReportTheme;
use crate::report;
use crate::types::BatchSummary;
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use std::time::Duration;

/// State of a batch after one more task has completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub description: String,
    pub completed: usize,
    pub total: usize,
    pub elapsed: Duration,
}

/// Receives progress updates from a running batch.
pub trait ProgressSink {
    fn begin(&mut self, _total: usize) {}

    fn advance(&mut self, progress: &Progress);

    fn finish(&mut self, summary: &BatchSummary);
}

/// Discards every update.
#[derive(Debug, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn advance(&mut self, _progress: &Progress) {}

    fn finish(&mut self, _summary: &BatchSummary) {}
}

/// Terminal progress bar followed by the summary table.
pub struct ConsoleProgress {
    theme: ReportTheme,
    pb: ProgressBar,
}

impl ConsoleProgress {
    pub fn new(theme: ReportTheme) -> Self {
        let pb = ProgressBar::new(0);
        match ProgressStyle::with_template(&theme.progress_template) {
            Ok(style) => pb.set_style(style.progress_chars(&theme.progress_chars)),
            Err(e) => warn!("Invalid progress template, using default: {}", e),
        }
        Self { theme, pb }
    }
}

impl ProgressSink for ConsoleProgress {
    fn begin(&mut self, total: usize) {
        self.pb.set_length(total as u64);
        self.pb.set_message("Starting");
    }

    fn advance(&mut self, progress: &Progress) {
        self.pb.set_length(progress.total as u64);
        self.pb.set_position(progress.completed as u64);
        self.pb.set_message(progress.description.clone());
    }

    fn finish(&mut self, summary: &BatchSummary) {
        self.pb.finish_and_clear();
        if summary.is_empty() {
            println!("Nothing to download");
            return;
        }
        println!("{}", report::render_summary_table(summary, &self.theme));
        println!("{}", report::render_totals(summary, &self.theme));
    }
}
