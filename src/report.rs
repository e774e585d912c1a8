use crate::config::{ReportTheme, TableStyle, STATS_FILE_NAME};
use crate::error::DownloaderError;
use crate::types::{BatchSummary, DownloadReport, DownloadStatus};
use colored::*;
use indicatif::HumanBytes;
use std::path::{Path, PathBuf};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "File Name")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Metadata")]
    metadata: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl SummaryRow {
    fn from_report(report: &DownloadReport, theme: &ReportTheme) -> Self {
        Self {
            name: report.task.file_name().to_string(),
            size: human_size(report),
            metadata: report.task.metadata().to_string(),
            status: status_indicator(report.status, theme),
        }
    }
}

/// Human readable size, or a dash for tasks that produced no file.
pub fn human_size(report: &DownloadReport) -> String {
    match (report.status, report.size) {
        (DownloadStatus::Failed, _) | (_, None) => "—".to_string(),
        (_, Some(bytes)) => HumanBytes(bytes).to_string(),
    }
}

pub fn status_indicator(status: DownloadStatus, theme: &ReportTheme) -> String {
    let text = match status {
        DownloadStatus::Downloaded => "✓ downloaded",
        DownloadStatus::AlreadyExists => "• exists",
        DownloadStatus::Failed => "✗ failed",
    };
    if !theme.color {
        return text.to_string();
    }
    match status {
        DownloadStatus::Downloaded => text.green().to_string(),
        DownloadStatus::AlreadyExists => text.yellow().to_string(),
        DownloadStatus::Failed => text.red().to_string(),
    }
}

pub fn render_summary_table(summary: &BatchSummary, theme: &ReportTheme) -> String {
    let rows: Vec<SummaryRow> = summary
        .reports
        .iter()
        .map(|r| SummaryRow::from_report(r, theme))
        .collect();

    let mut table = Table::new(rows);
    match theme.table_style {
        TableStyle::Modern => table.with(Style::modern()),
        TableStyle::Ascii => table.with(Style::ascii()),
        TableStyle::Blank => table.with(Style::blank()),
    };
    table.to_string()
}

fn paint(theme: &ReportTheme, value: impl ToString, color: Color) -> String {
    let s = value.to_string();
    if theme.color {
        s.as_str().color(color).to_string()
    } else {
        s
    }
}

pub fn render_totals(summary: &BatchSummary, theme: &ReportTheme) -> String {
    let mut out = format!(
        "Total: {} | Downloaded: {} | Already present: {} | Failed: {}\nTransferred: {} in {:.2?}",
        summary.total(),
        paint(theme, summary.downloaded, Color::Green),
        paint(theme, summary.already_exists, Color::Yellow),
        paint(theme, summary.failed, Color::Red),
        HumanBytes(summary.total_bytes_downloaded),
        summary.total_duration,
    );

    for report in summary.failures() {
        out.push_str(&format!(
            "\n{} {} - Error: {}",
            paint(theme, "✗", Color::Red),
            report.task.file_name(),
            report.error.as_deref().unwrap_or("unknown error"),
        ));
    }
    out
}

/// Writes one CSV row per report to `download_stats.csv` in `output_dir`.
pub fn write_stats_csv(
    summary: &BatchSummary,
    output_dir: &Path,
) -> Result<PathBuf, DownloaderError> {
    let stats_path = output_dir.join(STATS_FILE_NAME);
    let mut wtr = csv::WriterBuilder::new().from_path(&stats_path)?;

    wtr.write_record([
        "File Name",
        "Status",
        "Size (bytes)",
        "Duration (s)",
        "Identifier",
        "Error",
    ])?;

    for report in &summary.reports {
        wtr.write_record([
            report.task.file_name().to_string(),
            report.status.to_string(),
            report.size.map(|s| s.to_string()).unwrap_or_default(),
            format!("{:.3}", report.duration.as_secs_f64()),
            report.task.identifier().to_string(),
            report.error.clone().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(stats_path)
}
