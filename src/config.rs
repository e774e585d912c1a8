use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const STATS_FILE_NAME: &str = "download_stats.csv";

/// Settings for retrieving tasks. Each task gets a single attempt.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
    /// Bytes per second.
    pub rate_limit: Option<u64>,
    pub write_stats_csv: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            rate_limit: None,
            write_stats_csv: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TableStyle {
    #[default]
    Modern,
    Ascii,
    Blank,
}

/// Console styling for progress and the summary table.
#[derive(Debug, Clone)]
pub struct ReportTheme {
    pub color: bool,
    pub progress_template: String,
    pub progress_chars: String,
    pub table_style: TableStyle,
}

impl Default for ReportTheme {
    fn default() -> Self {
        Self {
            color: true,
            progress_template:
                "{spinner:.green} [{elapsed_precise}] {msg} [{bar:40.cyan/blue}] {pos}/{len}"
                    .to_string(),
            progress_chars: "#>-".to_string(),
            table_style: TableStyle::Modern,
        }
    }
}

impl ReportTheme {
    pub fn plain() -> Self {
        Self {
            color: false,
            table_style: TableStyle::Ascii,
            ..Self::default()
        }
    }
}
