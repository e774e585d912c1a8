use crate::config::{FetchConfig, ReportTheme, TableStyle};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Tab-separated task list (url, file_name, pages, type, size)
    #[arg(short, long, required_unless_present = "urls")]
    pub input_file: Option<PathBuf>,

    /// URLs to download, after any from the task list
    pub urls: Vec<String>,

    /// Output directory for downloaded files
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "30")]
    pub timeout: u64,

    /// Download rate limit in bytes per second (optional)
    #[arg(short = 'r', long, default_value = None)]
    pub rate_limit: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Write download_stats.csv into the output directory
    #[arg(long)]
    pub stats_csv: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Border style of the summary table
    #[arg(long, value_enum, default_value_t = TableStyle::Modern)]
    pub table_style: TableStyle,
}

impl Cli {
    pub fn fetch_config(&self) -> FetchConfig {
        let mut config = FetchConfig {
            timeout: Duration::from_secs(self.timeout),
            rate_limit: self.rate_limit,
            write_stats_csv: self.stats_csv,
            ..FetchConfig::default()
        };
        if let Some(ua) = &self.user_agent {
            config.user_agent = ua.clone();
        }
        config
    }

    pub fn report_theme(&self) -> ReportTheme {
        ReportTheme {
            color: !self.no_color,
            table_style: self.table_style,
            ..ReportTheme::default()
        }
    }
}
