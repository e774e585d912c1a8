use anyhow::{bail, Context};
use batch_downloader::cli::Cli;
use batch_downloader::{parser, ConsoleProgress, DownloadTask, Downloader};
use clap::Parser;
use colored::*;
use log::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    info!("Starting batch downloader");

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut tasks = match &cli.input_file {
        Some(path) => parser::parse_task_list(path)
            .await
            .with_context(|| format!("Failed to read task list {}", path.display()))?,
        None => Vec::new(),
    };
    for url in &cli.urls {
        tasks.push(DownloadTask::from_url(url)?);
    }
    info!("Loaded {} tasks", tasks.len());

    let downloader = Downloader::http(cli.fetch_config())?;
    let mut progress = ConsoleProgress::new(cli.report_theme());

    let summary = match downloader.run(&tasks, &cli.output_dir, &mut progress).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Download process failed: {}", e);
            eprintln!("{}", "Download process failed".red());
            return Err(e.into());
        }
    };

    if summary.failed > 0 {
        bail!("{} of {} downloads failed", summary.failed, summary.total());
    }
    println!("{}", "All downloads completed successfully".green());
    Ok(())
}
