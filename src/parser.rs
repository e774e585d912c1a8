use crate::error::DownloaderError;
use crate::types::{file_name_from_url, DownloadTask, TaskMetadata};
use csv::ReaderBuilder;
use log::debug;
use std::path::{Component, Path};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Reads a tab-separated task list: `url`, `file_name`, `pages`, `type`, `size`.
///
/// Only `url` is required. A blank `file_name` is derived from the URL.
pub async fn parse_task_list(path: &Path) -> Result<Vec<DownloadTask>, DownloaderError> {
    let mut file = File::open(path).await?;

    let mut contents = String::new();
    file.read_to_string(&mut contents).await?;

    parse_task_list_str(&contents)
}

pub fn parse_task_list_str(contents: &str) -> Result<Vec<DownloadTask>, DownloaderError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let mut tasks = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| DownloaderError::ParseError(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |i: usize| record.get(i).filter(|s| !s.is_empty());

        let url = field(0).ok_or_else(|| {
            DownloaderError::ParseError(format!("line {}: missing url", line))
        })?;
        let file_name = match field(1) {
            Some(name) => contained_path(name, line)?,
            None => file_name_from_url(url)?,
        };

        let metadata = TaskMetadata {
            pages: field(2).map(|s| parse_number(s, "pages", line)).transpose()?,
            kind: field(3).map(str::to_string),
            size: field(4).map(|s| parse_number(s, "size", line)).transpose()?,
        };

        let task = DownloadTask::new(url, file_name)?.with_metadata(metadata);
        debug!("Parsed task: {:?}", task);
        tasks.push(task);
    }

    Ok(tasks)
}

/// A `file_name` must stay inside the destination directory.
fn contained_path(name: &str, line: u64) -> Result<String, DownloaderError> {
    let escapes = Path::new(name).components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(DownloaderError::ParseError(format!(
            "line {}: file_name must be a relative path inside the output directory: {:?}",
            line, name
        )));
    }
    Ok(name.to_string())
}

fn parse_number<T: std::str::FromStr>(
    value: &str,
    column: &str,
    line: u64,
) -> Result<T, DownloaderError> {
    value.parse().map_err(|_| {
        DownloaderError::ParseError(format!(
            "line {}: {} is not a number: {:?}",
            line, column, value
        ))
    })
}
