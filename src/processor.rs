use crate::aggregator::{aggregate_stream, TracingSink};
use crate::archive::archive_file;
use crate::error::IngestError;
use crate::models::ReadMode;
use crate::source::open_lines;
use crate::store::save_result;
use anyhow::Result;
use chrono::Local;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

/// Extension of the transaction logs picked up from the intake directory
pub const LOG_EXTENSION: &str = ".txt";

const SOURCE_DIR: &str = "source";
const RESULT_DIR: &str = "result";
const ARCHIVE_DIR: &str = "archived";

/// Directories a run reads from and writes to
#[derive(Debug, Clone)]
pub struct Layout {
    /// Unprocessed logs
    pub source_dir: PathBuf,
    /// JSON results
    pub result_dir: PathBuf,
    /// Logs that have been processed
    pub archive_dir: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(SOURCE_DIR),
            result_dir: PathBuf::from(RESULT_DIR),
            archive_dir: PathBuf::from(ARCHIVE_DIR),
        }
    }
}

impl Layout {
    /// The default layout rooted at `root`
    pub fn under(root: &Path) -> Self {
        Self {
            source_dir: root.join(SOURCE_DIR),
            result_dir: root.join(RESULT_DIR),
            archive_dir: root.join(ARCHIVE_DIR),
        }
    }
}

/// Outcome of one pass over the intake directory
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Regular files in `dir` whose names end with `extension`, sorted by path
pub async fn discover_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, IngestError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| IngestError::file_read(dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| IngestError::file_read(dir, e))?
    {
        let matches = entry.file_name().to_string_lossy().ends_with(extension);
        if !matches {
            continue;
        }
        // metadata follows symlinks, so linked logs are picked up too
        let is_file = tokio::fs::metadata(entry.path())
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if is_file {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}

/// Aggregate one log, persist its record and archive it.
///
/// Returns the path of the result file. Nothing is written when the log
/// cannot be read to the end.
pub async fn process_file(file_path: &Path, layout: &Layout, mode: ReadMode) -> Result<PathBuf> {
    info!("Processing file ({} mode): {:?}", mode, file_path);
    let start_time = Instant::now();

    let lines = open_lines(file_path, mode).await?;
    let record = aggregate_stream(lines, &mut TracingSink)
        .await
        .map_err(|e| IngestError::file_read(file_path, e))?;

    let result_path = save_result(
        &layout.result_dir,
        file_path,
        &record,
        Local::now().naive_local(),
    )
    .await?;

    archive_file(file_path, &layout.archive_dir).await?;

    let result_name = result_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!(
        "File processed and archived: {} (name={:?}, total_sent={}, in {:.2?})",
        result_name,
        record.name,
        record.total_sent,
        start_time.elapsed()
    );

    Ok(result_path)
}

/// Process every log in the intake directory, one after another.
///
/// A file that fails is logged and left in the intake directory; the run
/// moves on to the next one.
pub async fn process_all_files(layout: &Layout, mode: ReadMode) -> Result<RunSummary> {
    tokio::fs::create_dir_all(&layout.result_dir)
        .await
        .map_err(|e| IngestError::result_write(&layout.result_dir, e))?;

    let files = discover_files(&layout.source_dir, LOG_EXTENSION).await?;
    let mut summary = RunSummary::default();

    if files.is_empty() {
        info!("No files to process.");
        return Ok(summary);
    }

    for file_path in files {
        match process_file(&file_path, layout, mode).await {
            Ok(_) => summary.processed += 1,
            Err(e) => {
                error!("Failed to process {:?}: {:#}", file_path, e);
                summary.failed += 1;
            }
        }
    }

    info!(
        "Run finished ({} mode): {} processed, {} failed",
        mode, summary.processed, summary.failed
    );
    Ok(summary)
}
