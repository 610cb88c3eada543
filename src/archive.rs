use crate::error::IngestError;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Move `source_path` into `archive_dir`, creating the directory if needed.
///
/// Returns the archived path. A file already at the target is replaced.
pub async fn archive_file(source_path: &Path, archive_dir: &Path) -> Result<PathBuf, IngestError> {
    tokio::fs::create_dir_all(archive_dir)
        .await
        .map_err(|e| IngestError::archive(archive_dir, e))?;

    let file_name = source_path.file_name().ok_or_else(|| {
        IngestError::archive(
            source_path,
            io::Error::new(io::ErrorKind::InvalidInput, "source path has no file name"),
        )
    })?;
    let target = archive_dir.join(file_name);

    if let Err(rename_err) = tokio::fs::rename(source_path, &target).await {
        // rename cannot cross filesystems; fall back to copy + remove
        warn!(
            "Rename of {:?} failed ({}), copying instead",
            source_path, rename_err
        );
        tokio::fs::copy(source_path, &target)
            .await
            .map_err(|_| IngestError::archive(source_path, rename_err))?;
        tokio::fs::remove_file(source_path)
            .await
            .map_err(|e| IngestError::archive(source_path, e))?;
    }

    debug!("Archived {:?} to {:?}", source_path, target);
    Ok(target)
}
