use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write result {path}: {source}")]
    ResultWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IngestError {
    pub(crate) fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead { path: path.into(), source }
    }

    pub(crate) fn result_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ResultWrite { path: path.into(), source }
    }

    pub(crate) fn archive(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Archive { path: path.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn test_file_read_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error = IngestError::file_read("source/missing.txt", io_error);

        assert!(error.to_string().contains("Failed to read file source/missing.txt"));
        assert!(error.source().is_some());

        match error {
            IngestError::FileRead { source, .. } => assert_eq!(source.kind(), io::ErrorKind::NotFound),
            _ => panic!("Wrong error variant"),
        }
    }

    #[test]
    fn test_result_write_error() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let error = IngestError::result_write("result/result_a.json", io_error);

        assert!(error.to_string().contains("Failed to write result result/result_a.json"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_archive_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "gone");
        let error = IngestError::archive("source/a.txt", io_error);

        assert!(error.to_string().contains("Failed to archive source/a.txt"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error_from: IngestError = json_error.into();

        assert!(error_from.to_string().contains("JSON error"));
        assert!(matches!(error_from, IngestError::Json(_)));
    }
}
