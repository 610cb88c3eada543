use crate::error::IngestError;
use crate::models::AggregateRecord;
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Name of the result file for `source_path` processed at `timestamp`
pub fn result_file_name(source_path: &Path, timestamp: NaiveDateTime) -> String {
    let base = source_path
        .file_name()
        .map(|name| name.to_string_lossy().replace(".txt", ""))
        .unwrap_or_default();

    format!("result_{}_{}.json", base, timestamp.format(TIMESTAMP_FORMAT))
}

/// Render a record as a 4-space indented JSON object, `name` first
pub fn render_record(record: &AggregateRecord) -> Result<Vec<u8>, IngestError> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    record.serialize(&mut serializer)?;
    Ok(buf)
}

/// Write `record` into `result_dir` and return the path of the new file
pub async fn save_result(
    result_dir: &Path,
    source_path: &Path,
    record: &AggregateRecord,
    timestamp: NaiveDateTime,
) -> Result<PathBuf, IngestError> {
    let result_path = result_dir.join(result_file_name(source_path, timestamp));
    let body = render_record(record)?;

    tokio::fs::write(&result_path, body)
        .await
        .map_err(|e| IngestError::result_write(&result_path, e))?;

    debug!("Wrote result {:?}", result_path);
    Ok(result_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 42)
            .unwrap()
    }

    #[test]
    fn test_result_file_name() {
        let name = result_file_name(Path::new("source/transactions.txt"), timestamp());
        assert_eq!(name, "result_transactions_20240309_070542.json");
    }

    #[test]
    fn test_result_file_name_drops_every_txt() {
        let name = result_file_name(Path::new("a.txt.b.txt"), timestamp());
        assert_eq!(name, "result_a.b_20240309_070542.json");
    }

    #[test]
    fn test_render_record_layout() {
        let body = render_record(&AggregateRecord::new("Bob", 150)).unwrap();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "{\n    \"name\": \"Bob\",\n    \"total_sent\": 150\n}"
        );
    }

    #[test]
    fn test_render_record_keeps_utf8() {
        let body = render_record(&AggregateRecord::new("Zoé", -3)).unwrap();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "{\n    \"name\": \"Zoé\",\n    \"total_sent\": -3\n}"
        );
    }

    #[tokio::test]
    async fn test_save_result_writes_file() {
        let dir = tempdir().unwrap();
        let record = AggregateRecord::new("", 0);

        let path = save_result(dir.path(), Path::new("source/empty.txt"), &record, timestamp())
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("result_empty_20240309_070542.json"));
        let written: AggregateRecord =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, record);
    }

    #[tokio::test]
    async fn test_save_result_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let result_dir = dir.path().join("nope");

        let err = save_result(&result_dir, Path::new("a.txt"), &AggregateRecord::default(), timestamp())
            .await
            .unwrap_err();

        match err {
            IngestError::ResultWrite { path, .. } => assert!(path.starts_with(&result_dir)),
            other => panic!("unexpected error: {}", other),
        }
    }
}
