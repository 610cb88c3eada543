use serde::{Deserialize, Serialize};

/// Per-file summary: the emitter of the last well-shaped line and the sum of
/// every amount that parsed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub name: String,
    pub total_sent: i64,
}

impl AggregateRecord {
    pub fn new(name: impl Into<String>, total_sent: i64) -> Self {
        Self {
            name: name.into(),
            total_sent,
        }
    }
}

/// How the lines of a source file are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReadMode {
    /// Read the whole file up front
    Eager,
    /// Read one line at a time
    Lazy,
}

impl std::fmt::Display for ReadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadMode::Eager => f.write_str("eager"),
            ReadMode::Lazy => f.write_str("lazy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_empty() {
        let record = AggregateRecord::default();
        assert_eq!(record.name, "");
        assert_eq!(record.total_sent, 0);
    }

    #[test]
    fn test_record_serializes_name_first() {
        let record = AggregateRecord::new("Bob", 150);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"name":"Bob","total_sent":150}"#);
    }

    #[test]
    fn test_read_mode_display() {
        assert_eq!(ReadMode::Eager.to_string(), "eager");
        assert_eq!(ReadMode::Lazy.to_string(), "lazy");
    }
}
