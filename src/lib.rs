pub mod aggregator;
pub mod archive;
pub mod error;
pub mod models;
pub mod processor;
pub mod source;
pub mod store;

// Re-export the entry points for convenience
pub use aggregator::{aggregate_lines, aggregate_stream, Aggregator, DiagnosticSink, TracingSink};
pub use models::{AggregateRecord, ReadMode};
pub use processor::{process_all_files, process_file, Layout, RunSummary};
