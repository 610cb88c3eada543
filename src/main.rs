use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

use sent_ledger::{process_all_files, Layout, ReadMode};

#[derive(Parser, Debug)]
#[command(about = "Totals the amounts sent in transaction logs and archives the processed files")]
struct Args {
    /// Read strategy for each pass over the intake directory, run in order
    #[arg(long = "mode", value_enum, num_args = 1.., default_values_t = [ReadMode::Eager, ReadMode::Lazy])]
    modes: Vec<ReadMode>,

    /// Log directory (defaults to logs/)
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

/// `RUST_LOG` directives when set and valid, `info` otherwise
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if !args.log_dir.exists() {
        fs::create_dir_all(&args.log_dir)?;
    }

    // One log file per run, named after the start time
    let datetime = Local::now().format("%Y%m%d_%H%M%S");
    let log_file = format!("sent_ledger_{}.log", datetime);
    let file_appender = tracing_appender::rolling::never(&args.log_dir, log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    registry()
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
        )
        .with(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let layout = Layout::default();
    let mut failed = 0;
    for mode in args.modes {
        failed += process_all_files(&layout, mode).await?.failed;
    }

    if failed > 0 {
        anyhow::bail!("{} file(s) could not be processed", failed);
    }

    Ok(())
}
