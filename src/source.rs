//! Line sources for transaction logs.
//!
//! Both strategies yield the same lines, terminators included, in file order.
//! A line ends at `\n`, `\r\n` or a bare `\r`.
//! Eager mode pays memory proportional to the file, lazy mode holds one line.

use crate::error::IngestError;
use crate::models::ReadMode;
use futures::stream::{BoxStream, Stream, StreamExt};
use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Stream of raw lines as consumed by the aggregator
pub type LineStream = BoxStream<'static, io::Result<String>>;

/// Open `path` with the requested strategy.
///
/// Open failures surface here, before any line is produced. Read failures in
/// lazy mode surface as an `Err` item on the stream.
pub async fn open_lines(path: &Path, mode: ReadMode) -> Result<LineStream, IngestError> {
    match mode {
        ReadMode::Eager => {
            let lines = read_all_lines(path).await?;
            Ok(tokio_stream::iter(lines.into_iter().map(Ok::<String, io::Error>)).boxed())
        }
        ReadMode::Lazy => stream_lines_lazy(path).await,
    }
}

/// Read the whole file and split it into lines, keeping each terminator
pub async fn read_all_lines(path: &Path) -> Result<Vec<String>, IngestError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| IngestError::file_read(path, e))?;

    Ok(content
        .split_inclusive('\n')
        .flat_map(split_bare_cr)
        .map(str::to_owned)
        .collect())
}

/// Split a `\n`-terminated chunk after every `\r` that does not start a `\r\n`
fn split_bare_cr(chunk: &str) -> Vec<&str> {
    let bytes = chunk.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    for (i, byte) in bytes.iter().enumerate() {
        if *byte == b'\r' && bytes.get(i + 1) != Some(&b'\n') {
            pieces.push(&chunk[start..=i]);
            start = i + 1;
        }
    }
    if start < chunk.len() {
        pieces.push(&chunk[start..]);
    }
    pieces
}

/// Single-pass stream over the lines of `path`
pub async fn stream_lines_lazy(path: &Path) -> Result<LineStream, IngestError> {
    let file = File::open(path)
        .await
        .map_err(|e| IngestError::file_read(path, e))?;

    Ok(lines_from_reader(BufReader::new(file)).boxed())
}

fn lines_from_reader<R>(mut reader: R) -> impl Stream<Item = io::Result<String>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async_stream::try_stream! {
        loop {
            let mut line = String::new();
            // read_line keeps the '\n' and fails on invalid UTF-8
            let read = reader.read_line(&mut line).await?;
            if read == 0 {
                break;
            }
            let pieces: Vec<String> = split_bare_cr(&line).into_iter().map(str::to_owned).collect();
            for piece in pieces {
                yield piece;
            }
        }
    }
}
