use crate::models::AggregateRecord;
use futures::stream::{Stream, StreamExt};
use std::io;
use tracing::{debug, warn};

/// Receives human-readable notices about lines that were skipped
pub trait DiagnosticSink {
    fn notice(&mut self, message: String);
}

/// Forwards notices to the operator log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn notice(&mut self, message: String) {
        warn!("{}", message);
    }
}

impl DiagnosticSink for Vec<String> {
    fn notice(&mut self, message: String) {
        self.push(message);
    }
}

/// Strip currency symbols from an amount field and parse it as an integer.
///
/// Removes the euro sign and its mis-decoded Latin-1 form (`â‚¬`). The rest
/// must be a base-10 integer with an optional sign; single underscores
/// between digits are accepted as separators.
pub fn parse_amount(raw: &str) -> Option<i64> {
    let cleaned = raw.replace('€', "").replace("â‚¬", "");
    parse_integer(&cleaned)
}

fn parse_integer(text: &str) -> Option<i64> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    if digits.contains('_') {
        text.replace('_', "").parse().ok()
    } else {
        text.parse().ok()
    }
}

/// Whitespace for field splitting: Unicode white space plus the ASCII
/// information separators `\x1c`..=`\x1f`
fn is_field_separator(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}

/// Incremental reduction of raw lines into an [`AggregateRecord`]
#[derive(Debug, Default)]
pub struct Aggregator {
    name: String,
    total_sent: i64,
    lines: usize,
    accepted: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one raw line into the running aggregate.
    ///
    /// Blank lines are ignored silently. Lines with fewer than three fields
    /// are reported and leave the state untouched. Any line with three or more
    /// fields sets the emitter name, even when its amount is then rejected.
    pub fn feed(&mut self, line: &str, sink: &mut dyn DiagnosticSink) {
        self.lines += 1;

        let trimmed = line.trim_matches(is_field_separator);
        if trimmed.is_empty() {
            return;
        }

        let fields: Vec<&str> = trimmed
            .split(is_field_separator)
            .filter(|field| !field.is_empty())
            .collect();
        if fields.len() < 3 {
            sink.notice(format!("Malformed line skipped: {}", trimmed));
            return;
        }

        self.name.clear();
        self.name.push_str(fields[0]);

        match parse_amount(fields[2]).and_then(|amount| self.total_sent.checked_add(amount)) {
            Some(total) => {
                self.total_sent = total;
                self.accepted += 1;
            }
            None => sink.notice(format!("Invalid amount on line: {}", trimmed)),
        }
    }

    pub fn finish(self) -> AggregateRecord {
        debug!(
            "Aggregated {} lines, {} amounts accepted",
            self.lines, self.accepted
        );
        AggregateRecord {
            name: self.name,
            total_sent: self.total_sent,
        }
    }
}

/// Reduce an in-memory sequence of lines
pub fn aggregate_lines<I, L>(lines: I, sink: &mut dyn DiagnosticSink) -> AggregateRecord
where
    I: IntoIterator<Item = L>,
    L: AsRef<str>,
{
    let mut aggregator = Aggregator::new();
    for line in lines {
        aggregator.feed(line.as_ref(), sink);
    }
    aggregator.finish()
}

/// Reduce a stream of lines, stopping at the first read error
pub async fn aggregate_stream<S>(
    mut lines: S,
    sink: &mut dyn DiagnosticSink,
) -> io::Result<AggregateRecord>
where
    S: Stream<Item = io::Result<String>> + Unpin,
{
    let mut aggregator = Aggregator::new();
    while let Some(line) = lines.next().await {
        aggregator.feed(&line?, sink);
    }
    Ok(aggregator.finish())
}
