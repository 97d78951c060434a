use crate::error::ParseError;
use crate::models::ParsedEntry;
use crate::parsers::LineParser;
use crate::statistics::ParsingStatistics;
use rayon::prelude::*;
use std::io::Read;
use tracing::info;

/// Split on `\n`, dropping a trailing `\r` so CRLF input reads like LF
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Give surviving entries a dense 0-based index in input order
fn assign_indices(entries: impl IntoIterator<Item = ParsedEntry>) -> Vec<ParsedEntry> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.with_index(index))
        .collect()
}

/// Runs a [`LineParser`] over whole text blocks.
///
/// Blank lines are dropped and never consume an index.
#[derive(Debug, Clone)]
pub struct BatchProcessor<P> {
    parser: P,
}

impl<P: LineParser> BatchProcessor<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    pub fn process(&self, text: &str) -> Vec<ParsedEntry> {
        let entries = assign_indices(split_lines(text).filter_map(|line| self.parser.parse_line(line)));
        info!(entries = entries.len(), "processed batch");
        entries
    }

    /// Decode `bytes` as UTF-8, then process. Invalid text is a `DecodeError`.
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<Vec<ParsedEntry>, ParseError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(self.process(text))
    }

    pub fn process_reader<R: Read>(&self, mut reader: R) -> Result<Vec<ParsedEntry>, ParseError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| ParseError::io("read", &e))?;
        self.process_bytes(&bytes)
    }

    /// Like [`process`](Self::process), also counting what happened per line
    pub fn process_with_statistics(&self, text: &str) -> (Vec<ParsedEntry>, ParsingStatistics) {
        let mut stats = ParsingStatistics::new();
        let mut kept = Vec::new();

        for line in split_lines(text) {
            match self.parser.parse_line(line) {
                Some(entry) => {
                    stats.record_entry(&entry);
                    kept.push(entry);
                }
                None => stats.record_blank(),
            }
        }

        let entries = assign_indices(kept);
        info!(
            lines = stats.total_lines,
            matched = stats.matched_lines,
            unmatched = stats.unmatched_lines,
            "batch complete"
        );
        (entries, stats)
    }
}

impl<P: LineParser + Sync> BatchProcessor<P> {
    /// Parse lines across the rayon pool. Output is identical to [`process`](Self::process).
    pub fn process_parallel(&self, text: &str) -> Vec<ParsedEntry> {
        let lines: Vec<&str> = split_lines(text).collect();

        // collect keeps input order, so indices can be assigned afterwards
        let parsed: Vec<Option<ParsedEntry>> = lines
            .into_par_iter()
            .map(|line| self.parser.parse_line(line))
            .collect();

        let entries = assign_indices(parsed.into_iter().flatten());
        info!(entries = entries.len(), "processed batch in parallel");
        entries
    }
}
