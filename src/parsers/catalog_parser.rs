use crate::catalog::{PatternCatalog, PatternSpec};
use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::level::{normalize_level, LevelTable};
use crate::models::*;
use crate::parsers::LineParser;
use crate::timestamp::TimestampNormalizer;
use regex::Captures;
use std::sync::Arc;
use tracing::{debug, info};

/// A pattern that matched, with what it yields
struct Candidate<'p, 't> {
    spec: &'p PatternSpec,
    captures: Captures<'t>,
    message: String,
    score: u8,
}

/// Presence score: one point each for a declared, non-empty timestamp,
/// a declared, non-empty level, and a non-empty message
fn presence_score(spec: &PatternSpec, captures: &Captures, message: &str) -> u8 {
    let present = |text: Option<Option<&str>>| matches!(text, Some(Some(t)) if !t.is_empty());

    let mut score = 0;
    if present(spec.timestamp_group.extract(captures)) {
        score += 1;
    }
    if present(spec.level_group.extract(captures)) {
        score += 1;
    }
    if !message.is_empty() {
        score += 1;
    }
    score
}

fn best_match<'p, 't>(line: &'t str, catalog: &'p PatternCatalog) -> Option<Candidate<'p, 't>> {
    let mut best: Option<Candidate> = None;

    for spec in catalog.iter() {
        let Some(captures) = spec.captures(line) else {
            continue;
        };
        let message = spec.message_template.render(&captures);
        let score = presence_score(spec, &captures, &message);

        // strictly greater, so the earliest pattern keeps a tie
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(Candidate { spec, captures, message, score });
        }
    }

    best
}

/// Parse one line against `catalog`.
///
/// Blank lines yield `None`. A line no pattern matches is kept verbatim
/// with `UNKNOWN` timestamp and level.
pub fn parse_line(
    line: &str,
    catalog: &PatternCatalog,
    levels: &LevelTable,
    timestamps: &TimestampNormalizer,
) -> Option<ParsedEntry> {
    if line.trim().is_empty() {
        return None;
    }

    let Some(candidate) = best_match(line, catalog) else {
        debug!(line, "no pattern matched");
        return Some(ParsedEntry::unmatched(line));
    };

    let spec = candidate.spec;
    debug!(pattern = %spec.name, score = candidate.score, "selected pattern");

    let timestamp = match spec.timestamp_group.extract(&candidate.captures) {
        None => timestamps.normalize(UNKNOWN),
        Some(raw) => timestamps.normalize(raw.unwrap_or_default()),
    };

    let raw_level = match spec.level_group.extract(&candidate.captures) {
        None => Some(UNKNOWN),
        Some(raw) => raw,
    };
    let level = normalize_level(raw_level, levels);

    Some(ParsedEntry::new(timestamp, level, candidate.message).with_pattern(spec.name.as_str()))
}

/// Line parser driven by a configured pattern catalog and level table.
///
/// Catalog and table sit behind `Arc` so clones share them read-only
/// across threads.
#[derive(Debug, Clone)]
pub struct CatalogParser {
    catalog: Arc<PatternCatalog>,
    levels: Arc<LevelTable>,
    timestamps: TimestampNormalizer,
}

impl CatalogParser {
    pub fn new(catalog: PatternCatalog, levels: LevelTable) -> Self {
        Self {
            catalog: Arc::new(catalog),
            levels: Arc::new(levels),
            timestamps: TimestampNormalizer::new(),
        }
    }

    /// Compile and validate `config`; fails on any configuration problem
    pub fn from_config(config: &ParserConfig) -> Result<Self, ParseError> {
        let catalog = PatternCatalog::from_config(&config.log_regexes)?;
        let levels = LevelTable::from_mapping(&config.log_level_mapping)?;
        info!(
            patterns = ?catalog.names(),
            levels = levels.len(),
            "compiled pattern catalog"
        );
        Ok(Self::new(catalog, levels))
    }

    /// Parser over the built-in catalog
    pub fn with_defaults() -> Result<Self, ParseError> {
        Self::from_config(&ParserConfig::defaults())
    }

    /// Pin the year assumed for timestamps that carry none
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.timestamps = TimestampNormalizer::with_reference_year(year);
        self
    }
}

impl LineParser for CatalogParser {
    fn parse_line(&self, line: &str) -> Option<ParsedEntry> {
        parse_line(line, &self.catalog, &self.levels, &self.timestamps)
    }
}
