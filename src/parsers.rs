use crate::models::ParsedEntry;

/// Turns one raw line into a structured entry.
///
/// Returns `None` only for lines that carry nothing (empty or whitespace);
/// every other line produces an entry, sentinel-filled if need be.
pub trait LineParser {
    fn parse_line(&self, line: &str) -> Option<ParsedEntry>;
}

pub mod catalog_parser;

pub use catalog_parser::{parse_line, CatalogParser};
