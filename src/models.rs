use serde::{Deserialize, Serialize};

/// Sentinel for a field that could not be extracted
pub const UNKNOWN: &str = "UNKNOWN";

/// Sentinel for a timestamp that does not fit any known date convention
pub const INVALID_DATE: &str = "Invalid date format";

/// Canonical timestamp layout; the fraction is appended separately as four digits
pub const CANONICAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One normalized log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEntry {
    /// Position among entries that survived filtering, not the source line number
    pub index: usize,

    /// Canonical `YYYY-MM-DD HH:MM:SS.FFFF` string or a sentinel
    pub timestamp: String,

    /// Canonical level, `UNKNOWN`, or `None` when the level group did not participate
    pub level: Option<String>,

    /// Reconstructed message, possibly empty
    pub message: String,

    /// Name of the catalog pattern that produced this entry
    #[serde(skip)]
    pub pattern: Option<String>,
}

impl ParsedEntry {
    pub fn new(timestamp: String, level: Option<String>, message: String) -> Self {
        Self {
            index: 0,
            timestamp,
            level,
            message,
            pattern: None,
        }
    }

    /// Entry for a line no pattern matched; the line is kept verbatim
    pub fn unmatched(line: &str) -> Self {
        Self::new(UNKNOWN.to_string(), Some(UNKNOWN.to_string()), line.to_string())
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn is_matched(&self) -> bool {
        self.pattern.is_some()
    }

    pub fn has_valid_timestamp(&self) -> bool {
        self.timestamp != UNKNOWN
            && self.timestamp != INVALID_DATE
            && !self.timestamp.starts_with("Error: ")
    }

    /// Level as displayed in plain-text output
    pub fn level_or_dash(&self) -> &str {
        self.level.as_deref().unwrap_or("-")
    }
}
