use crate::models::{ParsedEntry, UNKNOWN};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counters accumulated over one or more batches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsingStatistics {
    /// Every input line, blank ones included
    pub total_lines: usize,
    /// Empty or whitespace-only lines, which produce no entry
    pub blank_lines: usize,
    /// Lines some catalog pattern matched
    pub matched_lines: usize,
    /// Lines kept verbatim with `UNKNOWN` fields
    pub unmatched_lines: usize,
    /// Matched lines whose timestamp fell back to a sentinel
    pub invalid_timestamps: usize,
    /// Matched lines whose level token is not in the level table
    pub unknown_levels: usize,
    /// Matched lines per pattern name
    pub pattern_distribution: BTreeMap<String, usize>,
    /// Entries per canonical level; `-` when no level was captured
    pub level_distribution: BTreeMap<String, usize>,
}

impl ParsingStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_blank(&mut self) {
        self.total_lines += 1;
        self.blank_lines += 1;
    }

    pub fn record_entry(&mut self, entry: &ParsedEntry) {
        self.total_lines += 1;
        *self
            .level_distribution
            .entry(entry.level_or_dash().to_string())
            .or_insert(0) += 1;

        if !entry.is_matched() {
            self.unmatched_lines += 1;
            return;
        }

        self.matched_lines += 1;
        if let Some(pattern) = &entry.pattern {
            *self.pattern_distribution.entry(pattern.clone()).or_insert(0) += 1;
        }

        if !entry.has_valid_timestamp() {
            self.invalid_timestamps += 1;
        }
        if entry.level.as_deref() == Some(UNKNOWN) {
            self.unknown_levels += 1;
        }
    }

    /// Fold another set of counters into this one
    pub fn merge(&mut self, other: &ParsingStatistics) {
        self.total_lines += other.total_lines;
        self.blank_lines += other.blank_lines;
        self.matched_lines += other.matched_lines;
        self.unmatched_lines += other.unmatched_lines;
        self.invalid_timestamps += other.invalid_timestamps;
        self.unknown_levels += other.unknown_levels;
        for (name, count) in &other.pattern_distribution {
            *self.pattern_distribution.entry(name.clone()).or_insert(0) += count;
        }
        for (level, count) in &other.level_distribution {
            *self.level_distribution.entry(level.clone()).or_insert(0) += count;
        }
    }

    /// Lines that produced an entry
    pub fn entries(&self) -> usize {
        self.matched_lines + self.unmatched_lines
    }

    /// Matched entries as a percentage of all entries
    pub fn match_rate(&self) -> f64 {
        percentage(self.matched_lines, self.entries())
    }

    /// Unmatched entries as a percentage of all entries
    pub fn fallback_rate(&self) -> f64 {
        percentage(self.unmatched_lines, self.entries())
    }

    /// The pattern that matched the most lines, earliest name on ties
    pub fn most_common_pattern(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (name, &count) in &self.pattern_distribution {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((name.as_str(), count));
            }
        }
        best.map(|(name, _)| name)
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::INVALID_DATE;

    fn matched(pattern: &str, timestamp: &str, level: Option<&str>) -> ParsedEntry {
        ParsedEntry::new(timestamp.to_string(), level.map(str::to_string), "msg".to_string())
            .with_pattern(pattern)
    }

    #[test]
    fn test_empty_statistics() {
        let stats = ParsingStatistics::new();
        assert_eq!(stats.entries(), 0);
        assert_eq!(stats.match_rate(), 0.0);
        assert_eq!(stats.fallback_rate(), 0.0);
        assert_eq!(stats.most_common_pattern(), None);
    }

    #[test]
    fn test_record_entries() {
        let mut stats = ParsingStatistics::new();
        stats.record_entry(&matched("iso-level", "2024-01-15 10:30:00.0000", Some("ERROR")));
        stats.record_entry(&matched("iso-level", INVALID_DATE, Some(UNKNOWN)));
        stats.record_entry(&matched("syslog", "2024-03-01 08:00:00.0000", None));
        stats.record_entry(&ParsedEntry::unmatched("qwerty"));
        stats.record_blank();

        assert_eq!(stats.total_lines, 5);
        assert_eq!(stats.blank_lines, 1);
        assert_eq!(stats.matched_lines, 3);
        assert_eq!(stats.unmatched_lines, 1);
        assert_eq!(stats.invalid_timestamps, 1);
        assert_eq!(stats.unknown_levels, 1);
        assert_eq!(stats.pattern_distribution.get("iso-level"), Some(&2));
        assert_eq!(stats.level_distribution.get(UNKNOWN), Some(&2));
        assert_eq!(stats.level_distribution.get("-"), Some(&1));
        assert_eq!(stats.match_rate(), 75.0);
        assert_eq!(stats.fallback_rate(), 25.0);
        assert_eq!(stats.most_common_pattern(), Some("iso-level"));
    }

    #[test]
    fn test_merge() {
        let mut first = ParsingStatistics::new();
        first.record_entry(&matched("klog", "2024-03-01 08:00:00.0000", Some("INFO")));

        let mut second = ParsingStatistics::new();
        second.record_entry(&matched("klog", "2024-03-01 08:00:01.0000", Some("INFO")));
        second.record_blank();

        first.merge(&second);
        assert_eq!(first.total_lines, 3);
        assert_eq!(first.pattern_distribution.get("klog"), Some(&2));
        assert_eq!(first.level_distribution.get("INFO"), Some(&2));
    }

    #[test]
    fn test_most_common_pattern_prefers_earliest_name_on_ties() {
        let mut stats = ParsingStatistics::new();
        stats.record_entry(&matched("syslog", "2024-03-01 08:00:00.0000", None));
        stats.record_entry(&matched("klog", "2024-03-01 08:00:01.0000", Some("INFO")));

        assert_eq!(stats.most_common_pattern(), Some("klog"));
    }
}
