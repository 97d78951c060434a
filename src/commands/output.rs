use crate::cli::OutputFormat;
use crate::models::ParsedEntry;
use crate::statistics::ParsingStatistics;
use colored::*;
use std::error::Error;
use std::io::Write;

pub struct OutputFormatter {
    format: OutputFormat,
    highlight_pattern: Option<regex::Regex>,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            highlight_pattern: None,
        }
    }

    pub fn with_highlight(mut self, pattern: Option<&regex::Regex>) -> Self {
        self.highlight_pattern = pattern.cloned();
        self
    }

    pub fn write_entries<W: Write>(&self, writer: &mut W, entries: &[ParsedEntry]) -> Result<(), Box<dyn Error>> {
        match self.format {
            OutputFormat::Table => {
                writeln!(writer, "{}", "─".repeat(100).dimmed())?;
                for entry in entries {
                    writeln!(writer, "{}", self.format_table(entry))?;
                }
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *writer, entries)?;
                writeln!(writer)?;
            }
            OutputFormat::Ndjson => {
                for entry in entries {
                    writeln!(writer, "{}", serde_json::to_string(entry)?)?;
                }
            }
            OutputFormat::Csv => {
                let mut csv_writer = csv::Writer::from_writer(&mut *writer);
                for entry in entries {
                    csv_writer.serialize(entry)?;
                }
                csv_writer.flush()?;
            }
        }
        Ok(())
    }

    fn format_table(&self, entry: &ParsedEntry) -> String {
        let mut output = String::new();

        output.push_str(&format!("{:>5} ", entry.index.to_string().dimmed()));
        output.push_str(&format!("{:<24} ", entry.timestamp.cyan()));

        let level = entry.level_or_dash();
        let colored_level = match level {
            "FATAL" => level.red().bold(),
            "ERROR" => level.red(),
            "WARNING" => level.yellow(),
            "INFO" => level.green(),
            "DEBUG" => level.blue(),
            _ => level.dimmed(),
        };
        output.push_str(&format!("[{:^7}] ", colored_level));

        let message = match self.highlight_pattern {
            Some(ref pattern) => pattern
                .replace_all(&entry.message, |caps: &regex::Captures| {
                    caps[0].to_string().on_yellow().black().to_string()
                })
                .to_string(),
            None => entry.message.clone(),
        };
        output.push_str(&message);

        output
    }
}

pub fn print_stats_summary(stats: &ParsingStatistics) {
    let entries = stats.entries();

    println!("\n{}", "═".repeat(50).cyan());
    println!("{}", "SUMMARY".cyan().bold());
    println!("{}", "═".repeat(50).cyan());
    println!("Total lines:        {}", stats.total_lines.to_string().white().bold());
    println!("Blank (skipped):    {}", stats.blank_lines.to_string().dimmed());
    println!("Matched:            {} ({:.1}%)", stats.matched_lines.to_string().green(), stats.match_rate());
    println!("Unmatched:          {} ({:.1}%)", stats.unmatched_lines.to_string().red(), stats.fallback_rate());
    println!(
        "Invalid timestamp:  {} ({:.1}%)",
        stats.invalid_timestamps.to_string().yellow(),
        share(stats.invalid_timestamps, entries)
    );
    println!(
        "Unknown level:      {} ({:.1}%)",
        stats.unknown_levels.to_string().yellow(),
        share(stats.unknown_levels, entries)
    );

    if !stats.pattern_distribution.is_empty() {
        println!("\n{}:", "Pattern Distribution".dimmed());
        let mut sorted: Vec<_> = stats.pattern_distribution.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(a.1));
        for (pattern, count) in sorted {
            println!("  {}: {} ({:.1}%)", pattern.white(), count, share(*count, entries));
        }
    }

    if let Some(pattern) = stats.most_common_pattern() {
        println!("\nMost common pattern: {}", pattern.white().bold());
    }
}

pub fn print_level_distribution(stats: &ParsingStatistics) {
    let entries = stats.entries();
    if stats.level_distribution.is_empty() {
        return;
    }

    println!("\n{}:", "Level Distribution".cyan().bold());
    let mut sorted: Vec<_> = stats.level_distribution.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1));
    for (level, count) in sorted {
        let bar_len = (share(*count, entries) * 0.4) as usize;
        let bar = "█".repeat(bar_len);
        println!("  {:8} {:>6} ({:5.1}%) {}", level, count, share(*count, entries), bar.green());
    }
}

fn share(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<ParsedEntry> {
        vec![
            ParsedEntry::new(
                "2024-01-15 10:30:00.0000".to_string(),
                Some("ERROR".to_string()),
                "Connection refused, retrying".to_string(),
            ),
            ParsedEntry::new("Invalid date format".to_string(), None, "no level".to_string()).with_index(1),
        ]
    }

    fn render(format: OutputFormat) -> String {
        let mut buffer = Vec::new();
        OutputFormatter::new(format).write_entries(&mut buffer, &entries()).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_json_output_is_an_array() {
        let value: serde_json::Value = serde_json::from_str(&render(OutputFormat::Json)).unwrap();

        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert_eq!(value[0]["level"], "ERROR");
        assert!(value[1]["level"].is_null());
    }

    #[test]
    fn test_ndjson_output_one_object_per_line() {
        let output = render(OutputFormat::Ndjson);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["index"], 1);
        assert_eq!(second["message"], "no level");
    }

    #[test]
    fn test_csv_output_quotes_commas() {
        let output = render(OutputFormat::Csv);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "index,timestamp,level,message");
        assert_eq!(lines[1], "0,2024-01-15 10:30:00.0000,ERROR,\"Connection refused, retrying\"");
        assert_eq!(lines[2], "1,Invalid date format,,no level");
    }

    #[test]
    fn test_table_output_contains_fields() {
        let output = render(OutputFormat::Table);

        assert!(output.contains("Connection refused, retrying"));
        assert!(output.contains("2024-01-15 10:30:00.0000"));
        assert!(output.contains("ERROR"));
    }
}
