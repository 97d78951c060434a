use crate::cli::StatsArgs;
use crate::commands::output::{print_level_distribution, print_stats_summary};
use crate::commands::parse::expand_globs;
use crate::commands::read_text;
use crate::parsers::LineParser;
use crate::processor::BatchProcessor;
use crate::statistics::ParsingStatistics;
use colored::*;

pub fn run_stats<P: LineParser>(
    args: StatsArgs,
    processor: &BatchProcessor<P>,
) -> Result<(), Box<dyn std::error::Error>> {
    let files = expand_globs(&args.files)?;

    if files.is_empty() {
        eprintln!("No files matched the given patterns");
        return Ok(());
    }

    let stats = collect_statistics(processor, &files)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{} {}", "Files:".dimmed(), files.len());
    print_stats_summary(&stats);
    print_level_distribution(&stats);

    Ok(())
}

pub fn collect_statistics<P: LineParser>(
    processor: &BatchProcessor<P>,
    files: &[std::path::PathBuf],
) -> Result<ParsingStatistics, crate::error::ParseError> {
    let mut stats = ParsingStatistics::new();
    for file_path in files {
        let text = read_text(file_path)?;
        let (_, file_stats) = processor.process_with_statistics(&text);
        stats.merge(&file_stats);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::parsers::CatalogParser;

    fn processor() -> BatchProcessor<CatalogParser> {
        BatchProcessor::new(CatalogParser::with_defaults().unwrap())
    }

    #[test]
    fn test_collect_statistics_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.log");
        let second = dir.path().join("second.log");
        std::fs::write(&first, "2024-01-15 10:30:00 ERROR Connection refused\n\n").unwrap();
        std::fs::write(&second, "qwerty nonsense 12345\nWARN: retrying\n").unwrap();

        let stats = collect_statistics(&processor(), &[first, second]).unwrap();

        assert_eq!(stats.matched_lines, 2);
        assert_eq!(stats.unmatched_lines, 1);
        assert_eq!(stats.level_distribution.get("WARNING"), Some(&1));
        assert_eq!(stats.level_distribution.get("ERROR"), Some(&1));
    }

    #[test]
    fn test_non_utf8_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.log");
        std::fs::write(&path, [b'o', b'k', b'\n', 0xc3, 0x28]).unwrap();

        let result = collect_statistics(&processor(), &[path]);
        assert!(matches!(result, Err(ParseError::DecodeError { valid_up_to: 3, .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = collect_statistics(&processor(), &[std::path::PathBuf::from("/nonexistent/app.log")]);
        assert!(matches!(result, Err(ParseError::IoError { .. })));
    }
}
