use crate::cli::ParseArgs;
use crate::commands::output::{print_stats_summary, OutputFormatter};
use crate::commands::read_text;
use crate::models::ParsedEntry;
use crate::parsers::LineParser;
use crate::processor::BatchProcessor;
use crate::statistics::ParsingStatistics;
use glob::glob;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

pub fn run_parse<P: LineParser + Sync>(
    args: ParseArgs,
    processor: &BatchProcessor<P>,
) -> Result<(), Box<dyn std::error::Error>> {
    let files = expand_globs(&args.files)?;

    if files.is_empty() {
        eprintln!("No files matched the given patterns");
        return Ok(());
    }

    let filter = EntryFilter::new(args.level.as_deref(), args.grep.as_deref())?;
    let formatter = OutputFormatter::new(args.output).with_highlight(filter.grep.as_ref());

    let mut output: Box<dyn Write> = if let Some(ref path) = args.output_file {
        colored::control::set_override(false);
        Box::new(BufWriter::new(File::create(path)?))
    } else {
        Box::new(stdout())
    };

    let mut stats = ParsingStatistics::new();
    let mut selected: Vec<ParsedEntry> = Vec::new();

    for file_path in &files {
        if args.limit.map_or(false, |limit| selected.len() >= limit) {
            break;
        }
        debug!(file = %file_path.display(), "parsing");
        let text = read_text(file_path)?;

        // indices restart at 0 for every file
        let entries = if args.parallel {
            processor.process_parallel(&text)
        } else {
            let (entries, file_stats) = processor.process_with_statistics(&text);
            stats.merge(&file_stats);
            entries
        };

        for entry in entries {
            if let Some(limit) = args.limit {
                if selected.len() >= limit {
                    break;
                }
            }
            if filter.matches(&entry) {
                selected.push(entry);
            }
        }
    }

    formatter.write_entries(&mut output, &selected)?;
    output.flush()?;

    // Print summary to stdout when entries went to a file
    if args.output_file.is_some() && !args.parallel {
        print_stats_summary(&stats);
    }

    Ok(())
}

pub fn expand_globs(patterns: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let pattern_str = pattern.to_string_lossy();
        if pattern_str.contains('*') || pattern_str.contains('?') {
            let before = files.len();
            for entry in glob(&pattern_str)? {
                files.push(entry?);
            }
            if files.len() == before {
                warn!(pattern = %pattern_str, "glob matched no files");
            }
        } else {
            files.push(pattern.clone());
        }
    }
    Ok(files)
}

/// Level and message filters from the command line
pub struct EntryFilter {
    levels: Option<Vec<String>>,
    grep: Option<regex::Regex>,
}

impl EntryFilter {
    pub fn new(levels: Option<&[String]>, grep: Option<&str>) -> Result<Self, regex::Error> {
        let levels = levels.map(|lvls| lvls.iter().map(|l| l.trim().to_uppercase()).collect());
        let grep = grep
            .map(|p| regex::Regex::new(&format!("(?i){}", p)))
            .transpose()?;
        Ok(Self { levels, grep })
    }

    pub fn matches(&self, entry: &ParsedEntry) -> bool {
        if let Some(ref allowed) = self.levels {
            match entry.level.as_deref() {
                Some(level) if allowed.iter().any(|a| a == level) => {}
                _ => return false,
            }
        }

        if let Some(ref pattern) = self.grep {
            if !pattern.is_match(&entry.message) {
                return false;
            }
        }

        true
    }
}
