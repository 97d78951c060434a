use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "logainizer")]
#[command(author, version, about = "Normalize free-form log lines into timestamp, level and message")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Pattern catalog and level mapping (YAML, JSON or TOML); built-in catalog when omitted
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse log files into structured entries
    Parse(ParseArgs),

    /// Show match statistics and level distribution
    Stats(StatsArgs),

    /// Print an analysis prompt for a range of entries
    Prompt(PromptArgs),
}

#[derive(Args)]
pub struct ParseArgs {
    /// Log files to parse (supports glob patterns)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Keep only these canonical level(s)
    #[arg(long, short)]
    pub level: Option<Vec<String>>,

    /// Regex to search in message
    #[arg(long, short)]
    pub grep: Option<String>,

    /// Maximum number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Parse lines across all cores
    #[arg(long, short = 'p')]
    pub parallel: bool,

    /// Output file (default: stdout)
    #[arg(long, short = 'O')]
    pub output_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Log files to analyze (supports glob patterns)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print statistics as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct PromptArgs {
    /// Log file to build the prompt from
    pub file: PathBuf,

    /// What the analyser should know about these logs
    #[arg(long, short = 'x')]
    pub context: String,

    /// First entry index to include
    #[arg(long)]
    pub from: Option<usize>,

    /// Last entry index to include
    #[arg(long)]
    pub to: Option<usize>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON array
    Json,
    /// Newline-delimited JSON
    Ndjson,
    /// CSV format
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Ndjson => write!(f, "ndjson"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
