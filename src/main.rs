use clap::Parser;
use logainizer::cli::{Cli, Commands};
use logainizer::commands::{run_parse, run_prompt, run_stats};
use logainizer::{BatchProcessor, CatalogParser, ParserConfig};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // configuration problems are fatal before any input is read
    let config = ParserConfig::load_or_default(cli.config.as_deref())?;
    let processor = BatchProcessor::new(CatalogParser::from_config(&config)?);

    match cli.command {
        Commands::Parse(args) => run_parse(args, &processor),
        Commands::Stats(args) => run_stats(args, &processor),
        Commands::Prompt(args) => run_prompt(args, &processor),
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
