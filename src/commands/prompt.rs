use crate::analysis::{build_prompt, select_range};
use crate::cli::PromptArgs;
use crate::commands::read_text;
use crate::parsers::LineParser;
use crate::processor::BatchProcessor;

pub fn run_prompt<P: LineParser>(
    args: PromptArgs,
    processor: &BatchProcessor<P>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_text(&args.file)?;
    let entries = processor.process(&text);

    let selected = select_range(&entries, args.from, args.to);
    if selected.is_empty() {
        eprintln!("No entries in the requested range");
    }

    println!("{}", build_prompt(selected, &args.context));
    Ok(())
}
