//! Prompt text handed to the downstream log analyser.
//!
//! Only the prompt is built here. Sending it to a model is the caller's job.

use crate::models::ParsedEntry;
use std::fmt::Write;

const PROMPT_HEADER: &str = "Analyse the following logs and provide insights:\n\n";

/// Format `entries` and the user's `context` into one prompt.
///
/// An entry without a level shows `-` in the level column.
pub fn build_prompt<'a, I>(entries: I, context: &str) -> String
where
    I: IntoIterator<Item = &'a ParsedEntry>,
{
    let mut prompt = String::from(PROMPT_HEADER);
    for entry in entries {
        // writing to a String cannot fail
        let _ = writeln!(
            prompt,
            "Log: \n{} {} {} {}",
            entry.index,
            entry.timestamp,
            entry.level_or_dash(),
            entry.message
        );
    }
    let _ = write!(prompt, "\nContext: {}", context);
    prompt
}

/// Entries whose index lies in `from..=to`; an open end takes the rest
pub fn select_range(entries: &[ParsedEntry], from: Option<usize>, to: Option<usize>) -> Vec<&ParsedEntry> {
    let from = from.unwrap_or(0);
    let to = to.unwrap_or(usize::MAX);
    entries
        .iter()
        .filter(|entry| entry.index >= from && entry.index <= to)
        .collect()
}
