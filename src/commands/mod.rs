pub mod parse;
pub mod stats;
pub mod prompt;
pub mod output;

pub use parse::run_parse;
pub use prompt::run_prompt;
pub use stats::run_stats;

use crate::error::ParseError;
use std::fs;
use std::path::Path;

/// Read a whole log file as UTF-8 text
pub fn read_text(path: &Path) -> Result<String, ParseError> {
    let bytes = fs::read(path).map_err(|e| ParseError::io(format!("reading {}", path.display()), &e))?;
    Ok(String::from_utf8(bytes)?)
}
