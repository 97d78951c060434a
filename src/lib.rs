pub mod models;
pub mod error;
pub mod config;
pub mod template;
pub mod catalog;
pub mod level;
pub mod timestamp;
pub mod parsers;
pub mod processor;
pub mod statistics;
pub mod analysis;
pub mod cli;
pub mod commands;


pub use models::*;
pub use error::ParseError;
pub use config::{ParserConfig, PatternConfig};
pub use catalog::{GroupRef, PatternCatalog, PatternSpec};
pub use level::{normalize_level, LevelTable};
pub use timestamp::{ParsedTimestamp, TimestampError, TimestampNormalizer};
pub use parsers::{CatalogParser, LineParser};
pub use processor::BatchProcessor;
pub use statistics::ParsingStatistics;
