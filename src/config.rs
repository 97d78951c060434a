//! Pattern and level mapping configuration.
//!
//! [`ParserConfig::load`] reads a user file (YAML, JSON or TOML, picked by
//! extension). [`ParserConfig::defaults`] returns the catalog embedded from
//! `config/default.yaml`. A user file replaces the defaults rather than
//! merging with them, so pattern order stays exactly as written.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

const DEFAULT_CONFIG: &str = include_str!("../config/default.yaml");

fn no_group() -> i64 {
    -1
}

/// One `log_regexes` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub regex: String,
    #[serde(default = "no_group")]
    pub timestamp_group: i64,
    #[serde(default = "no_group")]
    pub log_level_group: i64,
    pub message_format: String,
}

/// Everything the parsing engine needs, loaded once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    #[serde(default)]
    pub log_regexes: Vec<PatternConfig>,
    #[serde(default)]
    pub log_level_mapping: BTreeMap<String, String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl ParserConfig {
    /// Load from `path`. A missing or malformed file is a configuration error.
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        if !path.is_file() {
            return Err(ParseError::configuration(
                path.display().to_string(),
                "configuration file not found",
            ));
        }

        let config: Self = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;
        config.check_present()?;

        info!(
            path = %path.display(),
            patterns = config.log_regexes.len(),
            levels = config.log_level_mapping.len(),
            "loaded parser configuration"
        );
        Ok(config)
    }

    /// Parse configuration text in the given format
    pub fn from_text(text: &str, format: config::FileFormat) -> Result<Self, ParseError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(text, format))
            .build()?
            .try_deserialize()?;
        config.check_present()?;
        Ok(config)
    }

    /// The built-in catalog, without touching the filesystem
    pub fn defaults() -> Self {
        Self::from_text(DEFAULT_CONFIG, config::FileFormat::Yaml)
            .expect("built-in default config must be valid")
    }

    /// Load `path` when given, otherwise the built-in catalog
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ParseError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::defaults()),
        }
    }

    fn check_present(&self) -> Result<(), ParseError> {
        if self.log_regexes.is_empty() {
            return Err(ParseError::configuration(
                "log_regexes",
                "at least one pattern is required",
            ));
        }
        if self.log_level_mapping.is_empty() {
            return Err(ParseError::configuration(
                "log_level_mapping",
                "at least one level mapping is required",
            ));
        }
        Ok(())
    }
}
