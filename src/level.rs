use crate::error::ParseError;
use crate::models::UNKNOWN;
use std::collections::HashMap;

/// Raw level token -> canonical level name. Keys are stored upper-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelTable {
    mapping: HashMap<String, String>,
}

impl LevelTable {
    pub fn from_mapping<I, K, V>(mapping: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut table = HashMap::new();
        for (raw, canonical) in mapping {
            let key = raw.as_ref().trim().to_uppercase();
            let value = canonical.into();
            if key.is_empty() {
                return Err(ParseError::configuration(
                    "log_level_mapping",
                    "level tokens must not be empty",
                ));
            }
            if value.trim().is_empty() {
                return Err(ParseError::configuration(
                    format!("log_level_mapping.{}", key),
                    "canonical level must not be empty",
                ));
            }
            table.insert(key, value);
        }

        if table.is_empty() {
            return Err(ParseError::configuration(
                "log_level_mapping",
                "at least one level mapping is required",
            ));
        }

        Ok(Self { mapping: table })
    }

    pub fn get(&self, upper_token: &str) -> Option<&str> {
        self.mapping.get(upper_token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

/// Canonicalize a raw level token.
///
/// `None` stays `None`. A token missing from the table becomes `UNKNOWN`
/// instead of being echoed back.
pub fn normalize_level(raw: Option<&str>, levels: &LevelTable) -> Option<String> {
    let raw = raw?;
    let upper = raw.to_uppercase();
    Some(levels.get(&upper).unwrap_or(UNKNOWN).to_string())
}
