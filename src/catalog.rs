use crate::config::PatternConfig;
use crate::error::ParseError;
use crate::template::MessageTemplate;
use regex::{Captures, Regex};

/// Capture group holding a field, or absent when the pattern has no such field.
/// Configuration spells absence as `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRef {
    Absent,
    Group(usize),
}

impl GroupRef {
    pub fn from_config(value: i64, parameter: &str) -> Result<Self, ParseError> {
        match value {
            -1 => Ok(GroupRef::Absent),
            n if n >= 0 => Ok(GroupRef::Group(n as usize)),
            n => Err(ParseError::configuration(
                parameter,
                format!("group reference {} is invalid (use -1 for none)", n),
            )),
        }
    }

    /// `None` when undeclared, `Some(None)` when declared but not in the match
    pub fn extract<'t>(&self, captures: &Captures<'t>) -> Option<Option<&'t str>> {
        match self {
            GroupRef::Absent => None,
            GroupRef::Group(n) => Some(captures.get(*n).map(|m| m.as_str())),
        }
    }
}

/// One recognised log-line shape
#[derive(Debug, Clone)]
pub struct PatternSpec {
    pub name: String,
    /// Configured expression, before anchoring
    pub source: String,
    pub timestamp_group: GroupRef,
    pub level_group: GroupRef,
    pub message_template: MessageTemplate,
    regex: Regex,
}

impl PatternSpec {
    /// Compile and validate one configured pattern. The expression is
    /// anchored at the start of the line; it need not consume the whole line.
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        timestamp_group: GroupRef,
        level_group: GroupRef,
        message_template: &str,
    ) -> Result<Self, ParseError> {
        let name = name.into();
        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|e| ParseError::RegexError {
            pattern: pattern.to_string(),
            error_message: e.to_string(),
        })?;

        let spec = Self {
            name,
            source: pattern.to_string(),
            timestamp_group,
            level_group,
            message_template: MessageTemplate::parse(message_template),
            regex,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn from_config(index: usize, config: &PatternConfig) -> Result<Self, ParseError> {
        let name = config
            .name
            .clone()
            .unwrap_or_else(|| format!("pattern#{}", index));
        let prefix = format!("log_regexes[{}]", index);

        Self::new(
            name,
            &config.regex,
            GroupRef::from_config(config.timestamp_group, &format!("{}.timestamp_group", prefix))?,
            GroupRef::from_config(config.log_level_group, &format!("{}.log_level_group", prefix))?,
            &config.message_format,
        )
    }

    /// Every referenced group must exist in the expression
    pub fn validate(&self) -> Result<(), ParseError> {
        let capture_count = self.regex.captures_len();
        let checks = [
            ("timestamp_group", self.timestamp_group_index()),
            ("log_level_group", self.level_group_index()),
            ("message_format", self.message_template.max_group()),
        ];

        for (field, group) in checks {
            if let Some(group) = group {
                if group >= capture_count {
                    return Err(ParseError::configuration(
                        format!("{}.{}", self.name, field),
                        format!(
                            "Capture group {} does not exist in pattern (max: {})",
                            group,
                            capture_count - 1
                        ),
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn captures<'t>(&self, line: &'t str) -> Option<Captures<'t>> {
        self.regex.captures(line)
    }

    fn timestamp_group_index(&self) -> Option<usize> {
        match self.timestamp_group {
            GroupRef::Group(n) => Some(n),
            GroupRef::Absent => None,
        }
    }

    fn level_group_index(&self) -> Option<usize> {
        match self.level_group {
            GroupRef::Group(n) => Some(n),
            GroupRef::Absent => None,
        }
    }
}

/// Ordered, immutable set of patterns. Order only breaks score ties.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    patterns: Vec<PatternSpec>,
}

impl PatternCatalog {
    pub fn new(patterns: Vec<PatternSpec>) -> Result<Self, ParseError> {
        if patterns.is_empty() {
            return Err(ParseError::configuration(
                "log_regexes",
                "at least one pattern is required",
            ));
        }
        Ok(Self { patterns })
    }

    pub fn from_config(configs: &[PatternConfig]) -> Result<Self, ParseError> {
        let patterns = configs
            .iter()
            .enumerate()
            .map(|(index, config)| PatternSpec::from_config(index, config))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(patterns)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternSpec> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.name.as_str()).collect()
    }
}
