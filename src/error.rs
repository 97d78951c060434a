use std::fmt;
use serde::{Deserialize, Serialize};

/// Process-visible failures. Line and field level problems never show up
/// here; they are downgraded to sentinel values on the entry instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParseError {
    /// Pattern or level mapping configuration is missing or invalid
    ConfigurationError {
        parameter: String,
        error_message: String,
    },
    /// A configured regular expression failed to compile
    RegexError {
        pattern: String,
        error_message: String,
    },
    /// Input bytes are not valid UTF-8 text
    DecodeError {
        valid_up_to: usize,
        error_message: String,
    },
    /// I/O error while reading input or configuration
    IoError {
        operation: String,
        error_message: String,
    },
}

impl ParseError {
    pub fn configuration(parameter: impl Into<String>, error_message: impl Into<String>) -> Self {
        ParseError::ConfigurationError {
            parameter: parameter.into(),
            error_message: error_message.into(),
        }
    }

    pub fn io(operation: impl Into<String>, error: &std::io::Error) -> Self {
        ParseError::IoError {
            operation: operation.into(),
            error_message: error.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::ConfigurationError { parameter, error_message } => {
                write!(f, "Configuration error for '{}': {}", parameter, error_message)
            }
            ParseError::RegexError { pattern, error_message } => {
                write!(f, "Regex error for pattern '{}': {}", pattern, error_message)
            }
            ParseError::DecodeError { valid_up_to, error_message } => {
                write!(f, "Input is not valid UTF-8 after byte {}: {}", valid_up_to, error_message)
            }
            ParseError::IoError { operation, error_message } => {
                write!(f, "I/O error during {}: {}", operation, error_message)
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<std::str::Utf8Error> for ParseError {
    fn from(e: std::str::Utf8Error) -> Self {
        ParseError::DecodeError {
            valid_up_to: e.valid_up_to(),
            error_message: e.to_string(),
        }
    }
}

impl From<std::string::FromUtf8Error> for ParseError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        e.utf8_error().into()
    }
}

impl From<config::ConfigError> for ParseError {
    fn from(e: config::ConfigError) -> Self {
        ParseError::ConfigurationError {
            parameter: "config".to_string(),
            error_message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_from_utf8() {
        let bytes = vec![b'o', b'k', 0xff, b'x'];
        let err: ParseError = String::from_utf8(bytes).unwrap_err().into();

        match &err {
            ParseError::DecodeError { valid_up_to, .. } => assert_eq!(*valid_up_to, 2),
            other => panic!("Expected DecodeError, got {:?}", other),
        }
        assert!(err.to_string().contains("after byte 2"));
    }

    #[test]
    fn test_configuration_error_display() {
        let err = ParseError::configuration("log_regexes", "at least one pattern is required");
        assert_eq!(
            err.to_string(),
            "Configuration error for 'log_regexes': at least one pattern is required"
        );
    }
}
