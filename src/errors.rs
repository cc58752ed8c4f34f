//! Typed failure signals for config rows and interactive answers.
//!
//! Row-level errors are always recovered by the parser; they exist so the
//! recovery path can report what went wrong and where.
use std::fmt;
use std::path::PathBuf;

/// A config row that could not be used as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Row did not split into the expected number of fields.
    InvalidDataFormat { line: usize, fields: usize },
    /// Enumerated field held a value outside its vocabulary.
    InvalidCharacteristic {
        field: &'static str,
        value: String,
    },
    /// Numeric field failed to parse.
    InvalidNumberFormat {
        field: &'static str,
        value: String,
    },
}

impl RecordError {
    /// Operator-facing warning, suffixed with the 1-based line number.
    pub fn warning(&self, line: usize) -> String {
        match self {
            RecordError::InvalidDataFormat { .. } => {
                format!("WARNING: invalid data format in config file in line {line}")
            }
            RecordError::InvalidCharacteristic { .. } => {
                format!("WARNING: invalid characteristic in config file in line {line}")
            }
            RecordError::InvalidNumberFormat { .. } => {
                format!("WARNING: invalid number format in config file in line {line}")
            }
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::InvalidDataFormat { line, fields } => write!(
                f,
                "line {line}: expected {} fields, found {fields}",
                crate::config::FIELD_COUNT
            ),
            RecordError::InvalidCharacteristic { field, value } => {
                write!(f, "invalid {field} value {value:?}")
            }
            RecordError::InvalidNumberFormat { field, value } => {
                write!(f, "invalid {field} number {value:?}")
            }
        }
    }
}

impl std::error::Error for RecordError {}

/// An interactive answer outside the accepted vocabulary of its prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidInput {
    pub answer: String,
}

impl InvalidInput {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
        }
    }
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Invalid response. ")
    }
}

impl std::error::Error for InvalidInput {}

/// Config-level failures that end the parse before any row is read.
#[derive(Debug)]
pub enum ConfigError {
    NotFound(PathBuf),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFound(_) => f.write_str("ERROR: could not find config file."),
            ConfigError::Io { path, source } => {
                write!(f, "read config {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::NotFound(_) => None,
            ConfigError::Io { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_carry_line_numbers() {
        let err = RecordError::InvalidDataFormat { line: 4, fields: 9 };
        assert_eq!(
            err.warning(4),
            "WARNING: invalid data format in config file in line 4"
        );
        let err = RecordError::InvalidCharacteristic {
            field: "gender",
            value: "robot".to_string(),
        };
        assert!(err.warning(7).ends_with("line 7"));
    }

    #[test]
    fn missing_config_message_is_stable() {
        let err = ConfigError::NotFound(PathBuf::from("nope.csv"));
        assert_eq!(err.to_string(), "ERROR: could not find config file.");
    }
}
