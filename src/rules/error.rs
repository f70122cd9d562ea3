//! Error types for rule storage and rule-set files

use std::io;
use thiserror::Error;

use crate::matcher::ParseError;

/// Errors that can occur while managing rules
#[derive(Debug, Error)]
pub enum RuleError {
    /// Rule not found
    #[error("Rule '{0}' not found")]
    NotFound(String),

    /// Rule already exists
    #[error("Rule '{0}' already exists")]
    AlreadyExists(String),

    /// Invalid rule name
    #[error("Invalid rule name '{0}': {1}")]
    InvalidName(String, String),

    /// The rule text does not parse
    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] ParseError),

    /// A line of a rule-set file does not parse
    #[error("Invalid rule on line {line}: {source}")]
    InvalidLine { line: usize, source: ParseError },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl From<toml::de::Error> for RuleError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for RuleError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
