//! Syntax errors raised while tokenizing or parsing a rule
//!
//! Every variant that points at a location carries the byte offset into the
//! original rule string so editors can highlight the offending input.

use thiserror::Error;

/// Malformed rule text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The rule contained nothing but whitespace
    #[error("Rule is empty")]
    Empty,

    /// A word in keyword position is not a known criterion code
    #[error("Unknown keyword '{keyword}' at byte {position}")]
    UnknownKeyword { keyword: String, position: usize },

    /// An operator or literal appeared where a keyword was expected
    #[error("Unexpected '{token}' at byte {position}, expected a keyword")]
    UnexpectedToken { token: String, position: usize },

    /// A keyword that takes an operand was not followed by one
    #[error("Keyword '{keyword}' at byte {position} is missing its operand")]
    MissingOperand { keyword: String, position: usize },

    /// A numeric criterion was given something that is not an integer
    #[error("Invalid number '{value}' at byte {position}")]
    InvalidNumber { value: String, position: usize },

    /// A quoted string or `/pattern/` never saw its closing delimiter
    #[error("Unterminated {kind} starting at byte {position}")]
    Unterminated { kind: &'static str, position: usize },

    /// `&` and `|` were both used in the same rule
    #[error("Cannot mix '&' and '|' in one rule (byte {position})")]
    MixedOperators { position: usize },

    /// An operator was not followed by a condition
    #[error("Expected a condition at byte {position}")]
    MissingPredicate { position: usize },

    /// Input remained after a complete condition
    #[error("Unexpected input at byte {position}")]
    TrailingInput { position: usize },

    /// `%` or a `/pattern/` was used with a criterion that cannot take it
    #[error("Modifier not allowed for '{keyword}' at byte {position}")]
    UnexpectedModifier { keyword: String, position: usize },
}

impl ParseError {
    /// Byte offset of the error, if it refers to a location
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::UnknownKeyword { position, .. }
            | Self::UnexpectedToken { position, .. }
            | Self::MissingOperand { position, .. }
            | Self::InvalidNumber { position, .. }
            | Self::Unterminated { position, .. }
            | Self::MixedOperators { position }
            | Self::MissingPredicate { position }
            | Self::TrailingInput { position }
            | Self::UnexpectedModifier { position, .. } => Some(*position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_reported() {
        let err = ParseError::MixedOperators { position: 12 };
        assert_eq!(err.position(), Some(12));
        assert_eq!(ParseError::Empty.position(), None);
    }

    #[test]
    fn test_display_mentions_keyword() {
        let err = ParseError::UnknownKeyword {
            keyword: "z".to_string(),
            position: 0,
        };
        assert!(err.to_string().contains("'z'"));
    }
}
