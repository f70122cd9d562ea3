//! mailmatch - a message-matching engine for mail filtering and quick search
//!
//! Rules are written in a compact language (`s "invoice" & ~D & ag 30`),
//! parsed into a [`matcher::PredicateList`], evaluated against anything that
//! implements [`message::MessageRecord`], and written back in canonical form.
//! Named rules are stored on disk by [`rules::RuleManager`].

use thiserror::Error;

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod matcher;
pub mod message;
pub mod output;
pub mod quicksearch;
pub mod rules;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum MailmatchError {
    /// A rule failed to parse
    #[error("Syntax error: {0}")]
    ParseError(#[from] matcher::ParseError),
    /// Rule storage error
    #[error("Rule error: {0}")]
    RuleError(#[from] rules::RuleError),
    /// Message loading error
    #[error("Message error: {0}")]
    MessageError(#[from] message::MessageError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
