//! Named rules
//!
//! Rules are stored in TOML at `~/.config/mailmatch/rules.toml` by default,
//! each with a description and usage statistics. The storage location can be
//! changed with the `rules_path` configuration key.
//!
//! A [`RuleSet`] is the in-memory, ordered form used for evaluation. It is
//! passed explicitly to whatever needs it and can be read from or written to
//! a plain text format with one rule per line:
//!
//! ```text
//! # comments and blank lines are ignored
//! spam: s "viagra" | f /@spam\.example$/
//! flagged: T & U
//! h "List-Id: announce"
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use mailmatch::rules::{RuleManager, default_rules_path};
//!
//! let manager = RuleManager::new(default_rules_path().unwrap());
//! manager.create("old-unread", "Unread for a month".to_string(), "U & ag 30").unwrap();
//!
//! let rule = manager.get("old-unread").unwrap();
//! println!("{}: {}", rule.name, rule.rule);
//! ```

pub mod error;
pub mod operations;
pub mod set;
pub mod types;

pub use error::RuleError;
pub use operations::RuleManager;
pub use set::{Rule, RuleSet};
pub use types::{RuleStorage, StoredRule, validate_rule_name};

use std::path::PathBuf;

use crate::config::MailmatchConfig;

/// Get the default rules file path
///
/// # Errors
///
/// Returns `RuleError` if the config directory cannot be determined
pub fn default_rules_path() -> Result<PathBuf, RuleError> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        RuleError::Config(config::ConfigError::Message(
            "Could not determine config directory".to_string(),
        ))
    })?;

    Ok(config_dir.join("mailmatch").join("rules.toml"))
}

/// The rules file named by the configuration, or the default
///
/// # Errors
///
/// Returns `RuleError` if no path is configured and the default cannot be
/// determined
pub fn get_rules_path(config: &MailmatchConfig) -> Result<PathBuf, RuleError> {
    match &config.rules_path {
        Some(path) => Ok(path.clone()),
        None => default_rules_path(),
    }
}
