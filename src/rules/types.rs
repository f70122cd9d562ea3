//! Stored rule records
//!
//! - `StoredRule`: a named rule with its description and usage statistics
//! - `RuleStorage`: the TOML document holding every stored rule

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::RuleError;
use crate::matcher::{PredicateList, parse_list};

/// A named rule as kept in the rules file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredRule {
    /// Unique rule name
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// When the rule was created
    pub created: DateTime<Utc>,

    /// When the rule was last used
    pub last_used: DateTime<Utc>,

    /// Number of times the rule has been used
    #[serde(default)]
    pub use_count: u32,

    /// The rule in its canonical text form
    pub rule: String,
}

impl StoredRule {
    #[must_use]
    pub fn new(name: String, description: String, rule: String) -> Self {
        let now = Utc::now();
        Self {
            name,
            description,
            created: now,
            last_used: now,
            use_count: 0,
            rule,
        }
    }

    /// Record that this rule was used
    pub fn record_use(&mut self) {
        self.use_count += 1;
        self.last_used = Utc::now();
    }

    /// Parse the rule text
    ///
    /// # Errors
    /// Returns `RuleError::InvalidRule` if the stored text does not parse.
    pub fn parsed(&self) -> Result<PredicateList, RuleError> {
        Ok(parse_list(&self.rule)?)
    }

    /// Check the name and the rule text
    ///
    /// # Errors
    /// Returns `RuleError::InvalidName` or `RuleError::InvalidRule`.
    pub fn validate(&self) -> Result<(), RuleError> {
        validate_rule_name(&self.name).map_err(|e| RuleError::InvalidName(self.name.clone(), e))?;
        self.parsed()?;
        Ok(())
    }
}

impl fmt::Display for StoredRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rule: {}", self.name)?;
        if !self.description.is_empty() {
            writeln!(f, "Description: {}", self.description)?;
        }
        writeln!(f)?;
        writeln!(f, "  {}", self.rule)?;
        writeln!(f)?;
        writeln!(f, "Created: {}", self.created.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "Last Used: {}", self.last_used.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "Use Count: {}", self.use_count)
    }
}

/// Root structure of the rules file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuleStorage {
    #[serde(rename = "rule", default)]
    pub rules: Vec<StoredRule>,
}

impl RuleStorage {
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StoredRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut StoredRule> {
        self.rules.iter_mut().find(|r| r.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.name == name)
    }

    /// Add a rule
    ///
    /// # Errors
    /// Returns `RuleError::AlreadyExists` for a duplicate name, or the
    /// validation error of the rule.
    pub fn add(&mut self, rule: StoredRule) -> Result<(), RuleError> {
        if self.contains(&rule.name) {
            return Err(RuleError::AlreadyExists(rule.name));
        }
        rule.validate()?;
        self.rules.push(rule);
        Ok(())
    }

    /// Replace the rule with the same name
    ///
    /// # Errors
    /// Returns `RuleError::NotFound` if no rule has that name, or the
    /// validation error of the rule.
    pub fn update(&mut self, rule: StoredRule) -> Result<(), RuleError> {
        rule.validate()?;
        let Some(existing) = self.get_mut(&rule.name) else {
            return Err(RuleError::NotFound(rule.name));
        };
        *existing = rule;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<StoredRule> {
        let pos = self.rules.iter().position(|r| r.name == name)?;
        Some(self.rules.remove(pos))
    }

    /// Rules sorted by use count, most used first
    #[must_use]
    pub fn most_used(&self) -> Vec<&StoredRule> {
        let mut sorted: Vec<&StoredRule> = self.rules.iter().collect();
        sorted.sort_by(|a, b| b.use_count.cmp(&a.use_count));
        sorted
    }

    /// Rules sorted by last use, most recent first
    #[must_use]
    pub fn recently_used(&self) -> Vec<&StoredRule> {
        let mut sorted: Vec<&StoredRule> = self.rules.iter().collect();
        sorted.sort_by(|a, b| b.last_used.cmp(&a.last_used));
        sorted
    }
}

/// Validate a rule name
///
/// Names are 1-64 characters of ASCII letters, digits, `-` and `_`.
///
/// # Errors
/// Returns a description of the problem.
pub fn validate_rule_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Rule name cannot be empty".to_string());
    }

    if name.len() > 64 {
        return Err(format!("Rule name too long (max 64 chars): {}", name.len()));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(format!(
            "Rule name '{name}' contains invalid characters (only letters, digits, '-' and '_' allowed)"
        ));
    }

    Ok(())
}
