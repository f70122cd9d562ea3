//! Ordered rule sets and their line-oriented text format
//!
//! One rule per line, either `name: rule` or a bare `rule`. A prefix before
//! the first `:` is only taken as a name when it is a valid rule name, so rules
//! such as `h "List-Id: x"` stay unnamed.
//!
//! Lines starting with `#` are comments. A block of comment lines directly
//! above a rule is that rule's description; a blank line ends the block, so a
//! comment followed by a blank line belongs to no rule.

use std::fmt;

use super::error::RuleError;
use super::types::validate_rule_name;
use crate::matcher::{Evaluator, PredicateList, parse_list};
use crate::message::MessageRecord;

/// A predicate list with an optional name and description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: Option<String>,
    /// Free text, possibly several lines; empty when there is none
    pub description: String,
    pub list: PredicateList,
}

impl Rule {
    #[must_use]
    pub const fn new(name: Option<String>, list: PredicateList) -> Self {
        Self {
            name,
            description: String::new(),
            list,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Parse one non-comment line of a rule-set file
    ///
    /// # Errors
    /// Returns the `ParseError` of the rule part, converted to `RuleError`.
    pub fn parse_line(line: &str) -> Result<Self, RuleError> {
        let line = line.trim();
        if let Some((prefix, rest)) = line.split_once(':') {
            let prefix = prefix.trim();
            if validate_rule_name(prefix).is_ok() {
                return Ok(Self::new(Some(prefix.to_string()), parse_list(rest)?));
            }
        }
        Ok(Self::new(None, parse_list(line)?))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}: {}", self.list),
            None => write!(f, "{}", self.list),
        }
    }
}

/// An ordered collection of rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Parse a rule-set document
    ///
    /// # Errors
    /// Returns `RuleError::InvalidLine` with the 1-based line number of the
    /// first rule that fails to parse.
    pub fn parse_lines(text: &str) -> Result<Self, RuleError> {
        let mut set = Self::new();
        let mut comments: Vec<&str> = Vec::new();

        for (i, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                comments.clear();
                continue;
            }
            if let Some(comment) = trimmed.strip_prefix('#') {
                comments.push(comment.strip_prefix(' ').unwrap_or(comment));
                continue;
            }
            let rule = Rule::parse_line(trimmed).map_err(|e| match e {
                RuleError::InvalidRule(source) => RuleError::InvalidLine { line: i + 1, source },
                other => other,
            })?;
            set.push(rule.with_description(comments.join("\n")));
            comments.clear();
        }
        Ok(set)
    }

    /// Render in the line format, each description as `#` lines above its rule
    #[must_use]
    pub fn to_lines(&self) -> String {
        let mut out = String::new();
        for rule in &self.rules {
            for line in rule.description.lines() {
                out.push_str("# ");
                out.push_str(line);
                out.push('\n');
            }
            out.push_str(&rule.to_string());
            out.push('\n');
        }
        out
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name.as_deref() == Some(name))
    }

    /// The first rule that matches `message`, in set order
    pub fn first_match<M: MessageRecord + ?Sized>(
        &self,
        evaluator: &Evaluator<'_>,
        message: &M,
    ) -> Option<&Rule> {
        self.rules.iter().find(|r| evaluator.evaluate(&r.list, message))
    }

    /// Every rule that matches `message`, in set order
    pub fn matching<M: MessageRecord + ?Sized>(&self, evaluator: &Evaluator<'_>, message: &M) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|r| evaluator.evaluate(&r.list, message))
            .collect()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}
