//! Rule CRUD operations
//!
//! `RuleManager` owns the path of the rules file and loads it on every call,
//! so separate invocations of the CLI always see each other's changes.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::RuleError;
use super::set::{Rule, RuleSet};
use super::types::{RuleStorage, StoredRule, validate_rule_name};
use crate::matcher::parse_list;

/// Manager for stored rules
///
/// # Examples
///
/// ```no_run
/// use mailmatch::rules::RuleManager;
/// use std::path::PathBuf;
///
/// let manager = RuleManager::new(PathBuf::from("rules.toml"));
/// manager.create("flagged", "Flagged and unread".to_string(), "T & U").unwrap();
/// let set = manager.load_rule_set().unwrap();
/// ```
pub struct RuleManager {
    path: PathBuf,
    auto_backup: bool,
}

impl RuleManager {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            auto_backup: true,
        }
    }

    /// Create a `RuleManager` that never writes a `.toml.backup` copy
    #[must_use]
    pub const fn without_backup(path: PathBuf) -> Self {
        Self {
            path,
            auto_backup: false,
        }
    }

    /// Returns an empty storage if the file doesn't exist
    fn load(&self) -> Result<RuleStorage, RuleError> {
        if !self.path.exists() {
            return Ok(RuleStorage::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        let storage: RuleStorage = toml::from_str(&contents)?;
        tracing::debug!(path = %self.path.display(), count = storage.rules.len(), "loaded rules");
        Ok(storage)
    }

    fn save(&self, storage: &RuleStorage) -> Result<(), RuleError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        if self.auto_backup && self.path.exists() {
            let backup_path = self.path.with_extension("toml.backup");
            fs::copy(&self.path, backup_path)?;
        }

        let toml = toml::to_string_pretty(storage)?;
        fs::write(&self.path, toml)?;

        Ok(())
    }

    /// Create a new rule
    ///
    /// The rule text is stored in canonical form.
    ///
    /// # Errors
    ///
    /// Returns `RuleError` if:
    /// - The rule name is invalid
    /// - The rule text does not parse
    /// - A rule with the same name already exists
    /// - The storage file cannot be saved
    pub fn create(&self, name: &str, description: String, rule: &str) -> Result<StoredRule, RuleError> {
        let mut storage = self.load()?;

        validate_rule_name(name).map_err(|e| RuleError::InvalidName(name.to_string(), e))?;
        let canonical = parse_list(rule)?.to_string();
        let stored = StoredRule::new(name.to_string(), description, canonical);

        storage.add(stored.clone())?;
        self.save(&storage)?;

        Ok(stored)
    }

    /// # Errors
    /// Returns `RuleError::NotFound` if no rule has that name.
    pub fn get(&self, name: &str) -> Result<StoredRule, RuleError> {
        let storage = self.load()?;
        storage
            .get(name)
            .cloned()
            .ok_or_else(|| RuleError::NotFound(name.to_string()))
    }

    /// Replace an existing rule
    ///
    /// # Errors
    ///
    /// Returns `RuleError` if the rule is not found, does not validate, or
    /// the storage file cannot be saved.
    pub fn update(&self, rule: StoredRule) -> Result<(), RuleError> {
        let mut storage = self.load()?;
        storage.update(rule)?;
        self.save(&storage)
    }

    /// # Errors
    /// Returns `RuleError` if the rule is not found or the storage file cannot
    /// be saved.
    pub fn delete(&self, name: &str) -> Result<StoredRule, RuleError> {
        let mut storage = self.load()?;

        let rule = storage
            .remove(name)
            .ok_or_else(|| RuleError::NotFound(name.to_string()))?;

        self.save(&storage)?;

        Ok(rule)
    }

    /// Rename a rule, keeping its position and statistics
    ///
    /// # Errors
    ///
    /// Returns `RuleError` if:
    /// - The old rule is not found
    /// - The new name is invalid
    /// - A rule with the new name already exists
    /// - The storage file cannot be saved
    pub fn rename(&self, old_name: &str, new_name: String) -> Result<(), RuleError> {
        let mut storage = self.load()?;

        validate_rule_name(&new_name).map_err(|e| RuleError::InvalidName(new_name.clone(), e))?;

        if storage.contains(&new_name) {
            return Err(RuleError::AlreadyExists(new_name));
        }

        let rule = storage
            .get_mut(old_name)
            .ok_or_else(|| RuleError::NotFound(old_name.to_string()))?;
        rule.name = new_name;

        self.save(&storage)
    }

    /// # Errors
    /// Returns `RuleError` if the storage file cannot be loaded.
    pub fn list(&self) -> Result<Vec<StoredRule>, RuleError> {
        Ok(self.load()?.rules)
    }

    /// The whole storage, for statistics
    ///
    /// # Errors
    /// Returns `RuleError` if the storage file cannot be loaded.
    pub fn storage(&self) -> Result<RuleStorage, RuleError> {
        self.load()
    }

    /// Increment the use count and update `last_used`
    ///
    /// # Errors
    /// Returns `RuleError` if the rule is not found or the storage file cannot
    /// be saved.
    pub fn record_use(&self, name: &str) -> Result<(), RuleError> {
        let mut storage = self.load()?;

        storage
            .get_mut(name)
            .ok_or_else(|| RuleError::NotFound(name.to_string()))?
            .record_use();

        self.save(&storage)
    }

    /// All stored rules as a parsed, named rule set
    ///
    /// # Errors
    /// Returns `RuleError` if the storage cannot be loaded or a stored rule
    /// no longer parses.
    pub fn load_rule_set(&self) -> Result<RuleSet, RuleError> {
        self.rule_set(&[])
    }

    /// The named rules, in the order given, as a rule set
    ///
    /// Selects every stored rule, in storage order, when `names` is empty.
    ///
    /// # Errors
    /// Returns `RuleError::NotFound` for a missing name, or the parse error
    /// of a stored rule.
    pub fn rule_set(&self, names: &[String]) -> Result<RuleSet, RuleError> {
        let storage = self.load()?;

        let selected: Vec<&StoredRule> = if names.is_empty() {
            storage.rules.iter().collect()
        } else {
            names
                .iter()
                .map(|name| storage.get(name).ok_or_else(|| RuleError::NotFound(name.clone())))
                .collect::<Result<_, _>>()?
        };

        selected
            .into_iter()
            .map(|r| {
                r.parsed().map(|list| {
                    Rule::new(Some(r.name.clone()), list).with_description(r.description.clone())
                })
            })
            .collect()
    }

    /// Write rules in the line format
    ///
    /// Exports every rule when `names` is empty. Descriptions are written as
    /// `#` comment lines above their rule.
    ///
    /// # Errors
    /// Returns `RuleError` if a named rule is missing or the file cannot be
    /// written.
    pub fn export(&self, export_path: &Path, names: &[String]) -> Result<usize, RuleError> {
        let set = self.rule_set(names)?;

        if let Some(parent) = export_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(export_path, set.to_lines())?;

        Ok(set.len())
    }

    /// Read rules in the line format and add them to the storage
    ///
    /// Unnamed rules get generated names `rule-1`, `rule-2`, ... skipping
    /// names already in use. Comment lines directly above a rule become its
    /// description. Nothing is saved unless every line parses.
    ///
    /// # Arguments
    /// * `overwrite` - replace existing rules with the same name
    /// * `skip_existing` - skip rules that already exist (when not overwriting)
    ///
    /// # Returns
    /// A tuple of (`imported_count`, `skipped_count`)
    ///
    /// # Errors
    /// Returns `RuleError` if the file cannot be read, a line does not parse,
    /// a name collides and neither flag is set, or the storage cannot be saved.
    pub fn import(
        &self,
        import_path: &Path,
        overwrite: bool,
        skip_existing: bool,
    ) -> Result<(usize, usize), RuleError> {
        let mut storage = self.load()?;

        let contents = fs::read_to_string(import_path)?;
        let set = RuleSet::parse_lines(&contents)?;

        let mut imported = 0;
        let mut skipped = 0;
        let mut counter = 0;

        for rule in &set {
            let name = match &rule.name {
                Some(name) => name.clone(),
                None => loop {
                    counter += 1;
                    let candidate = format!("rule-{counter}");
                    if !storage.contains(&candidate) {
                        break candidate;
                    }
                },
            };
            let stored = StoredRule::new(
                name.clone(),
                rule.description.clone(),
                rule.list.to_string(),
            );

            if storage.contains(&name) {
                if overwrite {
                    storage.update(stored)?;
                    imported += 1;
                } else if skip_existing {
                    skipped += 1;
                } else {
                    return Err(RuleError::AlreadyExists(name));
                }
            } else {
                storage.add(stored)?;
                imported += 1;
            }
        }

        self.save(&storage)?;

        Ok((imported, skipped))
    }
}
