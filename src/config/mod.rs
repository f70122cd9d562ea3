//! Configuration for mailmatch
//!
//! Stored as TOML in the user's config directory
//! (`~/.config/mailmatch/config.toml` on Linux). Any key can be overridden
//! with a `MAILMATCH_<KEY>` environment variable.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::quicksearch::SearchMode;

/// Keys accepted by [`MailmatchConfig::get_value`] and
/// [`MailmatchConfig::set_value`]
pub const KEYS: &[&str] = &[
    "rules_path",
    "exec_timeout_secs",
    "quicksearch_mode",
    "parallel",
    "quiet",
];

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct MailmatchConfig {
    /// Rules file; the platform default when unset
    #[serde(default)]
    pub rules_path: Option<PathBuf>,

    /// Limit for `X` commands in seconds; unset waits forever
    #[serde(default)]
    pub exec_timeout_secs: Option<u64>,

    /// Mode used by `search` when none is given
    #[serde(default)]
    pub quicksearch_mode: SearchMode,

    /// Evaluate message batches on all cores
    #[serde(default)]
    pub parallel: bool,

    /// Suppress informational output by default
    #[serde(default)]
    pub quiet: bool,
}

impl MailmatchConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("mailmatch").join("config.toml"))
    }

    /// Load configuration from the default location, creating it if missing
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it is missing
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save_to(path)?;
        }

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .add_source(Environment::with_prefix("MAILMATCH").try_parsing(true))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Timeout for `X` commands
    #[must_use]
    pub fn exec_timeout(&self) -> Option<Duration> {
        self.exec_timeout_secs.map(Duration::from_secs)
    }

    /// Current value of `key` as text; unset options print as `none`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` for an unknown key.
    pub fn get_value(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "rules_path" => self
                .rules_path
                .as_ref()
                .map_or_else(|| "none".to_string(), |p| p.display().to_string()),
            "exec_timeout_secs" => self
                .exec_timeout_secs
                .map_or_else(|| "none".to_string(), |s| s.to_string()),
            "quicksearch_mode" => self.quicksearch_mode.to_string(),
            "parallel" => self.parallel.to_string(),
            "quiet" => self.quiet.to_string(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set `key` from text; `none` or an empty value clears optional keys
    ///
    /// Does not save.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown key or a value of the wrong type.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let unset = value.is_empty() || value.eq_ignore_ascii_case("none");

        match key {
            "rules_path" => {
                self.rules_path = if unset { None } else { Some(PathBuf::from(value)) };
            }
            "exec_timeout_secs" => {
                self.exec_timeout_secs = if unset {
                    None
                } else {
                    Some(value.parse().map_err(|_| invalid_value(key, value, "a number of seconds"))?)
                };
            }
            "quicksearch_mode" => {
                self.quicksearch_mode = value.parse().map_err(ConfigError::Message)?;
            }
            "parallel" => {
                self.parallel = value.parse().map_err(|_| invalid_value(key, value, "'true' or 'false'"))?;
            }
            "quiet" => {
                self.quiet = value.parse().map_err(|_| invalid_value(key, value, "'true' or 'false'"))?;
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::NotFound(format!(
        "Unknown configuration key: '{key}'. Available keys: {}",
        KEYS.join(", ")
    ))
}

fn invalid_value(key: &str, value: &str, expected: &str) -> ConfigError {
    ConfigError::Message(format!("Invalid value for {key}: '{value}'. Use {expected}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = MailmatchConfig::default();
        assert!(config.rules_path.is_none());
        assert!(config.exec_timeout().is_none());
        assert_eq!(config.quicksearch_mode, SearchMode::Extended);
        assert!(!config.parallel);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = MailmatchConfig::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.quicksearch_mode, SearchMode::Extended);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = MailmatchConfig {
            rules_path: Some(PathBuf::from("/srv/mail/rules.toml")),
            exec_timeout_secs: Some(5),
            quicksearch_mode: SearchMode::From,
            parallel: true,
            quiet: false,
        };
        config.save_to(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("quicksearch_mode = \"from\""));

        let loaded = MailmatchConfig::load_from(&path).unwrap();
        assert_eq!(loaded.rules_path, config.rules_path);
        assert_eq!(loaded.exec_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(loaded.quicksearch_mode, SearchMode::From);
        assert!(loaded.parallel);
    }

    #[test]
    fn test_set_and_get_values() {
        let mut config = MailmatchConfig::default();

        config.set_value("exec_timeout_secs", "30").unwrap();
        assert_eq!(config.get_value("exec_timeout_secs").unwrap(), "30");
        config.set_value("exec_timeout_secs", "none").unwrap();
        assert_eq!(config.exec_timeout_secs, None);

        config.set_value("quicksearch_mode", "subject").unwrap();
        assert_eq!(config.get_value("quicksearch_mode").unwrap(), "subject");

        config.set_value("quiet", "true").unwrap();
        assert!(config.quiet);

        assert_eq!(config.get_value("rules_path").unwrap(), "none");
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut config = MailmatchConfig::default();
        assert!(config.set_value("parallel", "sometimes").is_err());
        assert!(config.set_value("exec_timeout_secs", "-1").is_err());
        assert!(config.set_value("quicksearch_mode", "body").is_err());
        assert!(matches!(
            config.set_value("colour", "red"),
            Err(ConfigError::NotFound(_))
        ));
        assert!(config.get_value("colour").is_err());
    }
}
