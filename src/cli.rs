//! Command-line interface definitions and parsing
//!
//! # Commands
//!
//! - **check**: parse a rule and print its canonical form
//! - **filter**: print the messages of a file that match a rule
//! - **classify**: label messages with the saved rules they match
//! - **search**: run a quick search over a message file
//! - **rules**: manage named rules (list, show, add, remove, rename, export, import, stats)
//! - **config**: read and change configuration values
//!
//! # Examples
//!
//! ```no_run
//! use mailmatch::cli::{Cli, Commands};
//!
//! let cli = Cli::parse_args();
//! if let Commands::Check { rule } = &cli.command {
//!     println!("checking {rule}");
//! }
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::message::MessageFormat;
use crate::quicksearch::SearchMode;

/// Quick-search mode as accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchModeArg {
    /// Case-insensitive substring of the subject
    Subject,
    /// Case-insensitive substring of the sender
    From,
    /// Case-insensitive substring of the recipients
    To,
    /// Full rule language with aliases
    Extended,
}

impl From<SearchModeArg> for SearchMode {
    fn from(mode: SearchModeArg) -> Self {
        match mode {
            SearchModeArg::Subject => Self::Subject,
            SearchModeArg::From => Self::From,
            SearchModeArg::To => Self::To,
            SearchModeArg::Extended => Self::Extended,
        }
    }
}

/// Message file format as accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    /// JSON array of message objects
    Json,
    /// Comma-separated values with a header row
    Csv,
    /// Tab-separated values with a header row
    Tsv,
}

impl From<FormatArg> for MessageFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => Self::Json,
            FormatArg::Csv => Self::Csv(b','),
            FormatArg::Tsv => Self::Csv(b'\t'),
        }
    }
}

/// Shared arguments for commands that read a message file
#[derive(Args, Debug, Clone)]
pub struct MessageArgs {
    /// File holding the messages to test
    #[arg(short = 'm', long = "messages", value_name = "FILE")]
    pub messages: PathBuf,

    /// File format (guessed from the extension if omitted)
    #[arg(long = "format", value_enum)]
    pub format: Option<FormatArg>,

    /// Evaluate messages on all cores (overrides config)
    #[arg(long = "parallel")]
    pub parallel: bool,
}

impl MessageArgs {
    /// The explicit format, or one guessed from the file name
    #[must_use]
    pub fn message_format(&self) -> MessageFormat {
        self.format
            .map_or_else(|| MessageFormat::from_path(&self.messages), Into::into)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.messages
    }
}

/// Configuration management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key=value (e.g., exec_timeout_secs=10)
        #[arg(value_name = "KEY=VALUE")]
        setting: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key to retrieve (e.g., quicksearch_mode)
        #[arg(value_name = "KEY")]
        key: String,
    },
}

/// Rule management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum RulesCommands {
    /// List all saved rules
    #[command(visible_alias = "ls")]
    List,

    /// Show detailed information about a rule
    Show {
        /// Name of the rule to show
        name: String,
    },

    /// Save a new rule
    Add {
        /// Name of the rule
        name: String,

        /// The rule, e.g. 's "invoice" & ~D'
        rule: String,

        /// Description of the rule
        #[arg(short = 'd', long = "description")]
        description: Option<String>,
    },

    /// Change the text or description of a rule
    Edit {
        /// Name of the rule to edit
        name: String,

        /// The new rule (keeps the current one if omitted)
        #[arg(required_unless_present = "description")]
        rule: Option<String>,

        /// The new description
        #[arg(short = 'd', long = "description")]
        description: Option<String>,
    },

    /// Delete a rule
    #[command(visible_alias = "rm")]
    Remove {
        /// Name of the rule to delete
        name: String,

        /// Skip confirmation prompt
        #[arg(short = 'f', long = "force")]
        force: bool,
    },

    /// Rename a rule
    #[command(visible_alias = "mv")]
    Rename {
        /// Current name of the rule
        old_name: String,

        /// New name for the rule
        new_name: String,
    },

    /// Export rules in the one-rule-per-line format
    Export {
        /// Names of specific rules to export (exports all if not specified)
        #[arg(value_name = "RULE")]
        rules: Vec<String>,

        /// Output file path (prints to stdout if not specified)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },

    /// Import rules from a one-rule-per-line file
    Import {
        /// Path to the file to import from
        path: PathBuf,

        /// Overwrite existing rules with the same name
        #[arg(long = "overwrite", conflicts_with = "skip_existing")]
        overwrite: bool,

        /// Skip rules that already exist
        #[arg(long = "skip-existing", conflicts_with = "overwrite")]
        skip_existing: bool,
    },

    /// Show rule usage statistics
    Stats,
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "mailmatch")]
#[command(about = "Match mail messages against filter rules", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Log debug diagnostics to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Parse a rule and print its canonical form
    #[command(visible_alias = "c")]
    Check {
        /// The rule to check
        rule: String,
    },

    /// Print the messages that match a rule
    #[command(visible_alias = "f")]
    Filter {
        /// The rule to apply (omit when using --rule-name)
        #[arg(value_name = "RULE", required_unless_present = "rule_name")]
        rule: Option<String>,

        /// Apply a saved rule instead
        #[arg(short = 'r', long = "rule-name", value_name = "NAME", conflicts_with = "rule")]
        rule_name: Option<String>,

        /// Print only the number of matches
        #[arg(long = "count")]
        count: bool,

        #[command(flatten)]
        messages: MessageArgs,
    },

    /// Label each message with the saved rules it matches
    Classify {
        /// Report only the first matching rule per message
        #[arg(long = "first")]
        first: bool,

        #[command(flatten)]
        messages: MessageArgs,
    },

    /// Quick search over a message file
    #[command(visible_alias = "s")]
    Search {
        /// The query; an empty query matches everything
        #[arg(value_name = "QUERY", default_value = "")]
        query: String,

        /// Search mode (defaults to the configured mode)
        #[arg(long = "mode", value_enum)]
        mode: Option<SearchModeArg>,

        #[command(flatten)]
        messages: MessageArgs,
    },

    /// Manage saved rules
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
