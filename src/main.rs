//! mailmatch CLI entry point
//!
//! # Usage
//!
//! ```bash
//! # Check a rule and print its canonical form
//! mailmatch check 's invoice & ~D'
//!
//! # Print messages from a file that match a rule
//! mailmatch filter 'f /@example\.com$/ | sg 50' --messages inbox.json
//!
//! # Save a rule and apply it by name
//! mailmatch rules add old-unread 'U & ag 30' -d "Unread for a month"
//! mailmatch filter -r old-unread --messages inbox.csv
//!
//! # Label messages with every saved rule they match
//! mailmatch classify --messages inbox.json
//!
//! # Quick search, as in a search bar
//! mailmatch search 'subject report & unread' --messages inbox.json
//! mailmatch search boss --mode from --messages inbox.json
//!
//! # Quiet mode (only output results)
//! mailmatch -q filter U --messages inbox.json
//! ```
//!
//! # Configuration
//!
//! Stored in the user's config directory (`~/.config/mailmatch/config.toml` on
//! Linux) and created with defaults on first run. Diagnostics go to stderr
//! and are filtered by `MAILMATCH_LOG`.

use std::process::ExitCode;

use colored::Colorize;
use mailmatch::{
    MailmatchError,
    cli::{Cli, Commands},
    commands,
    config::MailmatchConfig,
    logging,
};

type Result<T> = std::result::Result<T, MailmatchError>;

/// Dispatch to the command handler
///
/// # Errors
///
/// Returns `MailmatchError` if configuration loading fails or any command
/// handler returns an error.
fn run(cli: &Cli) -> Result<ExitCode> {
    let config = MailmatchConfig::load()?;
    let quiet = cli.quiet || config.quiet;

    match &cli.command {
        Commands::Check { rule } => {
            if !commands::check(rule, quiet)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Filter {
            rule,
            rule_name,
            count,
            messages,
        } => {
            commands::filter(
                &config,
                rule.as_deref(),
                rule_name.as_deref(),
                *count,
                messages,
                quiet,
            )?;
        }
        Commands::Classify { first, messages } => {
            commands::classify(&config, *first, messages, quiet)?;
        }
        Commands::Search {
            query,
            mode,
            messages,
        } => {
            commands::search(&config, query, mode.map(Into::into), messages, quiet)?;
        }
        Commands::Rules { command } => {
            commands::rules(&config, command, quiet)?;
        }
        Commands::Config { command } => {
            commands::config(config, command, quiet)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init_logging(if cli.verbose { "debug" } else { "warn" });

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
