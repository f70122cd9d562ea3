//! Search command - quick search over a message file

use crate::cli::MessageArgs;
use crate::config::MailmatchConfig;
use crate::matcher::{Evaluator, ShellRunner};
use crate::output;
use crate::quicksearch::{QuickSearchState, SearchMode};
use crate::MailmatchError;

type Result<T> = std::result::Result<T, MailmatchError>;

/// Execute the search command
///
/// An extended query that does not parse disables the search, so every
/// message is listed; a note says so unless `quiet` is set.
///
/// # Errors
///
/// Returns `MailmatchError` if the message file cannot be loaded.
pub fn execute(
    config: &MailmatchConfig,
    query: &str,
    mode: Option<SearchMode>,
    messages: &MessageArgs,
    quiet: bool,
) -> Result<usize> {
    let mode = mode.unwrap_or(config.quicksearch_mode);
    let state = QuickSearchState::prepare(query, mode);
    let all = super::load(messages)?;

    if !state.is_active() && !query.trim().is_empty() && !quiet {
        eprintln!(
            "note: '{}' is not a valid {} query, showing all messages",
            state.raw_input(),
            state.mode()
        );
    }

    let runner = ShellRunner;
    let evaluator = Evaluator::new(&runner).with_timeout(config.exec_timeout());
    let found = state.filter(&evaluator, &all, messages.parallel || config.parallel);

    for message in &found {
        println!("{}", output::message_line(message, quiet));
    }
    if !quiet {
        println!();
        println!("{} of {} found", found.len(), output::plural(all.len(), "message"));
    }

    Ok(found.len())
}
