//! Classify command - label messages with the saved rules they match

use rayon::prelude::*;

use crate::cli::MessageArgs;
use crate::config::MailmatchConfig;
use crate::matcher::{Evaluator, ShellRunner};
use crate::message::MessageInfo;
use crate::output;
use crate::rules::{Rule, RuleManager, RuleSet, get_rules_path};
use crate::MailmatchError;

type Result<T> = std::result::Result<T, MailmatchError>;

/// Execute the classify command
///
/// Every saved rule is tried against every message in storage order. With
/// `first` only the first matching rule is reported, as a filter chain would
/// apply it. Returns the number of messages that matched at least one rule.
///
/// # Errors
///
/// Returns `MailmatchError` if the rules cannot be loaded or a stored rule no
/// longer parses, or if the message file cannot be loaded.
pub fn execute(
    config: &MailmatchConfig,
    first: bool,
    messages: &MessageArgs,
    quiet: bool,
) -> Result<usize> {
    let manager = RuleManager::new(get_rules_path(config)?);
    let set = manager.load_rule_set()?;
    if set.is_empty() {
        if !quiet {
            println!("No saved rules.");
            println!("Create one with: mailmatch rules add <name> <rule>");
        }
        return Ok(0);
    }

    let all = super::load(messages)?;
    let runner = ShellRunner;
    let evaluator = Evaluator::new(&runner).with_timeout(config.exec_timeout());

    let labels: Vec<Vec<&Rule>> = if messages.parallel || config.parallel {
        all.par_iter()
            .map(|m| labels_for(&set, &evaluator, m, first))
            .collect()
    } else {
        all.iter()
            .map(|m| labels_for(&set, &evaluator, m, first))
            .collect()
    };

    let mut matched = 0;
    for (message, rules) in all.iter().zip(&labels) {
        if rules.is_empty() {
            continue;
        }
        matched += 1;
        let names: Vec<&str> = rules
            .iter()
            .map(|r| r.name.as_deref().unwrap_or("-"))
            .collect();
        println!("{}  [{}]", output::message_line(message, quiet), names.join(", "));
    }

    if !quiet {
        println!();
        println!(
            "{} of {} matched a rule",
            matched,
            output::plural(all.len(), "message")
        );
    }

    Ok(matched)
}

fn labels_for<'s>(
    set: &'s RuleSet,
    evaluator: &Evaluator<'_>,
    message: &MessageInfo,
    first: bool,
) -> Vec<&'s Rule> {
    if first {
        set.first_match(evaluator, message).into_iter().collect()
    } else {
        set.matching(evaluator, message)
    }
}
