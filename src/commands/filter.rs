//! Filter command - print the messages that match a rule

use crate::cli::MessageArgs;
use crate::config::MailmatchConfig;
use crate::matcher::{Evaluator, PredicateList, ShellRunner, filter_messages, parse_list};
use crate::output;
use crate::rules::{RuleManager, get_rules_path};
use crate::MailmatchError;

type Result<T> = std::result::Result<T, MailmatchError>;

/// Execute the filter command
///
/// Applies either the rule given inline or a saved rule; using a saved rule
/// counts towards its usage statistics. Returns the number of matches.
///
/// # Errors
///
/// Returns `MailmatchError` if the rule does not parse, the saved rule does
/// not exist, or the message file cannot be loaded.
pub fn execute(
    config: &MailmatchConfig,
    rule: Option<&str>,
    rule_name: Option<&str>,
    count: bool,
    messages: &MessageArgs,
    quiet: bool,
) -> Result<usize> {
    let list = resolve_rule(config, rule, rule_name)?;
    let all = super::load(messages)?;

    let runner = ShellRunner;
    let evaluator = Evaluator::new(&runner).with_timeout(config.exec_timeout());
    let matched = filter_messages(&evaluator, &list, &all, messages.parallel || config.parallel);

    if list.has_error() {
        eprintln!("warning: rule contains an invalid regex; those conditions never match");
    }

    if count {
        println!("{}", matched.len());
    } else {
        for message in &matched {
            println!("{}", output::message_line(message, quiet));
        }
        if !quiet {
            println!();
            println!("{} of {} matched", matched.len(), output::plural(all.len(), "message"));
        }
    }

    Ok(matched.len())
}

fn resolve_rule(
    config: &MailmatchConfig,
    rule: Option<&str>,
    rule_name: Option<&str>,
) -> Result<PredicateList> {
    match (rule, rule_name) {
        (_, Some(name)) => {
            let manager = RuleManager::new(get_rules_path(config)?);
            let list = manager.get(name)?.parsed()?;
            manager.record_use(name)?;
            Ok(list)
        }
        (Some(rule), None) => Ok(parse_list(rule)?),
        (None, None) => Err(MailmatchError::InvalidInput(
            "Give a rule or --rule-name".into(),
        )),
    }
}
