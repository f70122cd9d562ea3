//! Output formatting for CLI display

use colored::Colorize;

use crate::matcher::{Criterion, ParseError, Predicate};
use crate::message::MessageInfo;
use crate::rules::StoredRule;

/// One matching message
///
/// Quiet output is the bare summary so it can be piped; otherwise the
/// subject is highlighted and the sender appended.
#[must_use]
pub fn message_line(message: &MessageInfo, quiet: bool) -> String {
    if quiet {
        return message.summary();
    }
    let id = message.message_id.as_deref().unwrap_or("-");
    let subject = message.subject.as_deref().unwrap_or("(no subject)");
    match message.from.as_deref() {
        Some(from) => format!("  {}  {}  {}", id.dimmed(), subject.bold(), from.cyan()),
        None => format!("  {}  {}", id.dimmed(), subject.bold()),
    }
}

/// A syntax error with a caret under the offending position
#[must_use]
pub fn syntax_error(input: &str, err: &ParseError) -> String {
    let mut out = format!("{} {err}", "error:".red().bold());
    if let Some(position) = err.position() {
        let column = input
            .get(..position)
            .map_or(position, |prefix| prefix.chars().count());
        out.push_str(&format!("\n  {input}\n  {}{}", " ".repeat(column), "^".red()));
    }
    out
}

/// Readable name of a condition, e.g. `not unread`
#[must_use]
pub fn condition_name(predicate: &Predicate) -> String {
    let name = match predicate.criterion() {
        Criterion::Header(header) => format!("header {header}"),
        criterion => criterion.name().to_string(),
    };
    if predicate.is_negated() {
        format!("not {name}")
    } else {
        name
    }
}

/// A stored rule in list form
#[must_use]
pub fn rule_line(rule: &StoredRule, width: usize, quiet: bool) -> String {
    if quiet {
        return rule.name.clone();
    }
    let description = if rule.description.is_empty() {
        "(no description)".dimmed().to_string()
    } else {
        rule.description.lines().next().unwrap_or_default().to_string()
    };
    format!(
        "  {:<width$}  {}\n  {:<width$}  {}",
        rule.name.green(),
        description,
        "",
        rule.rule
    )
}

/// Singular or plural noun for a count
#[must_use]
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::parse_list;

    #[test]
    fn test_quiet_message_line_is_summary() {
        let msg = MessageInfo {
            message_id: Some("<a@b>".into()),
            subject: Some("Hi".into()),
            ..Default::default()
        };
        assert_eq!(message_line(&msg, true), "<a@b>  Hi");
    }

    #[test]
    fn test_syntax_error_caret() {
        colored::control::set_override(false);
        let input = "U & N | T";
        let err = parse_list(input).unwrap_err();
        let text = syntax_error(input, &err);
        assert!(text.ends_with("\n  U & N | T\n        ^"));
    }

    #[test]
    fn test_condition_names() {
        let list = parse_list(r#"~U & a & H X-Spam "yes" & ag 3"#).unwrap();
        let names: Vec<String> = list.predicates().iter().map(condition_name).collect();
        assert_eq!(names, ["not unread", "all", "header X-Spam", "age_greater"]);
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "rule"), "1 rule");
        assert_eq!(plural(3, "rule"), "3 rules");
    }
}
