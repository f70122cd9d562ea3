//! Check command - validate a rule and print its canonical form

use crate::matcher::parse_list;
use crate::output;
use crate::MailmatchError;

type Result<T> = std::result::Result<T, MailmatchError>;

/// Execute the check command
///
/// Returns whether the rule is valid. Syntax errors are reported on stderr
/// with a marker under the failing position.
///
/// # Errors
/// Never fails at present; the `Result` matches the other commands.
pub fn execute(rule: &str, quiet: bool) -> Result<bool> {
    match parse_list(rule) {
        Ok(list) => {
            if quiet {
                println!("{list}");
            } else {
                let policy = if list.combine_with_and() { "all" } else { "any" };
                println!("{list}");
                println!(
                    "  {} ({policy} must match)",
                    output::plural(list.len(), "condition")
                );
                for predicate in list.predicates() {
                    println!("    {}", output::condition_name(predicate));
                }
            }
            Ok(true)
        }
        Err(e) => {
            eprintln!("{}", output::syntax_error(rule, &e));
            Ok(false)
        }
    }
}
