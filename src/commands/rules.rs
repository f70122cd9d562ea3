//! Rule management command implementation
//!
//! - List all rules
//! - Show one rule in detail
//! - Add, edit, remove and rename rules
//! - Export and import rules in the one-rule-per-line format
//! - Show usage statistics

use std::io::Write;
use std::path::Path;

use crate::cli::RulesCommands;
use crate::config::MailmatchConfig;
use crate::matcher::parse_list;
use crate::output;
use crate::rules::{RuleManager, get_rules_path};
use crate::MailmatchError;

type Result<T> = std::result::Result<T, MailmatchError>;

/// Execute a rule management command
///
/// # Errors
///
/// Returns `MailmatchError` if:
/// - Rule storage cannot be accessed
/// - A rule does not parse or has an invalid name
/// - Any rule operation fails
pub fn execute(config: &MailmatchConfig, command: &RulesCommands, quiet: bool) -> Result<()> {
    let manager = RuleManager::new(get_rules_path(config)?);

    match command {
        RulesCommands::List => list_rules(&manager, quiet),
        RulesCommands::Show { name } => show_rule(&manager, name, quiet),
        RulesCommands::Add {
            name,
            rule,
            description,
        } => {
            let stored = manager.create(name, description.clone().unwrap_or_default(), rule)?;
            if !quiet {
                println!("Rule '{}' saved as: {}", stored.name, stored.rule);
            }
            Ok(())
        }
        RulesCommands::Edit {
            name,
            rule,
            description,
        } => edit_rule(&manager, name, rule.as_deref(), description.as_deref(), quiet),
        RulesCommands::Remove { name, force } => remove_rule(&manager, name, *force, quiet),
        RulesCommands::Rename { old_name, new_name } => {
            manager.rename(old_name, new_name.clone())?;
            if !quiet {
                println!("Rule '{old_name}' renamed to '{new_name}'");
            }
            Ok(())
        }
        RulesCommands::Export { rules, output } => export_rules(&manager, rules, output.as_deref(), quiet),
        RulesCommands::Import {
            path,
            overwrite,
            skip_existing,
        } => import_rules(&manager, path, *overwrite, *skip_existing, quiet),
        RulesCommands::Stats => show_stats(&manager, quiet),
    }
}

fn list_rules(manager: &RuleManager, quiet: bool) -> Result<()> {
    let rules = manager.list()?;

    if rules.is_empty() {
        if !quiet {
            println!("No saved rules.");
            println!("Create one with: mailmatch rules add <name> <rule>");
        }
        return Ok(());
    }

    if !quiet {
        println!("Saved Rules:");
        println!();
    }

    let width = rules.iter().map(|r| r.name.len()).max().unwrap_or(0).max(4);
    for rule in &rules {
        println!("{}", output::rule_line(rule, width, quiet));
    }

    Ok(())
}

fn show_rule(manager: &RuleManager, name: &str, quiet: bool) -> Result<()> {
    let rule = manager.get(name)?;

    if quiet {
        println!("{}", rule.rule);
    } else {
        print!("{rule}");
    }

    Ok(())
}

fn edit_rule(
    manager: &RuleManager,
    name: &str,
    rule: Option<&str>,
    description: Option<&str>,
    quiet: bool,
) -> Result<()> {
    let mut stored = manager.get(name)?;

    if let Some(rule) = rule {
        stored.rule = parse_list(rule)?.to_string();
    }
    if let Some(description) = description {
        stored.description = description.to_string();
    }
    manager.update(stored.clone())?;

    if !quiet {
        println!("Rule '{name}' updated: {}", stored.rule);
    }
    Ok(())
}

fn remove_rule(manager: &RuleManager, name: &str, force: bool, quiet: bool) -> Result<()> {
    let _ = manager.get(name)?;

    if !force && !quiet {
        print!("Delete rule '{name}'? (y/N): ");
        std::io::stdout().flush()?;

        let mut response = String::new();
        std::io::stdin().read_line(&mut response)?;

        let response = response.trim().to_lowercase();
        if response != "y" && response != "yes" {
            println!("Cancelled");
            return Ok(());
        }
    }

    manager.delete(name)?;

    if !quiet {
        println!("Rule '{name}' deleted");
    }

    Ok(())
}

fn export_rules(manager: &RuleManager, names: &[String], destination: Option<&Path>, quiet: bool) -> Result<()> {
    if let Some(output_path) = destination {
        let count = manager.export(output_path, names)?;
        if !quiet {
            println!(
                "Exported {} to {}",
                output::plural(count, "rule"),
                output_path.display()
            );
        }
        return Ok(());
    }

    print!("{}", manager.rule_set(names)?.to_lines());

    Ok(())
}

fn import_rules(
    manager: &RuleManager,
    path: &Path,
    overwrite: bool,
    skip_existing: bool,
    quiet: bool,
) -> Result<()> {
    let (imported, skipped) = manager.import(path, overwrite, skip_existing)?;

    if !quiet {
        println!("Imported {}", output::plural(imported, "rule"));
        if skipped > 0 {
            println!("Skipped {} already present", output::plural(skipped, "rule"));
        }
    }

    Ok(())
}

fn show_stats(manager: &RuleManager, quiet: bool) -> Result<()> {
    let storage = manager.storage()?;

    let total_uses: u64 = storage.rules.iter().map(|r| u64::from(r.use_count)).sum();
    if quiet {
        println!("{} {total_uses}", storage.rules.len());
        return Ok(());
    }

    println!("Rules: {}", storage.rules.len());
    println!("Total uses: {total_uses}");
    if storage.rules.is_empty() {
        return Ok(());
    }

    println!();
    println!("Most used:");
    for rule in storage.most_used().into_iter().take(5) {
        println!("  {:<24} {}", rule.name, rule.use_count);
    }

    println!();
    println!("Recently used:");
    for rule in storage.recently_used().into_iter().take(5) {
        println!("  {:<24} {}", rule.name, rule.last_used.format("%Y-%m-%d %H:%M:%S"));
    }

    Ok(())
}
