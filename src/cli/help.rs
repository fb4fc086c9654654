use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{ArgCompletion, CommandEntry, CommandRegistry};
use crate::config::CONFIG_KEYS;
use crate::currency::Locale;
use crate::domain::{categories_for, TransactionKind, EXPENSE_CATEGORIES, INCOME_CATEGORIES};

/// One line per command, grouped, showing the full usage.
pub fn overview_lines(registry: &CommandRegistry) -> Vec<String> {
    let width = registry.names().map(str::len).max().unwrap_or(0);
    let mut lines = Vec::new();
    for (group, entries) in registry.grouped() {
        lines.push(format!("{}:", group.title()));
        for entry in entries {
            lines.push(format!(
                "  {:<width$}  {}",
                entry.name,
                entry.description,
                width = width
            ));
            if let Some(args) = entry.argument_hint() {
                lines.push(format!("  {:<width$}    {} {}", "", entry.name, args, width = width));
            }
        }
    }
    lines
}

pub fn command_lines(entry: &CommandEntry, entry_type: TransactionKind) -> Vec<String> {
    let mut lines = vec![
        format!("  {}", entry.description),
        format!("  Usage: {}", entry.usage),
    ];
    match entry.completion {
        ArgCompletion::AddCategory => lines.push(format!(
            "  Categories ({}): {}",
            entry_type.label(),
            categories_for(entry_type).join(", ")
        )),
        ArgCompletion::FilterFlags | ArgCompletion::Category => {
            lines.push(format!("  Income: {}", INCOME_CATEGORIES.join(", ")));
            lines.push(format!("  Expense: {}", EXPENSE_CATEGORIES.join(", ")));
        }
        ArgCompletion::ConfigKeys => {
            lines.push(format!("  Keys: {}", CONFIG_KEYS.join(", ")));
            lines.push(format!("  Locales: {}", Locale::SUPPORTED.join(", ")));
        }
        ArgCompletion::EntryType | ArgCompletion::CommandName | ArgCompletion::Nothing => {}
    }
    lines
}

pub fn print_overview(registry: &CommandRegistry) {
    output_section("Available commands");
    for line in overview_lines(registry) {
        io::print_info(line);
    }
    io::print_hint("Use `help <command>` for details; Tab completes names and arguments.");
}

pub fn print_command(entry: &CommandEntry, entry_type: TransactionKind) {
    output_section(format!("Help: {}", entry.name));
    for line in command_lines(entry, entry_type) {
        io::print_info(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::core::test_support::harness;

    #[test]
    fn overview_is_grouped_with_usage_lines() {
        let harness = harness();
        let lines = overview_lines(&harness.context.registry);

        let headers: Vec<&str> = lines
            .iter()
            .filter(|line| !line.starts_with(' '))
            .map(String::as_str)
            .collect();
        assert_eq!(
            headers,
            [
                "Entry type:",
                "Transactions:",
                "Reports:",
                "Data files:",
                "Settings:",
                "Shell:"
            ]
        );
        assert!(lines
            .iter()
            .any(|line| line.trim() == "add <amount> <category> <description> [YYYY-MM-DD]"));
        assert!(!lines.iter().any(|line| line.trim() == "list list"));
    }

    #[test]
    fn command_help_lists_accepted_values() {
        let harness = harness();
        let registry = &harness.context.registry;

        let add = registry.get("add").unwrap();
        let lines = command_lines(add, TransactionKind::Expense);
        assert_eq!(lines[1], format!("  Usage: {}", add.usage));
        assert!(lines[2].contains("Alimentación"));
        assert!(!lines[2].contains("Salario"));

        let config = command_lines(registry.get("config").unwrap(), TransactionKind::Income);
        assert!(config.iter().any(|line| line.contains("backup_retention")));
        assert!(config.iter().any(|line| line.contains("en-US")));
    }
}
