use crate::cli::core::{usage_error, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{ArgCompletion, CommandEntry};
use crate::core::services::QueryService;
use crate::domain::{categories_for, TransactionKind};

const TYPE_USAGE: &str = "type [income|expense|toggle]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "type",
            "Show or switch the type used by `add`",
            TYPE_USAGE,
            cmd_type,
        )
        .completes(ArgCompletion::EntryType),
        CommandEntry::new(
            "categories",
            "List categories for the current type",
            "categories",
            cmd_categories,
        ),
    ]
}

fn cmd_type(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {}
        [value] if value.eq_ignore_ascii_case("toggle") => {
            context.entry_type = context.entry_type.toggled();
        }
        [value] => {
            context.entry_type = value.parse::<TransactionKind>()?;
        }
        _ => return Err(usage_error(TYPE_USAGE)),
    }
    io::print_info(format!(
        "Entry type: {} ({})",
        context.entry_type.label(),
        context.entry_type
    ));
    Ok(())
}

fn cmd_categories(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output_section(format!("Categories ({})", context.entry_type.label()));
    for (index, name) in categories_for(context.entry_type).iter().enumerate() {
        io::print_info(format!("  {:>2}. {}", index + 1, name));
    }
    let in_use = QueryService::categories_in_use(context.store.transactions());
    if !in_use.is_empty() {
        io::print_hint(format!("In use for filtering: {}", in_use.join(", ")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::core::test_support::harness;
    use crate::domain::TransactionKind;

    #[test]
    fn type_switches_and_toggles() {
        let mut harness = harness();
        assert_eq!(harness.context.entry_type, TransactionKind::Income);
        harness.run(&["type gasto"]);
        assert_eq!(harness.context.entry_type, TransactionKind::Expense);
        harness.run(&["type toggle"]);
        assert_eq!(harness.context.entry_type, TransactionKind::Income);
        harness.run(&["type transfer"]);
        assert_eq!(harness.context.entry_type, TransactionKind::Income);
    }
}
