use rust_decimal::Decimal;

use crate::cli::core::{
    parse_date, parse_id, positional, usage_error, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::registry::{ArgCompletion, CommandEntry};
use crate::domain::{resolve_category, TransactionDraft};

use super::report::describe_record;

const ADD_USAGE: &str = "add <amount> <category> <description> [YYYY-MM-DD]";
const DELETE_USAGE: &str = "delete <id> [--yes]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add",
            "Record an income or expense using the current type",
            ADD_USAGE,
            cmd_add,
        )
        .completes(ArgCompletion::AddCategory),
        CommandEntry::new(
            "delete",
            "Delete a transaction by id",
            DELETE_USAGE,
            cmd_delete,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 3 {
        return Err(usage_error(ADD_USAGE));
    }
    let kind = context.entry_type;

    // A trailing date is optional; everything between category and date is
    // the description, so quoting is not required.
    let (description_parts, date) = match args[2..].split_last() {
        Some((last, rest)) if !rest.is_empty() && looks_like_date(last) => {
            (rest, parse_date(last)?)
        }
        _ => (&args[2..], context.store.today()),
    };

    let mut draft = TransactionDraft::new(kind)
        .description(description_parts.join(" "))
        .date(date);
    if let Ok(amount) = args[0].replace(',', ".").parse::<Decimal>() {
        draft = draft.amount(amount);
    }
    let category = resolve_category(kind, args[1])
        .map_or_else(|| args[1].to_string(), str::to_string);
    draft = draft.category(category);

    let record = context.store.add(draft)?;
    io::print_success(format!(
        "Added {}",
        describe_record(&record, context.display_format())
    ));
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let positional = positional(args);
    let [raw_id] = positional.as_slice() else {
        return Err(usage_error(DELETE_USAGE));
    };
    let id = parse_id(raw_id)?;
    let Some(record) = context.store.get(id) else {
        io::print_warning(format!("No transaction with id {id}."));
        return Ok(());
    };
    let prompt = format!(
        "Delete {}?",
        describe_record(record, context.display_format())
    );
    if !context.confirm(&prompt, args)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    if let Some(removed) = context.store.delete_by_id(id)? {
        io::print_success(format!("Deleted transaction {}.", removed.id));
    }
    Ok(())
}

fn looks_like_date(value: &str) -> bool {
    value.len() == 10 && value.as_bytes()[4] == b'-' && value.as_bytes()[7] == b'-'
}
