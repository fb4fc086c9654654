use std::path::PathBuf;

use crate::cli::core::{positional, usage_error, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::plain;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use crate::core::services::TransferService;

const EXPORT_USAGE: &str = "export [path]";
const IMPORT_USAGE: &str = "import <path> [--yes]";
const RESTORE_USAGE: &str = "restore <backup> [--yes]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "export",
            "Write all transactions and totals to a JSON file",
            EXPORT_USAGE,
            cmd_export,
        ),
        CommandEntry::new(
            "import",
            "Replace all transactions with the contents of a JSON export",
            IMPORT_USAGE,
            cmd_import,
        ),
        CommandEntry::new(
            "clear",
            "Delete every transaction",
            "clear [--yes]",
            cmd_clear,
        ),
        CommandEntry::new("save", "Persist transactions now", "save", cmd_save),
        CommandEntry::new(
            "backups",
            "List stored snapshot backups",
            "backups",
            cmd_backups,
        ),
        CommandEntry::new(
            "restore",
            "Restore transactions from a snapshot backup",
            RESTORE_USAGE,
            cmd_restore,
        ),
    ]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = match args {
        [] => PathBuf::from(TransferService::export_file_name(context.store.today())),
        [path] => PathBuf::from(path),
        _ => return Err(usage_error(EXPORT_USAGE)),
    };
    let count = TransferService::write_export(
        &path,
        context.store.transactions(),
        context.store.now(),
    )?;
    io::print_success(format!(
        "Exported {} transactions to {}.",
        count,
        path.display()
    ));
    Ok(())
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let positional = positional(args);
    let [path] = positional.as_slice() else {
        return Err(usage_error(IMPORT_USAGE));
    };
    let records = TransferService::read_import(&PathBuf::from(path))?;
    let prompt = format!(
        "Replace {} current transactions with {} imported ones?",
        context.store.len(),
        records.len()
    );
    if !context.confirm(&prompt, args)? {
        io::print_info("Import cancelled.");
        return Ok(());
    }
    let count = context.store.replace_all(records)?;
    io::print_success(format!("Imported {count} transactions."));
    Ok(())
}

fn cmd_clear(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if context.store.is_empty() {
        io::print_info("Nothing to clear.");
        return Ok(());
    }
    let first = format!("Delete all {} transactions?", context.store.len());
    if !context.confirm(&first, args)?
        || !context.confirm("This cannot be undone. Continue?", args)?
    {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    context.store.clear()?;
    io::print_success("All transactions deleted.");
    Ok(())
}

fn cmd_save(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.store.persist()?;
    io::print_success(format!(
        "Saved {} transactions to {}.",
        context.store.len(),
        context.store.storage().describe()
    ));
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let backups = context.store.storage().list_backups()?;
    if backups.is_empty() {
        io::print_info("No backups found.");
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::left("Backup"),
        TableColumn::left("Created"),
        TableColumn::right("Size"),
    ]);
    for backup in &backups {
        table.push_row(vec![
            backup.id.clone(),
            backup
                .created_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "unknown".into()),
            format!("{} B", backup.size_bytes),
        ]);
    }
    plain(table.render());
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let positional = positional(args);
    let [backup] = positional.as_slice() else {
        return Err(usage_error(RESTORE_USAGE));
    };
    let prompt = format!(
        "Replace {} current transactions with backup `{}`?",
        context.store.len(),
        backup
    );
    if !context.confirm(&prompt, args)? {
        io::print_info("Restore cancelled.");
        return Ok(());
    }
    let count = context.store.restore_backup(backup)?;
    io::print_success(format!("Restored {count} transactions from `{backup}`."));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::core::test_support::harness;
    use tempfile::TempDir;

    #[test]
    fn clear_needs_both_confirmations() {
        let mut harness = harness();
        harness.run(&["add 10 Salario Nómina 2024-01-01", "clear"]);
        assert_eq!(harness.context.store.len(), 1);
        harness.run(&["clear --yes"]);
        assert!(harness.context.store.is_empty());
    }

    #[test]
    fn export_then_import_restores_collection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("finanzas.json");
        let path = path.to_str().unwrap();
        let mut harness = harness();
        harness.run(&[
            "add 1000 Salario Nómina 2024-01-01",
            "type expense",
            "add 200 Alimentación Mercado 2024-01-15",
        ]);
        let before = harness.context.store.transactions().to_vec();
        let export = format!("export {path}");
        let import = format!("import {path} --yes");
        harness.run(&[export.as_str(), "clear --yes", import.as_str()]);
        assert_eq!(harness.context.store.transactions(), before.as_slice());
    }

    #[test]
    fn invalid_import_keeps_collection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"summary":{}}"#).unwrap();
        let mut harness = harness();
        harness.run(&["add 10 Salario Nómina 2024-01-01"]);
        let import = format!("import {} --yes", path.display());
        harness.run(&[import.as_str()]);
        assert_eq!(harness.context.store.len(), 1);
    }
}
