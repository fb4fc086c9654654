use crate::cli::core::{usage_error, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{ArgCompletion, CommandEntry};

const CONFIG_USAGE: &str = "config [show|set <key> <value>]";

/// Keys read only when the shell starts.
const RESTART_KEYS: &[&str] = &[
    "storage_key",
    "data_dir",
    "backup_retention",
    "autosave_interval_secs",
];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change preferences",
        CONFIG_USAGE,
        cmd_config,
    )
    .completes(ArgCompletion::ConfigKeys)]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => show_config(context),
        [action] if action.eq_ignore_ascii_case("show") => show_config(context),
        [action, key, value @ ..] if action.eq_ignore_ascii_case("set") && !value.is_empty() => {
            set_config_value(context, key, &value.join(" "))
        }
        _ => Err(usage_error(CONFIG_USAGE)),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    output_section("Configuration");
    for (key, value) in context.config.entries() {
        io::print_info(format!("  {:<24} {}", key, value));
    }
    io::print_info(format!("  File: {}", context.config_manager.path().display()));
    Ok(())
}

fn set_config_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let key = key.to_ascii_lowercase();
    let mut updated = context.config.clone();
    updated.set_value(&key, value)?;
    context.config_manager.save(&updated)?;
    context.config = updated;
    io::print_success(format!("Updated `{key}`."));
    if RESTART_KEYS.contains(&key.as_str()) {
        io::print_hint("Restart the shell for this setting to take effect.");
    }
    Ok(())
}
