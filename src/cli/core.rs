//! Shell context construction, command dispatch, and argument helpers.

use std::io;

use chrono::NaiveDate;
use rustyline::error::ReadlineError;
use strsim::levenshtein;

use crate::{
    config::{Config, ConfigManager},
    core::{SystemClock, TransactionStore},
    domain::{TransactionId, TransactionKind},
    errors::TrackerError,
    storage::JsonSnapshotStorage,
};

use super::commands;
use super::io as cli_io;
use super::output::{set_preferences, OutputPreferences};
use super::registry::{CommandEntry, CommandRegistry};
pub use super::shell_context::{CliMode, ShellContext};

pub(crate) const YES_FLAG: &str = "--yes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] TrackerError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

/// Errors that end the shell itself rather than a single command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] TrackerError),
    #[error("Input error: {0}")]
    Input(#[from] io::Error),
    #[error("Line editor error: {0}")]
    Readline(#[from] ReadlineError),
}

impl ShellContext {
    /// Builds the shell state from the on-disk configuration and snapshot.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        let storage = JsonSnapshotStorage::with_retention(
            config_manager.data_dir(&config),
            &config.storage_key,
            config.backup_retention,
        )?;
        let store = TransactionStore::open(Box::new(storage), Box::new(SystemClock))?;
        Ok(Self::from_parts(mode, config_manager, config, store))
    }

    pub fn from_parts(
        mode: CliMode,
        config_manager: ConfigManager,
        config: Config,
        store: TransactionStore,
    ) -> Self {
        set_preferences(OutputPreferences {
            plain_mode: mode == CliMode::Script,
            quiet_mode: false,
        });
        let store = store.with_autosave_interval(config.autosave_interval_secs);
        for warning in store.load_warnings() {
            cli_io::print_warning(warning);
        }

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        Self {
            mode,
            registry,
            store,
            config_manager,
            config,
            entry_type: TransactionKind::default(),
            last_command: None,
            running: true,
        }
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    /// Registry entry for the command on the last dispatched line.
    fn last_entry(&self) -> Option<&CommandEntry> {
        let line = self.last_command.as_deref()?;
        let name = line.split_whitespace().next()?;
        self.command(&name.to_lowercase())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= 3 {
                cli_io::print_hint(format!("Did you mean `{}`?", name));
            }
        }
    }

    /// Asks for confirmation. `--yes` in `args` confirms without asking; script
    /// mode never prompts and treats a missing `--yes` as "no".
    pub(crate) fn confirm(&self, prompt: &str, args: &[&str]) -> Result<bool, CommandError> {
        if has_yes_flag(args) {
            return Ok(true);
        }
        match self.mode {
            CliMode::Interactive => cli_io::confirm_action(prompt),
            CliMode::Script => {
                cli_io::print_warning(format!("{prompt} Re-run with `{YES_FLAG}` to confirm."));
                Ok(false)
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(cli_io::confirm_action("Exit shell?").unwrap_or(true))
    }

    /// Writes the snapshot again when the autosave interval has elapsed.
    pub(crate) fn run_autosave(&mut self) {
        let now = self.store.now();
        if let Err(err) = self.store.autosave(now) {
            cli_io::print_warning(format!("Autosave failed: {err}"));
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                let usage = self
                    .last_entry()
                    .filter(|_| !message.starts_with("usage:"))
                    .map(|entry| entry.usage);
                cli_io::print_error(message);
                match usage {
                    Some(usage) => cli_io::print_hint(format!("Usage: {usage}")),
                    None => cli_io::print_hint("Use `help <command>` for usage details."),
                }
            }
            other => cli_io::print_error(other),
        }
    }
}

pub(crate) fn has_yes_flag(args: &[&str]) -> bool {
    args.iter()
        .any(|arg| arg.eq_ignore_ascii_case(YES_FLAG) || *arg == "-y")
}

/// Arguments with the confirmation flag removed.
pub(crate) fn positional<'a>(args: &[&'a str]) -> Vec<&'a str> {
    args.iter()
        .copied()
        .filter(|arg| !(arg.eq_ignore_ascii_case(YES_FLAG) || *arg == "-y"))
        .collect()
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

pub(crate) fn parse_id(input: &str) -> Result<TransactionId, CommandError> {
    input.trim_start_matches('#').parse().map_err(|_| {
        CommandError::InvalidArguments(format!("invalid transaction id `{}`", input))
    })
}

pub(crate) fn usage_error(usage: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {usage}"))
}
