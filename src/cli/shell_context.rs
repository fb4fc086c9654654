use crate::{
    config::{Config, ConfigManager},
    core::TransactionStore,
    currency::DisplayFormat,
    domain::TransactionKind,
};

use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// State shared by every command handler for the lifetime of the shell.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub store: TransactionStore,
    pub config_manager: ConfigManager,
    pub config: Config,
    /// Kind used by `add` and `categories`; starts as income.
    pub entry_type: TransactionKind,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn prompt(&self) -> String {
        format!("finance [{}]> ", self.entry_type)
    }

    pub fn display_format(&self) -> DisplayFormat<'_> {
        DisplayFormat {
            currency: &self.config.currency,
            locale: self.config.display_locale(),
        }
    }
}
