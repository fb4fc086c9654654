use std::collections::HashMap;

use crate::cli::core::CommandResult;
use crate::cli::shell_context::ShellContext;

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// Sections of the help overview, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandGroup {
    Entry,
    Records,
    Reports,
    Data,
    Settings,
    Shell,
}

impl CommandGroup {
    pub fn title(self) -> &'static str {
        match self {
            CommandGroup::Entry => "Entry type",
            CommandGroup::Records => "Transactions",
            CommandGroup::Reports => "Reports",
            CommandGroup::Data => "Data files",
            CommandGroup::Settings => "Settings",
            CommandGroup::Shell => "Shell",
        }
    }
}

/// What the words after a command name complete to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgCompletion {
    #[default]
    Nothing,
    /// `type` values.
    EntryType,
    /// Category in second position, after the amount.
    AddCategory,
    /// `--type`, `--category` and `--month` with their values.
    FilterFlags,
    /// Category names anywhere.
    Category,
    ConfigKeys,
    CommandName,
}

pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub group: CommandGroup,
    pub completion: ArgCompletion,
    pub handler: CommandHandler,
}

impl CommandEntry {
    /// Starts in the `Shell` group; [`CommandRegistry::register_group`] moves it.
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            group: CommandGroup::Shell,
            completion: ArgCompletion::Nothing,
            handler,
        }
    }

    pub const fn completes(mut self, completion: ArgCompletion) -> Self {
        self.completion = completion;
        self
    }

    /// Usage with the command name removed, shown as an inline hint.
    pub fn argument_hint(&self) -> Option<&'static str> {
        self.usage
            .strip_prefix(self.name)
            .map(str::trim_start)
            .filter(|rest| !rest.is_empty())
    }
}

/// Commands keyed by lowercase name; registration order is kept within each group.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
    by_name: HashMap<&'static str, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entries` under `group`. A repeated name replaces the earlier entry.
    pub fn register_group(
        &mut self,
        group: CommandGroup,
        entries: impl IntoIterator<Item = CommandEntry>,
    ) {
        for mut entry in entries {
            entry.group = group;
            match self.by_name.get(entry.name) {
                Some(&index) => self.entries[index] = entry,
                None => {
                    self.by_name.insert(entry.name, self.entries.len());
                    self.entries.push(entry);
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.by_name.get(name).map(|&index| &self.entries[index])
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.get(name).map(|entry| entry.handler)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CommandEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Entries bucketed by group, groups in display order.
    pub fn grouped(&self) -> Vec<(CommandGroup, Vec<&CommandEntry>)> {
        let mut groups: Vec<(CommandGroup, Vec<&CommandEntry>)> = Vec::new();
        let mut ordered: Vec<&CommandEntry> = self.entries.iter().collect();
        ordered.sort_by_key(|entry| entry.group);
        for entry in ordered {
            match groups.last_mut() {
                Some((group, members)) if *group == entry.group => members.push(entry),
                _ => groups.push((entry.group, vec![entry])),
            }
        }
        groups
    }
}
