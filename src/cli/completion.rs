//! Tab completion and inline usage hints for the interactive shell.

use std::borrow::Cow;
use std::collections::BTreeSet;

use colored::Colorize;
use rustyline::{
    completion::{Completer, Pair},
    highlight::Highlighter,
    hint::Hinter,
    validate::{ValidationContext, ValidationResult, Validator},
    Context as ReadlineContext, Helper,
};

use crate::cli::registry::ArgCompletion;
use crate::cli::shell_context::ShellContext;
use crate::config::CONFIG_KEYS;
use crate::currency::Locale;
use crate::domain::{categories_for, TransactionKind, EXPENSE_CATEGORIES, INCOME_CATEGORIES};

const TYPE_VALUES: &[&str] = &["income", "expense", "toggle"];
const FILTER_FLAGS: &[&str] = &["--type", "--category", "--month"];
const FILTER_TYPES: &[&str] = &["income", "expense", "all"];
const CONFIG_ACTIONS: &[&str] = &["show", "set"];

struct CommandInfo {
    name: &'static str,
    completion: ArgCompletion,
    hint: Option<&'static str>,
}

/// Everything the completer offers, captured from the shell before each prompt.
pub(crate) struct CompletionCatalog {
    commands: Vec<CommandInfo>,
    entry_type: TransactionKind,
    categories: Vec<String>,
    months: Vec<String>,
}

impl CompletionCatalog {
    pub(crate) fn from_context(context: &ShellContext) -> Self {
        let mut commands: Vec<CommandInfo> = context
            .registry
            .entries()
            .map(|entry| CommandInfo {
                name: entry.name,
                completion: entry.completion,
                hint: entry.argument_hint(),
            })
            .collect();
        commands.sort_by_key(|command| command.name);

        let records = context.store.transactions();
        let categories: BTreeSet<String> = INCOME_CATEGORIES
            .iter()
            .chain(EXPENSE_CATEGORIES)
            .map(|name| name.to_string())
            .chain(records.iter().map(|record| record.category.clone()))
            .collect();
        let months: BTreeSet<String> = records
            .iter()
            .map(|record| record.date.format("%Y-%m").to_string())
            .collect();

        Self {
            commands,
            entry_type: context.entry_type,
            categories: categories.into_iter().collect(),
            months: months.into_iter().rev().collect(),
        }
    }

    /// Returns the byte offset the candidates replace from, and the candidates.
    pub(crate) fn complete(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let prefix = &line[..pos];
        let (words, start, current) = split_prefix(prefix);
        let needle = current.to_lowercase();

        let Some((command, args)) = words.split_first() else {
            let names = self.commands.iter().map(|command| command.name);
            return (start, matching(names, &needle));
        };
        let Some(info) = self.command(command) else {
            return (start, Vec::new());
        };

        let options: Vec<&str> = match info.completion {
            ArgCompletion::Nothing => Vec::new(),
            ArgCompletion::EntryType if args.is_empty() => TYPE_VALUES.to_vec(),
            ArgCompletion::AddCategory if args.len() == 1 => {
                categories_for(self.entry_type).to_vec()
            }
            ArgCompletion::Category => self.category_names().collect(),
            ArgCompletion::FilterFlags => self.filter_options(args),
            ArgCompletion::ConfigKeys => match args {
                [] => CONFIG_ACTIONS.to_vec(),
                [action] if action.eq_ignore_ascii_case("set") => CONFIG_KEYS.to_vec(),
                [action, key] if action.eq_ignore_ascii_case("set") && key == "locale" => {
                    Locale::SUPPORTED.to_vec()
                }
                _ => Vec::new(),
            },
            ArgCompletion::CommandName if args.is_empty() => {
                self.commands.iter().map(|command| command.name).collect()
            }
            _ => Vec::new(),
        };
        (start, matching(options.into_iter(), &needle))
    }

    /// Remaining usage after `<command> `, while the cursor sits at the end.
    pub(crate) fn hint(&self, line: &str, pos: usize) -> Option<&'static str> {
        if pos < line.len() {
            return None;
        }
        let name = line.trim_start().strip_suffix(' ')?;
        if name.contains(char::is_whitespace) {
            return None;
        }
        self.command(name)?.hint
    }

    fn command(&self, name: &str) -> Option<&CommandInfo> {
        let name = name.to_lowercase();
        self.commands.iter().find(|command| command.name == name)
    }

    fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    /// Flags in even positions, the value for the preceding flag otherwise.
    fn filter_options<'a>(&'a self, args: &[String]) -> Vec<&'a str> {
        if args.len() % 2 == 0 {
            return FILTER_FLAGS
                .iter()
                .copied()
                .filter(|flag| {
                    !args
                        .iter()
                        .step_by(2)
                        .any(|used| used.eq_ignore_ascii_case(flag))
                })
                .collect();
        }
        let flag = args.last().map(|flag| flag.to_ascii_lowercase());
        let mut values: Vec<&str> = match flag.as_deref() {
            Some("--type") => return FILTER_TYPES.to_vec(),
            Some("--category") => self.category_names().collect(),
            Some("--month") => self.months.iter().map(String::as_str).collect(),
            _ => return Vec::new(),
        };
        values.push("all");
        values
    }
}

/// Splits the text before the cursor into finished words, the offset where the
/// word under the cursor starts (its opening quote included), and that word unquoted.
fn split_prefix(prefix: &str) -> (Vec<String>, usize, String) {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut start = 0;
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for (index, ch) in prefix.char_indices() {
        match (quote, ch) {
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => current.push(ch),
            (None, '"' | '\'') => {
                if !in_word {
                    start = index;
                    in_word = true;
                }
                quote = Some(ch);
            }
            (None, _) if ch.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, _) => {
                if !in_word {
                    start = index;
                    in_word = true;
                }
                current.push(ch);
            }
        }
    }
    if !in_word {
        start = prefix.len();
    }
    (words, start, current)
}

fn matching<'a>(options: impl Iterator<Item = &'a str>, needle: &str) -> Vec<Pair> {
    options
        .filter(|option| option.to_lowercase().starts_with(needle))
        .map(|option| Pair {
            display: option.to_string(),
            replacement: if option.contains(char::is_whitespace) {
                format!("\"{option}\"")
            } else {
                option.to_string()
            },
        })
        .collect()
}

/// rustyline helper backed by a [`CompletionCatalog`].
pub(crate) struct ShellHelper {
    catalog: CompletionCatalog,
}

impl ShellHelper {
    pub(crate) fn new(catalog: CompletionCatalog) -> Self {
        Self { catalog }
    }

    pub(crate) fn refresh(&mut self, context: &ShellContext) {
        self.catalog = CompletionCatalog::from_context(context);
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.catalog.complete(line, pos))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<String> {
        self.catalog.hint(line, pos).map(str::to_string)
    }
}

impl Highlighter for ShellHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }
}

impl Validator for ShellHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}
