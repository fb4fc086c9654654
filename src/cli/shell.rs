use std::io::{self, BufRead};

use rustyline::{error::ReadlineError, history::DefaultHistory, Cmd, Editor, KeyEvent};

use crate::cli::completion::{CompletionCatalog, ShellHelper};
use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::io as cli_io;

/// Environment variable that switches the shell to reading commands from stdin.
pub const SCRIPT_ENV: &str = "FINANCE_TRACKER_CLI_SCRIPT";

/// One input line after tokenizing.
#[derive(Debug, PartialEq, Eq)]
enum ParsedLine {
    /// Blank lines and `#` comments.
    Skip,
    Command { name: String, args: Vec<String> },
}

fn parse_line(line: &str) -> Result<ParsedLine, shell_words::ParseError> {
    let mut tokens = shell_words::split(line)?.into_iter();
    match tokens.next() {
        None => Ok(ParsedLine::Skip),
        Some(first) if first.starts_with('#') => Ok(ParsedLine::Skip),
        Some(first) => Ok(ParsedLine::Command {
            name: first,
            args: tokens.collect(),
        }),
    }
}

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    let mut context = ShellContext::new(mode)?;
    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context, io::stdin().lock()),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<ShellHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(ShellHelper::new(CompletionCatalog::from_context(
        context,
    ))));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
    cli_io::print_info(format!(
        "{} transactions loaded from {}. Type `help` to get started.",
        context.store.len(),
        context.store.storage().describe()
    ));

    while context.running {
        // Categories, months and the entry type change between prompts.
        if let Some(helper) = editor.helper_mut() {
            helper.refresh(context);
        }
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line.trim());
                if step(context, &line) == LoopControl::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                cli_io::print_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Runs one command per line until input ends or `exit`.
fn run_script(context: &mut ShellContext, input: impl BufRead) -> Result<(), CliError> {
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        tracing::trace!(line = index + 1, "script line");
        if !context.running || step(context, &line) == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

/// Handles a line and reports any command error, leaving the shell running.
fn step(context: &mut ShellContext, line: &str) -> LoopControl {
    match handle_line(context, line) {
        Ok(control) => control,
        Err(err) => {
            context.report_error(err);
            LoopControl::Continue
        }
    }
}

/// Tokenizes and dispatches one line, then gives the autosave timer a chance to run.
pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let (raw, args) = match parse_line(line) {
        Ok(ParsedLine::Skip) => return Ok(LoopControl::Continue),
        Ok(ParsedLine::Command { name, args }) => (name, args),
        Err(err) => {
            cli_io::print_warning(format!("Could not read the line: {err}"));
            return Ok(LoopControl::Continue);
        }
    };
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    context.last_command = Some(line.trim().to_string());

    let outcome = context.dispatch(&raw.to_lowercase(), &raw, &args);
    context.run_autosave();
    if let Ok(LoopControl::Exit) = outcome {
        context.running = false;
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::core::test_support::harness;

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        assert_eq!(parse_line("").unwrap(), ParsedLine::Skip);
        assert_eq!(parse_line("   # note").unwrap(), ParsedLine::Skip);
        assert_eq!(
            parse_line("add 10 Salario \"Pago extra\"").unwrap(),
            ParsedLine::Command {
                name: "add".into(),
                args: vec!["10".into(), "Salario".into(), "Pago extra".into()],
            }
        );
        assert!(parse_line("add \"unterminated").is_err());
    }

    #[test]
    fn script_input_stops_at_exit() {
        let mut harness = harness();
        let input = "add 10 Salario Nómina 2024-01-01\nadd \"broken\nEXIT\nadd 5 Bonos Bono 2024-01-02\n";
        run_script(&mut harness.context, input.as_bytes()).unwrap();

        assert_eq!(harness.context.store.len(), 1);
        assert!(!harness.context.running);
    }

    #[test]
    fn command_names_are_case_insensitive() {
        let mut harness = harness();
        harness.run(&["TYPE expense", "Add 3 Transporte Bus 2024-01-02"]);
        assert_eq!(harness.context.store.len(), 1);
        assert_eq!(
            harness.context.last_command.as_deref(),
            Some("Add 3 Transporte Bus 2024-01-02")
        );
    }
}
