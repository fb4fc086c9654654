use crate::cli::core::{usage_error, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{plain, section as output_section};
use crate::cli::registry::{ArgCompletion, CommandEntry};
use crate::cli::table::{Table, TableColumn};
use crate::core::services::{QueryService, SummaryService, TransactionFilter};
use crate::currency::DisplayFormat;
use crate::domain::{resolve_category, Transaction, TransactionKind};

const FILTER_USAGE: &str =
    "filter [--type income|expense|all] [--category NAME|all] [--month YYYY-MM|all]";
const SEARCH_USAGE: &str = "search <term>";
const DESCRIPTION_WIDTH: usize = 32;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "list",
            "List all transactions, newest first",
            "list",
            cmd_list,
        ),
        CommandEntry::new(
            "filter",
            "List transactions matching type, category, and month",
            FILTER_USAGE,
            cmd_filter,
        )
        .completes(ArgCompletion::FilterFlags),
        CommandEntry::new(
            "search",
            "Find transactions by description or category",
            SEARCH_USAGE,
            cmd_search,
        )
        .completes(ArgCompletion::Category),
        CommandEntry::new(
            "summary",
            "Show income, expense, and balance totals",
            "summary",
            cmd_summary,
        ),
        CommandEntry::new(
            "monthly",
            "Show income and expenses per month",
            "monthly",
            cmd_monthly,
        ),
        CommandEntry::new(
            "breakdown",
            "Show the largest expense categories",
            "breakdown",
            cmd_breakdown,
        ),
    ]
}

/// One-line description such as `#17 15/01/2024 Gasto -$12.50 Transporte (Bus)`.
pub(crate) fn describe_record(record: &Transaction, display: DisplayFormat<'_>) -> String {
    format!(
        "#{} {} {} {}{} {} ({})",
        record.id,
        display.date(record.date),
        record.kind.label(),
        record.kind.sign(),
        display.amount(record.amount),
        record.category,
        record.description
    )
}

fn render_transactions(records: &[&Transaction], display: DisplayFormat<'_>) -> String {
    let mut table = Table::new(vec![
        TableColumn::right("ID"),
        TableColumn::left("Fecha"),
        TableColumn::left("Tipo"),
        TableColumn::left("Categoría"),
        TableColumn::left("Descripción").max_width(DESCRIPTION_WIDTH),
        TableColumn::right("Monto"),
    ]);
    for record in records {
        table.push_row(vec![
            record.id.to_string(),
            display.date(record.date),
            record.kind.label().to_string(),
            record.category.clone(),
            record.description.clone(),
            format!("{}{}", record.kind.sign(), display.amount(record.amount)),
        ]);
    }
    table.render()
}

fn print_matches(context: &ShellContext, matches: &[&Transaction]) {
    if matches.is_empty() {
        io::print_info("No transactions match.");
    } else {
        plain(render_transactions(matches, context.display_format()));
    }
    io::print_info(format!(
        "{} de {} transacciones",
        matches.len(),
        context.store.len()
    ));
}

fn cmd_list(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.store.is_empty() {
        io::print_info("No transactions recorded yet. Use `add` to create one.");
        return Ok(());
    }
    let sorted = QueryService::sort_for_display(context.store.transactions());
    plain(render_transactions(&sorted, context.display_format()));
    Ok(())
}

fn cmd_filter(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = parse_filter(args)?;
    let matches = QueryService::filter(context.store.transactions(), &filter);
    print_matches(context, &matches);
    Ok(())
}

fn parse_filter(args: &[&str]) -> Result<TransactionFilter, CommandError> {
    let mut filter = TransactionFilter::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter.next().ok_or_else(|| usage_error(FILTER_USAGE))?;
        let value = (!value.eq_ignore_ascii_case("all")).then_some(*value);
        match flag.to_ascii_lowercase().as_str() {
            "--type" => filter.kind = value.map(str::parse::<TransactionKind>).transpose()?,
            "--category" => filter.category = value.map(canonical_category),
            "--month" => filter.month_prefix = value.map(str::to_string),
            _ => return Err(usage_error(FILTER_USAGE)),
        }
    }
    Ok(filter)
}

/// Category names are matched exactly, so accept any casing of a known name.
fn canonical_category(input: &str) -> String {
    resolve_category(TransactionKind::Income, input)
        .or_else(|| resolve_category(TransactionKind::Expense, input))
        .map_or_else(|| input.trim().to_string(), str::to_string)
}

fn cmd_search(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(usage_error(SEARCH_USAGE));
    }
    let term = args.join(" ");
    let matches = QueryService::search(context.store.transactions(), &term);
    print_matches(context, &matches);
    Ok(())
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let summary = SummaryService::summary(context.store.transactions());
    let display = context.display_format();
    output_section("Resumen");
    io::print_info(format!(
        "  Ingresos : {}",
        display.amount(summary.total_income)
    ));
    io::print_info(format!(
        "  Gastos   : {}",
        display.amount(summary.total_expenses)
    ));
    io::print_info(format!(
        "  Balance  : {}",
        display.amount(summary.balance)
    ));
    Ok(())
}

fn cmd_monthly(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let series = SummaryService::monthly_series(context.store.transactions());
    if series.is_empty() {
        io::print_info("No transactions recorded yet.");
        return Ok(());
    }
    let display = context.display_format();
    let mut table = Table::new(vec![
        TableColumn::left("Mes"),
        TableColumn::right("Ingresos"),
        TableColumn::right("Gastos"),
        TableColumn::right("Balance"),
    ]);
    for month in &series {
        table.push_row(vec![
            display.month(&month.month),
            display.amount(month.income),
            display.amount(month.expenses),
            display.amount(month.income - month.expenses),
        ]);
    }
    plain(table.render());
    Ok(())
}

fn cmd_breakdown(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let breakdown = SummaryService::category_breakdown(context.store.transactions());
    if breakdown.is_empty() {
        io::print_info("No expenses recorded yet.");
        return Ok(());
    }
    let display = context.display_format();
    let mut table = Table::new(vec![
        TableColumn::left("Categoría"),
        TableColumn::right("Total"),
    ]);
    for entry in &breakdown {
        table.push_row(vec![
            entry.category.clone(),
            display.amount(entry.total),
        ]);
    }
    plain(table.render());
    Ok(())
}
