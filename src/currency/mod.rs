//! Formatting helpers for amounts, dates, and month labels shown by the shell.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

const DISPLAY_PRECISION: u32 = 2;

pub fn symbol_for(code: &str) -> String {
    match code {
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "JPY" => "¥".into(),
        "MXN" => "MX$".into(),
        "AUD" => "A$".into(),
        _ => code.into(),
    }
}

/// Renders `value` with two decimals and `,` thousands grouping.
pub fn format_number(value: Decimal) -> String {
    let rounded = value
        .abs()
        .round_dp_with_strategy(DISPLAY_PRECISION, RoundingStrategy::MidpointAwayFromZero);
    let body = format!("{:.*}", DISPLAY_PRECISION as usize, rounded);
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body.as_str(), "00"));
    format!("{}.{}", group_digits(int_part, ','), frac_part)
}

/// Currency rendering used for totals and list rows, e.g. `-$1,200.50`.
pub fn format_amount(value: Decimal, currency: &str) -> String {
    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{}{}", symbol_for(currency), format_number(value))
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// Display locale for dates and month labels. Amounts keep the currency
/// symbol with `,` grouping in every locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    EsEs,
    EnUs,
    EnGb,
}

impl Locale {
    pub const SUPPORTED: &'static [&'static str] = &["es-ES", "en-US", "en-GB"];

    /// Parses a BCP 47 style tag such as `es-ES` or `en_us`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().replace('_', "-").to_ascii_lowercase().as_str() {
            "es-es" | "es" => Some(Locale::EsEs),
            "en-us" | "en" => Some(Locale::EnUs),
            "en-gb" => Some(Locale::EnGb),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Locale::EsEs => "es-ES",
            Locale::EnUs => "en-US",
            Locale::EnGb => "en-GB",
        }
    }

    fn date_pattern(self) -> &'static str {
        match self {
            Locale::EnUs => "%m/%d/%Y",
            Locale::EsEs | Locale::EnGb => "%d/%m/%Y",
        }
    }

    fn month_names(self) -> &'static [&'static str; 12] {
        const SPANISH: [&str; 12] = [
            "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
        ];
        const ENGLISH: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        match self {
            Locale::EsEs => &SPANISH,
            Locale::EnUs | Locale::EnGb => &ENGLISH,
        }
    }
}

/// Numeric date in the locale's field order, e.g. `15/01/2024` for `es-ES`.
pub fn format_date(date: NaiveDate, locale: Locale) -> String {
    date.format(locale.date_pattern()).to_string()
}

/// Short month label for a `YYYY-MM` key, e.g. `ene 2024`. Keys that do not
/// parse are returned unchanged.
pub fn format_month(month_key: &str, locale: Locale) -> String {
    NaiveDate::parse_from_str(&format!("{month_key}-01"), "%Y-%m-%d")
        .map(|date| {
            let name = locale.month_names()[date.month0() as usize];
            format!("{} {}", name, date.year())
        })
        .unwrap_or_else(|_| month_key.to_string())
}

/// Currency and locale pair used by the shell's tables and messages.
#[derive(Debug, Clone, Copy)]
pub struct DisplayFormat<'a> {
    pub currency: &'a str,
    pub locale: Locale,
}

impl DisplayFormat<'_> {
    pub fn amount(&self, value: Decimal) -> String {
        format_amount(value, self.currency)
    }

    pub fn date(&self, date: NaiveDate) -> String {
        format_date(date, self.locale)
    }

    pub fn month(&self, month_key: &str) -> String {
        format_month(month_key, self.locale)
    }
}
