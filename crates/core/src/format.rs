//! Locale- and currency-aware number formatting for journal output.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::JournalError;

/// Rendered in place of values that cannot be formatted (NaN, infinity).
pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "en-GB")]
    EnGb,
    #[serde(rename = "de-DE")]
    DeDe,
    #[serde(rename = "fr-FR")]
    FrFr,
    #[serde(rename = "ja-JP")]
    JaJp,
}

impl Locale {
    const fn decimal_separator(self) -> char {
        match self {
            Self::DeDe | Self::FrFr => ',',
            Self::EnUs | Self::EnGb | Self::JaJp => '.',
        }
    }

    const fn group_separator(self) -> char {
        match self {
            Self::DeDe => '.',
            Self::FrFr => ' ',
            Self::EnUs | Self::EnGb | Self::JaJp => ',',
        }
    }

    /// Continental locales write the currency symbol after the amount.
    const fn symbol_after(self) -> bool {
        matches!(self, Self::DeDe | Self::FrFr)
    }

    /// Continental locales put a space before the percent sign.
    const fn spaced_percent(self) -> bool {
        matches!(self, Self::DeDe | Self::FrFr)
    }

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::EnGb => "en-GB",
            Self::DeDe => "de-DE",
            Self::FrFr => "fr-FR",
            Self::JaJp => "ja-JP",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('_', "-").to_ascii_lowercase().as_str() {
            "en-us" | "en" => Ok(Self::EnUs),
            "en-gb" => Ok(Self::EnGb),
            "de-de" | "de" => Ok(Self::DeDe),
            "fr-fr" | "fr" => Ok(Self::FrFr),
            "ja-jp" | "ja" => Ok(Self::JaJp),
            _ => Err(JournalError::UnsupportedLocale(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Jpy,
    Usdt,
    Btc,
}

impl Currency {
    /// Minor-unit precision used for display.
    #[must_use]
    pub const fn decimals(self) -> u32 {
        match self {
            Self::Jpy => 0,
            Self::Btc => 8,
            Self::Usd | Self::Eur | Self::Gbp | Self::Usdt => 2,
        }
    }

    /// Fiat symbol, or `None` for assets rendered with their ticker code.
    #[must_use]
    pub const fn symbol(self) -> Option<&'static str> {
        match self {
            Self::Usd => Some("$"),
            Self::Eur => Some("€"),
            Self::Gbp => Some("£"),
            Self::Jpy => Some("¥"),
            Self::Usdt | Self::Btc => None,
        }
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Jpy => "JPY",
            Self::Usdt => "USDT",
            Self::Btc => "BTC",
        }
    }
}

impl FromStr for Currency {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "JPY" => Ok(Self::Jpy),
            "USDT" => Ok(Self::Usdt),
            "BTC" => Ok(Self::Btc),
            _ => Err(JournalError::UnsupportedCurrency(s.to_string())),
        }
    }
}

/// Formats an unsigned magnitude with locale separators. The sign is the
/// caller's concern.
fn format_magnitude(value: Decimal, decimals: u32, locale: Locale) -> String {
    let rounded = value
        .abs()
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{rounded:.prec$}", prec = decimals as usize);

    let (int_part, frac_part) = match plain.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (plain.as_str(), None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 8);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(locale.group_separator());
        }
        grouped.push(*digit);
    }

    if let Some(frac) = frac_part {
        grouped.push(locale.decimal_separator());
        grouped.push_str(frac);
    }
    grouped
}

/// Sign of `value` after rounding to `decimals`, so that -0.001 renders unsigned.
fn rounded_sign(value: Decimal, decimals: u32) -> std::cmp::Ordering {
    value
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
        .cmp(&Decimal::ZERO)
}

fn attach_currency(amount: String, currency: Currency, locale: Locale) -> String {
    match currency.symbol() {
        Some(symbol) if locale.symbol_after() => format!("{amount} {symbol}"),
        Some(symbol) => format!("{symbol}{amount}"),
        None => format!("{amount} {}", currency.code()),
    }
}

/// Formats a plain number with the locale's separators.
#[must_use]
pub fn format_number(value: Decimal, decimals: u32, locale: Locale) -> String {
    let magnitude = format_magnitude(value, decimals, locale);
    if rounded_sign(value, decimals).is_lt() {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}

/// Formats a monetary amount, e.g. `$1,234.56`, `1.234,56 €`, `12.50 USDT`.
#[must_use]
pub fn format_currency(value: Decimal, currency: Currency, locale: Locale) -> String {
    let decimals = currency.decimals();
    let amount = attach_currency(format_magnitude(value, decimals, locale), currency, locale);
    if rounded_sign(value, decimals).is_lt() {
        format!("-{amount}")
    } else {
        amount
    }
}

/// Formats a P&L figure with an explicit sign, e.g. `+$120.00` or `-$35.50`.
#[must_use]
pub fn format_pnl(value: Decimal, currency: Currency, locale: Locale) -> String {
    let decimals = currency.decimals();
    let amount = attach_currency(format_magnitude(value, decimals, locale), currency, locale);
    match rounded_sign(value, decimals) {
        std::cmp::Ordering::Greater => format!("+{amount}"),
        std::cmp::Ordering::Less => format!("-{amount}"),
        std::cmp::Ordering::Equal => amount,
    }
}

/// Formats a value that is already in percent units, e.g. `62.5` -> `62.5%`.
#[must_use]
pub fn format_percent(value: f64, decimals: u32, locale: Locale) -> String {
    let Some(value) = Decimal::from_f64(value) else {
        return PLACEHOLDER.to_string();
    };

    let number = format_number(value, decimals, locale);
    if locale.spaced_percent() {
        format!("{number} %")
    } else {
        format!("{number}%")
    }
}

/// Abbreviates large values: `1234` -> `1.2K`, `3_400_000` -> `3.4M`.
#[must_use]
pub fn format_compact(value: Decimal, locale: Locale) -> String {
    const SUFFIXES: [&str; 4] = ["", "K", "M", "B"];
    let thousand = Decimal::from(1_000);

    let mut unit = 0;
    let mut scaled = value;
    while unit + 1 < SUFFIXES.len() && scaled.abs() >= thousand {
        scaled /= thousand;
        unit += 1;
    }

    // Rounding can carry into the next unit (999.96K -> 1000.0K -> 1M).
    let mut rounded = scaled.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    if rounded.abs() >= thousand && unit + 1 < SUFFIXES.len() {
        rounded = (rounded / thousand)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        unit += 1;
    }

    let mut number = format_number(rounded, 1, locale);
    let trailing_zero = format!("{}0", locale.decimal_separator());
    if number.ends_with(&trailing_zero) {
        number.truncate(number.len() - trailing_zero.len());
    }
    format!("{number}{}", SUFFIXES[unit])
}

/// Converts a float amount before formatting; non-finite input yields the placeholder.
#[must_use]
pub fn format_currency_f64(value: f64, currency: Currency, locale: Locale) -> String {
    Decimal::from_f64(value).map_or_else(
        || PLACEHOLDER.to_string(),
        |v| format_currency(v, currency, locale),
    )
}
