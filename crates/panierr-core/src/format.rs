//! # Price Formatting
//!
//! Renders `Money` for shoppers according to a locale tag and a currency
//! format, the way the browser's number formatter does for the storefront.
//!
//! ## Supported Conventions
//! ```text
//! ┌────────────┬──────────┬──────────┬─────────────────────────────────────┐
//! │ locale     │ grouping │ decimal  │ 1234.5 USD                           │
//! ├────────────┼──────────┼──────────┼─────────────────────────────────────┤
//! │ en-*, ja-* │ ,        │ .        │ $1,234.50                            │
//! │ de-*, es-* │ .        │ ,        │ 1.234,50 $                           │
//! │ it-*, nl-* │ .        │ ,        │ 1.234,50 $                           │
//! │ fr-*       │ U+202F   │ ,        │ 1 234,50 $ (U+00A0 before symbol)    │
//! │ pt-BR      │ .        │ ,        │ $ 1.234,50                           │
//! └────────────┴──────────┴──────────┴─────────────────────────────────────┘
//! ```
//! Unknown locales fall back to `en-US`. Unknown currency codes are shown as
//! the code itself in the symbol position (`XTS1,234.50`).

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Default locale tag.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Default ISO 4217 currency code.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Upper bound on fraction digits; `Money` only carries two.
const MAX_FRACTION_DIGITS: u8 = 6;

// =============================================================================
// Currency Format Options
// =============================================================================

/// Whether to render a currency symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyStyle {
    /// `$10.00`
    #[default]
    Currency,
    /// `10.00`
    Decimal,
}

/// Number formatting options for prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrencyFormat {
    /// Currency or plain decimal.
    pub style: CurrencyStyle,

    /// ISO 4217 code (`USD`, `EUR`, `JPY`, ...).
    pub currency: String,

    /// Minimum fraction digits; defaults to the currency's own digits.
    pub minimum_fraction_digits: Option<u8>,

    /// Maximum fraction digits; defaults to the currency's own digits.
    pub maximum_fraction_digits: Option<u8>,

    /// Whether to insert group separators.
    pub use_grouping: bool,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat {
            style: CurrencyStyle::Currency,
            currency: DEFAULT_CURRENCY.to_string(),
            minimum_fraction_digits: None,
            maximum_fraction_digits: None,
            use_grouping: true,
        }
    }
}

impl CurrencyFormat {
    /// Currency style for the given code.
    pub fn currency(code: impl Into<String>) -> Self {
        CurrencyFormat {
            currency: code.into(),
            ..Default::default()
        }
    }

    /// Plain decimal style.
    pub fn decimal() -> Self {
        CurrencyFormat {
            style: CurrencyStyle::Decimal,
            ..Default::default()
        }
    }
}

// =============================================================================
// Locale Rules
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolPlacement {
    /// `$10.00`
    Prefix,
    /// `R$ 10,00`
    PrefixSpaced,
    /// `10,00 €`
    Suffix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LocaleRules {
    group: &'static str,
    decimal: &'static str,
    placement: SymbolPlacement,
    /// Separator between number and a suffixed symbol.
    symbol_gap: &'static str,
}

const EN: LocaleRules = LocaleRules {
    group: ",",
    decimal: ".",
    placement: SymbolPlacement::Prefix,
    symbol_gap: "",
};

const CONTINENTAL: LocaleRules = LocaleRules {
    group: ".",
    decimal: ",",
    placement: SymbolPlacement::Suffix,
    symbol_gap: "\u{a0}",
};

const FR: LocaleRules = LocaleRules {
    group: "\u{202f}",
    decimal: ",",
    placement: SymbolPlacement::Suffix,
    symbol_gap: "\u{a0}",
};

const PT_BR: LocaleRules = LocaleRules {
    group: ".",
    decimal: ",",
    placement: SymbolPlacement::PrefixSpaced,
    symbol_gap: "\u{a0}",
};

impl LocaleRules {
    fn for_locale(locale: &str) -> LocaleRules {
        let lower = locale.trim().to_ascii_lowercase().replace('_', "-");
        if lower == "pt-br" {
            return PT_BR;
        }
        match lower.split('-').next().unwrap_or_default() {
            "en" | "ja" | "zh" | "ko" | "he" | "th" => EN,
            "de" | "es" | "it" | "nl" | "pt" | "da" | "id" | "tr" => CONTINENTAL,
            "fr" => FR,
            _ => EN,
        }
    }
}

/// Symbol and natural fraction digits for a currency code.
fn currency_info(code: &str) -> (String, u8) {
    match code.to_ascii_uppercase().as_str() {
        "USD" => ("$".into(), 2),
        "EUR" => ("€".into(), 2),
        "GBP" => ("£".into(), 2),
        "JPY" => ("¥".into(), 0),
        "KRW" => ("₩".into(), 0),
        "INR" => ("₹".into(), 2),
        "BRL" => ("R$".into(), 2),
        "CAD" => ("CA$".into(), 2),
        "AUD" => ("A$".into(), 2),
        "CHF" => ("CHF".into(), 2),
        other => (other.to_string(), 2),
    }
}

// =============================================================================
// Price Formatter
// =============================================================================

/// Formats `Money` for a fixed locale and currency format.
///
/// ## Example
/// ```rust
/// use panierr_core::format::{CurrencyFormat, PriceFormatter};
/// use panierr_core::Money;
///
/// let us = PriceFormatter::new("en-US", &CurrencyFormat::default());
/// assert_eq!(us.format(Money::from_cents(123450)), "$1,234.50");
///
/// let de = PriceFormatter::new("de-DE", &CurrencyFormat::currency("EUR"));
/// assert_eq!(de.format(Money::from_cents(123450)), "1.234,50\u{a0}€");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFormatter {
    rules: LocaleRules,
    symbol: Option<String>,
    min_digits: u8,
    max_digits: u8,
    use_grouping: bool,
}

impl PriceFormatter {
    /// Builds a formatter for `locale` and `format`.
    pub fn new(locale: &str, format: &CurrencyFormat) -> Self {
        let (symbol, natural_digits) = currency_info(&format.currency);
        let max_digits = format
            .maximum_fraction_digits
            .unwrap_or(natural_digits)
            .min(MAX_FRACTION_DIGITS);
        let min_digits = format
            .minimum_fraction_digits
            .unwrap_or(natural_digits.min(max_digits))
            .min(max_digits);

        PriceFormatter {
            rules: LocaleRules::for_locale(locale),
            symbol: match format.style {
                CurrencyStyle::Currency => Some(symbol),
                CurrencyStyle::Decimal => None,
            },
            min_digits,
            max_digits,
            use_grouping: format.use_grouping,
        }
    }

    /// Renders an amount.
    pub fn format(&self, amount: Money) -> String {
        let number = self.format_number(amount.cents().unsigned_abs());
        let sign = if amount.is_negative() && number.chars().any(|c| c.is_ascii_digit() && c != '0') {
            "-"
        } else {
            ""
        };

        match &self.symbol {
            None => format!("{}{}", sign, number),
            Some(symbol) => match self.rules.placement {
                SymbolPlacement::Prefix => format!("{}{}{}", sign, symbol, number),
                SymbolPlacement::PrefixSpaced => {
                    format!("{}{}{}{}", sign, symbol, self.rules.symbol_gap, number)
                }
                SymbolPlacement::Suffix => {
                    format!("{}{}{}{}", sign, number, self.rules.symbol_gap, symbol)
                }
            },
        }
    }

    /// Digits, separators and fraction of an unsigned amount in minor units.
    fn format_number(&self, cents: u64) -> String {
        let digits = u32::from(self.max_digits);
        let cents = i128::from(cents);

        // Rescale minor units (2 digits) to `digits` fraction digits
        let scaled = if digits >= 2 {
            cents * 10i128.pow(digits - 2)
        } else {
            let divisor = 10i128.pow(2 - digits);
            (cents + divisor / 2) / divisor
        };

        let unit = 10i128.pow(digits);
        let int_part = (scaled / unit).to_string();
        let mut frac_part = if digits > 0 {
            format!("{:0width$}", scaled % unit, width = digits as usize)
        } else {
            String::new()
        };
        while frac_part.len() > usize::from(self.min_digits) && frac_part.ends_with('0') {
            frac_part.pop();
        }

        let int_part = if self.use_grouping {
            group_thousands(&int_part, self.rules.group)
        } else {
            int_part
        };

        if frac_part.is_empty() {
            int_part
        } else {
            format!("{}{}{}", int_part, self.rules.decimal, frac_part)
        }
    }
}

impl Default for PriceFormatter {
    fn default() -> Self {
        PriceFormatter::new(DEFAULT_LOCALE, &CurrencyFormat::default())
    }
}

fn group_thousands(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(c);
    }
    out
}
