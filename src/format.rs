//! Locale-aware display formatting for metric values
//!
//! All formatters render 3 to 4 significant digits regardless of magnitude,
//! so a price shows as "$1,330" and a transaction count compacts to
//! "1.235M". Inputs must be finite; NaN or infinity is a caller contract
//! violation and is only guarded by a debug assertion.

/// Locale parameters for number rendering
///
/// Translation string lookup lives outside this crate; the locale here only
/// carries the numeric conventions the formatters need.
#[derive(Debug, Clone)]
pub struct Locale {
    pub decimal_sep: char,
    pub group_sep: &'static str,
    pub currency_symbol: &'static str,
    /// Symbol trails the number ("1.330 €") instead of leading it
    pub symbol_suffix: bool,
}

impl Locale {
    pub fn en_us() -> Self {
        Self {
            decimal_sep: '.',
            group_sep: ",",
            currency_symbol: "$",
            symbol_suffix: false,
        }
    }

    pub fn de_de() -> Self {
        Self {
            decimal_sep: ',',
            group_sep: ".",
            currency_symbol: "€",
            symbol_suffix: true,
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::en_us()
    }
}

/// Formatting rule dispatch used by the store when committing a scalar
pub fn format_value(format: crate::types::ValueFormat, n: f64, locale: &Locale) -> String {
    use crate::types::ValueFormat::*;
    match format {
        Currency => format_currency(n, locale),
        CompactCurrency => format_compact_currency(n, locale),
        CompactCount => format_compact_count(n, locale),
        Count => format_count(n, locale),
    }
}

/// Full currency string, e.g. `format_currency(1330.0, ..) == "$1,330"`
pub fn format_currency(n: f64, locale: &Locale) -> String {
    with_currency(significant(n, locale), locale)
}

/// Compacted currency string, e.g. `"$23.46B"` for 23_456_789_000
pub fn format_compact_currency(n: f64, locale: &Locale) -> String {
    with_currency(format_compact_count(n, locale), locale)
}

/// Compacted count with a magnitude suffix, e.g. `"1.235M"` for 1_234_567
pub fn format_compact_count(n: f64, locale: &Locale) -> String {
    debug_assert!(n.is_finite(), "formatter input must be finite");
    let a = n.abs();
    let mut tier = if a < 1_000.0 {
        0
    } else {
        (floor_log10(a) / 3).clamp(0, MAX_TIER)
    };
    let mut mantissa = n / 1_000f64.powi(tier);
    // rounding at 4 significant digits can carry into the next magnitude
    if tier < MAX_TIER && round_sig4(mantissa.abs()) >= 1_000.0 {
        tier += 1;
        mantissa = n / 1_000f64.powi(tier);
    }
    let mut s = significant(mantissa, locale);
    s.push_str(SUFFIXES[tier as usize]);
    s
}

/// Plain grouped count, e.g. `"8,040"` for 8040
pub fn format_count(n: f64, locale: &Locale) -> String {
    significant(n, locale)
}

const MAX_TIER: i32 = 4;
const SUFFIXES: [&str; 5] = ["", "K", "M", "B", "T"];

fn with_currency(digits: String, locale: &Locale) -> String {
    if locale.symbol_suffix {
        format!("{} {}", digits, locale.currency_symbol)
    } else if let Some(rest) = digits.strip_prefix('-') {
        format!("-{}{}", locale.currency_symbol, rest)
    } else {
        format!("{}{}", locale.currency_symbol, digits)
    }
}

/// Renders `n` with at least 3 and at most 4 significant digits, grouped
/// per the locale.
fn significant(n: f64, locale: &Locale) -> String {
    debug_assert!(n.is_finite(), "formatter input must be finite");
    if n == 0.0 {
        return format!("0{}00", locale.decimal_sep);
    }

    let neg = n < 0.0;
    let rounded = round_sig4(n.abs());
    let mag = floor_log10(rounded);
    let max_dec = (3 - mag).max(0) as usize;
    let min_dec = (2 - mag).max(0) as usize;

    let mut digits = format!("{:.*}", max_dec, rounded);
    if max_dec > min_dec && digits.ends_with('0') {
        digits.pop();
        if digits.ends_with('.') {
            digits.pop();
        }
    }

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (digits, None),
    };

    let mut out = String::new();
    if neg {
        out.push('-');
    }
    out.push_str(&group_digits(&int_part, locale.group_sep));
    if let Some(frac) = frac_part {
        out.push(locale.decimal_sep);
        out.push_str(&frac);
    }
    out
}

/// Rounds a positive value to 4 significant digits.
fn round_sig4(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    let factor = 10f64.powi(3 - floor_log10(x));
    (x * factor).round() / factor
}

/// `floor(log10(x))` for positive `x`, corrected for float slop at exact
/// powers of ten.
fn floor_log10(x: f64) -> i32 {
    let mut mag = x.log10().floor() as i32;
    if 10f64.powi(mag) > x {
        mag -= 1;
    } else if 10f64.powi(mag + 1) <= x {
        mag += 1;
    }
    mag
}

fn group_digits(int_part: &str, sep: &str) -> String {
    if sep.is_empty() || int_part.len() <= 3 {
        return int_part.to_string();
    }
    let digits: Vec<char> = int_part.chars().collect();
    let mut out = String::new();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(*c);
    }
    out
}
