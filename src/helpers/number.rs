//! Number rounding and locale formatting used for table cells and legends.
//! Formatting follows the Swiss-German publishing conventions: decimal comma,
//! four-per-em space as thousands separator and an en-dash as minus sign.

/// En-dash, rendered in place of the ASCII minus sign.
pub(crate) const EN_DASH: &str = "\u{2013}";

/// Four-per-em space, used as thousands separator.
pub(crate) const THOUSANDS_SEPARATOR: char = '\u{2005}';

/// Decimal separator.
pub(crate) const DECIMAL_SEPARATOR: char = ',';

/// Absolute values from here on are rendered with thousands separators.
pub(crate) const GROUPING_THRESHOLD: f64 = 10_000.0;

/// Rounds half towards positive infinity, like `Math.round` in browsers.
#[inline]
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Rounds a value to two digits after the comma, or to `max_digits_after_comma`
/// when the data set is more precise than that.
pub fn rounded_value(value: f64, max_digits_after_comma: usize) -> f64 {
    let factor = if max_digits_after_comma > 2 {
        10f64.powi(max_digits_after_comma as i32)
    } else {
        100.0
    };
    round_half_up(value * factor) / factor
}

/// Formats a value with a fixed number of digits after the comma.
/// Zero digits falls back to the shortest representation of the value.
pub fn formatted_value(value: f64, max_digits_after_comma: usize) -> String {
    if max_digits_after_comma > 0 {
        format_number(value, Some(max_digits_after_comma))
    } else {
        format_number(value, None)
    }
}

/// Formats a value with the locale separators.
/// `decimals` fixes the digits after the comma, `None` keeps the shortest representation.
/// Thousands separators are only inserted from [`GROUPING_THRESHOLD`] on.
pub fn format_number(value: f64, decimals: Option<usize>) -> String {
    format_number_with_grouping(value, decimals, value.abs() >= GROUPING_THRESHOLD)
}

/// Formats a value with the locale separators and explicit grouping.
pub(crate) fn format_number_with_grouping(value: f64, decimals: Option<usize>, grouping: bool) -> String {
    let plain = match decimals {
        Some(decimals) => fixed_decimals(value.abs(), decimals),
        None => format!("{}", value.abs()),
    };
    let (integer, fraction) = match plain.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (plain.as_str(), None),
    };

    let mut formatted = String::with_capacity(plain.len() + 8);
    // Rounding may turn a small negative value into zero
    let is_zero = plain.chars().all(|c| c == '0' || c == '.');
    if value.is_sign_negative() && !is_zero {
        formatted.push_str(EN_DASH);
    }
    if grouping {
        let digits = integer.len();
        for (index, digit) in integer.chars().enumerate() {
            if index > 0 && (digits - index) % 3 == 0 {
                formatted.push(THOUSANDS_SEPARATOR);
            }
            formatted.push(digit);
        }
    } else {
        formatted.push_str(integer);
    }
    if let Some(fraction) = fraction {
        formatted.push(DECIMAL_SEPARATOR);
        formatted.push_str(fraction);
    }
    formatted
}

/// Rounds the exact decimal value of a non-negative float to `decimals`
/// digits. Exact ties round away from zero, everything else to nearest.
fn fixed_decimals(value: f64, decimals: usize) -> String {
    if is_exact_tie(value, decimals) {
        let half_unit = 0.5 / 10f64.powi(decimals as i32);
        format!("{:.*}", decimals, value + half_unit)
    } else {
        format!("{:.*}", decimals, value)
    }
}

/// Returns true if the exact binary value ends in a 5 right after the kept digits.
fn is_exact_tie(value: f64, decimals: usize) -> bool {
    if !value.is_finite() {
        return false;
    }
    // 1074 digits hold the full expansion of every f64
    let exact = format!("{:.1074}", value);
    let fraction = exact
        .split_once('.')
        .map(|(_, fraction)| fraction.trim_end_matches('0'))
        .unwrap_or_default();
    fraction.len() == decimals + 1 && fraction.ends_with('5')
}

/// Counts the digits after the decimal point of a raw cell string.
#[inline]
pub(crate) fn digits_after_comma(value: &str) -> usize {
    value.split('.').nth(1).map(str::len).unwrap_or(0)
}

/// Number of characters a value occupies once formatted, used for label layout.
pub(crate) fn value_length(value: f64, max_digits_after_comma: usize) -> usize {
    formatted_value(value, max_digits_after_comma).chars().count()
}
