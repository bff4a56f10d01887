//! Lenient coercion of inbound field values.
//!
//! Bodies come from forms that send numbers as strings, blanks for unset
//! fields and occasionally the wrong JSON type. Nothing here fails: bad
//! input resolves to an empty string, a default number or the current year.

use chrono::{Datelike, Local};
use serde_json::Value;

/// Trim a text field, treating absent or null as empty.
pub fn normalize_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// Length of the longest numeric prefix of `s` (sign, digits, fraction, exponent).
fn numeric_prefix_len(s: &str, allow_fraction: bool) -> usize {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if !allow_fraction {
        return if digits > 0 { end } else { 0 };
    }

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return 0;
    }

    // Exponent only counts when followed by at least one digit
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    end
}

/// Parse a decimal from the leading numeric part of a value.
///
/// `"1000.50 PHP"` reads as `1000.5`; `"PHP 1000"`, booleans and
/// non-finite results read as `None`.
pub fn parse_decimal(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim_start();
            let len = numeric_prefix_len(s, true);
            if len == 0 {
                None
            } else {
                s[..len].parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// Parse a non-negative monetary amount, falling back to `default`.
pub fn parse_money(value: Option<&Value>, default: f64) -> f64 {
    parse_decimal(value)
        .filter(|n| *n >= 0.0)
        .unwrap_or(default)
}

/// Parse an integer from the leading digits of a value.
pub fn parse_integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim_start();
            let len = numeric_prefix_len(s, false);
            if len == 0 {
                None
            } else {
                s[..len].parse::<i64>().ok()
            }
        }
        _ => None,
    }
}

/// The current calendar year on the server clock
pub fn current_year() -> i32 {
    Local::now().year()
}

/// Parse a policy year, falling back to the current calendar year when the
/// value is missing, unparsable or not a positive year.
pub fn parse_year(value: Option<&Value>) -> i32 {
    parse_integer(value)
        .filter(|y| *y > 0)
        .and_then(|y| i32::try_from(y).ok())
        .unwrap_or_else(current_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_is_trimmed_and_defaulted() {
        assert_eq!(normalize_text(None), "");
        assert_eq!(normalize_text(Some(&Value::Null)), "");
        assert_eq!(normalize_text(Some(&json!("  ABC 123  "))), "ABC 123");
        assert_eq!(normalize_text(Some(&json!(42))), "42");
        assert_eq!(normalize_text(Some(&json!("   "))), "");
    }

    #[test]
    fn decimal_reads_leading_number() {
        assert_eq!(parse_decimal(Some(&json!("1000"))), Some(1000.0));
        assert_eq!(parse_decimal(Some(&json!(" 1000.50 PHP"))), Some(1000.5));
        assert_eq!(parse_decimal(Some(&json!(".5"))), Some(0.5));
        assert_eq!(parse_decimal(Some(&json!("1e3"))), Some(1000.0));
        assert_eq!(parse_decimal(Some(&json!("12e"))), Some(12.0));
        assert_eq!(parse_decimal(Some(&json!("1,000"))), Some(1.0));
        assert_eq!(parse_decimal(Some(&json!(250.75))), Some(250.75));
    }

    #[test]
    fn decimal_rejects_non_numbers() {
        assert_eq!(parse_decimal(None), None);
        assert_eq!(parse_decimal(Some(&json!(""))), None);
        assert_eq!(parse_decimal(Some(&json!("PHP 1000"))), None);
        assert_eq!(parse_decimal(Some(&json!("."))), None);
        assert_eq!(parse_decimal(Some(&json!("-"))), None);
        assert_eq!(parse_decimal(Some(&json!(true))), None);
        assert_eq!(parse_decimal(Some(&json!({"amount": 1}))), None);
    }

    #[test]
    fn money_defaults_on_bad_or_negative_input() {
        assert_eq!(parse_money(Some(&json!("abc")), 0.0), 0.0);
        assert_eq!(parse_money(Some(&json!("-10")), 0.0), 0.0);
        assert_eq!(parse_money(None, 50.40), 50.40);
        assert_eq!(parse_money(Some(&json!("0")), 50.40), 0.0);
        assert_eq!(parse_money(Some(&json!("75.5")), 0.0), 75.5);
    }

    #[test]
    fn integer_reads_leading_digits() {
        assert_eq!(parse_integer(Some(&json!("2024"))), Some(2024));
        assert_eq!(parse_integer(Some(&json!("2024.9"))), Some(2024));
        assert_eq!(parse_integer(Some(&json!("2024abc"))), Some(2024));
        assert_eq!(parse_integer(Some(&json!(2023))), Some(2023));
        assert_eq!(parse_integer(Some(&json!(2023.6))), Some(2023));
        assert_eq!(parse_integer(Some(&json!("year"))), None);
    }

    #[test]
    fn year_falls_back_to_current() {
        let now = current_year();
        assert_eq!(parse_year(Some(&json!("2022"))), 2022);
        assert_eq!(parse_year(None), now);
        assert_eq!(parse_year(Some(&json!(""))), now);
        assert_eq!(parse_year(Some(&json!("n/a"))), now);
        assert_eq!(parse_year(Some(&json!("0"))), now);
        assert_eq!(parse_year(Some(&json!("99999999999"))), now);
    }
}
