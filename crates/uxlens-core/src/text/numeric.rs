//! Tolerant numeric coercion for scores, years and contrast ratings.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub const SCORE_MIN: f64 = 1.0;
pub const SCORE_MAX: f64 = 5.0;

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+(?:\.\d+)?|\.\d+)").unwrap());

/// Numeric value of a JSON number or of the leading number in a string
/// (`"4"`, `" 3.5 "`, `"4/5"`, `"2 out of 5"`).
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => LEADING_NUMBER.find(s.trim())?.as_str().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

pub fn round_one_decimal(n: f64) -> f64 {
    (n * 10.0).round() / 10.0
}

/// A 1..5 score rounded to one decimal.
pub fn parse_score(value: &Value) -> Option<f64> {
    coerce_number(value).map(|n| round_one_decimal(n.clamp(SCORE_MIN, SCORE_MAX)))
}

/// Severity implied by a score when none was given explicitly.
///
/// Only an exact 3 reads as medium; scores between 2 and 3 fall to low.
pub fn severity_from_score(score: f64) -> &'static str {
    if score <= 2.0 {
        "high"
    } else if score == 3.0 {
        "medium"
    } else {
        "low"
    }
}

/// Contrast rating rounded to an integer in `[1, 5]`.
pub fn clamp_contrast_score(value: &Value) -> Option<u8> {
    coerce_number(value).map(|n| n.round().clamp(SCORE_MIN, SCORE_MAX) as u8)
}

/// Integer year from a number or numeric string.
pub fn coerce_year(value: &Value) -> Option<i32> {
    let n = coerce_number(value)?;
    if n < i32::MIN as f64 || n > i32::MAX as f64 {
        return None;
    }
    Some(n.trunc() as i32)
}

/// `4` for whole scores, `3.5` otherwise.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{score:.1}")
    }
}
