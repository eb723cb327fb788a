//! Text-to-number coercion for written values.
//!
//! Only plain decimal text becomes a number: an optional leading `-`, digits,
//! and at most one `.`. Text that a spreadsheet user would read as a number
//! but that does not meet that rule (`1,234`, `1e3`, `+5`, ` 12 `) stays text
//! and raises a [`CoercionWarning`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric-looking string that was stored as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionWarning {
    pub sheet: String,
    pub row: u32,
    pub col: u32,
    pub text: String,
}

impl fmt::Display for CoercionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' at {}!{} looks numeric but was stored as text",
            self.text,
            self.sheet,
            crate::ole::xls::utils::cell_reference(self.row, self.col)
        )
    }
}

/// Result of coercing one string
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Coerced {
    Number(f64),
    Text { ambiguous: bool },
}

/// Decide how a written string is stored
pub(crate) fn coerce_text(text: &str) -> Coerced {
    if is_plain_decimal(text)
        && let Ok(n) = fast_float2::parse::<f64, _>(text)
    {
        return Coerced::Number(n);
    }
    Coerced::Text {
        ambiguous: looks_numeric(text),
    }
}

/// Optional single leading minus, digits, at most one point, at least one digit
fn is_plain_decimal(text: &str) -> bool {
    let body = text.strip_prefix('-').unwrap_or(text);
    let mut digits = 0usize;
    let mut points = 0usize;
    for ch in body.chars() {
        match ch {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}

/// Whether a human would likely read the text as a number
fn looks_numeric(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    if trimmed != text && fast_float2::parse::<f64, _>(trimmed).is_ok() {
        return true;
    }

    let stripped: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '\u{00A0}' | '+' | '$'))
        .collect();
    if stripped.is_empty() || !stripped.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    // Grouped with points, as in 1.234.567
    if stripped.matches('.').count() > 1 && stripped.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return true;
    }
    // Rejects words such as "inf" or "NaN" that the float parser accepts
    if !stripped
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | 'e' | 'E'))
    {
        return false;
    }
    fast_float2::parse::<f64, _>(&stripped).is_ok()
}
