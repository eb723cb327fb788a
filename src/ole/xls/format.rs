//! Number-format lookup used to tell dates from plain numbers.
//!
//! Every cell carries an XF index; the XF names a number format, either one
//! of Excel's built-in ids or a custom `FORMAT` record.

use std::collections::HashMap;

/// Built-in format ids that render as dates or times
fn is_builtin_date_format(ifmt: u16) -> bool {
    matches!(ifmt, 14..=22 | 45..=47)
}

/// Whether a custom format code renders a date or time.
///
/// Quoted literals, bracketed sections and escaped characters are ignored,
/// except for elapsed-time markers such as `[h]`.
pub fn is_date_format_code(code: &str) -> bool {
    let lower = code.to_ascii_lowercase();
    if lower == "general" || lower.is_empty() {
        return false;
    }

    let mut in_quotes = false;
    let mut in_brackets = false;
    let mut escaped = false;
    for ch in lower.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => in_brackets = true,
            ']' if !in_quotes => in_brackets = false,
            'd' | 'm' | 'y' | 'h' | 's' if !in_quotes && !in_brackets => return true,
            _ => {},
        }
    }

    // Elapsed time such as [h] or [mm]
    ["[h]", "[hh]", "[m]", "[mm]", "[s]", "[ss]"]
        .iter()
        .any(|token| lower.contains(token))
}

/// XF-to-format table for one workbook
#[derive(Debug, Clone, Default)]
pub struct FormatTable {
    /// Number format id of each XF record, in XF order
    xf_formats: Vec<u16>,
    /// Custom format codes by id
    custom: HashMap<u16, String>,
}

impl FormatTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_xf(&mut self, ifmt: u16) {
        self.xf_formats.push(ifmt);
    }

    pub(crate) fn add_format(&mut self, ifmt: u16, code: String) {
        self.custom.insert(ifmt, code);
    }

    /// Number format id attached to an XF index
    pub fn format_id(&self, xf: u16) -> Option<u16> {
        self.xf_formats.get(xf as usize).copied()
    }

    /// Whether cells with this XF display as dates
    pub fn is_date_xf(&self, xf: u16) -> bool {
        match self.format_id(xf) {
            Some(ifmt) => match self.custom.get(&ifmt) {
                Some(code) => is_date_format_code(code),
                None => is_builtin_date_format(ifmt),
            },
            None => false,
        }
    }

    /// Number of XF records seen
    pub fn xf_count(&self) -> usize {
        self.xf_formats.len()
    }
}
