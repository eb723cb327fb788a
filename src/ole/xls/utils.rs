//! Shared BIFF8 helpers: strings, RK numbers, A1 references and dates

use crate::common::binary::{self, decode_latin1, decode_utf16le};
use crate::ole::xls::error::{XlsError, XlsResult};
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Largest row index addressable in BIFF8
pub const MAX_ROW: u32 = 65_535;

/// Largest column index addressable in BIFF8 (column IV)
pub const MAX_COL: u32 = 255;

/// Parse an `XLUnicodeString` (16-bit length) or `ShortXLUnicodeString`
/// (8-bit length) starting at `offset`.
///
/// Returns the decoded string and the number of bytes consumed. Rich-text
/// and phonetic extensions are skipped when flagged.
pub fn parse_unicode_string(data: &[u8], offset: usize, wide_len: bool) -> XlsResult<(String, usize)> {
    let (cch, mut pos) = if wide_len {
        (binary::read_u16_le(data, offset)? as usize, offset + 2)
    } else {
        (binary::read_u8(data, offset)? as usize, offset + 1)
    };
    let flags = binary::read_u8(data, pos)?;
    pos += 1;

    let mut c_run = 0usize;
    let mut cb_ext = 0usize;
    if flags & 0x08 != 0 {
        c_run = binary::read_u16_le(data, pos)? as usize;
        pos += 2;
    }
    if flags & 0x04 != 0 {
        cb_ext = binary::read_u32_le(data, pos)? as usize;
        pos += 4;
    }

    let byte_len = if flags & 0x01 != 0 { cch * 2 } else { cch };
    let chars = data.get(pos..pos + byte_len).ok_or(XlsError::InvalidLength {
        expected: pos + byte_len,
        found: data.len(),
    })?;
    let text = if flags & 0x01 != 0 {
        decode_utf16le(chars)
    } else {
        decode_latin1(chars)
    };
    pos += byte_len + c_run * 4 + cb_ext;

    Ok((text, pos - offset))
}

/// Encode a string as a BIFF8 `XLUnicodeString` (16-bit length).
///
/// Characters that fit in one byte are stored compressed; anything else
/// switches the whole string to UTF-16LE.
pub fn encode_unicode_string(value: &str, out: &mut Vec<u8>) {
    let units: Vec<u16> = value.encode_utf16().collect();
    out.extend_from_slice(&(units.len() as u16).to_le_bytes());
    if units.iter().all(|&u| u <= 0xFF) {
        out.push(0x00);
        out.extend(units.iter().map(|&u| u as u8));
    } else {
        out.push(0x01);
        for unit in units {
            out.extend_from_slice(&unit.to_le_bytes());
        }
    }
}

/// Decode an RK value.
///
/// Bit 0 set means the value was multiplied by 100; bit 1 set means the
/// upper 30 bits are a signed integer rather than the top of an IEEE double.
pub fn rk_to_f64(rk: u32) -> f64 {
    let value = if rk & 0x02 != 0 {
        ((rk as i32) >> 2) as f64
    } else {
        f64::from_bits(((rk & 0xFFFF_FFFC) as u64) << 32)
    };

    if rk & 0x01 != 0 { value / 100.0 } else { value }
}

/// Excel literal for a BIFF8 error code
pub fn error_literal(code: u8) -> &'static str {
    match code {
        0x00 => "#NULL!",
        0x07 => "#DIV/0!",
        0x0F => "#VALUE!",
        0x17 => "#REF!",
        0x1D => "#NAME?",
        0x24 => "#NUM!",
        0x2A => "#N/A",
        0x2B => "#GETTING_DATA",
        _ => "#ERR!",
    }
}

/// Column letters for a 0-based column index (`0` -> `A`, `72` -> `BU`)
pub fn column_letter(col: u32) -> String {
    let mut n = col + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// 0-based column index for column letters (`A` -> `0`, `BU` -> `72`).
///
/// Letters are case-insensitive; anything else yields `None`.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut result: u32 = 0;
    for ch in letters.chars() {
        let ch = ch.to_ascii_uppercase();
        if !ch.is_ascii_uppercase() {
            return None;
        }
        result = result.checked_mul(26)?.checked_add(ch as u32 - 'A' as u32 + 1)?;
    }
    Some(result - 1)
}

/// A1 reference for a 0-based cell position (`(5, 1)` -> `B6`)
pub fn cell_reference(row: u32, col: u32) -> String {
    format!("{}{}", column_letter(col), row + 1)
}

/// Parse an A1 reference into a 0-based `(row, col)` pair (`B6` -> `(5, 1)`).
///
/// `$` anchors are accepted and ignored.
pub fn parse_cell_reference(reference: &str) -> Option<(u32, u32)> {
    let cleaned: String = reference.chars().filter(|&c| c != '$').collect();
    let split = cleaned.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cleaned.split_at(split);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let col = column_index(letters)?;
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col))
}

/// Convert an Excel serial date to a timestamp.
///
/// The 1900 system counts the nonexistent 1900-02-29, so serials before 61
/// are shifted by one day to land on real calendar dates.
pub fn excel_date_to_datetime(serial: f64, is_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let base = if is_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else if serial < 61.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    let days = serial.trunc() as i64;
    let millis = (serial.fract() * 86_400_000.0).round() as i64;
    let start = base.and_hms_opt(0, 0, 0)?;
    start
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::milliseconds(millis))
}

/// Convert a timestamp to an Excel serial date
pub fn datetime_to_excel_date(value: NaiveDateTime, is_1904: bool) -> f64 {
    let base = if is_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)
    };
    let Some(start) = base.and_then(|d| d.and_hms_opt(0, 0, 0)) else {
        return 0.0;
    };
    let millis = (value - start).num_milliseconds() as f64;
    let serial = millis / 86_400_000.0;
    if !is_1904 && serial < 61.0 {
        serial - 1.0
    } else {
        serial
    }
}
