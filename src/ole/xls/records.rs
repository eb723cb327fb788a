//! BIFF8 record parsing
//!
//! A workbook stream is a flat sequence of records, each a 4-byte header
//! (type, length) followed by its payload. Records are read as borrowed views
//! that remember their absolute offset, so the writer can re-emit untouched
//! records byte-for-byte.

use crate::common::binary::{self, decode_latin1, decode_utf16le};
use crate::ole::xls::cell::{Cell, Value};
use crate::ole::xls::error::{XlsError, XlsResult};
use crate::ole::xls::utils;
use smallvec::SmallVec;

/// Record type identifiers
pub mod rt {
    pub const FORMULA: u16 = 0x0006;
    pub const EOF: u16 = 0x000A;
    pub const DATEMODE: u16 = 0x0022;
    pub const FILEPASS: u16 = 0x002F;
    pub const CONTINUE: u16 = 0x003C;
    pub const CODEPAGE: u16 = 0x0042;
    pub const BOUNDSHEET: u16 = 0x0085;
    pub const MULRK: u16 = 0x00BD;
    pub const MULBLANK: u16 = 0x00BE;
    pub const DBCELL: u16 = 0x00D7;
    pub const RSTRING: u16 = 0x00D6;
    pub const XF: u16 = 0x00E0;
    pub const SST: u16 = 0x00FC;
    pub const LABELSST: u16 = 0x00FD;
    pub const EXTSST: u16 = 0x00FF;
    pub const DIMENSIONS: u16 = 0x0200;
    pub const BLANK: u16 = 0x0201;
    pub const NUMBER: u16 = 0x0203;
    pub const LABEL: u16 = 0x0204;
    pub const BOOLERR: u16 = 0x0205;
    pub const STRING: u16 = 0x0207;
    pub const ROW: u16 = 0x0208;
    pub const INDEX: u16 = 0x020B;
    pub const ARRAY: u16 = 0x0221;
    pub const TABLE: u16 = 0x0236;
    pub const RK: u16 = 0x027E;
    pub const FORMAT: u16 = 0x041E;
    pub const SHRFMLA: u16 = 0x04BC;
    pub const BOF: u16 = 0x0809;
}

/// One record borrowed from the stream
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    /// Absolute offset of the record header
    pub offset: usize,
    pub record_type: u16,
    pub data: &'a [u8],
}

impl<'a> Record<'a> {
    /// Size of header plus payload
    pub fn total_len(&self) -> usize {
        4 + self.data.len()
    }

    /// Offset just past this record
    pub fn end(&self) -> usize {
        self.offset + self.total_len()
    }
}

/// Iterator over records starting at a given offset
#[derive(Debug, Clone)]
pub struct RecordIter<'a> {
    stream: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> RecordIter<'a> {
    pub fn new(stream: &'a [u8]) -> Self {
        Self::at(stream, 0)
    }

    pub fn at(stream: &'a [u8], pos: usize) -> Self {
        Self {
            stream,
            pos,
            failed: false,
        }
    }

    /// Offset of the next record to be read
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = XlsResult<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.stream.len() {
            return None;
        }
        // Trailing zero padding after the last EOF is not a record
        if self.stream.len() - self.pos < 4 {
            self.pos = self.stream.len();
            return None;
        }

        let offset = self.pos;
        let header = (
            binary::read_u16_le(self.stream, offset),
            binary::read_u16_le(self.stream, offset + 2),
        );
        let (record_type, len) = match header {
            (Ok(t), Ok(l)) => (t, l as usize),
            _ => {
                self.failed = true;
                return Some(Err(XlsError::UnexpectedEndOfStream(format!(
                    "record header at {}",
                    offset
                ))));
            },
        };
        let Some(data) = self.stream.get(offset + 4..offset + 4 + len) else {
            self.failed = true;
            return Some(Err(XlsError::UnexpectedEndOfStream(format!(
                "record 0x{:04X} at {} declares {} bytes",
                record_type, offset, len
            ))));
        };

        self.pos = offset + 4 + len;
        Some(Ok(Record {
            offset,
            record_type,
            data,
        }))
    }
}

/// BOF record
#[derive(Debug, Clone)]
pub struct BofRecord {
    pub version: u16,
    /// Substream type (0x0005 globals, 0x0010 worksheet, 0x0020 chart, ...)
    pub substream_type: u16,
}

impl BofRecord {
    pub const GLOBALS: u16 = 0x0005;
    pub const WORKSHEET: u16 = 0x0010;

    pub fn parse(data: &[u8]) -> XlsResult<Self> {
        if data.len() < 4 {
            return Err(XlsError::InvalidLength {
                expected: 4,
                found: data.len(),
            });
        }
        Ok(BofRecord {
            version: binary::read_u16_le(data, 0)?,
            substream_type: binary::read_u16_le(data, 2)?,
        })
    }

    pub fn is_biff8(&self) -> bool {
        self.version == 0x0600
    }
}

/// BIFF8 DIMENSIONS record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DimensionsRecord {
    pub first_row: u32,
    /// Last used row plus one
    pub last_row: u32,
    pub first_col: u16,
    /// Last used column plus one
    pub last_col: u16,
}

impl DimensionsRecord {
    pub fn parse(data: &[u8]) -> XlsResult<Self> {
        if data.len() < 12 {
            return Err(XlsError::InvalidLength {
                expected: 14,
                found: data.len(),
            });
        }
        Ok(DimensionsRecord {
            first_row: binary::read_u32_le(data, 0)?,
            last_row: binary::read_u32_le(data, 4)?,
            first_col: binary::read_u16_le(data, 8)?,
            last_col: binary::read_u16_le(data, 10)?,
        })
    }

    /// Bounds covering every `(row, col)` given; all zero when empty
    pub fn covering<I: IntoIterator<Item = (u16, u16)>>(cells: I) -> Self {
        let mut dims: Option<Self> = None;
        for (row, col) in cells {
            let d = dims.get_or_insert(DimensionsRecord {
                first_row: row as u32,
                last_row: row as u32 + 1,
                first_col: col,
                last_col: col + 1,
            });
            d.first_row = d.first_row.min(row as u32);
            d.last_row = d.last_row.max(row as u32 + 1);
            d.first_col = d.first_col.min(col);
            d.last_col = d.last_col.max(col + 1);
        }
        dims.unwrap_or_default()
    }
}

/// Sheet types from BOUNDSHEET
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetType {
    WorkSheet,
    MacroSheet,
    ChartSheet,
    VBModule,
}

impl SheetType {
    pub fn from_u8(value: u8) -> XlsResult<Self> {
        match value {
            0x00 => Ok(SheetType::WorkSheet),
            0x01 => Ok(SheetType::MacroSheet),
            0x02 => Ok(SheetType::ChartSheet),
            0x06 => Ok(SheetType::VBModule),
            v => Err(XlsError::InvalidRecord {
                record_type: rt::BOUNDSHEET,
                message: format!("Invalid sheet type: {}", v),
            }),
        }
    }
}

/// BOUNDSHEET8 record
#[derive(Debug, Clone)]
pub struct BoundSheetRecord {
    /// Absolute offset of the sheet's BOF (`lbPlyPos`)
    pub position: u32,
    /// Hidden state (0 visible, 1 hidden, 2 very hidden)
    pub visibility: u8,
    pub sheet_type: SheetType,
    pub name: String,
}

impl BoundSheetRecord {
    pub fn parse(data: &[u8]) -> XlsResult<Self> {
        if data.len() < 8 {
            return Err(XlsError::InvalidLength {
                expected: 8,
                found: data.len(),
            });
        }
        let position = binary::read_u32_le(data, 0)?;
        let visibility = data[4] & 0x03;
        let sheet_type = SheetType::from_u8(data[5])?;
        let (name, _) = utils::parse_unicode_string(data, 6, false)?;

        Ok(BoundSheetRecord {
            position,
            visibility,
            sheet_type,
            name,
        })
    }
}

/// XF record; only the number format matters here
#[derive(Debug, Clone)]
pub struct ExtendedFormat {
    pub font_index: u16,
    pub format_index: u16,
}

impl ExtendedFormat {
    pub fn parse(data: &[u8]) -> XlsResult<Self> {
        if data.len() < 4 {
            return Err(XlsError::InvalidLength {
                expected: 4,
                found: data.len(),
            });
        }
        Ok(ExtendedFormat {
            font_index: binary::read_u16_le(data, 0)?,
            format_index: binary::read_u16_le(data, 2)?,
        })
    }
}

/// FORMAT record: a custom number format code
pub fn parse_format(data: &[u8]) -> XlsResult<(u16, String)> {
    let ifmt = binary::read_u16_le(data, 0)?;
    let (code, _) = utils::parse_unicode_string(data, 2, true)?;
    Ok((ifmt, code))
}

/// Reader over an SST payload split across `CONTINUE` records.
///
/// Plain reads (counts, run lengths) step over record boundaries
/// transparently. Character data is different: every continuation of a
/// string's characters starts with a fresh option byte whose low bit says
/// whether the remaining characters are compressed.
struct ContinuedReader<'a> {
    parts: Vec<&'a [u8]>,
    part: usize,
    pos: usize,
}

impl<'a> ContinuedReader<'a> {
    fn new(parts: Vec<&'a [u8]>) -> Self {
        Self {
            parts,
            part: 0,
            pos: 0,
        }
    }

    fn available(&self) -> usize {
        self.parts
            .get(self.part)
            .map_or(0, |p| p.len().saturating_sub(self.pos))
    }

    /// Move to the next part if the current one is exhausted
    fn advance_if_exhausted(&mut self) -> XlsResult<()> {
        while self.available() == 0 {
            if self.part + 1 >= self.parts.len() {
                return Err(XlsError::UnexpectedEndOfStream(
                    "shared string table truncated".to_string(),
                ));
            }
            self.part += 1;
            self.pos = 0;
        }
        Ok(())
    }

    fn read_u8(&mut self) -> XlsResult<u8> {
        self.advance_if_exhausted()?;
        let byte = self.parts[self.part][self.pos];
        self.pos += 1;
        Ok(byte)
    }

    fn read_u16(&mut self) -> XlsResult<u16> {
        Ok(u16::from_le_bytes([self.read_u8()?, self.read_u8()?]))
    }

    fn read_u32(&mut self) -> XlsResult<u32> {
        Ok(u32::from_le_bytes([
            self.read_u8()?,
            self.read_u8()?,
            self.read_u8()?,
            self.read_u8()?,
        ]))
    }

    fn skip(&mut self, mut count: usize) -> XlsResult<()> {
        while count > 0 {
            self.advance_if_exhausted()?;
            let step = count.min(self.available());
            self.pos += step;
            count -= step;
        }
        Ok(())
    }

    fn read_chars(&mut self, cch: usize, mut high_byte: bool) -> XlsResult<String> {
        let mut text = String::with_capacity(cch);
        let mut remaining = cch;
        while remaining > 0 {
            if self.available() == 0 {
                self.advance_if_exhausted()?;
                high_byte = self.read_u8()? & 0x01 != 0;
            }
            let width = if high_byte { 2 } else { 1 };
            let take = remaining.min(self.available() / width);
            if take == 0 {
                return Err(XlsError::InvalidData(
                    "character split across CONTINUE boundary".to_string(),
                ));
            }
            let bytes = &self.parts[self.part][self.pos..self.pos + take * width];
            if high_byte {
                text.push_str(&decode_utf16le(bytes));
            } else {
                text.push_str(&decode_latin1(bytes));
            }
            self.pos += take * width;
            remaining -= take;
        }
        Ok(text)
    }
}

/// Shared string table
#[derive(Debug, Clone, Default)]
pub struct SharedStringTable {
    pub strings: Vec<String>,
}

impl SharedStringTable {
    /// Parse the SST payload and its CONTINUE payloads, in stream order
    pub fn parse(parts: Vec<&[u8]>) -> XlsResult<Self> {
        let mut reader = ContinuedReader::new(parts);
        let _total = reader.read_u32()?;
        let unique = reader.read_u32()? as usize;

        let mut strings = Vec::with_capacity(unique.min(65_536));
        for _ in 0..unique {
            let cch = reader.read_u16()? as usize;
            let flags = reader.read_u8()?;
            let c_run = if flags & 0x08 != 0 {
                reader.read_u16()? as usize
            } else {
                0
            };
            let cb_ext = if flags & 0x04 != 0 {
                reader.read_u32()? as usize
            } else {
                0
            };
            strings.push(reader.read_chars(cch, flags & 0x01 != 0)?);
            reader.skip(c_run * 4 + cb_ext)?;
        }

        Ok(SharedStringTable { strings })
    }

    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }
}

/// One cell decoded from a cell record
#[derive(Debug, Clone, PartialEq)]
pub struct CellEntry {
    pub row: u16,
    pub col: u16,
    pub cell: Cell,
    /// Formula whose string result lives in the following `STRING` record
    pub awaits_string: bool,
}

impl CellEntry {
    fn plain(row: u16, col: u16, xf: u16, value: Value) -> Self {
        CellEntry {
            row,
            col,
            cell: Cell {
                xf,
                value,
                is_formula: false,
            },
            awaits_string: false,
        }
    }
}

/// Whether a record type carries cell data
pub fn is_cell_record(record_type: u16) -> bool {
    matches!(
        record_type,
        rt::FORMULA
            | rt::BLANK
            | rt::NUMBER
            | rt::LABEL
            | rt::BOOLERR
            | rt::RK
            | rt::LABELSST
            | rt::MULRK
            | rt::MULBLANK
            | rt::RSTRING
    )
}

/// Row and column span covered by a cell record
pub fn cell_span(record_type: u16, data: &[u8]) -> XlsResult<(u16, u16, u16)> {
    let row = binary::read_u16_le(data, 0)?;
    let first = binary::read_u16_le(data, 2)?;
    let last = match record_type {
        rt::MULRK | rt::MULBLANK => {
            if data.len() < 6 {
                return Err(XlsError::InvalidLength {
                    expected: 6,
                    found: data.len(),
                });
            }
            binary::read_u16_le(data, data.len() - 2)?
        },
        _ => first,
    };
    if last < first {
        return Err(XlsError::InvalidRecord {
            record_type,
            message: format!("last column {} before first column {}", last, first),
        });
    }
    Ok((row, first, last))
}

/// Decode a cell record into its cells.
///
/// `MULRK` and `MULBLANK` expand to one entry per column. `LABELSST` indices
/// outside the table decode as empty text.
pub fn parse_cell_record(
    record_type: u16,
    data: &[u8],
    sst: &SharedStringTable,
) -> XlsResult<SmallVec<[CellEntry; 1]>> {
    let (row, first, last) = cell_span(record_type, data)?;
    let mut out = SmallVec::new();

    match record_type {
        rt::MULRK => {
            for (i, col) in (first..=last).enumerate() {
                let at = 4 + i * 6;
                let xf = binary::read_u16_le(data, at)?;
                let rk = binary::read_u32_le(data, at + 2)?;
                out.push(CellEntry::plain(row, col, xf, Value::Number(utils::rk_to_f64(rk))));
            }
            return Ok(out);
        },
        rt::MULBLANK => {
            for (i, col) in (first..=last).enumerate() {
                let xf = binary::read_u16_le(data, 4 + i * 2)?;
                out.push(CellEntry::plain(row, col, xf, Value::Empty));
            }
            return Ok(out);
        },
        _ => {},
    }

    let xf = binary::read_u16_le(data, 4)?;
    let entry = match record_type {
        rt::BLANK => CellEntry::plain(row, first, xf, Value::Empty),
        rt::NUMBER => CellEntry::plain(row, first, xf, Value::Number(binary::read_f64_le(data, 6)?)),
        rt::RK => {
            let rk = binary::read_u32_le(data, 6)?;
            CellEntry::plain(row, first, xf, Value::Number(utils::rk_to_f64(rk)))
        },
        rt::LABEL | rt::RSTRING => {
            let (text, _) = utils::parse_unicode_string(data, 6, true)?;
            CellEntry::plain(row, first, xf, Value::Text(text))
        },
        rt::LABELSST => {
            let index = binary::read_u32_le(data, 6)?;
            let text = sst.get(index).unwrap_or_default().to_string();
            CellEntry::plain(row, first, xf, Value::Text(text))
        },
        rt::BOOLERR => {
            let raw = binary::read_u8(data, 6)?;
            let value = if binary::read_u8(data, 7)? != 0 {
                Value::Text(utils::error_literal(raw).to_string())
            } else {
                Value::Bool(raw != 0)
            };
            CellEntry::plain(row, first, xf, value)
        },
        rt::FORMULA => parse_formula(row, first, xf, data)?,
        other => {
            return Err(XlsError::InvalidRecord {
                record_type: other,
                message: "not a cell record".to_string(),
            });
        },
    };
    out.push(entry);
    Ok(out)
}

/// Decode the cached result of a `FORMULA` record
fn parse_formula(row: u16, col: u16, xf: u16, data: &[u8]) -> XlsResult<CellEntry> {
    let cached = data.get(6..14).ok_or(XlsError::InvalidLength {
        expected: 14,
        found: data.len(),
    })?;

    let mut awaits_string = false;
    let value = if cached[6] == 0xFF && cached[7] == 0xFF {
        match cached[0] {
            0x00 => {
                awaits_string = true;
                Value::Text(String::new())
            },
            0x01 => Value::Bool(cached[2] != 0),
            0x02 => Value::Text(utils::error_literal(cached[2]).to_string()),
            _ => Value::Empty,
        }
    } else {
        Value::Number(binary::read_f64_le(cached, 0)?)
    };

    Ok(CellEntry {
        row,
        col,
        cell: Cell {
            xf,
            value,
            is_formula: true,
        },
        awaits_string,
    })
}

/// Text carried by a `STRING` record
pub fn parse_string_record(data: &[u8]) -> XlsResult<String> {
    utils::parse_unicode_string(data, 0, true).map(|(text, _)| text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(record_type: u16, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&record_type.to_le_bytes());
        out.extend_from_slice(&(data.len() as u16).to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn test_record_iter_offsets() {
        let mut stream = record(rt::BOF, &[0x00, 0x06, 0x05, 0x00]);
        stream.extend(record(rt::EOF, &[]));
        stream.extend([0, 0]);

        let records: Vec<_> = RecordIter::new(&stream).map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].offset, 0);
        assert_eq!(records[1].offset, 8);
        assert_eq!(records[1].end(), 12);

        let bof = BofRecord::parse(records[0].data).unwrap();
        assert!(bof.is_biff8());
        assert_eq!(bof.substream_type, BofRecord::GLOBALS);
    }

    #[test]
    fn test_record_iter_truncated() {
        let mut stream = record(rt::NUMBER, &[0; 14]);
        stream.truncate(10);
        let mut iter = RecordIter::new(&stream);
        assert!(matches!(
            iter.next(),
            Some(Err(XlsError::UnexpectedEndOfStream(_)))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_boundsheet() {
        let mut data = 1234u32.to_le_bytes().to_vec();
        data.extend([0x00, 0x00, 4, 0x00]);
        data.extend(b"jour");
        let sheet = BoundSheetRecord::parse(&data).unwrap();
        assert_eq!(sheet.position, 1234);
        assert_eq!(sheet.sheet_type, SheetType::WorkSheet);
        assert_eq!(sheet.name, "jour");
    }

    #[test]
    fn test_sst_plain() {
        let mut data = Vec::new();
        data.extend(3u32.to_le_bytes());
        data.extend(2u32.to_le_bytes());
        data.extend([3, 0, 0]);
        data.extend(b"abc");
        // Rich text with one run
        data.extend([2, 0, 0x08, 1, 0]);
        data.extend(b"xy");
        data.extend([0, 0, 0, 0]);

        let sst = SharedStringTable::parse(vec![&data]).unwrap();
        assert_eq!(sst.strings, vec!["abc", "xy"]);
        assert_eq!(sst.get(1), Some("xy"));
        assert_eq!(sst.get(2), None);
    }

    #[test]
    fn test_sst_string_split_across_continue() {
        // "Hello" compressed in the SST, continued as UTF-16 after the split
        let mut sst = Vec::new();
        sst.extend(1u32.to_le_bytes());
        sst.extend(2u32.to_le_bytes());
        sst.extend([5, 0, 0]);
        sst.extend(b"Hel");
        let mut cont = vec![0x01];
        cont.extend([b'l', 0, b'o', 0]);
        // Next string starts directly, no option byte
        cont.extend([2, 0, 0]);
        cont.extend(b"ok");

        let table = SharedStringTable::parse(vec![&sst, &cont]).unwrap();
        assert_eq!(table.strings, vec!["Hello", "ok"]);
    }

    #[test]
    fn test_sst_header_at_boundary() {
        let mut sst = Vec::new();
        sst.extend(1u32.to_le_bytes());
        sst.extend(1u32.to_le_bytes());
        let mut cont = vec![2, 0, 0];
        cont.extend(b"hi");

        let table = SharedStringTable::parse(vec![&sst, &cont]).unwrap();
        assert_eq!(table.strings, vec!["hi"]);
    }

    #[test]
    fn test_dimensions_covering() {
        let dims = DimensionsRecord::covering([(4, 2), (10, 1), (7, 72)]);
        assert_eq!(
            dims,
            DimensionsRecord {
                first_row: 4,
                last_row: 11,
                first_col: 1,
                last_col: 73,
            }
        );
        assert_eq!(
            DimensionsRecord::covering(std::iter::empty()),
            DimensionsRecord::default()
        );
    }

    #[test]
    fn test_cell_records() {
        let sst = SharedStringTable {
            strings: vec!["Visa".to_string()],
        };

        let mut number = vec![3, 0, 1, 0, 15, 0];
        number.extend(25.5f64.to_le_bytes());
        let cells = parse_cell_record(rt::NUMBER, &number, &sst).unwrap();
        assert_eq!(cells[0].row, 3);
        assert_eq!(cells[0].col, 1);
        assert_eq!(cells[0].cell.value, Value::Number(25.5));

        let mut label_sst = vec![0, 0, 2, 0, 15, 0];
        label_sst.extend(0u32.to_le_bytes());
        let cells = parse_cell_record(rt::LABELSST, &label_sst, &sst).unwrap();
        assert_eq!(cells[0].cell.value, Value::Text("Visa".to_string()));

        let boolerr = [1, 0, 1, 0, 15, 0, 0x07, 1];
        let cells = parse_cell_record(rt::BOOLERR, &boolerr, &sst).unwrap();
        assert_eq!(cells[0].cell.value, Value::Text("#DIV/0!".to_string()));
    }

    #[test]
    fn test_mulrk_expands() {
        let mut data = vec![5, 0, 2, 0];
        for n in [1u32, 2] {
            data.extend(15u16.to_le_bytes());
            data.extend(((n << 2) | 0x02).to_le_bytes());
        }
        data.extend(3u16.to_le_bytes());

        assert_eq!(cell_span(rt::MULRK, &data).unwrap(), (5, 2, 3));
        let cells = parse_cell_record(rt::MULRK, &data, &SharedStringTable::default()).unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!((cells[1].col, cells[1].cell.value.clone()), (3, Value::Number(2.0)));
    }

    #[test]
    fn test_formula_cached_values() {
        let sst = SharedStringTable::default();
        let mut numeric = vec![0, 0, 0, 0, 15, 0];
        numeric.extend(7.0f64.to_le_bytes());
        numeric.extend([0; 6]);
        let cells = parse_cell_record(rt::FORMULA, &numeric, &sst).unwrap();
        assert!(cells[0].cell.is_formula);
        assert_eq!(cells[0].cell.value, Value::Number(7.0));

        let mut string = vec![0, 0, 0, 0, 15, 0];
        string.extend([0x00, 0, 0, 0, 0, 0, 0xFF, 0xFF]);
        string.extend([0; 6]);
        let cells = parse_cell_record(rt::FORMULA, &string, &sst).unwrap();
        assert!(cells[0].awaits_string);

        let mut boolean = vec![0, 0, 0, 0, 15, 0];
        boolean.extend([0x01, 0, 1, 0, 0, 0, 0xFF, 0xFF]);
        boolean.extend([0; 6]);
        let cells = parse_cell_record(rt::FORMULA, &boolean, &sst).unwrap();
        assert_eq!(cells[0].cell.value, Value::Bool(true));
    }
}
