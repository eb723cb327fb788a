//! Read-only BIFF8 workbook
//!
//! The workbook stream is parsed once, eagerly. The parsed [`Workbook`] owns
//! a copy of the stream so the writer can re-emit untouched records, and it
//! never mutates it: any number of workbooks may be opened over the same
//! container bytes.

use crate::common::binary;
use crate::common::{Error, Result};
use crate::ole::consts::{BOOK_STREAM, WORKBOOK_STREAM};
use crate::ole::file::OleFile;
use crate::ole::xls::cell::Value;
use crate::ole::xls::error::{XlsError, XlsResult};
use crate::ole::xls::format::FormatTable;
use crate::ole::xls::records::{
    self, BofRecord, BoundSheetRecord, ExtendedFormat, RecordIter, SharedStringTable, rt,
};
use crate::ole::xls::utils;
use crate::ole::xls::worksheet::Worksheet;

/// Parsed BIFF8 workbook
#[derive(Debug, Clone)]
pub struct Workbook {
    stream_name: String,
    stream: Vec<u8>,
    sheets: Vec<Worksheet>,
    formats: FormatTable,
    is_1904: bool,
    /// Offset just past the globals `EOF`
    globals_end: usize,
}

impl Workbook {
    /// Open the data stream of a compound container.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedContainer`] when the bytes are not a compound file,
    /// hold neither a `Workbook` nor a `Book` stream, or the stream is not a
    /// readable BIFF8 workbook.
    pub fn open(container: &[u8]) -> Result<Self> {
        let ole = OleFile::parse(container)?;
        for name in [WORKBOOK_STREAM, BOOK_STREAM] {
            if ole.exists(&[name]) {
                let stream = ole.open_stream(&[name])?;
                return Ok(Self::from_stream(name, stream)?);
            }
        }
        Err(Error::from(XlsError::MissingWorkbookStream))
    }

    /// Parse a bare workbook stream.
    pub fn from_stream(stream_name: impl Into<String>, stream: Vec<u8>) -> XlsResult<Self> {
        let mut formats = FormatTable::new();
        let mut is_1904 = false;
        let mut bound_sheets: Vec<(BoundSheetRecord, usize)> = Vec::new();
        let mut sst_parts: Vec<&[u8]> = Vec::new();
        let mut in_sst = false;
        let mut globals_end = None;

        for (index, record) in RecordIter::new(&stream).enumerate() {
            let record = record?;
            if index == 0 {
                if record.record_type != rt::BOF {
                    return Err(XlsError::UnexpectedRecordType {
                        expected: rt::BOF,
                        found: record.record_type,
                    });
                }
                let bof = BofRecord::parse(record.data)?;
                if !bof.is_biff8() {
                    return Err(XlsError::UnsupportedBiffVersion(bof.version));
                }
                continue;
            }

            if in_sst && record.record_type == rt::CONTINUE {
                sst_parts.push(record.data);
                continue;
            }
            in_sst = false;

            match record.record_type {
                rt::FILEPASS => return Err(XlsError::PasswordProtected),
                rt::DATEMODE => is_1904 = binary::read_u16_le(record.data, 0)? == 1,
                rt::FORMAT => {
                    let (ifmt, code) = records::parse_format(record.data)?;
                    formats.add_format(ifmt, code);
                },
                rt::XF => formats.push_xf(ExtendedFormat::parse(record.data)?.format_index),
                rt::BOUNDSHEET => {
                    bound_sheets.push((BoundSheetRecord::parse(record.data)?, record.offset + 4));
                },
                rt::SST => {
                    sst_parts.push(record.data);
                    in_sst = true;
                },
                rt::EOF => {
                    globals_end = Some(record.end());
                    break;
                },
                _ => {},
            }
        }

        let globals_end = globals_end.ok_or_else(|| {
            XlsError::UnexpectedEndOfStream("workbook globals have no EOF".to_string())
        })?;
        let sst = if sst_parts.is_empty() {
            SharedStringTable::default()
        } else {
            SharedStringTable::parse(sst_parts)?
        };

        let mut sheets = Vec::with_capacity(bound_sheets.len());
        for (bound, boundsheet_offset) in &bound_sheets {
            if (bound.position as usize) < globals_end {
                return Err(XlsError::InvalidRecord {
                    record_type: rt::BOUNDSHEET,
                    message: format!(
                        "sheet '{}' starts at {} inside the globals",
                        bound.name, bound.position
                    ),
                });
            }
            sheets.push(Worksheet::parse(&stream, bound, *boundsheet_offset, &sst)?);
        }

        log::debug!(
            "workbook stream: {} bytes, {} sheets, {} shared strings, {} XF records",
            stream.len(),
            sheets.len(),
            sst.strings.len(),
            formats.xf_count()
        );

        Ok(Workbook {
            stream_name: stream_name.into(),
            stream,
            sheets,
            formats,
            is_1904,
            globals_end,
        })
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheet_index(name).is_some()
    }

    pub(crate) fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|s| s.name() == name)
    }

    /// Look up a sheet by exact name
    pub fn sheet(&self, name: &str) -> Result<&Worksheet> {
        self.sheet_index(name)
            .map(|i| &self.sheets[i])
            .ok_or_else(|| Error::UnknownSheet(name.to_string()))
    }

    /// Value of a cell.
    ///
    /// Cells outside the grid or without a record read as `Empty`. Numbers
    /// whose format is a date format read as `Date`.
    pub fn cell(&self, sheet: &str, row: u32, col: u32) -> Result<Value> {
        let sheet = self.sheet(sheet)?;
        if row > utils::MAX_ROW || col > utils::MAX_COL {
            return Ok(Value::Empty);
        }
        Ok(sheet
            .cell(row as u16, col as u16)
            .map(|cell| self.present(cell.xf, &cell.value))
            .unwrap_or_default())
    }

    /// Turn a stored value into what callers see
    pub(crate) fn present(&self, xf: u16, value: &Value) -> Value {
        match value {
            Value::Number(n) if self.formats.is_date_xf(xf) => {
                utils::excel_date_to_datetime(*n, self.is_1904)
                    .map(Value::Date)
                    .unwrap_or(Value::Number(*n))
            },
            other => other.clone(),
        }
    }

    pub fn formats(&self) -> &FormatTable {
        &self.formats
    }

    /// Whether serial dates count from 1904
    pub fn is_1904(&self) -> bool {
        self.is_1904
    }

    /// The raw workbook stream
    pub fn stream(&self) -> &[u8] {
        &self.stream
    }

    /// Name the data stream was stored under
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    pub(crate) fn globals_end(&self) -> usize {
        self.globals_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::writer::OleWriter;
    use crate::ole::xls::records::BofRecord;

    fn record(record_type: u16, data: &[u8]) -> Vec<u8> {
        let mut out = record_type.to_le_bytes().to_vec();
        out.extend((data.len() as u16).to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    fn bof(kind: u16) -> Vec<u8> {
        let mut data = 0x0600u16.to_le_bytes().to_vec();
        data.extend(kind.to_le_bytes());
        data.extend([0; 12]);
        record(rt::BOF, &data)
    }

    fn xf(ifmt: u16) -> Vec<u8> {
        let mut data = vec![0, 0];
        data.extend(ifmt.to_le_bytes());
        data.extend([0; 16]);
        record(rt::XF, &data)
    }

    /// Globals with two XFs (General, then built-in date 14) and one sheet
    fn sample_stream() -> Vec<u8> {
        let mut globals = bof(BofRecord::GLOBALS);
        globals.extend(xf(0));
        globals.extend(xf(14));
        let mut sst = 1u32.to_le_bytes().to_vec();
        sst.extend(1u32.to_le_bytes());
        sst.extend([4, 0, 0]);
        sst.extend(b"Visa");
        globals.extend(record(rt::SST, &sst));
        let boundsheet_at = globals.len();
        let mut bound = 0u32.to_le_bytes().to_vec();
        bound.extend([0, 0, 4, 0]);
        bound.extend(b"jour");
        globals.extend(record(rt::BOUNDSHEET, &bound));
        globals.extend(record(rt::EOF, &[]));

        let position = globals.len() as u32;
        globals[boundsheet_at + 4..boundsheet_at + 8].copy_from_slice(&position.to_le_bytes());

        let mut sheet = bof(BofRecord::WORKSHEET);
        let mut number = vec![3, 0, 1, 0, 0, 0];
        number.extend(25.5f64.to_le_bytes());
        sheet.extend(record(rt::NUMBER, &number));
        let mut date = vec![4, 0, 1, 0, 1, 0];
        date.extend(45658.0f64.to_le_bytes());
        sheet.extend(record(rt::NUMBER, &date));
        let mut label = vec![5, 0, 1, 0, 0, 0];
        label.extend(0u32.to_le_bytes());
        sheet.extend(record(rt::LABELSST, &label));
        sheet.extend(record(rt::EOF, &[]));

        globals.extend(sheet);
        globals
    }

    #[test]
    fn test_read_cells() {
        let workbook = Workbook::from_stream("Workbook", sample_stream()).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["jour"]);
        assert!(workbook.has_sheet("jour"));
        assert!(!workbook.has_sheet("Jour"));
        assert_eq!(workbook.cell("jour", 3, 1).unwrap(), Value::Number(25.5));
        assert_eq!(workbook.cell("jour", 5, 1).unwrap(), Value::from("Visa"));

        let date = workbook.cell("jour", 4, 1).unwrap();
        assert_eq!(
            date,
            Value::from(chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
        );

        assert_eq!(workbook.cell("jour", 9, 9).unwrap(), Value::Empty);
        assert_eq!(workbook.cell("jour", 70_000, 300).unwrap(), Value::Empty);
        assert!(matches!(
            workbook.cell("Jour", 0, 0),
            Err(Error::UnknownSheet(_))
        ));
    }

    #[test]
    fn test_open_container() {
        let mut writer = OleWriter::new();
        writer.create_stream(&["Workbook"], &sample_stream()).unwrap();
        writer.create_storage(&["_VBA_PROJECT_CUR"]).unwrap();
        let bytes = writer.to_bytes().unwrap();

        let workbook = Workbook::open(&bytes).unwrap();
        assert_eq!(workbook.stream_name(), "Workbook");
        assert_eq!(workbook.cell("jour", 3, 1).unwrap(), Value::Number(25.5));

        // Two readers over the same buffer
        let other = Workbook::open(&bytes).unwrap();
        assert_eq!(other.stream(), workbook.stream());
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(
            Workbook::open(b"not a container"),
            Err(Error::MalformedContainer(_))
        ));

        let mut writer = OleWriter::new();
        writer.create_stream(&["Other"], b"data").unwrap();
        assert!(matches!(
            Workbook::open(&writer.to_bytes().unwrap()),
            Err(Error::MalformedContainer(_))
        ));

        let mut encrypted = bof(BofRecord::GLOBALS);
        encrypted.extend(record(rt::FILEPASS, &[0; 6]));
        encrypted.extend(record(rt::EOF, &[]));
        assert!(matches!(
            Workbook::from_stream("Workbook", encrypted),
            Err(XlsError::PasswordProtected)
        ));

        let mut biff5 = record(rt::BOF, &[0x00, 0x05, 0x05, 0x00, 0, 0, 0, 0]);
        biff5.extend(record(rt::EOF, &[]));
        assert!(matches!(
            Workbook::from_stream("Book", biff5),
            Err(XlsError::UnsupportedBiffVersion(0x0500))
        ));
    }
}
