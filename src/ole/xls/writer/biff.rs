//! BIFF8 record emitters
//!
//! Each BIFF record is a 4-byte header (type, payload length) followed by the
//! payload. Only the records the shadow writer creates are emitted here;
//! everything else is copied from the source stream as-is.
//!
//! Based on "[MS-XLS]: Excel Binary File Format (.xls) Structure".

use crate::ole::xls::records::{DimensionsRecord, rt};
use crate::ole::xls::utils;
use crate::ole::xls::{XlsError, XlsResult};
use std::io::Write;
use zerocopy::{FromBytes, IntoBytes, LE, U16, U32};

/// Largest record payload BIFF8 allows
pub(crate) const MAX_RECORD_DATA: usize = 8224;

/// XF index of the default cell format
pub(crate) const DEFAULT_CELL_XF: u16 = 15;

/// Write a BIFF record header
#[inline]
pub(crate) fn write_record_header<W: Write>(
    writer: &mut W,
    record_type: u16,
    data_len: u16,
) -> XlsResult<()> {
    writer.write_all(&record_type.to_le_bytes())?;
    writer.write_all(&data_len.to_le_bytes())?;
    Ok(())
}

/// Write a complete record from its payload
pub(crate) fn write_record<W: Write>(writer: &mut W, record_type: u16, data: &[u8]) -> XlsResult<()> {
    if data.len() > MAX_RECORD_DATA {
        return Err(XlsError::InvalidRecord {
            record_type,
            message: format!("payload of {} bytes exceeds {}", data.len(), MAX_RECORD_DATA),
        });
    }
    write_record_header(writer, record_type, data.len() as u16)?;
    writer.write_all(data)?;
    Ok(())
}

fn row_index(row: u32, record: &str) -> XlsResult<u16> {
    u16::try_from(row).map_err(|_| {
        XlsError::InvalidData(format!(
            "Row index {} exceeds BIFF8 limit 65535 for {} record",
            row, record
        ))
    })
}

/// Cell header shared by every cell record: row, column, XF
fn cell_prefix(row: u16, col: u16, xf_index: u16) -> Vec<u8> {
    let mut data = Vec::with_capacity(16);
    data.extend_from_slice(&row.to_le_bytes());
    data.extend_from_slice(&col.to_le_bytes());
    data.extend_from_slice(&xf_index.to_le_bytes());
    data
}

/// Write NUMBER record (IEEE double)
///
/// Record type: 0x0203
pub fn write_number<W: Write>(
    writer: &mut W,
    row: u32,
    col: u16,
    xf_index: u16,
    value: f64,
) -> XlsResult<()> {
    let mut data = cell_prefix(row_index(row, "NUMBER")?, col, xf_index);
    data.extend_from_slice(&value.to_le_bytes());
    write_record(writer, rt::NUMBER, &data)
}

/// Write RK record (packed 30-bit number)
///
/// Record type: 0x027E
pub fn write_rk<W: Write>(writer: &mut W, row: u32, col: u16, xf_index: u16, rk: u32) -> XlsResult<()> {
    let mut data = cell_prefix(row_index(row, "RK")?, col, xf_index);
    data.extend_from_slice(&rk.to_le_bytes());
    write_record(writer, rt::RK, &data)
}

/// Write LABEL record (inline string, no SST entry)
///
/// Record type: 0x0204
pub fn write_label<W: Write>(
    writer: &mut W,
    row: u32,
    col: u16,
    xf_index: u16,
    value: &str,
) -> XlsResult<()> {
    let mut data = cell_prefix(row_index(row, "LABEL")?, col, xf_index);
    if value.encode_utf16().count() > 255 {
        return Err(XlsError::InvalidData(format!(
            "LABEL text of {} characters exceeds 255",
            value.chars().count()
        )));
    }
    utils::encode_unicode_string(value, &mut data);
    write_record(writer, rt::LABEL, &data)
}

/// Write LABELSST record (index into the shared string table)
///
/// Record type: 0x00FD
pub fn write_labelsst<W: Write>(
    writer: &mut W,
    row: u32,
    col: u16,
    xf_index: u16,
    sst_index: u32,
) -> XlsResult<()> {
    let mut data = cell_prefix(row_index(row, "LABELSST")?, col, xf_index);
    data.extend_from_slice(&sst_index.to_le_bytes());
    write_record(writer, rt::LABELSST, &data)
}

/// Write BLANK record (formatted empty cell)
///
/// Record type: 0x0201
pub fn write_blank<W: Write>(writer: &mut W, row: u32, col: u16, xf_index: u16) -> XlsResult<()> {
    let data = cell_prefix(row_index(row, "BLANK")?, col, xf_index);
    write_record(writer, rt::BLANK, &data)
}

/// Write BOOLERR record holding a boolean
///
/// Record type: 0x0205
pub fn write_boolerr<W: Write>(
    writer: &mut W,
    row: u32,
    col: u16,
    xf_index: u16,
    value: bool,
) -> XlsResult<()> {
    let mut data = cell_prefix(row_index(row, "BOOLERR")?, col, xf_index);
    // Value, then the is-error flag
    data.extend_from_slice(&[u8::from(value), 0x00]);
    write_record(writer, rt::BOOLERR, &data)
}

/// Write DIMENSIONS record (BIFF8 layout, 14 bytes)
///
/// Record type: 0x0200
pub fn write_dimensions<W: Write>(writer: &mut W, dims: &DimensionsRecord) -> XlsResult<()> {
    let mut data = Vec::with_capacity(14);
    data.extend_from_slice(&dims.first_row.to_le_bytes());
    data.extend_from_slice(&dims.last_row.to_le_bytes());
    data.extend_from_slice(&dims.first_col.to_le_bytes());
    data.extend_from_slice(&dims.last_col.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    write_record(writer, rt::DIMENSIONS, &data)
}

/// Payload of a ROW record
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    zerocopy_derive::FromBytes,
    zerocopy_derive::IntoBytes,
    zerocopy_derive::Immutable,
    zerocopy_derive::KnownLayout,
)]
#[repr(C)]
pub(crate) struct RowRecord {
    row: U16<LE>,
    first_col: U16<LE>,
    /// Last used column plus one
    last_col: U16<LE>,
    height: U16<LE>,
    reserved: U16<LE>,
    unused: U16<LE>,
    flags: U32<LE>,
}

impl RowRecord {
    /// Default row: height 255 twips, XF 15, reserved bit 8 set
    pub(crate) fn new(row: u16) -> Self {
        RowRecord {
            row: U16::new(row),
            first_col: U16::new(0),
            last_col: U16::new(0),
            height: U16::new(0x00FF),
            reserved: U16::new(0),
            unused: U16::new(0),
            flags: U32::new(0x000F_0100),
        }
    }

    pub(crate) fn parse(data: &[u8]) -> XlsResult<Self> {
        Self::read_from_bytes(data).map_err(|_| XlsError::InvalidLength {
            expected: 16,
            found: data.len(),
        })
    }

    pub(crate) fn row(&self) -> u16 {
        self.row.get()
    }

    pub(crate) fn columns(&self) -> (u16, u16) {
        (self.first_col.get(), self.last_col.get())
    }

    /// Set the used column span; `last_col` is exclusive
    pub(crate) fn set_columns(&mut self, first_col: u16, last_col: u16) {
        self.first_col = U16::new(first_col);
        self.last_col = U16::new(last_col);
    }
}

/// Write ROW record
///
/// Record type: 0x0208
pub(crate) fn write_row<W: Write>(writer: &mut W, row: &RowRecord) -> XlsResult<()> {
    write_record(writer, rt::ROW, row.as_bytes())
}
