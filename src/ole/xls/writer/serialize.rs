//! Re-emission of a workbook stream with pending edits applied.
//!
//! Globals are copied verbatim. Each sheet substream is copied verbatim when
//! it has no edits (only its `INDEX` offsets move with it). An edited sheet
//! has its cell table rebuilt: untouched cells keep their record bytes,
//! edited cells get fresh records, rows are re-emitted in blocks of 32, and
//! `DIMENSIONS` is recomputed. `INDEX` and `DBCELL` are dropped since both are
//! optional and their offsets would no longer hold.

use std::collections::{BTreeMap, BTreeSet};

use super::biff::{self, DEFAULT_CELL_XF, RowRecord};
use super::shadow::Edit;
use crate::common::binary;
use crate::ole::xls::cell::Value;
use crate::ole::xls::error::{XlsError, XlsResult};
use crate::ole::xls::records::{DimensionsRecord, rt};
use crate::ole::xls::workbook::Workbook;
use crate::ole::xls::worksheet::{LayoutRecord, Role, Worksheet};

/// Rows per block of the cell table
const ROW_BLOCK: usize = 32;

pub(crate) fn serialize(
    source: &Workbook,
    edits: &BTreeMap<usize, BTreeMap<(u16, u16), Edit>>,
) -> XlsResult<Vec<u8>> {
    let stream = source.stream();
    let sheets = source.sheets();
    let mut out = Vec::with_capacity(stream.len() + 1024);
    out.extend_from_slice(&stream[..source.globals_end()]);

    let mut order: Vec<usize> = (0..sheets.len()).collect();
    order.sort_by_key(|&i| sheets[i].bof_offset());

    let mut positions = vec![0u32; sheets.len()];
    let mut cursor = source.globals_end();
    for index in order {
        let sheet = &sheets[index];
        let bof = sheet.bof_offset();
        if bof < cursor {
            return Err(XlsError::InvalidData(format!(
                "sheet '{}' overlaps the preceding substream",
                sheet.name()
            )));
        }
        out.extend_from_slice(&stream[cursor..bof]);
        positions[index] = to_u32(out.len())?;

        match edits.get(&index).filter(|e| !e.is_empty()) {
            Some(sheet_edits) => emit_edited(stream, sheet, sheet_edits, &mut out)?,
            None => emit_shifted(stream, sheet, out.len() as i64 - bof as i64, &mut out)?,
        }
        cursor = sheet.end_offset();
    }
    out.extend_from_slice(&stream[cursor..]);

    for (sheet, position) in sheets.iter().zip(&positions) {
        let at = sheet.boundsheet_offset;
        out[at..at + 4].copy_from_slice(&position.to_le_bytes());
    }

    log::debug!(
        "serialized workbook stream: {} -> {} bytes, {} edited sheets",
        stream.len(),
        out.len(),
        edits.values().filter(|e| !e.is_empty()).count()
    );
    Ok(out)
}

fn to_u32(value: usize) -> XlsResult<u32> {
    u32::try_from(value)
        .map_err(|_| XlsError::InvalidData(format!("stream offset {} exceeds 4 GiB", value)))
}

fn shift(offset: u32, delta: i64) -> XlsResult<u32> {
    u32::try_from(offset as i64 + delta)
        .map_err(|_| XlsError::InvalidData(format!("offset {} cannot move by {}", offset, delta)))
}

/// Copy an unedited sheet, moving its `INDEX` offsets by `delta`
fn emit_shifted(stream: &[u8], sheet: &Worksheet, delta: i64, out: &mut Vec<u8>) -> XlsResult<()> {
    for item in &sheet.layout {
        let bytes = &stream[item.start..item.end];
        if item.role != Role::Index || delta == 0 {
            out.extend_from_slice(bytes);
            continue;
        }

        let mut patched = bytes.to_vec();
        let data = &mut patched[4..];
        if data.len() >= 16 {
            let def_col_width = binary::read_u32_le(data, 12)?;
            if def_col_width != 0 {
                data[12..16].copy_from_slice(&shift(def_col_width, delta)?.to_le_bytes());
            }
            for at in (16..data.len().saturating_sub(3)).step_by(4) {
                let dbcell = binary::read_u32_le(data, at)?;
                data[at..at + 4].copy_from_slice(&shift(dbcell, delta)?.to_le_bytes());
            }
        }
        out.extend_from_slice(&patched);
    }
    Ok(())
}

/// One entry of the rebuilt cell table
enum Slot<'a> {
    /// Original record bytes with their trailers
    Kept { bytes: &'a [u8], last_col: u16 },
    /// Freshly emitted record bytes
    Built(Vec<u8>),
}

impl Slot<'_> {
    fn bytes(&self) -> &[u8] {
        match self {
            Slot::Kept { bytes, .. } => bytes,
            Slot::Built(bytes) => bytes,
        }
    }
}

/// A cell record and the records bound to it
struct CellGroup<'a> {
    head: &'a LayoutRecord,
    row: u16,
    first_col: u16,
    last_col: u16,
    trailers: Vec<&'a LayoutRecord>,
}

impl CellGroup<'_> {
    fn end(&self) -> usize {
        self.trailers.last().map_or(self.head.end, |t| t.end)
    }
}

fn emit_edited(
    stream: &[u8],
    sheet: &Worksheet,
    edits: &BTreeMap<(u16, u16), Edit>,
    out: &mut Vec<u8>,
) -> XlsResult<()> {
    let layout = &sheet.layout;

    let mut groups: Vec<CellGroup<'_>> = Vec::new();
    let mut rows: BTreeMap<u16, RowRecord> = BTreeMap::new();
    for item in layout {
        match item.role {
            Role::Cell {
                row,
                first_col,
                last_col,
            } => groups.push(CellGroup {
                head: item,
                row,
                first_col,
                last_col,
                trailers: Vec::new(),
            }),
            Role::Trailer => {
                if let Some(group) = groups.last_mut() {
                    group.trailers.push(item);
                }
            },
            Role::Row(row) => {
                rows.insert(row, RowRecord::parse(&stream[item.start + 4..item.end])?);
            },
            _ => {},
        }
    }

    let mut slots: BTreeMap<(u16, u16), Slot<'_>> = BTreeMap::new();
    for group in &groups {
        let touched = edits
            .range((group.row, group.first_col)..=(group.row, group.last_col))
            .next()
            .is_some();

        if !touched {
            slots.insert(
                (group.row, group.first_col),
                Slot::Kept {
                    bytes: &stream[group.head.start..group.end()],
                    last_col: group.last_col,
                },
            );
            continue;
        }

        // A single edited cell is rebuilt from its edit below. Anchors of
        // formula definitions are never edited, so only a cached `STRING`
        // is lost with it.
        if group.first_col != group.last_col {
            split_multi(stream, group, &mut slots)?;
        }
    }

    for (&(row, col), edit) in edits {
        let xf = sheet.cell(row, col).map_or(DEFAULT_CELL_XF, |c| c.xf);
        let mut bytes = Vec::new();
        match edit {
            Edit::Set(Value::Number(n)) => biff::write_number(&mut bytes, row as u32, col, xf, *n)?,
            Edit::Set(Value::Text(text)) => biff::write_label(&mut bytes, row as u32, col, xf, text)?,
            Edit::Set(Value::Bool(b)) => biff::write_boolerr(&mut bytes, row as u32, col, xf, *b)?,
            Edit::Set(other) => {
                return Err(XlsError::InvalidData(format!(
                    "cannot store {:?} as a raw cell value",
                    other
                )));
            },
            Edit::Clear => biff::write_blank(&mut bytes, row as u32, col, xf)?,
        }
        slots.insert((row, col), Slot::Built(bytes));
    }

    // Column spans per row, last column exclusive
    let mut spans: BTreeMap<u16, (u16, u16)> = BTreeMap::new();
    for (&(row, col), slot) in &slots {
        let last = match slot {
            Slot::Kept { last_col, .. } => *last_col,
            Slot::Built(_) => col,
        };
        let span = spans.entry(row).or_insert((col, last + 1));
        span.0 = span.0.min(col);
        span.1 = span.1.max(last + 1);
    }
    for (&row, &(first, last)) in &spans {
        rows.entry(row)
            .or_insert_with(|| RowRecord::new(row))
            .set_columns(first, last);
    }

    let dimensions = DimensionsRecord::covering(spans.iter().flat_map(|(&row, &(first, last))| {
        [(row, first), (row, last - 1)]
    }));

    let anchor = layout
        .iter()
        .position(|r| matches!(r.role, Role::Row(_) | Role::Cell { .. } | Role::DbCell))
        .or_else(|| {
            layout
                .iter()
                .position(|r| r.role == Role::Dimensions)
                .map(|i| i + 1)
        })
        .unwrap_or(layout.len() - 1);

    for (i, item) in layout.iter().enumerate() {
        if i == anchor {
            emit_cell_table(&rows, &slots, out)?;
        }
        match item.role {
            Role::Row(_) | Role::Cell { .. } | Role::Trailer | Role::DbCell | Role::Index => {},
            Role::Dimensions => biff::write_dimensions(out, &dimensions)?,
            Role::Eof | Role::Other => out.extend_from_slice(&stream[item.start..item.end]),
        }
    }

    log::debug!(
        "sheet '{}': rebuilt {} rows, {} cell slots, {} edits",
        sheet.name(),
        rows.len(),
        slots.len(),
        edits.len()
    );
    Ok(())
}

/// Break a `MULRK`/`MULBLANK` into one `RK`/`BLANK` per column
fn split_multi<'a>(
    stream: &'a [u8],
    group: &CellGroup<'a>,
    slots: &mut BTreeMap<(u16, u16), Slot<'a>>,
) -> XlsResult<()> {
    let data = &stream[group.head.start + 4..group.head.end];
    for (i, col) in (group.first_col..=group.last_col).enumerate() {
        let mut bytes = Vec::new();
        match group.head.record_type {
            rt::MULRK => {
                let at = 4 + i * 6;
                let xf = binary::read_u16_le(data, at)?;
                let rk = binary::read_u32_le(data, at + 2)?;
                biff::write_rk(&mut bytes, group.row as u32, col, xf, rk)?;
            },
            rt::MULBLANK => {
                let xf = binary::read_u16_le(data, 4 + i * 2)?;
                biff::write_blank(&mut bytes, group.row as u32, col, xf)?;
            },
            other => {
                return Err(XlsError::InvalidRecord {
                    record_type: other,
                    message: "multi-column span on a single-cell record".to_string(),
                });
            },
        }
        slots.insert((group.row, col), Slot::Built(bytes));
    }
    Ok(())
}

/// Rows in blocks of 32: the block's `ROW` records, then its cells
fn emit_cell_table(
    rows: &BTreeMap<u16, RowRecord>,
    slots: &BTreeMap<(u16, u16), Slot<'_>>,
    out: &mut Vec<u8>,
) -> XlsResult<()> {
    let all_rows: BTreeSet<u16> = rows
        .keys()
        .copied()
        .chain(slots.keys().map(|&(row, _)| row))
        .collect();
    let all_rows: Vec<u16> = all_rows.into_iter().collect();

    for block in all_rows.chunks(ROW_BLOCK) {
        for row in block {
            if let Some(record) = rows.get(row) {
                biff::write_row(out, record)?;
            }
        }
        let (first, last) = (block[0], block[block.len() - 1]);
        for (_, slot) in slots.range((first, 0)..=(last, u16::MAX)) {
            out.extend_from_slice(slot.bytes());
        }
    }
    Ok(())
}
