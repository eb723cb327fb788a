//! Worksheet substreams
//!
//! A sheet is the run of records from its `BOF` to the matching `EOF`.
//! Embedded charts nest further `BOF`/`EOF` pairs inside it; only records at
//! the sheet's own depth are classified.

use std::collections::{BTreeMap, BTreeSet};

use crate::ole::xls::cell::Cell;
use crate::ole::xls::error::{XlsError, XlsResult};
use crate::ole::xls::records::{
    self, BofRecord, BoundSheetRecord, DimensionsRecord, RecordIter, SharedStringTable, SheetType, rt,
};

/// What a record does inside a sheet substream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    /// `ROW` record for the given row
    Row(u16),
    /// Cell record covering `first_col..=last_col` of `row`
    Cell { row: u16, first_col: u16, last_col: u16 },
    /// Record bound to the preceding cell (`STRING`, `SHRFMLA`, `ARRAY`,
    /// `TABLE` or `CONTINUE`)
    Trailer,
    DbCell,
    Index,
    Dimensions,
    /// The sheet's closing `EOF`
    Eof,
    Other,
}

/// A classified record, by absolute byte range in the workbook stream
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayoutRecord {
    pub role: Role,
    pub record_type: u16,
    pub start: usize,
    pub end: usize,
}

/// Walk a sheet substream from its `BOF` through the matching `EOF`.
pub(crate) fn scan_layout(stream: &[u8], bof_offset: usize) -> XlsResult<Vec<LayoutRecord>> {
    let mut layout = Vec::new();
    let mut depth = 0usize;

    for record in RecordIter::at(stream, bof_offset) {
        let record = record?;
        if layout.is_empty() && record.record_type != rt::BOF {
            return Err(XlsError::UnexpectedRecordType {
                expected: rt::BOF,
                found: record.record_type,
            });
        }

        let previous = layout.last().map(|r: &LayoutRecord| r.role);
        let role = match record.record_type {
            rt::BOF => {
                depth += 1;
                Role::Other
            },
            rt::EOF => {
                depth -= 1;
                if depth == 0 { Role::Eof } else { Role::Other }
            },
            _ if depth > 1 => Role::Other,
            rt::ROW => Role::Row(crate::common::binary::read_u16_le(record.data, 0)?),
            t if records::is_cell_record(t) => {
                let (row, first_col, last_col) = records::cell_span(t, record.data)?;
                Role::Cell {
                    row,
                    first_col,
                    last_col,
                }
            },
            rt::STRING | rt::SHRFMLA | rt::ARRAY | rt::TABLE | rt::CONTINUE
                if matches!(previous, Some(Role::Cell { .. } | Role::Trailer)) =>
            {
                Role::Trailer
            },
            rt::DBCELL => Role::DbCell,
            rt::INDEX => Role::Index,
            rt::DIMENSIONS => Role::Dimensions,
            _ => Role::Other,
        };

        layout.push(LayoutRecord {
            role,
            record_type: record.record_type,
            start: record.offset,
            end: record.end(),
        });
        if role == Role::Eof {
            return Ok(layout);
        }
    }

    Err(XlsError::UnexpectedEndOfStream(format!(
        "sheet at offset {} has no closing EOF",
        bof_offset
    )))
}

/// One sheet of a workbook
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    kind: SheetType,
    visibility: u8,
    /// Offset of the `BOUNDSHEET8` payload whose first field is `lbPlyPos`
    pub(crate) boundsheet_offset: usize,
    pub(crate) layout: Vec<LayoutRecord>,
    cells: BTreeMap<(u16, u16), Cell>,
    /// Formula cells followed by a `SHRFMLA`, `ARRAY` or `TABLE` record
    definition_anchors: BTreeSet<(u16, u16)>,
}

impl Worksheet {
    pub(crate) fn parse(
        stream: &[u8],
        bound: &BoundSheetRecord,
        boundsheet_offset: usize,
        sst: &SharedStringTable,
    ) -> XlsResult<Self> {
        let bof_offset = bound.position as usize;
        let layout = scan_layout(stream, bof_offset)?;

        let bof = BofRecord::parse(&stream[bof_offset + 4..layout[0].end])?;
        if !bof.is_biff8() {
            return Err(XlsError::UnsupportedBiffVersion(bof.version));
        }

        let mut cells = BTreeMap::new();
        let mut definition_anchors = BTreeSet::new();
        if bound.sheet_type == SheetType::WorkSheet {
            let mut pending_string: Option<(u16, u16)> = None;
            let mut last_cell: Option<(u16, u16)> = None;
            for item in &layout {
                let data = &stream[item.start + 4..item.end];
                match item.role {
                    Role::Cell {
                        row,
                        first_col,
                        last_col,
                    } => {
                        pending_string = None;
                        last_cell = (first_col == last_col).then_some((row, first_col));
                        for entry in records::parse_cell_record(item.record_type, data, sst)? {
                            if entry.awaits_string {
                                pending_string = Some((entry.row, entry.col));
                            }
                            cells.insert((entry.row, entry.col), entry.cell);
                        }
                    },
                    Role::Trailer if item.record_type == rt::STRING => {
                        if let Some(key) = pending_string.take()
                            && let Some(cell) = cells.get_mut(&key)
                        {
                            cell.value = records::parse_string_record(data)?.into();
                        }
                    },
                    Role::Trailer if matches!(item.record_type, rt::SHRFMLA | rt::ARRAY | rt::TABLE) => {
                        definition_anchors.extend(last_cell);
                    },
                    _ => {},
                }
            }
        }

        log::debug!(
            "sheet '{}': {} records, {} cells",
            bound.name,
            layout.len(),
            cells.len()
        );

        Ok(Worksheet {
            name: bound.name.clone(),
            kind: bound.sheet_type,
            visibility: bound.visibility,
            boundsheet_offset,
            layout,
            cells,
            definition_anchors,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SheetType {
        self.kind
    }

    /// Whether the sheet tab is shown
    pub fn is_visible(&self) -> bool {
        self.visibility == 0
    }

    /// Raw stored cell, if any record covers `(row, col)`
    pub fn cell(&self, row: u16, col: u16) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Stored cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = ((u16, u16), &Cell)> {
        self.cells.iter().map(|(&pos, cell)| (pos, cell))
    }

    /// Whether `(row, col)` holds a shared, array or table formula definition
    /// that other cells refer to
    pub fn anchors_definition(&self, row: u16, col: u16) -> bool {
        self.definition_anchors.contains(&(row, col))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Bounds of the stored cells
    pub fn dimensions(&self) -> DimensionsRecord {
        DimensionsRecord::covering(self.cells.keys().copied())
    }

    /// Absolute offset of the sheet's `BOF`
    pub fn bof_offset(&self) -> usize {
        self.layout.first().map_or(0, |r| r.start)
    }

    /// Absolute offset just past the sheet's `EOF`
    pub fn end_offset(&self) -> usize {
        self.layout.last().map_or(0, |r| r.end)
    }
}
