//! Shadow copy of a workbook that accumulates cell mutations.
//!
//! The source [`Workbook`] is never touched. Mutations are kept as a sparse
//! edit list per sheet and only turned into records by
//! [`ShadowWorkbook::serialize`].

use std::collections::BTreeMap;
use std::sync::Arc;

use super::biff::DEFAULT_CELL_XF;
use super::coerce::{self, Coerced, CoercionWarning};
use crate::common::{Error, Result};
use crate::ole::xls::cell::Value;
use crate::ole::xls::records::SheetType;
use crate::ole::xls::utils;
use crate::ole::xls::workbook::Workbook;

/// Maps a semantic field name of a sheet to a zero-based `(row, col)`.
pub trait FieldResolver {
    fn resolve(&self, sheet: &str, field: &str) -> Result<(u32, u32)>;
}

/// A pending change to one cell
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Edit {
    /// Store a raw value (never `Empty` or `Date`)
    Set(Value),
    /// Blank the cell, keeping its XF
    Clear,
}

/// A write that passed validation and can be applied without failing
struct Prepared {
    sheet: usize,
    row: u16,
    col: u16,
    value: Value,
    warning: Option<CoercionWarning>,
}

/// Writable view over a [`Workbook`].
///
/// ```no_run
/// use std::sync::Arc;
/// use rj_engine::ole::xls::{ShadowWorkbook, Workbook};
///
/// # fn main() -> rj_engine::common::Result<()> {
/// let bytes = std::fs::read("rj.xls")?;
/// let workbook = Arc::new(Workbook::open(&bytes)?);
/// let mut shadow = ShadowWorkbook::new(workbook);
/// shadow.write("controle", 2, 1, "7")?;
/// let stream = shadow.serialize()?;
/// # let _ = stream;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ShadowWorkbook {
    source: Arc<Workbook>,
    pub(crate) edits: BTreeMap<usize, BTreeMap<(u16, u16), Edit>>,
    warnings: Vec<CoercionWarning>,
}

impl ShadowWorkbook {
    pub fn new(source: Arc<Workbook>) -> Self {
        ShadowWorkbook {
            source,
            edits: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    /// The unmodified source workbook
    pub fn workbook(&self) -> &Workbook {
        &self.source
    }

    /// Write a value.
    ///
    /// `Empty` and `""` are no-ops, as is writing the value the cell already
    /// holds. Plain decimal text is stored as a number. Returns whether the
    /// cell's pending content changed.
    ///
    /// # Errors
    ///
    /// `UnknownSheet`, `CellOutOfBounds`, or `InvalidArgument` for text over
    /// 255 characters, non-finite numbers, non-worksheet targets and cells
    /// anchoring a shared, array or table formula.
    pub fn write(&mut self, sheet: &str, row: u32, col: u32, value: impl Into<Value>) -> Result<bool> {
        match self.prepare(sheet, row, col, value.into())? {
            Some(prepared) => Ok(self.apply(&prepared)),
            None => Ok(false),
        }
    }

    /// Blank a cell, keeping its format.
    ///
    /// A cell with no content is left alone. Returns whether anything changed.
    /// Anchors of shared, array or table formulas cannot be cleared.
    pub fn clear(&mut self, sheet: &str, row: u32, col: u32) -> Result<bool> {
        let (index, row, col) = self.locate_clearable(sheet, row, col)?;
        let original = self.source.sheets()[index].cell(row, col);
        let originally_empty = original.is_none_or(|c| c.value.is_empty());

        let edits = self.edits.entry(index).or_default();
        let changed = if originally_empty {
            edits.remove(&(row, col)).is_some()
        } else {
            edits.insert((row, col), Edit::Clear) != Some(Edit::Clear)
        };
        if edits.is_empty() {
            self.edits.remove(&index);
        }
        Ok(changed)
    }

    /// Value a read would return after serialization
    pub fn current(&self, sheet: &str, row: u32, col: u32) -> Result<Value> {
        let (index, r, c) = self.locate(sheet, row, col)?;
        match self.edits.get(&index).and_then(|e| e.get(&(r, c))) {
            Some(Edit::Set(value)) => {
                let xf = self.source.sheets()[index]
                    .cell(r, c)
                    .map_or(DEFAULT_CELL_XF, |cell| cell.xf);
                Ok(self.source.present(xf, value))
            },
            Some(Edit::Clear) => Ok(Value::Empty),
            None => self.source.cell(sheet, row, col),
        }
    }

    /// Write every field of `values` at the address `resolver` gives it.
    ///
    /// All fields are resolved and all values validated before the first
    /// cell changes; on error nothing is applied. Empty values are skipped.
    /// Returns the number of cells whose content changed.
    pub fn fill_by_address_map<R, I, K, V>(&mut self, resolver: &R, sheet: &str, values: I) -> Result<usize>
    where
        R: FieldResolver + ?Sized,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.sheet_index(sheet)?;
        let mut addressed = Vec::new();
        for (field, value) in values {
            let (row, col) = resolver.resolve(sheet, field.as_ref())?;
            addressed.push((row, col, value.into()));
        }
        self.write_cells(sheet, addressed)
    }

    /// Write several cells of one sheet.
    ///
    /// Same rules as [`write`](Self::write), but every write is validated
    /// before the first one is applied. Returns the number of cells whose
    /// content changed.
    pub fn write_cells<I, V>(&mut self, sheet: &str, cells: I) -> Result<usize>
    where
        I: IntoIterator<Item = (u32, u32, V)>,
        V: Into<Value>,
    {
        self.sheet_index(sheet)?;
        let mut prepared = Vec::new();
        for (row, col, value) in cells {
            if let Some(p) = self.prepare(sheet, row, col, value.into())? {
                prepared.push(p);
            }
        }
        Ok(prepared.into_iter().filter(|p| self.apply(p)).count())
    }

    /// Overwrite several cells of one sheet, blanking those given an empty
    /// value.
    ///
    /// Every write and every blanked address is validated before the first
    /// cell changes. Returns the number of cells whose content changed.
    pub fn replace_cells<I, V>(&mut self, sheet: &str, cells: I) -> Result<usize>
    where
        I: IntoIterator<Item = (u32, u32, V)>,
        V: Into<Value>,
    {
        self.sheet_index(sheet)?;
        let mut prepared = Vec::new();
        let mut blanks = Vec::new();
        for (row, col, value) in cells {
            let value = value.into();
            if value.is_empty() {
                self.locate_clearable(sheet, row, col)?;
                blanks.push((row, col));
            } else if let Some(p) = self.prepare(sheet, row, col, value)? {
                prepared.push(p);
            }
        }

        let mut changed = prepared.into_iter().filter(|p| self.apply(p)).count();
        for (row, col) in blanks {
            if self.clear(sheet, row, col)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Blank several cells of one sheet after checking every address.
    ///
    /// Returns the number of cells whose content changed.
    pub fn clear_cells<I>(&mut self, sheet: &str, cells: I) -> Result<usize>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let cells: Vec<(u32, u32)> = cells.into_iter().collect();
        for &(row, col) in &cells {
            self.locate_clearable(sheet, row, col)?;
        }
        let mut changed = 0;
        for (row, col) in cells {
            if self.clear(sheet, row, col)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Numeric-looking strings that were stored as text
    pub fn warnings(&self) -> &[CoercionWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<CoercionWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Whether any cell differs from the source
    pub fn is_modified(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Number of cells with a pending change
    pub fn pending_count(&self) -> usize {
        self.edits.values().map(BTreeMap::len).sum()
    }

    /// Serialize a complete workbook stream reflecting every mutation.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(super::serialize::serialize(&self.source, &self.edits)?)
    }

    fn sheet_index(&self, sheet: &str) -> Result<usize> {
        self.source
            .sheet_index(sheet)
            .ok_or_else(|| Error::UnknownSheet(sheet.to_string()))
    }

    fn locate(&self, sheet: &str, row: u32, col: u32) -> Result<(usize, u16, u16)> {
        let index = self.sheet_index(sheet)?;
        if row > utils::MAX_ROW || col > utils::MAX_COL {
            return Err(Error::CellOutOfBounds {
                sheet: sheet.to_string(),
                row,
                col,
            });
        }
        if self.source.sheets()[index].kind() != SheetType::WorkSheet {
            return Err(Error::InvalidArgument(format!(
                "sheet '{}' is not a worksheet",
                sheet
            )));
        }
        Ok((index, row as u16, col as u16))
    }

    fn locate_clearable(&self, sheet: &str, row: u32, col: u32) -> Result<(usize, u16, u16)> {
        let (index, r, c) = self.locate(sheet, row, col)?;
        let has_content = self.source.sheets()[index]
            .cell(r, c)
            .is_some_and(|cell| !cell.value.is_empty());
        if has_content {
            self.check_definition_anchor(index, sheet, r, c)?;
        }
        Ok((index, r, c))
    }

    /// A definition anchor must stay the formula record its definition follows
    fn check_definition_anchor(&self, index: usize, sheet: &str, row: u16, col: u16) -> Result<()> {
        if self.source.sheets()[index].anchors_definition(row, col) {
            return Err(Error::InvalidArgument(format!(
                "{}!{} anchors a shared formula definition",
                sheet,
                utils::cell_reference(row.into(), col.into())
            )));
        }
        Ok(())
    }

    /// Validate and coerce one write without mutating anything
    fn prepare(&self, sheet: &str, row: u32, col: u32, value: Value) -> Result<Option<Prepared>> {
        let (index, r, c) = self.locate(sheet, row, col)?;
        if value.is_empty() {
            return Ok(None);
        }

        let mut warning = None;
        let raw = match value {
            Value::Text(text) => match coerce::coerce_text(&text) {
                Coerced::Number(n) => Value::Number(n),
                Coerced::Text { ambiguous } => {
                    if text.encode_utf16().count() > 255 {
                        return Err(Error::InvalidArgument(format!(
                            "text for {}!{} is longer than 255 characters",
                            sheet,
                            utils::cell_reference(row, col)
                        )));
                    }
                    if ambiguous {
                        warning = Some(CoercionWarning {
                            sheet: sheet.to_string(),
                            row,
                            col,
                            text: text.clone(),
                        });
                    }
                    Value::Text(text)
                },
            },
            Value::Date(date) => Value::Number(utils::datetime_to_excel_date(date, self.source.is_1904())),
            other => other,
        };
        if let Value::Number(n) = raw
            && !n.is_finite()
        {
            return Err(Error::InvalidArgument(format!(
                "{} cannot be stored at {}!{}",
                n,
                sheet,
                utils::cell_reference(row, col)
            )));
        }

        let unchanged = self.source.sheets()[index]
            .cell(r, c)
            .is_some_and(|cell| cell.value == raw);
        if !unchanged {
            self.check_definition_anchor(index, sheet, r, c)?;
        }

        Ok(Some(Prepared {
            sheet: index,
            row: r,
            col: c,
            value: raw,
            warning,
        }))
    }

    fn apply(&mut self, p: &Prepared) -> bool {
        if let Some(warning) = &p.warning {
            log::warn!("{}", warning);
            self.warnings.push(warning.clone());
        }

        let original = self.source.sheets()[p.sheet]
            .cell(p.row, p.col)
            .map(|cell| &cell.value);
        let edits = self.edits.entry(p.sheet).or_default();

        let changed = if original == Some(&p.value) {
            edits.remove(&(p.row, p.col)).is_some()
        } else {
            let edit = Edit::Set(p.value.clone());
            edits.insert((p.row, p.col), edit.clone()) != Some(edit)
        };
        if edits.is_empty() {
            self.edits.remove(&p.sheet);
        }
        changed
    }
}
