//! Caller-owned handle over one RJ document.
//!
//! A [`DocumentSession`] owns the original container bytes, the workbook
//! parsed from them and the shadow copy collecting this cycle's writes. It is
//! meant for a single read-modify-write cycle: open, read, fill, run macros,
//! [`export`](DocumentSession::export), then drop it. Nothing is shared
//! between sessions except the immutable catalogue.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalogue::{Catalogue, sheet};
use super::macros::{self, DueBackLine, FillReport, MacroReport};
use super::matcher::NameMatcher;
use crate::common::{Error, Result};
use crate::ole::xls::{ShadowWorkbook, Value, Workbook, utils};
use crate::ole::{RebuildOptions, rebuild_with};

/// One receptionist's due-back amounts for a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueBackEntry {
    pub receptionist: String,
    /// Column letters on the due-back sheet
    pub column: String,
    pub balance: Value,
    pub operations: Value,
}

/// Due-back roster of a day, in column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueBackDay {
    pub day: u32,
    pub entries: Vec<DueBackEntry>,
}

/// An open RJ document.
///
/// ```no_run
/// use rj_engine::rj::DocumentSession;
///
/// # fn main() -> rj_engine::Result<()> {
/// let mut session = DocumentSession::open("RJ 2026-01.xls")?;
/// session.update_controle(15, 1, 2026)?;
/// let report = session.propagate_summary_to_ledger(15)?;
/// println!("{} ledger cells updated", report.written);
/// session.save("RJ 2026-01 (15).xls")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DocumentSession {
    original: Vec<u8>,
    shadow: ShadowWorkbook,
    catalogue: Arc<Catalogue>,
    matcher: NameMatcher,
    options: RebuildOptions,
}

impl DocumentSession {
    /// Open a document from a path with the builtin catalogue.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        log::debug!("opening '{}' ({} bytes)", path.as_ref().display(), bytes.len());
        Self::from_bytes(bytes)
    }

    /// Open a document from its container bytes with the builtin catalogue.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::with_catalogue(bytes, Catalogue::builtin()?)
    }

    pub fn with_catalogue(bytes: Vec<u8>, catalogue: Arc<Catalogue>) -> Result<Self> {
        let workbook = Workbook::open(&bytes)?;
        log::debug!(
            "session over '{}' stream: {} sheets",
            workbook.stream_name(),
            workbook.sheets().len()
        );
        Ok(DocumentSession {
            original: bytes,
            shadow: ShadowWorkbook::new(Arc::new(workbook)),
            catalogue,
            matcher: NameMatcher::default(),
            options: RebuildOptions::default(),
        })
    }

    /// Use another matcher for personnel propagation
    pub fn with_matcher(mut self, matcher: NameMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_rebuild_options(mut self, options: RebuildOptions) -> Self {
        self.options = options;
        self
    }

    /// The workbook as it was opened
    pub fn workbook(&self) -> &Workbook {
        self.shadow.workbook()
    }

    pub fn shadow(&self) -> &ShadowWorkbook {
        &self.shadow
    }

    pub fn shadow_mut(&mut self) -> &mut ShadowWorkbook {
        &mut self.shadow
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// The container bytes the session was opened from
    pub fn original(&self) -> &[u8] {
        &self.original
    }

    /// Current value of a cell, pending writes included
    pub fn read(&self, sheet: &str, row: u32, col: u32) -> Result<Value> {
        self.shadow.current(sheet, row, col)
    }

    /// Current value of a named field
    pub fn read_field(&self, sheet: &str, field: &str) -> Result<Value> {
        let (row, col) = self.catalogue.resolve(sheet, field)?;
        self.read(sheet, row, col)
    }

    /// Every catalogued field of a sheet.
    ///
    /// Fails with `UnknownSheet` when the catalogue has no field table for
    /// the sheet or the workbook lacks it.
    pub fn read_fields(&self, sheet: &str) -> Result<BTreeMap<String, Value>> {
        let fields = self
            .catalogue
            .fields(sheet)
            .ok_or_else(|| Error::UnknownSheet(sheet.to_string()))?;
        let mut values = BTreeMap::new();
        for (field, &(row, col)) in fields {
            values.insert(field.clone(), self.read(sheet, row, col)?);
        }
        Ok(values)
    }

    /// Receptionist roster with the balance and operations amounts of a day
    pub fn read_due_back(&self, day: u32) -> Result<DueBackDay> {
        let (balance_row, operations_row) = self.catalogue.day_rows(sheet::DUBACK, day)?;
        let mut roster: Vec<(&String, u32)> = self
            .catalogue
            .registry(sheet::DUBACK)
            .map(|registry| registry.iter().map(|(name, &col)| (name, col)).collect())
            .unwrap_or_default();
        roster.sort_by_key(|&(_, col)| col);

        let mut entries = Vec::with_capacity(roster.len());
        for (name, col) in roster {
            entries.push(DueBackEntry {
                receptionist: name.clone(),
                column: utils::column_letter(col),
                balance: self.read(sheet::DUBACK, balance_row, col)?,
                operations: self.read(sheet::DUBACK, operations_row, col)?,
            });
        }
        Ok(DueBackDay { day, entries })
    }

    /// Write one cell
    pub fn write(&mut self, sheet: &str, row: u32, col: u32, value: impl Into<Value>) -> Result<bool> {
        self.shadow.write(sheet, row, col, value)
    }

    /// Write named fields of a sheet; nothing is written if any field is
    /// unknown.
    pub fn fill_fields<I, K, V>(&mut self, sheet: &str, values: I) -> Result<FillReport>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let before = self.shadow.warnings().len();
        let written = self
            .shadow
            .fill_by_address_map(self.catalogue.as_ref(), sheet, values)?;
        Ok(FillReport {
            sheet: sheet.to_string(),
            written,
            warnings: self.shadow.warnings()[before..].to_vec(),
        })
    }

    pub fn propagate_summary_to_ledger(&mut self, day: u32) -> Result<MacroReport> {
        macros::propagate_summary_to_ledger(&mut self.shadow, &self.catalogue, day)
    }

    pub fn propagate_card_totals_to_ledger(&mut self, day: u32) -> Result<MacroReport> {
        macros::propagate_card_totals_to_ledger(&mut self.shadow, &self.catalogue, day)
    }

    pub fn propagate_ledger_to_personnel(&mut self, day: u32) -> Result<MacroReport> {
        macros::propagate_ledger_to_personnel(&mut self.shadow, &self.catalogue, &self.matcher, day)
    }

    /// Clear every reset range; returns the cells that held content
    pub fn reset_tabs(&mut self) -> Result<usize> {
        macros::reset_tabs(&mut self.shadow, &self.catalogue)
    }

    pub fn fill_due_back(&mut self, day: u32, receptionist: &str, amount: f64, line: DueBackLine) -> Result<bool> {
        macros::fill_due_back(&mut self.shadow, &self.catalogue, day, receptionist, amount, line)
    }

    pub fn fill_due_back_by_column(&mut self, day: u32, letters: &str, amount: f64, line: DueBackLine) -> Result<bool> {
        macros::fill_due_back_by_column(&mut self.shadow, &self.catalogue, day, letters, amount, line)
    }

    pub fn fill_personnel_day(&mut self, day: u32, amount: f64, column: Option<&str>) -> Result<bool> {
        macros::fill_personnel_day(&mut self.shadow, &self.catalogue, day, amount, column)
    }

    pub fn update_deposit(&mut self, date_text: &str, amount: f64) -> Result<Option<u32>> {
        macros::update_deposit(&mut self.shadow, date_text, amount)
    }

    pub fn update_controle(&mut self, day: u32, month: u32, year: u32) -> Result<usize> {
        macros::update_controle(&mut self.shadow, &self.catalogue, day, month, year)
    }

    /// Whether any write is pending
    pub fn is_modified(&self) -> bool {
        self.shadow.is_modified()
    }

    /// The new workbook stream spliced into a copy of the original container.
    pub fn export(&self) -> Result<Vec<u8>> {
        let stream = self.shadow.serialize()?;
        rebuild_with(&self.original, &stream, &self.options)
    }

    /// [`export`](Self::export) to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.export()?;
        std::fs::write(path.as_ref(), &bytes)?;
        log::debug!("saved '{}' ({} bytes)", path.as_ref().display(), bytes.len());
        Ok(())
    }
}
