//! Semantic field catalogue of the RJ workbook.
//!
//! Every cell the engine reads or writes is addressed through a
//! [`Catalogue`]: named fields at fixed A1 positions, day-indexed tables,
//! name-to-column registries, the copy spans used by the ledger macros and
//! the ranges cleared at the start of a day. Addresses are static and never
//! inferred from the workbook's content.
//!
//! # Example
//!
//! ```
//! use rj_engine::rj::{Catalogue, sheet};
//!
//! # fn main() -> rj_engine::Result<()> {
//! let catalogue = Catalogue::builtin()?;
//! assert_eq!(catalogue.resolve("Recap", "argent_recu")?, (23, 1));
//! assert_eq!(catalogue.day_rows(sheet::DUBACK, 1)?, (5, 6));
//! assert_eq!(catalogue.column_for(sheet::DUBACK, "Caron")?, "E");
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::tables;
use crate::common::{Error, Result};
use crate::ole::xls::FieldResolver;
use crate::ole::xls::utils::{self, MAX_COL, MAX_ROW};

/// Sheet names of the RJ workbook
pub mod sheet {
    pub const CONTROLE: &str = "controle";
    pub const RECAP: &str = "Recap";
    pub const TRANSELECT: &str = "transelect";
    pub const GEAC_UX: &str = "geac_ux";
    pub const DUBACK: &str = "DUBACK#";
    pub const SETD: &str = "SetD";
    pub const JOUR: &str = "jour";
    pub const DEPOT: &str = "depot";
    pub const DAILY: &str = "daily";
}

/// Last day of a month
pub const MAX_DAY: u32 = 31;

/// Row formula of a day-indexed table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayFormula {
    /// Two rows per day: balance at `base + 2 * day`, operations right after
    Paired { base: u32 },
    /// One row per day at `base + day`, used for both lines
    Single { base: u32 },
}

impl DayFormula {
    /// `(balance_row, operations_row)` of `day`; the day is not checked
    pub fn rows(&self, day: u32) -> (u32, u32) {
        match *self {
            DayFormula::Paired { base } => {
                let balance = base + 2 * day;
                (balance, balance + 1)
            },
            DayFormula::Single { base } => (base + day, base + day),
        }
    }

    fn rows_per_day(&self) -> usize {
        match self {
            DayFormula::Paired { .. } => 2,
            DayFormula::Single { .. } => 1,
        }
    }
}

/// Rectangular block of cells, zero-based and inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub first_row: u32,
    pub last_row: u32,
    pub first_col: u32,
    pub last_col: u32,
}

impl CellRange {
    pub fn new(first_row: u32, last_row: u32, first_col: u32, last_col: u32) -> Self {
        CellRange {
            first_row,
            last_row,
            first_col,
            last_col,
        }
    }

    /// Every position, row by row
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.first_row..=self.last_row).flat_map(move |row| (self.first_col..=self.last_col).map(move |col| (row, col)))
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        ((self.last_row - self.first_row + 1) as usize) * ((self.last_col - self.first_col + 1) as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.first_row > self.last_row || self.first_col > self.last_col
    }
}

/// Weekly summary row copied into the ledger's day row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySpan {
    pub source_sheet: String,
    pub source_row: u32,
    pub source_first_col: u32,
    /// Number of cells copied
    pub width: u32,
    pub target_sheet: String,
    pub target_first_col: u32,
}

/// Card totals row copied into the ledger's card columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSpan {
    pub source_sheet: String,
    pub source_row: u32,
    pub target_sheet: String,
    /// Card name (a key of the target registry) and its source column
    pub cards: Vec<(String, u32)>,
}

/// Per-employee ledger row propagated to the personnel sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonnelSpan {
    pub source_sheet: String,
    pub last_name_row: u32,
    pub first_name_row: u32,
    pub first_col: u32,
    pub last_col: u32,
    pub target_sheet: String,
}

/// Immutable address registry.
///
/// `Send + Sync`; every lookup is a pure function of its arguments.
#[derive(Debug, Clone)]
pub struct Catalogue {
    fields: HashMap<String, BTreeMap<String, (u32, u32)>>,
    day_tables: HashMap<String, DayFormula>,
    registries: HashMap<String, BTreeMap<String, u32>>,
    summary: Option<SummarySpan>,
    cards: Option<CardSpan>,
    personnel: Option<PersonnelSpan>,
    resets: BTreeMap<String, Vec<CellRange>>,
}

static BUILTIN: Lazy<std::result::Result<Arc<Catalogue>, String>> = Lazy::new(|| {
    CatalogueBuilder::rj().build().map(Arc::new).map_err(|e| match e {
        Error::IncompleteCatalogue(message) => message,
        other => other.to_string(),
    })
});

impl Catalogue {
    /// The RJ workbook catalogue, built and validated once per process.
    pub fn builtin() -> Result<Arc<Catalogue>> {
        match &*BUILTIN {
            Ok(catalogue) => Ok(Arc::clone(catalogue)),
            Err(message) => Err(Error::IncompleteCatalogue(message.clone())),
        }
    }

    /// Zero-based `(row, col)` of a named field.
    pub fn resolve(&self, sheet: &str, field: &str) -> Result<(u32, u32)> {
        self.fields
            .get(sheet)
            .and_then(|fields| fields.get(field))
            .copied()
            .ok_or_else(|| Error::UnknownField {
                sheet: sheet.to_string(),
                field: field.to_string(),
            })
    }

    /// `(balance_row, operations_row)` of a day in a sheet's day table.
    ///
    /// The day is checked first, so a bad day is `InvalidDay` whatever the
    /// sheet.
    pub fn day_rows(&self, sheet: &str, day: u32) -> Result<(u32, u32)> {
        if !(1..=MAX_DAY).contains(&day) {
            return Err(Error::InvalidDay(day));
        }
        self.day_tables
            .get(sheet)
            .map(|formula| formula.rows(day))
            .ok_or_else(|| Error::NoDayTable(sheet.to_string()))
    }

    /// Column letters registered for `name` (exact, case-sensitive)
    pub fn column_for(&self, sheet: &str, name: &str) -> Result<String> {
        self.column_index_for(sheet, name).map(utils::column_letter)
    }

    /// Zero-based column registered for `name` (exact, case-sensitive)
    pub fn column_index_for(&self, sheet: &str, name: &str) -> Result<u32> {
        self.registries
            .get(sheet)
            .and_then(|registry| registry.get(name))
            .copied()
            .ok_or_else(|| Error::UnknownName {
                sheet: sheet.to_string(),
                name: name.to_string(),
            })
    }

    /// Every field of a sheet with its position
    pub fn fields(&self, sheet: &str) -> Option<&BTreeMap<String, (u32, u32)>> {
        self.fields.get(sheet)
    }

    /// Sheets that have a field table, sorted
    pub fn field_sheets(&self) -> Vec<&str> {
        let mut sheets: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        sheets.sort_unstable();
        sheets
    }

    pub fn day_table(&self, sheet: &str) -> Option<DayFormula> {
        self.day_tables.get(sheet).copied()
    }

    /// Name-to-column registry of a sheet
    pub fn registry(&self, sheet: &str) -> Option<&BTreeMap<String, u32>> {
        self.registries.get(sheet)
    }

    pub fn summary_span(&self) -> Result<&SummarySpan> {
        self.summary
            .as_ref()
            .ok_or_else(|| Error::IncompleteCatalogue("no summary span".to_string()))
    }

    pub fn card_span(&self) -> Result<&CardSpan> {
        self.cards
            .as_ref()
            .ok_or_else(|| Error::IncompleteCatalogue("no card totals span".to_string()))
    }

    pub fn personnel_span(&self) -> Result<&PersonnelSpan> {
        self.personnel
            .as_ref()
            .ok_or_else(|| Error::IncompleteCatalogue("no personnel span".to_string()))
    }

    /// Reset ranges per sheet, sorted by sheet name
    pub fn reset_ranges(&self) -> impl Iterator<Item = (&str, &[CellRange])> {
        self.resets.iter().map(|(sheet, ranges)| (sheet.as_str(), ranges.as_slice()))
    }

    /// Completeness check run by [`CatalogueBuilder::build`].
    ///
    /// Every sheet a macro touches has its day table, registry and span;
    /// every address lies on the BIFF8 grid; no two days share a row.
    pub fn validate(&self) -> Result<()> {
        for (sheet, fields) in &self.fields {
            for (field, &(row, col)) in fields {
                check_cell(&format!("{}!{}", sheet, field), row, col)?;
            }
        }

        for (sheet, formula) in &self.day_tables {
            let mut seen = BTreeSet::new();
            for day in 1..=MAX_DAY {
                let (balance, operations) = formula.rows(day);
                check_cell(&format!("{} day {}", sheet, day), operations.max(balance), 0)?;
                seen.insert(balance);
                seen.insert(operations);
            }
            if seen.len() != MAX_DAY as usize * formula.rows_per_day() {
                return Err(incomplete(format!("day rows of '{}' overlap", sheet)));
            }
        }

        for (sheet, registry) in &self.registries {
            for (name, &col) in registry {
                check_cell(&format!("{}[{}]", sheet, name), 0, col)?;
            }
        }

        if let Some(span) = &self.summary {
            self.require_day_table(&span.target_sheet, "summary span")?;
            if span.width == 0 {
                return Err(incomplete("summary span is empty".to_string()));
            }
            check_cell("summary source", span.source_row, span.source_first_col + span.width - 1)?;
            check_cell("summary target", 0, span.target_first_col + span.width - 1)?;
        }

        if let Some(span) = &self.cards {
            self.require_day_table(&span.target_sheet, "card totals span")?;
            for (card, source_col) in &span.cards {
                check_cell(&format!("card '{}' source", card), span.source_row, *source_col)?;
                if self.column_index_for(&span.target_sheet, card).is_err() {
                    return Err(incomplete(format!(
                        "card '{}' has no column on '{}'",
                        card, span.target_sheet
                    )));
                }
            }
        }

        if let Some(span) = &self.personnel {
            self.require_day_table(&span.source_sheet, "personnel span")?;
            self.require_day_table(&span.target_sheet, "personnel span")?;
            if self.registries.get(&span.target_sheet).is_none_or(BTreeMap::is_empty) {
                return Err(incomplete(format!("'{}' has no personnel registry", span.target_sheet)));
            }
            if span.first_col > span.last_col {
                return Err(incomplete("personnel span columns are reversed".to_string()));
            }
            check_cell("personnel names", span.last_name_row.max(span.first_name_row), span.last_col)?;
        }

        for (sheet, ranges) in &self.resets {
            for range in ranges {
                if range.is_empty() {
                    return Err(incomplete(format!("empty reset range on '{}'", sheet)));
                }
                check_cell(&format!("reset range of '{}'", sheet), range.last_row, range.last_col)?;
            }
        }
        Ok(())
    }

    fn require_day_table(&self, sheet: &str, user: &str) -> Result<()> {
        if self.day_tables.contains_key(sheet) {
            Ok(())
        } else {
            Err(incomplete(format!("{} needs a day table on '{}'", user, sheet)))
        }
    }
}

impl FieldResolver for Catalogue {
    fn resolve(&self, sheet: &str, field: &str) -> Result<(u32, u32)> {
        Catalogue::resolve(self, sheet, field)
    }
}

fn incomplete(message: String) -> Error {
    Error::IncompleteCatalogue(message)
}

fn check_cell(what: &str, row: u32, col: u32) -> Result<()> {
    if row > MAX_ROW || col > MAX_COL {
        return Err(incomplete(format!(
            "{} at ({}, {}) is outside the BIFF8 grid",
            what, row, col
        )));
    }
    Ok(())
}

/// Assembles a [`Catalogue`]; [`build`](Self::build) validates it.
///
/// Addresses are given the way they read in Excel (`"B6"`, `"BU"`).
#[derive(Debug, Clone, Default)]
pub struct CatalogueBuilder {
    fields: Vec<(String, String, String)>,
    day_tables: HashMap<String, DayFormula>,
    registry: Vec<(String, String, String)>,
    summary: Option<SummarySpan>,
    cards: Option<CardSpan>,
    personnel: Option<PersonnelSpan>,
    resets: BTreeMap<String, Vec<CellRange>>,
}

impl CatalogueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder preloaded with the RJ workbook tables
    pub fn rj() -> Self {
        let mut builder = Self::new();
        for (sheet, table) in &tables::FIELD_TABLES {
            for (field, reference) in table.entries() {
                builder = builder.field(sheet, field, reference);
            }
        }

        builder = builder
            .day_table(sheet::DUBACK, DayFormula::Paired { base: 3 })
            .day_table(sheet::SETD, DayFormula::Single { base: 3 })
            .day_table(sheet::JOUR, DayFormula::Single { base: 3 });

        for (name, letters) in tables::DUBACK_RECEPTIONISTS.entries() {
            builder = builder.registry_entry(sheet::DUBACK, name, letters);
        }
        for (name, letters) in tables::SETD_PERSONNEL.entries() {
            builder = builder.registry_entry(sheet::SETD, name, letters);
        }
        for (name, letters) in tables::JOUR_CARDS.entries() {
            builder = builder.registry_entry(sheet::JOUR, name, letters);
        }

        // Recap!H19:N19 -> jour BU:CA
        builder = builder.summary_span(SummarySpan {
            source_sheet: sheet::RECAP.to_string(),
            source_row: 18,
            source_first_col: 7,
            width: 7,
            target_sheet: sheet::JOUR.to_string(),
            target_first_col: 72,
        });
        // transelect totals row 14, B onwards
        builder = builder.card_span(CardSpan {
            source_sheet: sheet::TRANSELECT.to_string(),
            source_row: 13,
            target_sheet: sheet::JOUR.to_string(),
            cards: tables::CARD_ORDER
                .iter()
                .enumerate()
                .map(|(i, card)| (card.to_string(), 1 + i as u32))
                .collect(),
        });
        builder = builder.personnel_span(PersonnelSpan {
            source_sheet: sheet::DUBACK.to_string(),
            last_name_row: 1,
            first_name_row: 2,
            first_col: 2,
            last_col: 24,
            target_sheet: sheet::SETD.to_string(),
        });

        for (sheet, ranges) in &tables::RESET_RANGES {
            for &(first_row, last_row, first_col, last_col) in ranges.iter() {
                builder = builder.reset_range(sheet, CellRange::new(first_row, last_row, first_col, last_col));
            }
        }
        builder
    }

    /// Register a named field at an A1 reference
    pub fn field(mut self, sheet: &str, field: &str, reference: &str) -> Self {
        self.fields
            .push((sheet.to_string(), field.to_string(), reference.to_string()));
        self
    }

    pub fn day_table(mut self, sheet: &str, formula: DayFormula) -> Self {
        self.day_tables.insert(sheet.to_string(), formula);
        self
    }

    /// Register `name` at column `letters` of a sheet's registry
    pub fn registry_entry(mut self, sheet: &str, name: &str, letters: &str) -> Self {
        self.registry
            .push((sheet.to_string(), name.to_string(), letters.to_string()));
        self
    }

    pub fn summary_span(mut self, span: SummarySpan) -> Self {
        self.summary = Some(span);
        self
    }

    pub fn card_span(mut self, span: CardSpan) -> Self {
        self.cards = Some(span);
        self
    }

    pub fn personnel_span(mut self, span: PersonnelSpan) -> Self {
        self.personnel = Some(span);
        self
    }

    pub fn reset_range(mut self, sheet: &str, range: CellRange) -> Self {
        self.resets.entry(sheet.to_string()).or_default().push(range);
        self
    }

    /// Parse every address and run [`Catalogue::validate`].
    pub fn build(self) -> Result<Catalogue> {
        let mut fields: HashMap<String, BTreeMap<String, (u32, u32)>> = HashMap::new();
        for (sheet, field, reference) in self.fields {
            let position = utils::parse_cell_reference(&reference).ok_or_else(|| {
                incomplete(format!("{}!{}: bad cell reference '{}'", sheet, field, reference))
            })?;
            if fields.entry(sheet.clone()).or_default().insert(field.clone(), position).is_some() {
                return Err(incomplete(format!("{}!{} is registered twice", sheet, field)));
            }
        }

        let mut registries: HashMap<String, BTreeMap<String, u32>> = HashMap::new();
        for (sheet, name, letters) in self.registry {
            let col = utils::column_index(&letters).ok_or_else(|| {
                incomplete(format!("{}[{}]: bad column '{}'", sheet, name, letters))
            })?;
            if registries.entry(sheet.clone()).or_default().insert(name.clone(), col).is_some() {
                return Err(incomplete(format!("{}[{}] is registered twice", sheet, name)));
            }
        }

        let catalogue = Catalogue {
            fields,
            day_tables: self.day_tables,
            registries,
            summary: self.summary,
            cards: self.cards,
            personnel: self.personnel,
            resets: self.resets,
        };
        catalogue.validate()?;
        log::debug!(
            "catalogue: {} field sheets, {} day tables, {} registries",
            catalogue.fields.len(),
            catalogue.day_tables.len(),
            catalogue.registries.len()
        );
        Ok(catalogue)
    }
}
