//! Sheet-to-sheet operations of the RJ workbook.
//!
//! Each operation reads a fixed region through the shadow copy (so earlier
//! pending writes are visible), computes its target cells from the
//! [`Catalogue`] and writes them back through the same [`ShadowWorkbook`].
//! Operations never call each other. Every operation checks all of its
//! inputs before its first write, so a failing call leaves the shadow copy
//! as it was.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalogue::{Catalogue, MAX_DAY, PersonnelSpan, sheet};
use super::matcher::NameMatcher;
use crate::common::{Error, Result};
use crate::ole::xls::utils::{self, MAX_COL};
use crate::ole::xls::{CoercionWarning, SheetType, ShadowWorkbook, Value};

/// First row of the deposit table
const DEPOSIT_FIRST_ROW: u32 = 9;
/// Last row searched for a free deposit line
const DEPOSIT_LAST_ROW: u32 = 199;

/// Outcome of a ledger macro
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroReport {
    pub day: u32,
    /// Target cells whose content changed
    pub written: usize,
    /// Source cells deliberately not propagated (zero or empty)
    pub skipped: usize,
    /// Names with no registry match, or the source cell when the name is blank
    pub unmatched: Vec<String>,
}

/// Outcome of a field fill
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillReport {
    pub sheet: String,
    /// Cells whose content changed
    pub written: usize,
    /// Numeric-looking strings stored as text
    pub warnings: Vec<CoercionWarning>,
}

/// Line of a due-back day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueBackLine {
    /// Amount carried from the previous day
    Balance,
    /// The day's new amount
    Operations,
}

/// Copy the weekly recap summary into the ledger's day row.
///
/// Clear-then-copy: an empty source cell blanks its target, a zero is
/// written as zero.
pub fn propagate_summary_to_ledger(shadow: &mut ShadowWorkbook, catalogue: &Catalogue, day: u32) -> Result<MacroReport> {
    let span = catalogue.summary_span()?;
    let (row, _) = catalogue.day_rows(&span.target_sheet, day)?;

    let mut cells = Vec::with_capacity(span.width as usize);
    for offset in 0..span.width {
        let value = shadow.current(&span.source_sheet, span.source_row, span.source_first_col + offset)?;
        cells.push((row, span.target_first_col + offset, value));
    }
    let written = shadow.replace_cells(&span.target_sheet, cells)?;

    log::debug!(
        "summary -> {} day {} (row {}): {} cells changed",
        span.target_sheet,
        day,
        row + 1,
        written
    );
    Ok(MacroReport {
        day,
        written,
        ..MacroReport::default()
    })
}

/// Copy the card totals into the ledger's card columns.
///
/// Only non-zero numbers are written; a zero or empty total leaves the
/// ledger cell untouched.
pub fn propagate_card_totals_to_ledger(
    shadow: &mut ShadowWorkbook,
    catalogue: &Catalogue,
    day: u32,
) -> Result<MacroReport> {
    let span = catalogue.card_span()?;
    let (row, _) = catalogue.day_rows(&span.target_sheet, day)?;

    let mut writes = Vec::new();
    let mut skipped = 0;
    for (card, source_col) in &span.cards {
        let total = shadow.current(&span.source_sheet, span.source_row, *source_col)?;
        if total.is_nonzero_number() {
            let col = catalogue.column_index_for(&span.target_sheet, card)?;
            writes.push((row, col, total));
        } else {
            log::debug!("card '{}' has no total for day {}", card, day);
            skipped += 1;
        }
    }
    let written = shadow.write_cells(&span.target_sheet, writes)?;

    Ok(MacroReport {
        day,
        written,
        skipped,
        unmatched: Vec::new(),
    })
}

/// Propagate the due-back operations row to the personnel sheet.
///
/// Each non-zero amount is credited to the registry column its header name
/// matches; amounts of names matching the same column add up. Names with no
/// match are reported, never an error.
pub fn propagate_ledger_to_personnel(
    shadow: &mut ShadowWorkbook,
    catalogue: &Catalogue,
    matcher: &NameMatcher,
    day: u32,
) -> Result<MacroReport> {
    let span = catalogue.personnel_span()?;
    let (_, operations_row) = catalogue.day_rows(&span.source_sheet, day)?;
    let (target_row, _) = catalogue.day_rows(&span.target_sheet, day)?;
    let registry = catalogue
        .registry(&span.target_sheet)
        .ok_or_else(|| Error::IncompleteCatalogue(format!("'{}' has no registry", span.target_sheet)))?;
    let candidates: Vec<&str> = registry.keys().map(String::as_str).collect();

    let mut report = MacroReport {
        day,
        ..MacroReport::default()
    };
    let mut amounts: BTreeMap<u32, f64> = BTreeMap::new();
    for col in span.first_col..=span.last_col {
        let amount = match shadow.current(&span.source_sheet, operations_row, col)? {
            Value::Number(n) if n != 0.0 => n,
            _ => {
                report.skipped += 1;
                continue;
            },
        };

        let name = person_name(shadow, span, col)?;
        let column = matcher
            .find(&name, candidates.iter().copied())
            .and_then(|found| registry.get(found.candidate));
        match column {
            Some(&target_col) => *amounts.entry(target_col).or_insert(0.0) += amount,
            None => {
                let label = if name.is_empty() {
                    format!("{}!{}", span.source_sheet, utils::cell_reference(operations_row, col))
                } else {
                    name
                };
                log::warn!("no personnel column for '{}' (day {}, amount {})", label, day, amount);
                report.unmatched.push(label);
            },
        }
    }

    report.written = shadow.write_cells(
        &span.target_sheet,
        amounts
            .into_iter()
            .map(|(col, amount)| (target_row, col, amount)),
    )?;
    Ok(report)
}

/// `"first last"` from the two header rows of a ledger column
fn person_name(shadow: &ShadowWorkbook, span: &PersonnelSpan, col: u32) -> Result<String> {
    let first = shadow.current(&span.source_sheet, span.first_name_row, col)?.to_string();
    let last = shadow.current(&span.source_sheet, span.last_name_row, col)?.to_string();
    let parts: Vec<&str> = [first.trim(), last.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
    Ok(parts.join(" "))
}

/// Clear every reset range of the catalogue.
///
/// Returns the number of cells that held content.
pub fn reset_tabs(shadow: &mut ShadowWorkbook, catalogue: &Catalogue) -> Result<usize> {
    for (name, _) in catalogue.reset_ranges() {
        if shadow.workbook().sheet(name)?.kind() != SheetType::WorkSheet {
            return Err(Error::InvalidArgument(format!("sheet '{}' is not a worksheet", name)));
        }
    }

    let mut cleared = 0;
    for (name, ranges) in catalogue.reset_ranges() {
        let count = shadow.clear_cells(name, ranges.iter().flat_map(|range| range.cells()))?;
        log::debug!("reset '{}': {} cells cleared", name, count);
        cleared += count;
    }
    Ok(cleared)
}

/// Write a receptionist's due-back amount for a day.
pub fn fill_due_back(
    shadow: &mut ShadowWorkbook,
    catalogue: &Catalogue,
    day: u32,
    receptionist: &str,
    amount: f64,
    line: DueBackLine,
) -> Result<bool> {
    let col = catalogue.column_index_for(sheet::DUBACK, receptionist)?;
    write_due_back(shadow, catalogue, day, col, amount, line)
}

/// Write a due-back amount into a column given by its letters.
pub fn fill_due_back_by_column(
    shadow: &mut ShadowWorkbook,
    catalogue: &Catalogue,
    day: u32,
    letters: &str,
    amount: f64,
    line: DueBackLine,
) -> Result<bool> {
    let col = parse_column(letters)?;
    write_due_back(shadow, catalogue, day, col, amount, line)
}

fn write_due_back(
    shadow: &mut ShadowWorkbook,
    catalogue: &Catalogue,
    day: u32,
    col: u32,
    amount: f64,
    line: DueBackLine,
) -> Result<bool> {
    let (balance, operations) = catalogue.day_rows(sheet::DUBACK, day)?;
    let row = match line {
        DueBackLine::Balance => balance,
        DueBackLine::Operations => operations,
    };
    shadow.write(sheet::DUBACK, row, col, amount)
}

/// Write a day's amount on the personnel sheet, column `B` unless given.
pub fn fill_personnel_day(
    shadow: &mut ShadowWorkbook,
    catalogue: &Catalogue,
    day: u32,
    amount: f64,
    column: Option<&str>,
) -> Result<bool> {
    let col = parse_column(column.unwrap_or("B"))?;
    let (row, _) = catalogue.day_rows(sheet::SETD, day)?;
    shadow.write(sheet::SETD, row, col, amount)
}

/// Append a deposit to the first free line of the deposit table.
///
/// A line is free when its amount (column `B`) is empty. Writes the date
/// text in `A` and the amount in `B`; returns the zero-based row, or `None`
/// when every line up to row 200 is taken.
pub fn update_deposit(shadow: &mut ShadowWorkbook, date_text: &str, amount: f64) -> Result<Option<u32>> {
    for row in DEPOSIT_FIRST_ROW..=DEPOSIT_LAST_ROW {
        if shadow.current(sheet::DEPOT, row, 1)?.is_empty() {
            shadow.write_cells(
                sheet::DEPOT,
                [(row, 0, Value::from(date_text)), (row, 1, Value::from(amount))],
            )?;
            return Ok(Some(row));
        }
    }
    log::warn!("deposit table is full, {} not recorded", amount);
    Ok(None)
}

/// Set the audit date on `controle`.
pub fn update_controle(
    shadow: &mut ShadowWorkbook,
    catalogue: &Catalogue,
    day: u32,
    month: u32,
    year: u32,
) -> Result<usize> {
    if !(1..=MAX_DAY).contains(&day) {
        return Err(Error::InvalidDay(day));
    }
    if !(1..=12).contains(&month) {
        return Err(Error::InvalidArgument(format!("month {} is not in 1..=12", month)));
    }
    if !(2000..=2100).contains(&year) {
        return Err(Error::InvalidArgument(format!("year {} is not in 2000..=2100", year)));
    }
    shadow.fill_by_address_map(
        catalogue,
        sheet::CONTROLE,
        [("jour", day), ("mois", month), ("annee", year)],
    )
}

fn parse_column(letters: &str) -> Result<u32> {
    utils::column_index(letters)
        .filter(|&col| col <= MAX_COL)
        .ok_or_else(|| Error::InvalidArgument(format!("'{}' is not a column", letters)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::xls::Workbook;
    use crate::rj::catalogue::{CatalogueBuilder, DayFormula};
    use crate::testing::FixtureBook;
    use std::sync::Arc;

    fn shadow(book: &FixtureBook) -> ShadowWorkbook {
        ShadowWorkbook::new(Arc::new(Workbook::open(&book.container()).unwrap()))
    }

    fn reopen(shadow: &ShadowWorkbook) -> Workbook {
        Workbook::from_stream("Workbook", shadow.serialize().unwrap()).unwrap()
    }

    fn builtin() -> Arc<Catalogue> {
        Catalogue::builtin().unwrap()
    }

    #[test]
    fn test_summary_propagation() {
        let mut book = FixtureBook::rj();
        let summary = [100.0, -50.0, 0.0, 25.5, 0.0, 0.0, 10.0];
        for (i, value) in summary.iter().enumerate() {
            book.sheet("Recap").number(18, 7 + i as u16, *value);
        }
        book.sheet("jour").number(10, 74, 999.0).text(10, 75, "old");

        let mut shadow = shadow(&book);
        let report = propagate_summary_to_ledger(&mut shadow, &builtin(), 7).unwrap();
        assert_eq!(report.day, 7);
        assert_eq!(report.written, 7);

        let workbook = reopen(&shadow);
        let ledger: Vec<Value> = (72..=78).map(|col| workbook.cell("jour", 10, col).unwrap()).collect();
        let expected: Vec<Value> = summary.iter().map(|&n| Value::Number(n)).collect();
        assert_eq!(ledger, expected);
        // Neighbouring days are untouched
        assert_eq!(workbook.cell("jour", 9, 72).unwrap(), Value::Empty);
        assert_eq!(workbook.cell("jour", 11, 72).unwrap(), Value::Empty);
    }

    #[test]
    fn test_summary_blanks_empty_sources() {
        let mut book = FixtureBook::rj();
        book.sheet("Recap").number(18, 7, 1.0);
        book.sheet("jour").number(4, 72, 5.0).number(4, 73, 6.0);

        let mut shadow = shadow(&book);
        let report = propagate_summary_to_ledger(&mut shadow, &builtin(), 1).unwrap();
        assert_eq!(report.written, 2);

        let workbook = reopen(&shadow);
        assert_eq!(workbook.cell("jour", 4, 72).unwrap(), Value::Number(1.0));
        assert_eq!(workbook.cell("jour", 4, 73).unwrap(), Value::Empty);
    }

    #[test]
    fn test_summary_rejects_bad_day() {
        let mut shadow = shadow(&FixtureBook::rj());
        for day in [0, 32] {
            assert!(matches!(
                propagate_summary_to_ledger(&mut shadow, &builtin(), day),
                Err(Error::InvalidDay(d)) if d == day
            ));
        }
        assert!(!shadow.is_modified());
    }

    #[test]
    fn test_card_totals_skip_zero() {
        let catalogue = builtin();
        let mut book = FixtureBook::rj();
        // amex_elavon, visa, debit
        book.sheet("transelect")
            .number(13, 1, 0.0)
            .number(13, 4, 500.0)
            .number(13, 5, 300.0);
        let amex = catalogue.column_index_for("jour", "amex_elavon").unwrap();
        book.sheet("jour").number(6, amex as u16, 42.0);

        let mut shadow = shadow(&book);
        let report = propagate_card_totals_to_ledger(&mut shadow, &catalogue, 3).unwrap();
        assert_eq!(report.written, 2);
        assert_eq!(report.skipped, 4);

        let workbook = reopen(&shadow);
        let column = |card: &str| catalogue.column_index_for("jour", card).unwrap();
        assert_eq!(workbook.cell("jour", 6, amex).unwrap(), Value::Number(42.0));
        assert_eq!(workbook.cell("jour", 6, column("visa")).unwrap(), Value::Number(500.0));
        assert_eq!(workbook.cell("jour", 6, column("debit")).unwrap(), Value::Number(300.0));
        assert_eq!(workbook.cell("jour", 6, column("master")).unwrap(), Value::Empty);
    }

    #[test]
    fn test_personnel_propagation() {
        let catalogue = builtin();
        let mut book = FixtureBook::rj();
        // Day 2 operations row is 8
        book.sheet("DUBACK#")
            .text(1, 2, "Latulippe")
            .text(2, 2, "Josée")
            .number(8, 2, 25.0)
            .text(1, 3, "LATULIPPE")
            .text(2, 3, "stephane")
            .number(8, 3, 10.0)
            .text(1, 4, "Inconnu")
            .text(2, 4, "Zed")
            .number(8, 4, 5.0)
            .text(1, 5, "Caron")
            .number(8, 5, 0.0);

        let mut shadow = shadow(&book);
        let report = propagate_ledger_to_personnel(&mut shadow, &catalogue, &NameMatcher::default(), 2).unwrap();
        assert_eq!(report.written, 2);
        assert_eq!(report.skipped, 20);
        assert_eq!(report.unmatched, vec!["Zed Inconnu".to_string()]);

        let workbook = reopen(&shadow);
        let josee = catalogue.column_index_for("SetD", "Josée Latulippe").unwrap();
        let stephane = catalogue.column_index_for("SetD", "Stéphane Latulippe").unwrap();
        assert_eq!(workbook.cell("SetD", 5, josee).unwrap(), Value::Number(25.0));
        assert_eq!(workbook.cell("SetD", 5, stephane).unwrap(), Value::Number(10.0));
    }

    #[test]
    fn test_personnel_surname_first_registry() {
        let catalogue = builtin();
        let mut book = FixtureBook::rj();
        book.sheet("DUBACK#")
            .text(1, 2, "Woods")
            .text(2, 2, "John")
            .number(6, 2, 40.0)
            .text(1, 3, "Sachetti")
            .text(2, 3, "François")
            .number(6, 3, 15.0);

        let mut shadow = shadow(&book);
        let report = propagate_ledger_to_personnel(&mut shadow, &catalogue, &NameMatcher::default(), 1).unwrap();
        assert!(report.unmatched.is_empty());
        assert_eq!(report.written, 2);

        let woods = catalogue.column_index_for("SetD", "WOODS John").unwrap();
        let sachetti = catalogue.column_index_for("SetD", "sachetti francois").unwrap();
        assert_eq!(shadow.current("SetD", 4, woods).unwrap(), Value::Number(40.0));
        assert_eq!(shadow.current("SetD", 4, sachetti).unwrap(), Value::Number(15.0));
    }

    fn doe_catalogue() -> Catalogue {
        CatalogueBuilder::new()
            .day_table("DUBACK#", DayFormula::Paired { base: 3 })
            .day_table("SetD", DayFormula::Single { base: 3 })
            .registry_entry("SetD", "John Doe", "C")
            .personnel_span(PersonnelSpan {
                source_sheet: "DUBACK#".into(),
                last_name_row: 1,
                first_name_row: 2,
                first_col: 2,
                last_col: 4,
                target_sheet: "SetD".into(),
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_unmatched_initial_is_reported() {
        let mut book = FixtureBook::rj();
        book.sheet("DUBACK#")
            .text(1, 2, "Doe")
            .text(2, 2, "J.")
            .number(6, 2, 75.0);

        let mut shadow = shadow(&book);
        let report = propagate_ledger_to_personnel(&mut shadow, &doe_catalogue(), &NameMatcher::default(), 1).unwrap();
        assert_eq!(report.unmatched, vec!["J. Doe".to_string()]);
        assert_eq!(report.written, 0);
        assert!(!shadow.is_modified());

        // Last-name matching is opt-in
        let matcher = NameMatcher::default().with(crate::rj::MatchStrategy::LastName);
        let report = propagate_ledger_to_personnel(&mut shadow, &doe_catalogue(), &matcher, 1).unwrap();
        assert!(report.unmatched.is_empty());
        assert_eq!(shadow.current("SetD", 4, 2).unwrap(), Value::Number(75.0));
    }

    #[test]
    fn test_blank_name_reports_cell() {
        let mut book = FixtureBook::rj();
        book.sheet("DUBACK#").number(6, 3, 1.0);

        let mut shadow = shadow(&book);
        let report = propagate_ledger_to_personnel(&mut shadow, &doe_catalogue(), &NameMatcher::default(), 1).unwrap();
        assert_eq!(report.unmatched, vec!["DUBACK#!D7".to_string()]);
    }

    #[test]
    fn test_reset_tabs() {
        let mut book = FixtureBook::rj();
        book.sheet("Recap").number(5, 1, 1.0).number(17, 3, 2.0).number(18, 7, 3.0);
        book.sheet("depot").text(9, 0, "2026-01-02").number(41, 10, 4.0);
        book.sheet("transelect").formula(13, 1, 50.0);

        let mut shadow = shadow(&book);
        assert_eq!(reset_tabs(&mut shadow, &builtin()).unwrap(), 4);

        let workbook = reopen(&shadow);
        assert_eq!(workbook.cell("Recap", 5, 1).unwrap(), Value::Empty);
        assert_eq!(workbook.cell("Recap", 17, 3).unwrap(), Value::Empty);
        assert_eq!(workbook.cell("Recap", 18, 7).unwrap(), Value::Number(3.0));
        assert_eq!(workbook.cell("Recap", 0, 0).unwrap(), Value::from("Recap"));
        assert_eq!(workbook.cell("depot", 9, 0).unwrap(), Value::Empty);
        assert_eq!(workbook.cell("transelect", 13, 1).unwrap(), Value::Number(50.0));
    }

    #[test]
    fn test_reset_requires_every_sheet() {
        let mut book = FixtureBook::new();
        book.sheet("Recap").number(5, 1, 1.0);
        let mut shadow = shadow(&book);
        assert!(matches!(reset_tabs(&mut shadow, &builtin()), Err(Error::UnknownSheet(_))));
        assert!(!shadow.is_modified());
    }

    #[test]
    fn test_fill_due_back() {
        let catalogue = builtin();
        let mut shadow = shadow(&FixtureBook::rj());
        assert!(fill_due_back(&mut shadow, &catalogue, 1, "Caron", 12.5, DueBackLine::Operations).unwrap());
        assert!(fill_due_back(&mut shadow, &catalogue, 1, "Caron", -3.0, DueBackLine::Balance).unwrap());
        assert!(fill_due_back_by_column(&mut shadow, &catalogue, 31, "Z", 7.0, DueBackLine::Operations).unwrap());

        assert_eq!(shadow.current("DUBACK#", 6, 4).unwrap(), Value::Number(12.5));
        assert_eq!(shadow.current("DUBACK#", 5, 4).unwrap(), Value::Number(-3.0));
        assert_eq!(shadow.current("DUBACK#", 66, 25).unwrap(), Value::Number(7.0));

        assert!(matches!(
            fill_due_back(&mut shadow, &catalogue, 1, "caron", 1.0, DueBackLine::Balance),
            Err(Error::UnknownName { .. })
        ));
        assert!(matches!(
            fill_due_back_by_column(&mut shadow, &catalogue, 1, "C3", 1.0, DueBackLine::Balance),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            fill_due_back(&mut shadow, &catalogue, 40, "Caron", 1.0, DueBackLine::Balance),
            Err(Error::InvalidDay(40))
        ));
    }

    #[test]
    fn test_fill_personnel_day() {
        let catalogue = builtin();
        let mut shadow = shadow(&FixtureBook::rj());
        assert!(fill_personnel_day(&mut shadow, &catalogue, 4, 99.0, None).unwrap());
        assert!(fill_personnel_day(&mut shadow, &catalogue, 4, 1.5, Some("EI")).unwrap());

        assert_eq!(shadow.current("SetD", 7, 1).unwrap(), Value::Number(99.0));
        let ei = utils::column_index("EI").unwrap();
        assert_eq!(shadow.current("SetD", 7, ei).unwrap(), Value::Number(1.5));
    }

    #[test]
    fn test_update_deposit() {
        let mut book = FixtureBook::rj();
        book.sheet("depot").number(9, 1, 10.0).number(10, 1, 20.0);
        let mut shadow = shadow(&book);

        assert_eq!(update_deposit(&mut shadow, "2026-01-15", 55.5).unwrap(), Some(11));
        assert_eq!(shadow.current("depot", 11, 0).unwrap(), Value::from("2026-01-15"));
        assert_eq!(shadow.current("depot", 11, 1).unwrap(), Value::Number(55.5));
        assert_eq!(update_deposit(&mut shadow, "2026-01-16", 1.0).unwrap(), Some(12));
    }

    #[test]
    fn test_update_deposit_full() {
        let mut book = FixtureBook::rj();
        for row in DEPOSIT_FIRST_ROW..=DEPOSIT_LAST_ROW {
            book.sheet("depot").number(row as u16, 1, 1.0);
        }
        let mut shadow = shadow(&book);
        assert_eq!(update_deposit(&mut shadow, "2026-01-15", 2.0).unwrap(), None);
        assert!(!shadow.is_modified());
    }

    #[test]
    fn test_update_controle() {
        let catalogue = builtin();
        let mut shadow = shadow(&FixtureBook::rj());
        assert_eq!(update_controle(&mut shadow, &catalogue, 15, 1, 2026).unwrap(), 3);
        assert_eq!(shadow.current("controle", 2, 1).unwrap(), Value::Number(15.0));
        assert_eq!(shadow.current("controle", 3, 1).unwrap(), Value::Number(1.0));
        assert_eq!(shadow.current("controle", 4, 1).unwrap(), Value::Number(2026.0));
        // Same date again changes nothing
        assert_eq!(update_controle(&mut shadow, &catalogue, 15, 1, 2026).unwrap(), 0);

        assert!(matches!(update_controle(&mut shadow, &catalogue, 0, 1, 2026), Err(Error::InvalidDay(0))));
        assert!(matches!(
            update_controle(&mut shadow, &catalogue, 1, 13, 2026),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            update_controle(&mut shadow, &catalogue, 1, 1, 1999),
            Err(Error::InvalidArgument(_))
        ));
    }
}
