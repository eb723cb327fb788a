//! The RJ reconciliation workbook: field catalogue, ledger macros and the
//! document session tying them to the container engine.

pub mod catalogue;
pub mod macros;
pub mod matcher;
pub mod session;
mod tables;

pub use catalogue::{
    CardSpan, Catalogue, CatalogueBuilder, CellRange, DayFormula, MAX_DAY, PersonnelSpan, SummarySpan, sheet,
};
pub use macros::{DueBackLine, FillReport, MacroReport};
pub use matcher::{MatchStrategy, NameMatch, NameMatcher};
pub use session::{DocumentSession, DueBackDay, DueBackEntry};
