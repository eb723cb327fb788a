//! Legacy Excel (.xls) workbook reader and writer
//!
//! Reads the BIFF8 `Workbook` stream of a compound file into an immutable
//! [`Workbook`], and writes changes through a [`ShadowWorkbook`] that
//! re-emits the stream with only the edited cell tables rebuilt.

/// Error types for XLS parsing
mod error;

/// BIFF record parsing
pub mod records;

/// Workbook parsing implementation
mod workbook;

/// Worksheet substreams
mod worksheet;

/// Cell values
mod cell;

/// Number formats and date detection
mod format;

/// Shared parsing utilities
pub mod utils;

/// Shadow-copy writer
pub mod writer;

pub use cell::{Cell, Value};
pub use error::{XlsError, XlsResult};
pub use format::FormatTable;
pub use records::SheetType;
pub use workbook::Workbook;
pub use worksheet::Worksheet;
pub use writer::{CoercionWarning, FieldResolver, ShadowWorkbook};
