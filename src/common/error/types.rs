//! Crate-level error type.
//!
//! Format-level failures (`OleError`, `XlsError`) are folded into the two
//! container variants at the component boundary; every other variant is a
//! caller-contract violation and is surfaced immediately.
use thiserror::Error;

/// Main error type for engine operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input bytes are not a readable compound container or workbook stream
    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    /// Reconstruction could not locate the data stream or prove stream preservation
    #[error("Container structure error: {0}")]
    ContainerStructure(String),

    /// Field is not registered for the sheet
    #[error("Unknown field '{field}' on sheet '{sheet}'")]
    UnknownField { sheet: String, field: String },

    /// Name is not present in the sheet's column registry
    #[error("Unknown name '{name}' on sheet '{sheet}'")]
    UnknownName { sheet: String, name: String },

    /// Day of month outside 1..=31
    #[error("Invalid day {0}: expected 1..=31")]
    InvalidDay(u32),

    /// Sheet name not present in the workbook or catalogue
    #[error("Unknown sheet '{0}'")]
    UnknownSheet(String),

    /// Sheet has no day-indexed table
    #[error("Sheet '{0}' has no day-indexed table")]
    NoDayTable(String),

    /// Cell address beyond the BIFF8 grid (65536 rows x 256 columns)
    #[error("Cell ({row}, {col}) on sheet '{sheet}' is outside the BIFF8 grid")]
    CellOutOfBounds { sheet: String, row: u32, col: u32 },

    /// Argument outside its accepted range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Catalogue failed its completeness check
    #[error("Incomplete catalogue: {0}")]
    IncompleteCatalogue(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
