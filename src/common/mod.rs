//! Building blocks shared by the container, workbook and catalogue layers.

/// Bounds-checked little-endian reads and string decoding
pub mod binary;

/// Crate-level error type
pub mod error;

pub use error::{Error, Result};
