//! rj-engine - Binary engine for a hotel's nightly reconciliation workbook
//!
//! The reconciliation ("RJ") workbook is a legacy BIFF8 `.xls` file stored
//! in an OLE2 compound container next to a VBA project. This crate reads it,
//! writes cells through a shadow copy and rebuilds the container so that
//! every stream other than the workbook survives byte-for-byte.
//!
//! # Features
//!
//! - **Compound file reader/writer**: OLE2 containers, v3 and v4 sector sizes
//! - **BIFF8 reader**: shared strings, number formats, every cell record
//! - **Shadow writer**: sparse cell edits re-emitted as a new workbook stream
//! - **Container reconstruction**: the VBA project is carried over untouched
//! - **Field catalogue**: semantic field names mapped to fixed cell addresses
//! - **Ledger macros**: the sheet-to-sheet copies the workbook's VBA buttons did
//!
//! # Example - Reading fields
//!
//! ```no_run
//! use rj_engine::rj::DocumentSession;
//!
//! # fn main() -> rj_engine::Result<()> {
//! let session = DocumentSession::open("RJ 2026-01.xls")?;
//! for (field, value) in session.read_fields("controle")? {
//!     println!("{}: {}", field, value);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Low-level write
//!
//! ```no_run
//! use std::sync::Arc;
//! use rj_engine::ole::{self, xls::{ShadowWorkbook, Workbook}};
//!
//! # fn main() -> rj_engine::Result<()> {
//! let original = std::fs::read("RJ 2026-01.xls")?;
//! let mut shadow = ShadowWorkbook::new(Arc::new(Workbook::open(&original)?));
//! shadow.write("Recap", 23, 1, "1520.75")?;
//! let rebuilt = ole::rebuild(&original, &shadow.serialize()?)?;
//! std::fs::write("RJ 2026-01 (new).xls", rebuilt)?;
//! # Ok(())
//! # }
//! ```

/// Error type and binary helpers shared by every layer
pub mod common;

/// OLE2 compound files and the BIFF8 workbook inside them
///
/// The `ole` module also contains the `xls` submodule for reading and
/// writing the workbook stream, and the container reconstructor.
pub mod ole;

/// Field catalogue, ledger macros and document sessions of the RJ workbook
pub mod rj;

#[cfg(test)]
pub(crate) mod testing;

pub use common::{Error, Result};
