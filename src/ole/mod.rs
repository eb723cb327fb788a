/// Constants for OLE file format
pub mod consts;

/// Main OLE file parsing implementation
mod file;

/// Compound file writer
pub mod writer;

/// Legacy Excel (.xls) workbook reader and shadow writer
///
/// This module parses the BIFF8 `Workbook` stream of an OLE2 container and
/// re-emits it with cell mutations applied.
pub mod xls;

/// Container reconstruction around a replacement workbook stream
pub mod rebuild;

// Re-export public types for convenient access
pub use file::{DirectoryEntry, EntryPath, OleError, OleFile, is_ole_file};
pub use rebuild::{RebuildOptions, auxiliary_streams, rebuild, rebuild_with};
pub use writer::OleWriter;
