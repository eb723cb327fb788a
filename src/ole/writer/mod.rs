//! Compound file (OLE2) writing
//!
//! Used to rebuild a workbook container around a modified `Workbook` stream.
//! Every storage is declared explicitly so empty storages and their CLSIDs
//! survive a rebuild.

/// FAT and MiniFAT allocation
mod alloc;

/// Core writer
mod core;

/// Directory tree generation
mod directory;

/// Header and DIFAT generation
mod header;


pub use core::OleWriter;
