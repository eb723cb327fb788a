//! Container reconstruction around a replacement workbook stream.
//!
//! The original container is parsed only far enough to enumerate its
//! directory. Every storage is recreated with its CLSID and state bits, every
//! stream other than the workbook stream is copied byte-for-byte, and the
//! workbook stream is swapped for the new bytes. The VBA project is never
//! interpreted.

use super::consts::{BOOK_STREAM, WORKBOOK_STREAM};
use super::file::{OleError, OleFile};
use super::writer::OleWriter;
use crate::common::{Error, Result};

/// Options controlling [`rebuild_with`]
#[derive(Debug, Clone)]
pub struct RebuildOptions {
    /// Re-open the output and compare every auxiliary stream against the
    /// original. Enabled by default.
    pub verify: bool,
}

impl Default for RebuildOptions {
    fn default() -> Self {
        Self { verify: true }
    }
}

impl RebuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

/// Rebuild `original` with its data stream replaced by `workbook`.
///
/// Equivalent to [`rebuild_with`] using default options.
pub fn rebuild(original: &[u8], workbook: &[u8]) -> Result<Vec<u8>> {
    rebuild_with(original, workbook, &RebuildOptions::default())
}

/// Rebuild `original` with its data stream replaced by `workbook`.
///
/// # Errors
///
/// [`Error::ContainerStructure`] when the original cannot be parsed, when it
/// has no root-level `Workbook` or `Book` stream, or when verification finds
/// an auxiliary stream that did not survive unchanged.
pub fn rebuild_with(original: &[u8], workbook: &[u8], options: &RebuildOptions) -> Result<Vec<u8>> {
    let source = OleFile::parse(original).map_err(structure("parse original container"))?;
    let data_stream = locate_data_stream(&source)?;
    let entries = source
        .entries()
        .map_err(structure("enumerate original directory"))?;

    let mut writer = OleWriter::with_sector_size(source.sector_size())
        .map_err(structure("prepare writer"))?;
    if let Some(root) = source.root() {
        writer.set_root_clsid(root.clsid);
    }

    // The data stream goes first so it starts at sector 0, as Excel writes it.
    writer
        .create_stream(&[data_stream.as_str()], workbook)
        .map_err(structure("place data stream"))?;

    let mut copied = 0usize;
    for item in &entries {
        let path: Vec<&str> = item.path.iter().map(String::as_str).collect();
        if item.entry.is_storage() {
            writer
                .create_storage_with_class(&path, item.entry.clsid, item.entry.state_bits)
                .map_err(structure("recreate storage"))?;
        } else if item.entry.is_stream() && !is_data_stream(&item.path, &data_stream) {
            let bytes = source
                .read_entry(item.entry)
                .map_err(structure("read auxiliary stream"))?;
            writer
                .create_stream(&path, &bytes)
                .map_err(structure("copy auxiliary stream"))?;
            copied += 1;
        }
    }

    let output = writer.to_bytes().map_err(structure("write container"))?;
    log::debug!(
        "rebuilt container: {} bytes, data stream '{}' ({} bytes), {} auxiliary streams",
        output.len(),
        data_stream,
        workbook.len(),
        copied
    );

    if options.verify {
        verify(&source, &data_stream, &output, workbook)?;
    }
    Ok(output)
}

/// Names of the streams other than the data stream, with their contents.
pub fn auxiliary_streams(container: &[u8]) -> Result<Vec<(Vec<String>, Vec<u8>)>> {
    let ole = OleFile::parse(container)?;
    let data_stream = locate_data_stream(&ole)?;
    collect_auxiliary(&ole, &data_stream).map_err(Error::from)
}

fn collect_auxiliary(
    ole: &OleFile<'_>,
    data_stream: &str,
) -> std::result::Result<Vec<(Vec<String>, Vec<u8>)>, OleError> {
    let mut out = Vec::new();
    for item in ole.entries()? {
        if item.entry.is_stream() && !is_data_stream(&item.path, data_stream) {
            out.push((item.path.clone(), ole.read_entry(item.entry)?));
        }
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

fn verify(source: &OleFile<'_>, data_stream: &str, output: &[u8], workbook: &[u8]) -> Result<()> {
    let rebuilt = OleFile::parse(output).map_err(structure("re-open rebuilt container"))?;

    let expected = collect_auxiliary(source, data_stream)
        .map_err(structure("read original auxiliary streams"))?;
    let actual = collect_auxiliary(&rebuilt, data_stream)
        .map_err(structure("read rebuilt auxiliary streams"))?;

    if expected.len() != actual.len() {
        return Err(Error::ContainerStructure(format!(
            "auxiliary stream count changed from {} to {}",
            expected.len(),
            actual.len()
        )));
    }
    for ((want_path, want), (got_path, got)) in expected.iter().zip(&actual) {
        if want_path != got_path {
            return Err(Error::ContainerStructure(format!(
                "auxiliary stream '{}' missing, found '{}'",
                want_path.join("/"),
                got_path.join("/")
            )));
        }
        if want != got {
            return Err(Error::ContainerStructure(format!(
                "auxiliary stream '{}' changed during rebuild",
                want_path.join("/")
            )));
        }
    }

    let stored = rebuilt
        .open_stream(&[data_stream])
        .map_err(structure("read rebuilt data stream"))?;
    if stored != workbook {
        return Err(Error::ContainerStructure(
            "data stream was not stored as given".to_string(),
        ));
    }
    Ok(())
}

/// Name of the data stream as stored, `Workbook` preferred over `Book`.
fn locate_data_stream(ole: &OleFile<'_>) -> Result<String> {
    let entries = ole
        .entries()
        .map_err(structure("enumerate original directory"))?;
    for wanted in [WORKBOOK_STREAM, BOOK_STREAM] {
        let found = entries.iter().find(|e| {
            e.entry.is_stream() && e.path.len() == 1 && e.path[0].eq_ignore_ascii_case(wanted)
        });
        if let Some(item) = found {
            return Ok(item.entry.name.clone());
        }
    }
    Err(Error::ContainerStructure(
        "no Workbook or Book stream at the container root".to_string(),
    ))
}

fn is_data_stream(path: &[String], data_stream: &str) -> bool {
    path.len() == 1 && path[0] == data_stream
}

fn structure(step: &'static str) -> impl Fn(OleError) -> Error {
    move |err| Error::ContainerStructure(format!("{}: {}", step, err))
}
