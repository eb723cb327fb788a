//! In-memory compound file writer.
//!
//! Streams and storages are collected first and laid out in one pass by
//! [`OleWriter::to_bytes`]. The resulting file is arranged as:
//!
//! ```text
//! header | large streams | ministream | directory | MiniFAT | DIFAT | FAT
//! ```
//!
//! Large streams are allocated in insertion order, so the first stream added
//! (the workbook stream when rebuilding a spreadsheet) starts at sector 0.

use super::super::consts::*;
use super::super::file::OleError;
use super::alloc::{ChainTable, MiniStore};
use super::directory::DirectoryBuilder;
use super::header::{difat_sector_count, HeaderBuilder};
use std::io::Write;

/// Storage declared explicitly, possibly without any children
#[derive(Debug, Clone)]
struct StorageSpec {
    path: Vec<String>,
    clsid: [u8; 16],
    state_bits: u32,
}

/// Compound file writer
///
/// # Example
///
/// ```rust
/// use rj_engine::ole::{OleFile, OleWriter};
///
/// let mut writer = OleWriter::new();
/// writer.create_stream(&["Workbook"], b"BIFF")?;
/// writer.create_storage(&["_VBA_PROJECT_CUR", "VBA"])?;
/// writer.create_stream(&["_VBA_PROJECT_CUR", "VBA", "dir"], b"compressed")?;
///
/// let bytes = writer.to_bytes()?;
/// let ole = OleFile::parse(&bytes)?;
/// assert_eq!(ole.open_stream(&["Workbook"])?, b"BIFF");
/// # Ok::<(), rj_engine::ole::OleError>(())
/// ```
#[derive(Debug, Clone)]
pub struct OleWriter {
    /// Sector size (512 or 4096 bytes)
    sector_size: usize,
    root_clsid: [u8; 16],
    /// Streams in insertion order
    streams: Vec<(Vec<String>, Vec<u8>)>,
    storages: Vec<StorageSpec>,
}

impl OleWriter {
    /// Create a writer producing version 3 files (512-byte sectors)
    pub fn new() -> Self {
        Self {
            sector_size: SECTOR_SIZE_V3,
            root_clsid: [0; 16],
            streams: Vec::new(),
            storages: Vec::new(),
        }
    }

    /// Create a writer with an explicit sector size (512 or 4096)
    pub fn with_sector_size(sector_size: usize) -> Result<Self, OleError> {
        if sector_size != SECTOR_SIZE_V3 && sector_size != SECTOR_SIZE_V4 {
            return Err(OleError::InvalidData(format!(
                "Sector size must be 512 or 4096, got {}",
                sector_size
            )));
        }
        Ok(Self {
            sector_size,
            ..Self::new()
        })
    }

    /// Set the CLSID of the root entry
    pub fn set_root_clsid(&mut self, clsid: [u8; 16]) {
        self.root_clsid = clsid;
    }

    /// Create or replace the stream at `path`.
    ///
    /// Missing parent storages are created implicitly.
    pub fn create_stream(&mut self, path: &[&str], data: &[u8]) -> Result<(), OleError> {
        let owned = owned_path(path)?;
        match self.streams.iter_mut().find(|(p, _)| *p == owned) {
            Some((_, existing)) => *existing = data.to_vec(),
            None => self.streams.push((owned, data.to_vec())),
        }
        Ok(())
    }

    /// Declare a storage; it is written even when it ends up empty.
    pub fn create_storage(&mut self, path: &[&str]) -> Result<(), OleError> {
        self.create_storage_with_class(path, [0; 16], 0)
    }

    /// Declare a storage with its CLSID and state bits.
    pub fn create_storage_with_class(
        &mut self,
        path: &[&str],
        clsid: [u8; 16],
        state_bits: u32,
    ) -> Result<(), OleError> {
        let owned = owned_path(path)?;
        match self.storages.iter_mut().find(|s| s.path == owned) {
            Some(spec) => {
                spec.clsid = clsid;
                spec.state_bits = state_bits;
            },
            None => self.storages.push(StorageSpec {
                path: owned,
                clsid,
                state_bits,
            }),
        }
        Ok(())
    }

    /// Lay out the complete file in memory
    pub fn to_bytes(&self) -> Result<Vec<u8>, OleError> {
        let sector_size = self.sector_size;
        let mut fat = ChainTable::new(sector_size);
        let mut mini = MiniStore::new();

        // Large streams first, in insertion order
        let mut placed: Vec<(&[String], u32, &[u8])> = Vec::with_capacity(self.streams.len());
        let mut large: Vec<(u32, &[u8])> = Vec::new();
        for (path, data) in &self.streams {
            if data.len() >= MINI_STREAM_CUTOFF as usize {
                let start = fat.allocate(data.len());
                large.push((start, data.as_slice()));
                placed.push((path.as_slice(), start, data.as_slice()));
            }
        }
        for (path, data) in &self.streams {
            if data.len() < MINI_STREAM_CUTOFF as usize {
                placed.push((path.as_slice(), mini.push(data), data.as_slice()));
            }
        }

        let ministream_start = fat.allocate(mini.data().len());
        let mut directory =
            DirectoryBuilder::new(ministream_start, mini.data().len() as u64, self.root_clsid);
        for spec in &self.storages {
            directory.set_storage_class(&spec.path, spec.clsid, spec.state_bits);
        }
        for (path, start, data) in &placed {
            directory.add_stream_path(path, *start, data.len() as u64);
        }
        let dir_stream = directory.generate(sector_size);
        let dir_start = fat.allocate(dir_stream.len());

        let minifat_sectors = if mini.is_empty() {
            Vec::new()
        } else {
            mini.table().to_sectors(sector_size)
        };
        let num_minifat = (minifat_sectors.len() / sector_size) as u32;
        let minifat_start = fat.allocate(minifat_sectors.len());

        // The FAT has to describe its own sectors and the DIFAT's
        let per_fat_sector = (sector_size / 4) as u32;
        let used = fat.len();
        let (mut num_fat, mut num_difat) = (0u32, 0u32);
        loop {
            let next_fat = (used + num_fat + num_difat).div_ceil(per_fat_sector);
            let next_difat = difat_sector_count(next_fat, sector_size);
            if next_fat == num_fat && next_difat == num_difat {
                break;
            }
            num_fat = next_fat;
            num_difat = next_difat;
        }
        let difat_start = fat.reserve(num_difat, DIFSECT);
        let fat_start = fat.reserve(num_fat, FATSECT);

        fat.validate()
            .map_err(|e| OleError::InvalidData(format!("FAT validation failed: {}", e)))?;

        let mut header = HeaderBuilder::new(sector_size);
        header.first_dir_sector = dir_start;
        header.num_dir_sectors = (dir_stream.len() / sector_size) as u32;
        if num_minifat > 0 {
            header.first_minifat_sector = minifat_start;
            header.num_minifat_sectors = num_minifat;
        }
        if num_difat > 0 {
            header.first_difat_sector = difat_start;
            header.num_difat_sectors = num_difat;
        }
        header.fat_sectors = (fat_start..fat_start + num_fat).collect();

        let mut image = vec![0u8; (fat.len() as usize + 1) * sector_size];
        image[..sector_size].copy_from_slice(&header.generate());
        for (start, data) in large {
            place(&mut image, start, data, sector_size);
        }
        place(&mut image, ministream_start, mini.data(), sector_size);
        place(&mut image, dir_start, &dir_stream, sector_size);
        place(&mut image, minifat_start, &minifat_sectors, sector_size);
        place(&mut image, difat_start, &header.difat_sectors(), sector_size);
        place(&mut image, fat_start, &fat.to_sectors(sector_size), sector_size);

        Ok(image)
    }

    /// Write the complete file to `writer`
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), OleError> {
        writer.write_all(&self.to_bytes()?)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the complete file to `path`
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), OleError> {
        let file = std::fs::File::create(path)?;
        let mut buffered = std::io::BufWriter::new(file);
        self.write_to(&mut buffered)
    }
}

impl Default for OleWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn owned_path(path: &[&str]) -> Result<Vec<String>, OleError> {
    if path.is_empty() || path.iter().any(|c| c.is_empty()) {
        return Err(OleError::InvalidData("Empty path".to_string()));
    }
    if let Some(long) = path.iter().find(|c| c.encode_utf16().count() > 31) {
        return Err(OleError::InvalidData(format!(
            "Entry name '{}' exceeds 31 characters",
            long
        )));
    }
    Ok(path.iter().map(|c| c.to_string()).collect())
}

/// Copy a contiguous run starting at `sector` into the file image
fn place(image: &mut [u8], sector: u32, data: &[u8], sector_size: usize) {
    if sector == ENDOFCHAIN || data.is_empty() {
        return;
    }
    let offset = (sector as usize + 1) * sector_size;
    image[offset..offset + data.len()].copy_from_slice(data);
}
