//! Compound file header and DIFAT generation

use super::super::consts::*;

/// Values that go into the 512-byte header
#[derive(Debug, Default)]
pub(super) struct HeaderBuilder {
    /// Sector size (512 or 4096)
    pub sector_size: usize,
    pub first_dir_sector: u32,
    /// csectDir; written as 0 for 512-byte sectors
    pub num_dir_sectors: u32,
    pub first_minifat_sector: u32,
    pub num_minifat_sectors: u32,
    pub first_difat_sector: u32,
    pub num_difat_sectors: u32,
    /// Every FAT sector id; the first 109 are stored in the header itself
    pub fat_sectors: Vec<u32>,
}

impl HeaderBuilder {
    pub fn new(sector_size: usize) -> Self {
        Self {
            sector_size,
            first_minifat_sector: ENDOFCHAIN,
            first_difat_sector: ENDOFCHAIN,
            ..Default::default()
        }
    }

    /// Produce the first block of the file: the header padded to one sector.
    pub fn generate(&self) -> Vec<u8> {
        let mut header = vec![0u8; self.sector_size];
        let v4 = self.sector_size == SECTOR_SIZE_V4;

        header[0..8].copy_from_slice(MAGIC);
        header[0x18..0x1A].copy_from_slice(&0x003Eu16.to_le_bytes());
        header[0x1A..0x1C].copy_from_slice(&(if v4 { 4u16 } else { 3u16 }).to_le_bytes());
        header[0x1C..0x1E].copy_from_slice(&0xFFFEu16.to_le_bytes());
        header[0x1E..0x20].copy_from_slice(&(if v4 { 12u16 } else { 9u16 }).to_le_bytes());
        header[0x20..0x22].copy_from_slice(&6u16.to_le_bytes());

        let num_dir_sectors = if v4 { self.num_dir_sectors } else { 0 };
        header[0x28..0x2C].copy_from_slice(&num_dir_sectors.to_le_bytes());
        header[0x2C..0x30].copy_from_slice(&(self.fat_sectors.len() as u32).to_le_bytes());
        header[0x30..0x34].copy_from_slice(&self.first_dir_sector.to_le_bytes());
        header[0x38..0x3C].copy_from_slice(&MINI_STREAM_CUTOFF.to_le_bytes());
        header[0x3C..0x40].copy_from_slice(&self.first_minifat_sector.to_le_bytes());
        header[0x40..0x44].copy_from_slice(&self.num_minifat_sectors.to_le_bytes());
        header[0x44..0x48].copy_from_slice(&self.first_difat_sector.to_le_bytes());
        header[0x48..0x4C].copy_from_slice(&self.num_difat_sectors.to_le_bytes());

        for i in 0..HEADER_DIFAT_ENTRIES {
            let id = self.fat_sectors.get(i).copied().unwrap_or(FREESECT);
            let offset = 0x4C + i * 4;
            header[offset..offset + 4].copy_from_slice(&id.to_le_bytes());
        }

        header
    }

    /// Sectors holding the FAT ids that do not fit in the header.
    ///
    /// DIFAT sectors are laid out contiguously from `first_difat_sector`;
    /// the last u32 of each sector links to the next one.
    pub fn difat_sectors(&self) -> Vec<u8> {
        let overflow = self.fat_sectors.get(HEADER_DIFAT_ENTRIES..).unwrap_or(&[]);
        if overflow.is_empty() {
            return Vec::new();
        }

        let per_sector = self.sector_size / 4 - 1;
        let chunks: Vec<&[u32]> = overflow.chunks(per_sector).collect();
        let mut out = Vec::with_capacity(chunks.len() * self.sector_size);
        for (i, ids) in chunks.iter().enumerate() {
            let mut sector = vec![0xFFu8; self.sector_size];
            for (j, id) in ids.iter().enumerate() {
                sector[j * 4..j * 4 + 4].copy_from_slice(&id.to_le_bytes());
            }
            let next = if i + 1 < chunks.len() {
                self.first_difat_sector + i as u32 + 1
            } else {
                ENDOFCHAIN
            };
            let tail = self.sector_size - 4;
            sector[tail..].copy_from_slice(&next.to_le_bytes());
            out.extend_from_slice(&sector);
        }
        out
    }
}

/// Number of DIFAT sectors needed for `num_fat` FAT sectors
pub(super) fn difat_sector_count(num_fat: u32, sector_size: usize) -> u32 {
    let per_sector = (sector_size / 4 - 1) as u32;
    num_fat
        .saturating_sub(HEADER_DIFAT_ENTRIES as u32)
        .div_ceil(per_sector)
}
