//! Sector allocation for the FAT and the MiniFAT.
//!
//! Both tables are the same structure at different granularities: an array
//! mapping each unit (sector or mini sector) to the next unit of its chain.
//! Chains are always allocated contiguously, so the writer never produces
//! fragmented streams.

use super::super::consts::*;

/// Allocation table over fixed-size units
#[derive(Debug)]
pub(super) struct ChainTable {
    /// Unit index -> next unit, or a marker value
    entries: Vec<u32>,
    /// Unit size in bytes (sector or mini sector)
    unit: usize,
}

impl ChainTable {
    pub fn new(unit: usize) -> Self {
        Self {
            entries: Vec::new(),
            unit,
        }
    }

    /// Allocate a contiguous chain large enough for `len` bytes.
    ///
    /// Returns the first unit, or `ENDOFCHAIN` for an empty payload.
    pub fn allocate(&mut self, len: usize) -> u32 {
        if len == 0 {
            return ENDOFCHAIN;
        }
        let count = len.div_ceil(self.unit) as u32;
        let start = self.len();
        self.entries
            .extend((start + 1..start + count).chain(std::iter::once(ENDOFCHAIN)));
        start
    }

    /// Reserve `count` units carrying a fixed marker (`FATSECT`, `DIFSECT`).
    pub fn reserve(&mut self, count: u32, marker: u32) -> u32 {
        if count == 0 {
            return ENDOFCHAIN;
        }
        let start = self.len();
        self.entries
            .extend(std::iter::repeat_n(marker, count as usize));
        start
    }

    /// Number of units allocated so far
    pub fn len(&self) -> u32 {
        self.entries.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[u32] {
        &self.entries
    }

    /// Serialize the table into whole sectors, padding with `FREESECT`.
    pub fn to_sectors(&self, sector_size: usize) -> Vec<u8> {
        let per_sector = sector_size / 4;
        let count = self.entries.len().div_ceil(per_sector);
        let mut out = Vec::with_capacity(count * sector_size);
        for value in &self.entries {
            out.extend_from_slice(&value.to_le_bytes());
        }
        out.resize(count * sector_size, 0xFF);
        out
    }

    /// Check that every chain terminates and only references allocated units.
    pub fn validate(&self) -> Result<(), String> {
        let len = self.entries.len();
        let mut seen = vec![false; len];
        for start in 0..len {
            if seen[start] || matches!(self.entries[start], FATSECT | DIFSECT | FREESECT) {
                continue;
            }
            let mut current = start;
            let mut steps = 0usize;
            loop {
                seen[current] = true;
                steps += 1;
                if steps > len {
                    return Err(format!("Circular chain through unit {}", start));
                }
                match self.entries[current] {
                    ENDOFCHAIN => break,
                    next if (next as usize) < len => current = next as usize,
                    next => {
                        return Err(format!("Unit {} points to invalid unit {}", current, next));
                    },
                }
            }
        }
        Ok(())
    }
}

/// Small-stream store: the MiniFAT plus the ministream payload it indexes.
#[derive(Debug)]
pub(super) struct MiniStore {
    table: ChainTable,
    data: Vec<u8>,
}

impl MiniStore {
    pub fn new() -> Self {
        Self {
            table: ChainTable::new(MINI_SECTOR_SIZE),
            data: Vec::new(),
        }
    }

    /// Append a small stream, returning its first mini sector.
    pub fn push(&mut self, payload: &[u8]) -> u32 {
        let start = self.table.allocate(payload.len());
        if start != ENDOFCHAIN {
            self.data.extend_from_slice(payload);
            let padded = self.data.len().div_ceil(MINI_SECTOR_SIZE) * MINI_SECTOR_SIZE;
            self.data.resize(padded, 0);
        }
        start
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Ministream contents, padded to whole mini sectors
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn table(&self) -> &ChainTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_chains() {
        let mut fat = ChainTable::new(512);
        assert_eq!(fat.allocate(0), ENDOFCHAIN);
        assert_eq!(fat.allocate(1024), 0);
        assert_eq!(fat.allocate(1), 2);
        assert_eq!(fat.entries(), &[1, ENDOFCHAIN, ENDOFCHAIN]);

        assert_eq!(fat.reserve(2, FATSECT), 3);
        assert_eq!(fat.len(), 5);
        assert!(fat.validate().is_ok());

        let sectors = fat.to_sectors(512);
        assert_eq!(sectors.len(), 512);
        assert_eq!(&sectors[0..4], &1u32.to_le_bytes());
        assert_eq!(&sectors[20..24], &FREESECT.to_le_bytes());
    }

    #[test]
    fn test_ministore_pads_to_mini_sectors() {
        let mut mini = MiniStore::new();
        assert_eq!(mini.push(&[0xAA; 50]), 0);
        assert_eq!(mini.push(&[0xBB; 100]), 1);
        assert_eq!(mini.push(&[]), ENDOFCHAIN);

        assert_eq!(mini.data().len(), 192);
        assert_eq!(mini.table().entries(), &[ENDOFCHAIN, 2, ENDOFCHAIN]);
        assert_eq!(mini.data()[64], 0xBB);
        assert_eq!(mini.data()[50], 0);
    }
}
