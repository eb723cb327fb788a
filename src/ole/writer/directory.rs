//! Directory stream generation.
//!
//! Entries are created in path order, then each storage's children are
//! arranged into a balanced sibling tree. Siblings compare by UTF-16 name
//! length first and then by the upper-cased name, which is the ordering
//! compound file readers rely on for lookups.
//!
//! ```text
//! Children sorted: [A, BB, CC, DDD, EEEE]
//!
//!            CC            <- storage.child
//!          /    \
//!        BB      EEEE
//!       /        /
//!      A       DDD
//! ```
//!
//! Nodes on the deepest level of an incomplete tree are coloured red and all
//! others black, which keeps the black height equal on every path.

use super::super::consts::*;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One pending 128-byte directory entry
#[derive(Debug, Clone)]
pub(super) struct DirectoryEntryBuilder {
    pub name: String,
    /// STGTY_ROOT, STGTY_STORAGE or STGTY_STREAM
    pub entry_type: u8,
    pub start_sector: u32,
    pub size: u64,
    pub sid_left: u32,
    pub sid_right: u32,
    pub sid_child: u32,
    pub clsid: [u8; 16],
    pub state_bits: u32,
    /// 0 = red, 1 = black
    pub color: u8,
}

impl DirectoryEntryBuilder {
    fn new(name: String, entry_type: u8) -> Self {
        Self {
            name,
            entry_type,
            start_sector: 0,
            size: 0,
            sid_left: NOSTREAM,
            sid_right: NOSTREAM,
            sid_child: NOSTREAM,
            clsid: [0; 16],
            state_bits: 0,
            color: 1,
        }
    }

    /// Serialize to the on-disk layout
    pub fn to_bytes(&self) -> [u8; DIRENTRY_SIZE] {
        let mut data = [0u8; DIRENTRY_SIZE];

        // At most 31 UTF-16 units plus the terminator
        let units: Vec<u16> = self.name.encode_utf16().take(31).collect();
        for (i, unit) in units.iter().enumerate() {
            data[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
        }
        let name_len = ((units.len() + 1) * 2) as u16;
        data[64..66].copy_from_slice(&name_len.to_le_bytes());

        data[66] = self.entry_type;
        data[67] = self.color;
        data[68..72].copy_from_slice(&self.sid_left.to_le_bytes());
        data[72..76].copy_from_slice(&self.sid_right.to_le_bytes());
        data[76..80].copy_from_slice(&self.sid_child.to_le_bytes());
        data[80..96].copy_from_slice(&self.clsid);
        data[96..100].copy_from_slice(&self.state_bits.to_le_bytes());
        // Creation and modification times stay zero
        data[116..120].copy_from_slice(&self.start_sector.to_le_bytes());
        data[120..128].copy_from_slice(&self.size.to_le_bytes());

        data
    }
}

/// Sibling ordering used inside one storage
pub(super) fn compare_names(a: &str, b: &str) -> Ordering {
    let len_a = a.encode_utf16().count();
    let len_b = b.encode_utf16().count();
    len_a
        .cmp(&len_b)
        .then_with(|| a.to_uppercase().cmp(&b.to_uppercase()))
}

/// Builds the directory stream; SID 0 is always the root
pub(super) struct DirectoryBuilder {
    entries: Vec<DirectoryEntryBuilder>,
    /// Storage path -> SID
    storages: HashMap<Vec<String>, u32>,
    /// Parent SID -> child SIDs in insertion order
    children: HashMap<u32, Vec<u32>>,
}

impl DirectoryBuilder {
    pub fn new(ministream_start: u32, ministream_size: u64, root_clsid: [u8; 16]) -> Self {
        let mut root = DirectoryEntryBuilder::new("Root Entry".to_string(), STGTY_ROOT);
        root.start_sector = ministream_start;
        root.size = ministream_size;
        root.clsid = root_clsid;

        let mut storages = HashMap::new();
        storages.insert(Vec::new(), 0);
        Self {
            entries: vec![root],
            storages,
            children: HashMap::new(),
        }
    }

    /// Ensure the storage at `path` exists and return its SID.
    pub fn add_storage_path(&mut self, path: &[String]) -> u32 {
        let mut parent = 0u32;
        for depth in 1..=path.len() {
            let prefix = &path[..depth];
            parent = match self.storages.get(prefix) {
                Some(&sid) => sid,
                None => {
                    let sid = self.push(parent, &prefix[depth - 1], STGTY_STORAGE);
                    self.storages.insert(prefix.to_vec(), sid);
                    sid
                },
            };
        }
        parent
    }

    /// Set CLSID and state bits of an existing storage.
    pub fn set_storage_class(&mut self, path: &[String], clsid: [u8; 16], state_bits: u32) {
        let sid = self.add_storage_path(path);
        let entry = &mut self.entries[sid as usize];
        entry.clsid = clsid;
        entry.state_bits = state_bits;
    }

    /// Add a stream below its parent storage, creating the parents as needed.
    pub fn add_stream_path(&mut self, path: &[String], start_sector: u32, size: u64) -> u32 {
        let Some((name, parents)) = path.split_last() else {
            return NOSTREAM;
        };
        let parent = self.add_storage_path(parents);
        let sid = self.push(parent, name, STGTY_STREAM);
        let entry = &mut self.entries[sid as usize];
        entry.start_sector = start_sector;
        entry.size = size;
        sid
    }

    fn push(&mut self, parent: u32, name: &str, entry_type: u8) -> u32 {
        let sid = self.entries.len() as u32;
        self.entries
            .push(DirectoryEntryBuilder::new(name.to_string(), entry_type));
        self.children.entry(parent).or_default().push(sid);
        sid
    }

    /// Link every sibling tree and serialize the entries in SID order.
    ///
    /// The stream is padded with empty entries to a whole number of sectors.
    pub fn generate(mut self, sector_size: usize) -> Vec<u8> {
        let parents: Vec<u32> = self.children.keys().copied().collect();
        for parent in parents {
            let mut kids = self.children.remove(&parent).unwrap_or_default();
            kids.sort_by(|&a, &b| {
                compare_names(&self.entries[a as usize].name, &self.entries[b as usize].name)
            });
            let red_depth = match kids.len() {
                0 | 1 => usize::MAX,
                n => n.ilog2() as usize,
            };
            let top = link(&kids, &mut self.entries, 0, red_depth);
            self.entries[parent as usize].sid_child = top;
        }

        let mut data = Vec::with_capacity(self.entries.len() * DIRENTRY_SIZE);
        for entry in &self.entries {
            data.extend_from_slice(&entry.to_bytes());
        }

        // Unused slots: empty name, no siblings, no child
        let mut unused = [0u8; DIRENTRY_SIZE];
        unused[68..80].fill(0xFF);
        while data.len() % sector_size != 0 {
            data.extend_from_slice(&unused);
        }
        data
    }

    #[cfg(test)]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

/// Arrange `sorted` into a size-balanced tree and return the subtree root.
fn link(
    sorted: &[u32],
    entries: &mut [DirectoryEntryBuilder],
    depth: usize,
    red_depth: usize,
) -> u32 {
    if sorted.is_empty() {
        return NOSTREAM;
    }
    let mid = sorted.len() / 2;
    let sid = sorted[mid];
    let left = link(&sorted[..mid], entries, depth + 1, red_depth);
    let right = link(&sorted[mid + 1..], entries, depth + 1, red_depth);

    let entry = &mut entries[sid as usize];
    entry.sid_left = left;
    entry.sid_right = right;
    entry.color = if depth == red_depth { 0 } else { 1 };
    sid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_compare_names() {
        assert_eq!(compare_names("Data", "1Table"), Ordering::Less);
        assert_eq!(compare_names("abc", "ABD"), Ordering::Less);
        assert_eq!(compare_names("VBA", "vba"), Ordering::Equal);
        // UTF-16 length, not byte length
        assert_eq!(compare_names("éé", "abc"), Ordering::Less);
        assert_eq!(compare_names("_VBA_PROJECT", "dir"), Ordering::Greater);
    }

    #[test]
    fn test_entry_bytes() {
        let mut entry = DirectoryEntryBuilder::new("VBA".to_string(), STGTY_STORAGE);
        entry.clsid = [7; 16];
        entry.state_bits = 0x10;
        let bytes = entry.to_bytes();
        assert_eq!(&bytes[0..6], &[b'V', 0, b'B', 0, b'A', 0]);
        assert_eq!(u16::from_le_bytes([bytes[64], bytes[65]]), 8);
        assert_eq!(bytes[66], STGTY_STORAGE);
        assert_eq!(&bytes[80..96], &[7; 16]);
        assert_eq!(u32::from_le_bytes([bytes[96], bytes[97], bytes[98], bytes[99]]), 0x10);
    }

    #[test]
    fn test_balanced_siblings() {
        let mut dir = DirectoryBuilder::new(ENDOFCHAIN, 0, [0; 16]);
        for name in ["EEEE", "A", "DDD", "CC", "BB"] {
            dir.add_stream_path(&names(&[name]), ENDOFCHAIN, 0);
        }
        dir.add_stream_path(&names(&["VBA", "dir"]), ENDOFCHAIN, 0);
        assert_eq!(dir.entry_count(), 8);

        let data = dir.generate(512);
        assert_eq!(data.len(), 1024);

        let field = |sid: usize, off: usize| {
            let at = sid * DIRENTRY_SIZE + off;
            u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
        };
        // Sorted: A(2) BB(5) CC(4) DDD(3) VBA(6) EEEE(1); midpoint is DDD
        assert_eq!(field(0, 76), 3);
        assert_eq!(field(3, 68), 5);
        assert_eq!(field(3, 72), 1);
        assert_eq!(field(1, 68), 6);
        assert_eq!(field(5, 68), 2);
        assert_eq!(field(5, 72), 4);
        // The storage's own child is its stream
        assert_eq!(field(6, 76), 7);
        // Root black, deepest level red
        assert_eq!(data[3 * DIRENTRY_SIZE + 67], 1);
        assert_eq!(data[2 * DIRENTRY_SIZE + 67], 0);
    }

    #[test]
    fn test_padding_entries() {
        let dir = DirectoryBuilder::new(ENDOFCHAIN, 0, [0; 16]);
        let data = dir.generate(512);
        assert_eq!(data.len(), 512);
        assert_eq!(data[66], STGTY_ROOT);
        assert_eq!(data[DIRENTRY_SIZE + 66], STGTY_EMPTY);
        assert_eq!(&data[DIRENTRY_SIZE + 76..DIRENTRY_SIZE + 80], &[0xFF; 4]);
    }
}
