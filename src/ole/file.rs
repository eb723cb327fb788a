use super::consts::*;
use crate::common::binary::{self, decode_utf16le};
use std::io;
use zerocopy::{FromBytes, LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Raw OLE directory entry structure (128 bytes)
///
/// This represents the on-disk format of a directory entry.
/// Based on Microsoft OLE2 specification.
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawDirectoryEntry {
    /// Entry name in UTF-16LE (64 bytes, null-padded)
    name: [u8; 64],
    /// Length of name in bytes (including null terminator)
    name_len: U16<LE>,
    /// Entry type (1 = storage, 2 = stream, 5 = root)
    entry_type: u8,
    /// Node color (0 = red, 1 = black)
    node_color: u8,
    /// Left sibling SID
    sid_left: U32<LE>,
    /// Right sibling SID
    sid_right: U32<LE>,
    /// Child SID
    sid_child: U32<LE>,
    /// CLSID (16 bytes)
    clsid: [u8; 16],
    /// State bits
    state_bits: U32<LE>,
    /// Creation time (FILETIME)
    creation_time: U64<LE>,
    /// Modified time (FILETIME)
    modified_time: U64<LE>,
    /// Starting sector
    start_sector: U32<LE>,
    /// Stream size
    stream_size: U64<LE>,
}

/// Parsed view of an OLE2 compound file held in memory.
///
/// The reader borrows the byte buffer and never mutates it. All tables (FAT,
/// MiniFAT, directory, ministream) are decoded once in [`OleFile::parse`], so
/// reads take `&self` and any number of `OleFile`s may share one buffer.
#[derive(Debug)]
pub struct OleFile<'a> {
    /// The complete container bytes
    data: &'a [u8],
    /// Sector size (512 or 4096 bytes)
    sector_size: usize,
    /// Mini sector size (typically 64 bytes)
    mini_sector_size: usize,
    /// Mini stream cutoff size (typically 4096 bytes)
    mini_stream_cutoff: u32,
    /// File Allocation Table - maps sector to next sector in chain
    fat: Vec<u32>,
    /// Mini FAT - for streams smaller than cutoff size
    minifat: Vec<u32>,
    /// Directory entries indexed by SID; unused slots are `None`
    dir_entries: Vec<Option<DirectoryEntry>>,
    /// Contents of the root entry's ministream
    ministream: Vec<u8>,
}

/// Represents an OLE directory entry (stream or storage)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Storage ID (index in directory)
    pub sid: u32,
    /// Entry name (UTF-16 decoded to UTF-8)
    pub name: String,
    /// Entry type (stream, storage, root, etc.)
    pub entry_type: u8,
    /// Index of left sibling in red-black tree
    pub sid_left: u32,
    /// Index of right sibling in red-black tree
    pub sid_right: u32,
    /// Index of child node in red-black tree
    pub sid_child: u32,
    /// Raw CLSID of this entry
    pub clsid: [u8; 16],
    /// User-defined state bits
    pub state_bits: u32,
    /// Creation time (FILETIME)
    pub creation_time: u64,
    /// Modified time (FILETIME)
    pub modified_time: u64,
    /// First sector of the stream
    pub start_sector: u32,
    /// Size of the stream in bytes
    pub size: u64,
    /// Whether this stream is in MiniFAT
    pub is_minifat: bool,
}

impl DirectoryEntry {
    #[inline]
    pub fn is_stream(&self) -> bool {
        self.entry_type == STGTY_STREAM
    }

    #[inline]
    pub fn is_storage(&self) -> bool {
        self.entry_type == STGTY_STORAGE || self.entry_type == STGTY_ROOT
    }

    /// CLSID formatted as `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`, empty when unset.
    pub fn clsid_string(&self) -> String {
        format_clsid(&self.clsid)
    }
}

/// A directory entry together with its storage path below the root.
#[derive(Debug, Clone)]
pub struct EntryPath<'e> {
    /// Storage names followed by the entry's own name
    pub path: Vec<String>,
    pub entry: &'e DirectoryEntry,
}

/// Error types for OLE file parsing
#[derive(Debug)]
pub enum OleError {
    Io(io::Error),
    InvalidFormat(String),
    InvalidData(String),
    NotOleFile,
    CorruptedFile(String),
    StreamNotFound,
}

impl From<io::Error> for OleError {
    fn from(err: io::Error) -> Self {
        OleError::Io(err)
    }
}

impl From<crate::common::binary::BinaryError> for OleError {
    fn from(err: crate::common::binary::BinaryError) -> Self {
        OleError::InvalidData(err.to_string())
    }
}

impl std::fmt::Display for OleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OleError::Io(e) => write!(f, "IO error: {}", e),
            OleError::InvalidFormat(s) => write!(f, "Invalid format: {}", s),
            OleError::InvalidData(s) => write!(f, "Invalid data: {}", s),
            OleError::NotOleFile => write!(f, "Not an OLE file"),
            OleError::CorruptedFile(s) => write!(f, "Corrupted file: {}", s),
            OleError::StreamNotFound => write!(f, "Stream not found"),
        }
    }
}

impl std::error::Error for OleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OleError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl<'a> OleFile<'a> {
    /// Parse an OLE file held entirely in memory
    ///
    /// # Arguments
    /// * `data` - The complete compound file bytes
    ///
    /// # Returns
    /// * `Result<OleFile, OleError>` - The parsed OLE file or an error
    pub fn parse(data: &'a [u8]) -> Result<Self, OleError> {
        if !is_ole_file(data) {
            return Err(OleError::NotOleFile);
        }

        let header = &data[..HEADER_SIZE];
        let dll_version = binary::read_u16_le(header, 0x1A)?;
        let byte_order = binary::read_u16_le(header, 0x1C)?;
        let sector_shift = binary::read_u16_le(header, 0x1E)?;
        let mini_sector_shift = binary::read_u16_le(header, 0x20)?;
        let num_fat_sectors = binary::read_u32_le(header, 0x2C)?;
        let first_dir_sector = binary::read_u32_le(header, 0x30)?;
        let mini_stream_cutoff = binary::read_u32_le(header, 0x38)?;
        let first_minifat_sector = binary::read_u32_le(header, 0x3C)?;
        let num_minifat_sectors = binary::read_u32_le(header, 0x40)?;
        let first_difat_sector = binary::read_u32_le(header, 0x44)?;
        let num_difat_sectors = binary::read_u32_le(header, 0x48)?;

        // Validate byte order (must be little-endian)
        if byte_order != 0xFFFE {
            return Err(OleError::InvalidFormat("Invalid byte order".to_string()));
        }
        if !(9..=12).contains(&sector_shift) || mini_sector_shift > sector_shift {
            return Err(OleError::InvalidFormat(format!(
                "Unsupported sector shift {}",
                sector_shift
            )));
        }

        let sector_size = 1usize << sector_shift;
        let mini_sector_size = 1usize << mini_sector_shift;

        // Validate sector size matches DLL version
        if (dll_version == 3 && sector_size != SECTOR_SIZE_V3)
            || (dll_version == 4 && sector_size != SECTOR_SIZE_V4)
        {
            return Err(OleError::InvalidFormat("Sector size mismatch".to_string()));
        }

        let mut ole = OleFile {
            data,
            sector_size,
            mini_sector_size,
            mini_stream_cutoff,
            fat: Vec::new(),
            minifat: Vec::new(),
            dir_entries: Vec::new(),
            ministream: Vec::new(),
        };

        ole.load_fat(header, num_fat_sectors, first_difat_sector, num_difat_sectors)?;
        ole.load_directory(first_dir_sector)?;
        if num_minifat_sectors > 0 && first_minifat_sector != ENDOFCHAIN {
            ole.load_minifat(first_minifat_sector)?;
        }
        ole.load_ministream()?;

        Ok(ole)
    }

    /// Sector size of the container (512 or 4096).
    pub fn sector_size(&self) -> usize {
        self.sector_size
    }

    /// Load the File Allocation Table (FAT)
    ///
    /// The first 109 FAT sector indexes are stored in the header, additional
    /// indexes are stored in a chain of DIFAT sectors.
    fn load_fat(
        &mut self,
        header: &[u8],
        num_fat_sectors: u32,
        first_difat_sector: u32,
        num_difat_sectors: u32,
    ) -> Result<(), OleError> {
        let wanted = num_fat_sectors as usize;
        let mut fat_sectors = Vec::with_capacity(wanted);

        for i in 0..HEADER_DIFAT_ENTRIES {
            if fat_sectors.len() == wanted {
                break;
            }
            let sector = binary::read_u32_le(header, 0x4C + i * 4)?;
            if sector == FREESECT || sector == ENDOFCHAIN {
                break;
            }
            fat_sectors.push(sector);
        }

        let entries_per_difat = (self.sector_size / 4) - 1; // -1 for next DIFAT pointer
        let mut difat_sector = first_difat_sector;
        for _ in 0..num_difat_sectors {
            if fat_sectors.len() == wanted || difat_sector > MAXREGSECT {
                break;
            }
            let sector_data = self.sector(difat_sector)?;
            for i in 0..entries_per_difat {
                if fat_sectors.len() == wanted {
                    break;
                }
                let sector = binary::read_u32_le(sector_data, i * 4)?;
                if sector == FREESECT || sector == ENDOFCHAIN {
                    break;
                }
                fat_sectors.push(sector);
            }
            difat_sector = binary::read_u32_le(sector_data, entries_per_difat * 4)?;
        }

        if fat_sectors.len() != wanted {
            return Err(OleError::CorruptedFile(format!(
                "Header declares {} FAT sectors, found {}",
                wanted,
                fat_sectors.len()
            )));
        }

        let entries_per_sector = self.sector_size / 4;
        self.fat.reserve(fat_sectors.len() * entries_per_sector);
        for &sector_id in &fat_sectors {
            let sector_data = self.sector(sector_id)?;
            self.fat.extend(
                sector_data
                    .chunks_exact(4)
                    .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]])),
            );
        }

        Ok(())
    }

    /// Load the Mini FAT (for small streams)
    fn load_minifat(&mut self, first_minifat_sector: u32) -> Result<(), OleError> {
        let minifat_data = self.read_fat_chain(first_minifat_sector)?;
        self.minifat = minifat_data
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(())
    }

    /// Load every directory entry; the tree is walked lazily by path lookups.
    fn load_directory(&mut self, first_dir_sector: u32) -> Result<(), OleError> {
        let dir_data = self.read_fat_chain(first_dir_sector)?;
        let num_entries = dir_data.len() / DIRENTRY_SIZE;
        if num_entries == 0 {
            return Err(OleError::CorruptedFile("Empty directory".to_string()));
        }

        let mut entries = Vec::with_capacity(num_entries);
        for (sid, chunk) in dir_data.chunks_exact(DIRENTRY_SIZE).enumerate() {
            entries.push(self.parse_directory_entry(chunk, sid as u32)?);
        }

        match entries.first() {
            Some(Some(root)) if root.entry_type == STGTY_ROOT => {},
            _ => return Err(OleError::CorruptedFile("Missing root entry".to_string())),
        }

        self.dir_entries = entries;
        Ok(())
    }

    /// Load the ministream, which is the root entry's FAT chain
    fn load_ministream(&mut self) -> Result<(), OleError> {
        let (start, size) = match self.root() {
            Some(root) => (root.start_sector, root.size),
            None => return Err(OleError::CorruptedFile("No root entry".to_string())),
        };
        if start == ENDOFCHAIN || size == 0 {
            return Ok(());
        }
        let mut ministream = self.read_fat_chain(start)?;
        ministream.truncate(size as usize);
        self.ministream = ministream;
        Ok(())
    }

    /// Parse a single directory entry from 128 bytes
    fn parse_directory_entry(
        &self,
        data: &[u8],
        sid: u32,
    ) -> Result<Option<DirectoryEntry>, OleError> {
        let raw = RawDirectoryEntry::read_from_bytes(data)
            .map_err(|_| OleError::InvalidFormat("Failed to parse directory entry".to_string()))?;

        if raw.entry_type == STGTY_EMPTY {
            return Ok(None);
        }

        let name_len = raw.name_len.get() as usize;
        let name_bytes = &raw.name[0..name_len.saturating_sub(2).min(64)];
        let name = decode_utf16le(name_bytes)
            .trim_end_matches('\0')
            .to_string();

        // Handle size based on sector size (512-byte sectors only use low 32 bits)
        let size = if self.sector_size == SECTOR_SIZE_V3 {
            raw.stream_size.get() & 0xFFFFFFFF
        } else {
            raw.stream_size.get()
        };

        let is_minifat = size < self.mini_stream_cutoff as u64 && raw.entry_type == STGTY_STREAM;

        Ok(Some(DirectoryEntry {
            sid,
            name,
            entry_type: raw.entry_type,
            sid_left: raw.sid_left.get(),
            sid_right: raw.sid_right.get(),
            sid_child: raw.sid_child.get(),
            clsid: raw.clsid,
            state_bits: raw.state_bits.get(),
            creation_time: raw.creation_time.get(),
            modified_time: raw.modified_time.get(),
            start_sector: raw.start_sector.get(),
            size,
            is_minifat,
        }))
    }

    /// Borrow a single sector from the buffer
    fn sector(&self, sector_id: u32) -> Result<&'a [u8], OleError> {
        // Sector position in file: (sector_id + 1) * sector_size
        let position = (sector_id as usize + 1) * self.sector_size;
        let data: &'a [u8] = self.data;
        if position >= data.len() {
            return Err(OleError::CorruptedFile(format!(
                "Sector {} beyond end of file",
                sector_id
            )));
        }
        // Writers may truncate the final sector; the missing tail reads as padding.
        let end = (position + self.sector_size).min(data.len());
        Ok(&data[position..end])
    }

    /// Read a stream by following the FAT chain
    fn read_fat_chain(&self, start_sector: u32) -> Result<Vec<u8>, OleError> {
        let mut data = Vec::new();
        let mut sector = start_sector;
        let mut steps = 0usize;

        while sector != ENDOFCHAIN {
            if sector as usize >= self.fat.len() {
                return Err(OleError::CorruptedFile(
                    "Invalid sector index in FAT".to_string(),
                ));
            }
            steps += 1;
            if steps > self.fat.len() {
                return Err(OleError::CorruptedFile("Cycle in FAT chain".to_string()));
            }

            let sector_data = self.sector(sector)?;
            data.extend_from_slice(sector_data);
            data.resize(steps * self.sector_size, 0);

            sector = self.fat[sector as usize];
        }

        Ok(data)
    }

    /// Read a stream by following the MiniFAT chain
    fn read_minifat_chain(&self, start_sector: u32, size: u64) -> Result<Vec<u8>, OleError> {
        let mut data = Vec::with_capacity(size as usize);
        let mut sector = start_sector;
        let mut steps = 0usize;

        while sector != ENDOFCHAIN {
            if sector as usize >= self.minifat.len() {
                return Err(OleError::CorruptedFile(
                    "Invalid sector index in MiniFAT".to_string(),
                ));
            }
            steps += 1;
            if steps > self.minifat.len() {
                return Err(OleError::CorruptedFile("Cycle in MiniFAT chain".to_string()));
            }

            let position = (sector as usize) * self.mini_sector_size;
            let chunk = self
                .ministream
                .get(position..position + self.mini_sector_size)
                .ok_or_else(|| OleError::CorruptedFile("Mini sector out of bounds".to_string()))?;
            data.extend_from_slice(chunk);

            sector = self.minifat[sector as usize];
        }

        if (data.len() as u64) < size {
            return Err(OleError::CorruptedFile(
                "MiniFAT chain shorter than stream size".to_string(),
            ));
        }
        data.truncate(size as usize);
        Ok(data)
    }

    /// Read the full contents of a stream entry
    pub fn read_entry(&self, entry: &DirectoryEntry) -> Result<Vec<u8>, OleError> {
        if !entry.is_stream() {
            return Err(OleError::InvalidFormat(format!(
                "'{}' is not a stream",
                entry.name
            )));
        }
        if entry.size == 0 {
            return Ok(Vec::new());
        }

        if entry.is_minifat {
            self.read_minifat_chain(entry.start_sector, entry.size)
        } else {
            let mut data = self.read_fat_chain(entry.start_sector)?;
            if (data.len() as u64) < entry.size {
                return Err(OleError::CorruptedFile(format!(
                    "FAT chain of '{}' shorter than stream size",
                    entry.name
                )));
            }
            data.truncate(entry.size as usize);
            Ok(data)
        }
    }

    /// Open a stream by path and return its contents
    ///
    /// # Arguments
    /// * `path` - Path to the stream as a slice of strings
    ///
    /// # Returns
    /// * `Result<Vec<u8>, OleError>` - Stream contents or error
    pub fn open_stream(&self, path: &[&str]) -> Result<Vec<u8>, OleError> {
        let entry = self.find_entry(path)?;
        self.read_entry(entry)
    }

    /// Root directory entry
    pub fn root(&self) -> Option<&DirectoryEntry> {
        self.dir_entries.first().and_then(Option::as_ref)
    }

    /// Every storage and stream below the root, each with its full path.
    ///
    /// Siblings are listed in tree order (in-order traversal of the sibling
    /// tree), parents before their children.
    pub fn entries(&self) -> Result<Vec<EntryPath<'_>>, OleError> {
        let mut out = Vec::new();
        let mut visited = vec![false; self.dir_entries.len()];
        visited[0] = true;
        let root_child = self.root().map(|r| r.sid_child).unwrap_or(NOSTREAM);
        self.walk(root_child, &mut Vec::new(), &mut visited, &mut out)?;
        Ok(out)
    }

    fn walk<'s>(
        &'s self,
        sid: u32,
        parent: &mut Vec<String>,
        visited: &mut [bool],
        out: &mut Vec<EntryPath<'s>>,
    ) -> Result<(), OleError> {
        if sid == NOSTREAM {
            return Ok(());
        }
        let entry = self.entry(sid)?;
        if std::mem::replace(&mut visited[sid as usize], true) {
            return Err(OleError::CorruptedFile(format!(
                "Directory entry {} referenced twice",
                sid
            )));
        }

        self.walk(entry.sid_left, parent, visited, out)?;

        parent.push(entry.name.clone());
        out.push(EntryPath {
            path: parent.clone(),
            entry,
        });
        if entry.is_storage() {
            self.walk(entry.sid_child, parent, visited, out)?;
        }
        parent.pop();

        self.walk(entry.sid_right, parent, visited, out)
    }

    fn entry(&self, sid: u32) -> Result<&DirectoryEntry, OleError> {
        self.dir_entries
            .get(sid as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| OleError::CorruptedFile(format!("Invalid directory entry {}", sid)))
    }

    /// Find a directory entry by path
    fn find_entry(&self, path: &[&str]) -> Result<&DirectoryEntry, OleError> {
        let mut current = self.root().ok_or(OleError::StreamNotFound)?;
        for &name in path {
            if !current.is_storage() {
                return Err(OleError::StreamNotFound);
            }
            current = self.find_child_by_name(current.sid_child, name, 0)?;
        }
        Ok(current)
    }

    /// Find a child entry by name in a sibling tree (case-insensitive)
    fn find_child_by_name(
        &self,
        sid: u32,
        name: &str,
        depth: usize,
    ) -> Result<&DirectoryEntry, OleError> {
        if sid == NOSTREAM || depth > self.dir_entries.len() {
            return Err(OleError::StreamNotFound);
        }
        let entry = self.entry(sid)?;

        if entry.name.to_lowercase() == name.to_lowercase() {
            return Ok(entry);
        }

        if let Ok(found) = self.find_child_by_name(entry.sid_left, name, depth + 1) {
            return Ok(found);
        }
        self.find_child_by_name(entry.sid_right, name, depth + 1)
    }

    /// Check if a stream or storage exists
    pub fn exists(&self, path: &[&str]) -> bool {
        self.find_entry(path).is_ok()
    }
}

/// Format CLSID as a human-readable string
fn format_clsid(bytes: &[u8; 16]) -> String {
    if bytes.iter().all(|&b| b == 0) {
        return String::new();
    }

    format!(
        "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        u16::from_le_bytes([bytes[4], bytes[5]]),
        u16::from_le_bytes([bytes[6], bytes[7]]),
        bytes[8],
        bytes[9],
        bytes[10],
        bytes[11],
        bytes[12],
        bytes[13],
        bytes[14],
        bytes[15],
    )
}

/// Check if a file/data is an OLE file by checking magic bytes
pub fn is_ole_file(data: &[u8]) -> bool {
    data.len() >= MINIMAL_OLEFILE_SIZE && &data[0..8] == MAGIC
}
