//! Snapshot File Format
//!
//! Layout (little-endian):
//! ┌─────────────────────────────────────────────────────┐
//! │ FileHeader (16 bytes): magic[8] version:u32 count:u32│
//! ├─────────────────────────────────────────────────────┤
//! │ RecordHeader (12 bytes): key_len value_len checksum │
//! │ key bytes | value bytes                             │
//! ├─────────────────────────────────────────────────────┤
//! │ ... record berikutnya                               │
//! └─────────────────────────────────────────────────────┘

use crc32fast::Hasher as Crc32;

use crate::error::StoreError;

/// Magic bytes di awal file
pub const MAGIC: [u8; 8] = *b"SYNCVIEW";
pub const VERSION: u32 = 1;
pub const FILE_HEADER_SIZE: usize = 16;
pub const RECORD_HEADER_SIZE: usize = 12;

/// Header file snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u32,
    pub record_count: u32,
}

impl FileHeader {
    pub fn new(record_count: u32) -> Self {
        Self {
            version: VERSION,
            record_count,
        }
    }

    pub fn to_bytes(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut out = [0u8; FILE_HEADER_SIZE];
        out[..8].copy_from_slice(&MAGIC);
        out[8..12].copy_from_slice(&self.version.to_le_bytes());
        out[12..16].copy_from_slice(&self.record_count.to_le_bytes());
        out
    }

    /// Parse dan validasi header di awal buffer
    pub fn from_bytes(buf: &[u8]) -> Result<Self, StoreError> {
        if buf.len() < FILE_HEADER_SIZE {
            return Err(StoreError::Truncated { offset: 0 });
        }
        if buf[..8] != MAGIC {
            return Err(StoreError::BadMagic);
        }

        let version = read_u32_le(buf, 8);
        if version != VERSION {
            return Err(StoreError::UnsupportedVersion(version));
        }

        Ok(Self {
            version,
            record_count: read_u32_le(buf, 12),
        })
    }
}

/// Header per record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub key_len: u32,
    pub value_len: u32,
    pub checksum: u32,
}

impl RecordHeader {
    pub fn for_record(key: &[u8], value: &[u8]) -> Result<Self, StoreError> {
        let key_len =
            u32::try_from(key.len()).map_err(|_| StoreError::RecordTooLarge { len: key.len() })?;
        let value_len = u32::try_from(value.len())
            .map_err(|_| StoreError::RecordTooLarge { len: value.len() })?;

        Ok(Self {
            key_len,
            value_len,
            checksum: checksum(key, value),
        })
    }

    pub fn to_bytes(&self) -> [u8; RECORD_HEADER_SIZE] {
        let mut out = [0u8; RECORD_HEADER_SIZE];
        out[0..4].copy_from_slice(&self.key_len.to_le_bytes());
        out[4..8].copy_from_slice(&self.value_len.to_le_bytes());
        out[8..12].copy_from_slice(&self.checksum.to_le_bytes());
        out
    }

    /// `None` jika buffer lebih pendek dari header
    #[inline(always)]
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < RECORD_HEADER_SIZE {
            return None;
        }
        Some(Self {
            key_len: read_u32_le(buf, 0),
            value_len: read_u32_le(buf, 4),
            checksum: read_u32_le(buf, 8),
        })
    }

    /// Total ukuran record (header + key + value)
    #[inline(always)]
    pub fn total_size(&self) -> usize {
        RECORD_HEADER_SIZE + self.key_len as usize + self.value_len as usize
    }
}

#[inline(always)]
fn read_u32_le(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

/// CRC-32 atas key lalu value
#[inline(always)]
pub fn checksum(key: &[u8], value: &[u8]) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(key);
    hasher.update(value);
    hasher.finalize()
}
