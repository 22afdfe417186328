//! Snapshot Writer
//!
//! Encode record langsung ke satu buffer; header file (dengan jumlah
//! record) baru diisi saat `finish`.

use std::fs;
use std::path::Path;

use tracing::debug;

use super::format::{FileHeader, RecordHeader, FILE_HEADER_SIZE};
use crate::error::StoreError;

/// Builder untuk file snapshot
pub struct SnapshotWriter {
    buffer: Vec<u8>,
    records: u32,
}

impl Default for SnapshotWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotWriter {
    /// Membuat writer kosong (header placeholder sudah dialokasikan)
    pub fn new() -> Self {
        Self {
            buffer: vec![0u8; FILE_HEADER_SIZE],
            records: 0,
        }
    }

    /// Tambah satu record. Urutan bebas; key duplikat: yang terakhir menang.
    pub fn push(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let header = RecordHeader::for_record(key, value)?;
        let records = self
            .records
            .checked_add(1)
            .ok_or(StoreError::RecordTooLarge { len: key.len() })?;

        self.buffer.reserve(header.total_size());
        self.buffer.extend_from_slice(&header.to_bytes());
        self.buffer.extend_from_slice(key);
        self.buffer.extend_from_slice(value);
        self.records = records;

        Ok(())
    }

    /// Jumlah record yang sudah ditulis
    pub fn len(&self) -> usize {
        self.records as usize
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Tutup header dan kembalikan isi file
    pub fn finish(mut self) -> Vec<u8> {
        let header = FileHeader::new(self.records);
        self.buffer[..FILE_HEADER_SIZE].copy_from_slice(&header.to_bytes());
        self.buffer
    }

    pub fn write_to<P: AsRef<Path>>(self, path: P) -> Result<(), StoreError> {
        let records = self.records;
        let bytes = self.finish();
        fs::write(path.as_ref(), &bytes)?;

        debug!(
            path = %path.as_ref().display(),
            records,
            bytes = bytes.len(),
            "snapshot written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::format::{FileHeader, RecordHeader, RECORD_HEADER_SIZE};

    #[test]
    fn test_empty_writer_has_header_only() {
        let bytes = SnapshotWriter::new().finish();
        assert_eq!(bytes.len(), FILE_HEADER_SIZE);
        assert_eq!(FileHeader::from_bytes(&bytes).unwrap().record_count, 0);
    }

    #[test]
    fn test_push_encodes_record() {
        let mut writer = SnapshotWriter::new();
        writer.push(b"k", b"value").unwrap();
        assert_eq!(writer.len(), 1);
        assert!(!writer.is_empty());

        let bytes = writer.finish();
        assert_eq!(FileHeader::from_bytes(&bytes).unwrap().record_count, 1);

        let record = RecordHeader::from_bytes(&bytes[FILE_HEADER_SIZE..]).unwrap();
        assert_eq!(record.key_len, 1);
        assert_eq!(record.value_len, 5);

        let body = &bytes[FILE_HEADER_SIZE + RECORD_HEADER_SIZE..];
        assert_eq!(body, b"kvalue");
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.db");

        let mut writer = SnapshotWriter::new();
        writer.push(b"a", b"1").unwrap();
        writer.push(b"b", b"2").unwrap();
        writer.write_to(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(FileHeader::from_bytes(&bytes).unwrap().record_count, 2);
        assert_eq!(bytes.len(), FILE_HEADER_SIZE + 2 * (RECORD_HEADER_SIZE + 2));
    }
}
