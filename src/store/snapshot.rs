//! Memory-Mapped Snapshot Store
//!
//! File snapshot di-mmap read-only, lalu seluruh record divalidasi sekali
//! saat open (bounds + checksum). Index hanya menyimpan offset ke dalam
//! mmap, jadi iterasi mengembalikan slice langsung dari page cache.

use std::fs::File;
use std::ops::Range;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::debug;

use super::format::{checksum, FileHeader, RecordHeader, FILE_HEADER_SIZE, RECORD_HEADER_SIZE};
use crate::error::StoreError;

/// Satu pasangan key/value (zero-copy dari mmap)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub key: &'a [u8],
    pub value: &'a [u8],
}

/// Batas iterasi
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Bounds {
    /// Semua record
    #[default]
    All,
    /// `[start, limit)`; slice kosong berarti tanpa batas di sisi itu
    Range { start: Vec<u8>, limit: Vec<u8> },
    /// Semua key yang diawali prefix ini
    Prefix(Vec<u8>),
}

impl Bounds {
    pub fn range(start: impl Into<Vec<u8>>, limit: impl Into<Vec<u8>>) -> Self {
        Self::Range {
            start: start.into(),
            limit: limit.into(),
        }
    }

    pub fn prefix(prefix: impl Into<Vec<u8>>) -> Self {
        Self::Prefix(prefix.into())
    }

    fn lower(&self) -> Option<&[u8]> {
        match self {
            Self::All => None,
            Self::Range { start, .. } | Self::Prefix(start) => {
                (!start.is_empty()).then_some(start.as_slice())
            }
        }
    }

    fn upper(&self) -> Option<Vec<u8>> {
        match self {
            Self::All => None,
            Self::Range { limit, .. } => (!limit.is_empty()).then(|| limit.clone()),
            Self::Prefix(prefix) => prefix_limit(prefix),
        }
    }
}

/// Key terkecil yang lebih besar dari semua key berprefix `prefix`.
/// `None` jika prefix kosong atau seluruhnya 0xff.
fn prefix_limit(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut limit = prefix.to_vec();
    while let Some(last) = limit.pop() {
        if last < u8::MAX {
            limit.push(last + 1);
            return Some(limit);
        }
    }
    None
}

#[derive(Debug, Clone)]
struct Entry {
    key: Range<usize>,
    value: Range<usize>,
}

/// Snapshot read-only, terurut berdasarkan key
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    mmap: Mmap,
    index: Vec<Entry>,
}

impl Store {
    /// Membuka dan memvalidasi snapshot file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;

        // mmap file kosong gagal di beberapa platform
        if file.metadata()?.len() < FILE_HEADER_SIZE as u64 {
            return Err(StoreError::Truncated { offset: 0 });
        }

        // SAFETY: Map read-only; snapshot tidak diubah selama terbuka
        let mmap = unsafe { Mmap::map(&file)? };
        let index = build_index(&mmap)?;

        debug!(
            path = %path.display(),
            records = index.len(),
            bytes = mmap.len(),
            "snapshot opened"
        );

        Ok(Self { path, mmap, index })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Jumlah key unik
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Point lookup
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.index
            .binary_search_by(|e| self.key_at(e).cmp(key))
            .ok()
            .map(|i| &self.mmap[self.index[i].value.clone()])
    }

    /// Iterasi terurut dalam batas `bounds`
    pub fn iter(&self, bounds: &Bounds) -> Records<'_> {
        let start = bounds
            .lower()
            .map_or(0, |lower| self.index.partition_point(|e| self.key_at(e) < lower));
        let end = bounds.upper().map_or(self.index.len(), |upper| {
            self.index
                .partition_point(|e| self.key_at(e) < upper.as_slice())
        });

        Records {
            store: self,
            pos: start,
            end: end.max(start),
        }
    }

    #[inline(always)]
    fn key_at(&self, entry: &Entry) -> &[u8] {
        &self.mmap[entry.key.clone()]
    }
}

/// Walk semua record, validasi, lalu sort + dedup berdasarkan key
fn build_index(buf: &[u8]) -> Result<Vec<Entry>, StoreError> {
    let header = FileHeader::from_bytes(buf)?;
    // record_count belum dipercaya: batasi dengan jumlah record yang muat di file
    let max_records = (buf.len() - FILE_HEADER_SIZE) / RECORD_HEADER_SIZE;
    let mut entries = Vec::with_capacity((header.record_count as usize).min(max_records));
    let mut pos = FILE_HEADER_SIZE;

    while pos < buf.len() {
        let record = RecordHeader::from_bytes(&buf[pos..])
            .ok_or(StoreError::Truncated { offset: pos })?;

        let key_start = pos + RECORD_HEADER_SIZE;
        let value_start = key_start + record.key_len as usize;
        let end = pos + record.total_size();
        if end > buf.len() {
            return Err(StoreError::Truncated { offset: pos });
        }

        if checksum(&buf[key_start..value_start], &buf[value_start..end]) != record.checksum {
            return Err(StoreError::ChecksumMismatch { offset: pos });
        }

        entries.push(Entry {
            key: key_start..value_start,
            value: value_start..end,
        });
        pos = end;
    }

    if entries.len() != header.record_count as usize {
        return Err(StoreError::CountMismatch {
            expected: header.record_count,
            found: entries.len(),
        });
    }

    // Stable sort: untuk key yang sama, urutan file dipertahankan
    entries.sort_by(|a, b| buf[a.key.clone()].cmp(&buf[b.key.clone()]));

    let mut index: Vec<Entry> = Vec::with_capacity(entries.len());
    let mut duplicates = 0usize;
    for entry in entries {
        if let Some(last) = index.last_mut() {
            if buf[last.key.clone()] == buf[entry.key.clone()] {
                *last = entry;
                duplicates += 1;
                continue;
            }
        }
        index.push(entry);
    }

    if duplicates > 0 {
        debug!(duplicates, "duplicate keys collapsed, last write wins");
    }

    Ok(index)
}

/// Zero-copy iterator atas record terurut
pub struct Records<'a> {
    store: &'a Store,
    pos: usize,
    end: usize,
}

impl<'a> Iterator for Records<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.end {
            return None;
        }

        let store = self.store;
        let entry = &store.index[self.pos];
        self.pos += 1;

        Some(Record {
            key: &store.mmap[entry.key.clone()],
            value: &store.mmap[entry.value.clone()],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.pos;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Records<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SnapshotWriter;
    use std::fs;

    fn write_snapshot<K: AsRef<[u8]>, V: AsRef<[u8]>>(
        records: &[(K, V)],
    ) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.snap");

        let mut writer = SnapshotWriter::new();
        for (k, v) in records {
            writer.push(k.as_ref(), v.as_ref()).unwrap();
        }
        writer.write_to(&path).unwrap();

        (dir, path)
    }

    fn keys(store: &Store, bounds: &Bounds) -> Vec<Vec<u8>> {
        store.iter(bounds).map(|r| r.key.to_vec()).collect()
    }

    #[test]
    fn test_iteration_is_sorted() {
        let (_dir, path) = write_snapshot(&[("c", "3"), ("a", "1"), ("b", "2")]);
        let store = Store::open(&path).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(keys(&store, &Bounds::All), vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn test_range_is_half_open() {
        let (_dir, path) = write_snapshot(&[("a", ""), ("b", ""), ("c", ""), ("d", "")]);
        let store = Store::open(&path).unwrap();

        assert_eq!(keys(&store, &Bounds::range("b", "d")), vec![b"b".to_vec(), b"c".to_vec()]);
        assert_eq!(keys(&store, &Bounds::range("", "b")), vec![b"a".to_vec()]);
        assert_eq!(keys(&store, &Bounds::range("c", "")).len(), 2);
        assert_eq!(keys(&store, &Bounds::range("d", "a")).len(), 0);
    }

    #[test]
    fn test_prefix() {
        let (_dir, path) = write_snapshot(&[
            (vec![1u8, 0, 0], ""),
            (vec![1, 0xff], ""),
            (vec![2, 0], ""),
            (vec![0xff, 0xff], ""),
        ]);
        let store = Store::open(&path).unwrap();

        assert_eq!(store.iter(&Bounds::prefix(vec![1u8])).len(), 2);
        assert_eq!(store.iter(&Bounds::prefix(vec![0xffu8])).len(), 1);
        assert_eq!(store.iter(&Bounds::prefix(Vec::new())).len(), 4);
    }

    #[test]
    fn test_prefix_limit() {
        assert_eq!(prefix_limit(b"ab"), Some(b"ac".to_vec()));
        assert_eq!(prefix_limit(&[1, 0xff]), Some(vec![2]));
        assert_eq!(prefix_limit(&[0xff]), None);
        assert_eq!(prefix_limit(&[]), None);
    }

    #[test]
    fn test_duplicate_keys_last_write_wins() {
        let (_dir, path) = write_snapshot(&[("k", "old"), ("x", "1"), ("k", "new")]);
        let store = Store::open(&path).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(b"k"), Some(&b"new"[..]));
        assert_eq!(store.get(b"missing"), None);
    }

    #[test]
    fn test_corrupted_record_is_rejected() {
        let (_dir, path) = write_snapshot(&[("key", "value")]);
        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        fs::write(&path, &bytes).unwrap();

        assert!(matches!(
            Store::open(&path),
            Err(StoreError::ChecksumMismatch { offset: FILE_HEADER_SIZE })
        ));
    }

    #[test]
    fn test_truncated_file_is_rejected() {
        let (_dir, path) = write_snapshot(&[("key", "value")]);
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 2]).unwrap();

        assert!(matches!(
            Store::open(&path),
            Err(StoreError::Truncated { .. })
        ));

        fs::write(&path, b"").unwrap();
        assert!(matches!(
            Store::open(&path),
            Err(StoreError::Truncated { offset: 0 })
        ));
    }

    #[test]
    fn test_oversized_record_count_is_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liar.snap");
        fs::write(&path, FileHeader::new(u32::MAX).to_bytes()).unwrap();

        assert!(matches!(
            Store::open(&path),
            Err(StoreError::CountMismatch { expected: u32::MAX, found: 0 })
        ));
    }

    #[test]
    fn test_not_a_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk");
        fs::write(&path, b"this is definitely not a snapshot").unwrap();

        assert!(matches!(Store::open(&path), Err(StoreError::BadMagic)));
        assert!(matches!(
            Store::open(dir.path().join("missing")),
            Err(StoreError::Io(_))
        ));
    }

    #[test]
    fn test_empty_snapshot() {
        let (_dir, path) = write_snapshot::<&str, &str>(&[]);
        let store = Store::open(&path).unwrap();

        assert!(store.is_empty());
        assert_eq!(store.iter(&Bounds::All).next(), None);
        assert_eq!(store.path(), path.as_path());
    }
}
