//! Error types untuk store dan console.
//!
//! Decoder di `protocol` tidak punya error publik: kegagalan decode
//! dirender sebagai marker string. Error di sini hanya untuk plumbing.

use std::io;

use thiserror::Error;

/// Error saat membuka atau menulis snapshot file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("not a snapshot file (bad magic)")]
    BadMagic,

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("snapshot truncated at offset {offset}")]
    Truncated { offset: usize },

    #[error("checksum mismatch in record at offset {offset}")]
    ChecksumMismatch { offset: usize },

    #[error("record count mismatch: header says {expected}, found {found}")]
    CountMismatch { expected: u32, found: usize },

    #[error("record too large: {len} bytes")]
    RecordTooLarge { len: usize },
}

/// Error dari satu command console. Tidak pernah mengakhiri session.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("database is not open")]
    NotOpen,

    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
