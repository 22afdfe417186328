//! Store module: Read-only snapshot dengan mmap backing
//!
//! Prinsip desain:
//! - Zero-Copy: Key/value dibaca langsung dari mmap, tidak ada copy
//! - Validate once: Bounds dan checksum dicek saat open, iterasi infallible
//! - Ordered: Index terurut untuk range dan prefix scan

mod format;
mod snapshot;
mod writer;

pub use format::{checksum, FileHeader, RecordHeader, FILE_HEADER_SIZE, MAGIC, VERSION};
pub use snapshot::{Bounds, Record, Records, Store};
pub use writer::SnapshotWriter;
