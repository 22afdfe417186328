//! Syncview - Sync Index Snapshot Inspector
//!
//! Arsitektur:
//! - Protocol: Pure key/value decoding (tag-dispatched binary key layouts, value codecs)
//! - Store: Zero-copy, mmap-backed ordered snapshot file
//! - Console: `open` / `close` / `show` command loop

pub mod console;
pub mod error;
pub mod protocol;
pub mod store;

pub use error::{ConsoleError, StoreError};
pub use protocol::{decode_key, decode_value, SyncKey, ValueFormat};
