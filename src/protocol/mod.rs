//! Protocol Layer: Sync Index Key/Value Decoding
//!
//! Prinsip desain:
//! - Pure: Tidak ada state, tidak ada I/O, aman dipanggil dari thread mana saja
//! - Zero-Copy parse: `SyncKey` meminjam slice dari raw key
//! - Total: Input terpotong/rusak dirender sebagai marker, tidak pernah panic

mod cursor;
mod key;
mod value;

pub use cursor::{Cursor, DecodeError};
pub use key::{decode_key, KeyType, Quoted, SyncKey, HASH_SIZE};
pub use value::{decode_value, ValueFormat, CONVERT_ERROR};
