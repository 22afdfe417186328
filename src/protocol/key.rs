//! Sync Index Key Format
//!
//! Layout (byte 0 = tag, integer big-endian):
//! ┌─────┬──────────────────────────────────────────────────────┐
//! │ tag │ fields                                               │
//! ├─────┼──────────────────────────────────────────────────────┤
//! │  0  │ folder:u32  device:u32  name\0                       │
//! │  1  │ folder:u32  name\0                                   │
//! │  2  │ folder:u32  hash[32]  name\0                         │
//! │ 3,4 │ opaque statistic key                                 │
//! │  5  │ folder:u32  name\0                                   │
//! │ 6,7 │ id:u32                                               │
//! │  8  │ device:u32  folder:u32                               │
//! │  9  │ folder:u32                                           │
//! │ 10  │ key (sisa bytes)                                     │
//! │ 11  │ folder:u32  sequence:u64                             │
//! │ 12  │ folder:u32  file (sisa bytes)                        │
//! │ 13  │ hash (sisa bytes)                                    │
//! └─────┴──────────────────────────────────────────────────────┘
//!
//! Parse menghasilkan `SyncKey` yang meminjam slice dari raw key;
//! rendering terpisah lewat `Display`.

use std::fmt;

use super::cursor::{Cursor, DecodeError};

/// Panjang hash block (SHA-256)
pub const HASH_SIZE: usize = 32;

/// Tag byte pada key index
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// File info per device
    Device = 0,
    /// Version list global
    Global = 1,
    /// Block index dari file
    Block = 2,
    DeviceStatistic = 3,
    FolderStatistic = 4,
    VirtualMtime = 5,
    FolderIdx = 6,
    DeviceIdx = 7,
    IndexId = 8,
    FolderMeta = 9,
    MiscData = 10,
    /// Sequence number -> device key
    Sequence = 11,
    Need = 12,
    BlockList = 13,
}

impl KeyType {
    #[inline(always)]
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Device),
            1 => Some(Self::Global),
            2 => Some(Self::Block),
            3 => Some(Self::DeviceStatistic),
            4 => Some(Self::FolderStatistic),
            5 => Some(Self::VirtualMtime),
            6 => Some(Self::FolderIdx),
            7 => Some(Self::DeviceIdx),
            8 => Some(Self::IndexId),
            9 => Some(Self::FolderMeta),
            10 => Some(Self::MiscData),
            11 => Some(Self::Sequence),
            12 => Some(Self::Need),
            13 => Some(Self::BlockList),
            _ => None,
        }
    }

    /// Label di dalam kurung siku saat rendering
    pub fn label(self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Global => "global",
            Self::Block => "block",
            Self::DeviceStatistic => "dstat",
            Self::FolderStatistic => "fstat",
            Self::VirtualMtime => "mtime",
            Self::FolderIdx => "folderidx",
            Self::DeviceIdx => "deviceidx",
            Self::IndexId => "indexid",
            Self::FolderMeta => "foldermeta",
            Self::MiscData => "miscdata",
            Self::Sequence => "sequence",
            Self::Need => "need",
            Self::BlockList => "blocklist",
        }
    }
}

/// Label untuk tag yang tidak dikenal
pub const UNKNOWN_LABEL: &str = "???";

/// Key yang sudah di-parse (zero-copy, meminjam dari raw key)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKey<'a> {
    Device {
        folder: u32,
        device: u32,
        name: &'a [u8],
    },
    Global {
        folder: u32,
        name: &'a [u8],
    },
    Block {
        folder: u32,
        hash: &'a [u8; HASH_SIZE],
        name: &'a [u8],
    },
    /// Seluruh key, termasuk tag
    DeviceStatistic { raw: &'a [u8] },
    /// Seluruh key, termasuk tag
    FolderStatistic { raw: &'a [u8] },
    VirtualMtime {
        folder: u32,
        name: &'a [u8],
    },
    FolderIdx { id: u32 },
    DeviceIdx { id: u32 },
    IndexId { device: u32, folder: u32 },
    FolderMeta { folder: u32 },
    MiscData { key: &'a [u8] },
    Sequence { folder: u32, sequence: u64 },
    Need { folder: u32, file: &'a [u8] },
    BlockList { hash: &'a [u8] },
    /// Tag di luar 0..=13
    Unknown { raw: &'a [u8] },
}

impl<'a> SyncKey<'a> {
    /// Parse raw key sesuai layout tag-nya.
    ///
    /// Gagal hanya jika field fixed-width tidak muat (atau key kosong).
    pub fn parse(raw: &'a [u8]) -> Result<Self, DecodeError> {
        let Some(&tag) = raw.first() else {
            return Err(DecodeError::Truncated {
                field: "tag",
                offset: 0,
                need: 1,
                have: 0,
            });
        };
        let Some(key_type) = KeyType::from_u8(tag) else {
            return Ok(Self::Unknown { raw });
        };

        let mut c = Cursor::at(raw, 1);
        let key = match key_type {
            KeyType::Device => Self::Device {
                folder: c.read_u32("folder")?,
                device: c.read_u32("device")?,
                name: c.read_nul_terminated(),
            },
            KeyType::Global => Self::Global {
                folder: c.read_u32("folder")?,
                name: c.read_nul_terminated(),
            },
            KeyType::Block => Self::Block {
                folder: c.read_u32("folder")?,
                hash: c.read_array::<HASH_SIZE>("hash")?,
                name: c.read_nul_terminated(),
            },
            KeyType::DeviceStatistic => Self::DeviceStatistic { raw },
            KeyType::FolderStatistic => Self::FolderStatistic { raw },
            KeyType::VirtualMtime => Self::VirtualMtime {
                folder: c.read_u32("folder")?,
                name: c.read_nul_terminated(),
            },
            KeyType::FolderIdx => Self::FolderIdx {
                id: c.read_u32("id")?,
            },
            KeyType::DeviceIdx => Self::DeviceIdx {
                id: c.read_u32("id")?,
            },
            KeyType::IndexId => Self::IndexId {
                device: c.read_u32("device")?,
                folder: c.read_u32("folder")?,
            },
            KeyType::FolderMeta => Self::FolderMeta {
                folder: c.read_u32("folder")?,
            },
            KeyType::MiscData => Self::MiscData { key: c.rest() },
            KeyType::Sequence => Self::Sequence {
                folder: c.read_u32("folder")?,
                sequence: c.read_u64("sequence")?,
            },
            KeyType::Need => Self::Need {
                folder: c.read_u32("folder")?,
                file: c.rest(),
            },
            KeyType::BlockList => Self::BlockList { hash: c.rest() },
        };

        Ok(key)
    }

    /// Tag dari key, `None` untuk `Unknown`
    pub fn key_type(&self) -> Option<KeyType> {
        let key_type = match self {
            Self::Device { .. } => KeyType::Device,
            Self::Global { .. } => KeyType::Global,
            Self::Block { .. } => KeyType::Block,
            Self::DeviceStatistic { .. } => KeyType::DeviceStatistic,
            Self::FolderStatistic { .. } => KeyType::FolderStatistic,
            Self::VirtualMtime { .. } => KeyType::VirtualMtime,
            Self::FolderIdx { .. } => KeyType::FolderIdx,
            Self::DeviceIdx { .. } => KeyType::DeviceIdx,
            Self::IndexId { .. } => KeyType::IndexId,
            Self::FolderMeta { .. } => KeyType::FolderMeta,
            Self::MiscData { .. } => KeyType::MiscData,
            Self::Sequence { .. } => KeyType::Sequence,
            Self::Need { .. } => KeyType::Need,
            Self::BlockList { .. } => KeyType::BlockList,
            Self::Unknown { .. } => return None,
        };
        Some(key_type)
    }

    pub fn label(&self) -> &'static str {
        self.key_type().map_or(UNKNOWN_LABEL, KeyType::label)
    }
}

impl fmt::Display for SyncKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.label())?;
        match *self {
            Self::Device {
                folder,
                device,
                name,
            } => write!(f, " F:{} D:{} N:{}", folder, device, Quoted(name)),
            Self::Global { folder, name } | Self::VirtualMtime { folder, name } => {
                write!(f, " F:{} N:{}", folder, Quoted(name))
            }
            Self::Block { folder, hash, name } => write!(
                f,
                " F:{} H:{} N:{}",
                folder,
                hex::encode(hash),
                Quoted(name)
            ),
            Self::DeviceStatistic { raw } | Self::FolderStatistic { raw } => {
                write!(f, " K:{}", hex::encode(raw))
            }
            Self::FolderIdx { id } | Self::DeviceIdx { id } => write!(f, " K:{}", id),
            Self::IndexId { device, folder } => write!(f, " D:{} F:{}", device, folder),
            Self::FolderMeta { folder } => write!(f, " F:{}", folder),
            Self::MiscData { key } => write!(f, " K:{}", Quoted(key)),
            Self::Sequence { folder, sequence } => write!(f, " F:{} S:{}", folder, sequence),
            Self::Need { folder, file } => write!(f, " F:{} V:{}", folder, Quoted(file)),
            Self::BlockList { hash } => write!(f, " H:{}", hex::encode(hash)),
            Self::Unknown { raw } => write!(f, " {}", hex::encode(raw)),
        }
    }
}

/// Byte string dalam tanda kutip: UTF-8 valid di-escape seperti debug
/// string, byte yang tidak valid ditulis `\xNN`.
pub struct Quoted<'a>(pub &'a [u8]);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for chunk in self.0.utf8_chunks() {
            for c in chunk.valid().chars() {
                // Di dalam kutip ganda, `'` ditulis apa adanya
                if c == '\'' {
                    f.write_str("'")?;
                } else {
                    write!(f, "{}", c.escape_debug())?;
                }
            }
            for b in chunk.invalid() {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        f.write_str("\"")
    }
}

/// Render raw key menjadi teks. Total: tidak pernah panic.
///
/// Key kosong menghasilkan string kosong. Key dengan field yang terpotong
/// dirender sebagai marker `<truncated ...>` diikuti hex seluruh key.
pub fn decode_key(raw: &[u8]) -> String {
    if raw.is_empty() {
        return String::new();
    }

    match SyncKey::parse(raw) {
        Ok(key) => key.to_string(),
        Err(err) => {
            let label = KeyType::from_u8(raw[0]).map_or(UNKNOWN_LABEL, KeyType::label);
            format!("[{}] <{}> K:{}", label, err, hex::encode(raw))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(tag: u8, parts: &[&[u8]]) -> Vec<u8> {
        let mut out = vec![tag];
        for part in parts {
            out.extend_from_slice(part);
        }
        out
    }

    #[test]
    fn test_device_key() {
        let raw = key(0, &[&7u32.to_be_bytes(), &3u32.to_be_bytes(), b"foo.txt\0"]);
        assert_eq!(decode_key(&raw), r#"[device] F:7 D:3 N:"foo.txt""#);
    }

    #[test]
    fn test_global_and_mtime_keys() {
        let global = key(1, &[&2u32.to_be_bytes(), b"dir/a"]);
        assert_eq!(decode_key(&global), r#"[global] F:2 N:"dir/a""#);

        let mtime = key(5, &[&9u32.to_be_bytes(), b"x\0trailing"]);
        assert_eq!(decode_key(&mtime), r#"[mtime] F:9 N:"x""#);
    }

    #[test]
    fn test_block_key() {
        let hash = [0xabu8; HASH_SIZE];
        let raw = key(2, &[&1u32.to_be_bytes(), &hash, b"f\0"]);

        let expected = format!(r#"[block] F:1 H:{} N:"f""#, "ab".repeat(HASH_SIZE));
        assert_eq!(decode_key(&raw), expected);
    }

    #[test]
    fn test_statistic_keys_render_full_key() {
        assert_eq!(decode_key(&[3, 0x61, 0x62]), "[dstat] K:036162");
        assert_eq!(decode_key(&[4, 0xff]), "[fstat] K:04ff");
    }

    #[test]
    fn test_index_keys() {
        assert_eq!(decode_key(&key(6, &[&12u32.to_be_bytes()])), "[folderidx] K:12");
        assert_eq!(decode_key(&key(7, &[&13u32.to_be_bytes()])), "[deviceidx] K:13");
        assert_eq!(
            decode_key(&key(8, &[&4u32.to_be_bytes(), &5u32.to_be_bytes()])),
            "[indexid] D:4 F:5"
        );
        assert_eq!(decode_key(&key(9, &[&8u32.to_be_bytes()])), "[foldermeta] F:8");
    }

    #[test]
    fn test_miscdata_keeps_nul_bytes() {
        let raw = key(10, &[b"dbVersion\0x"]);
        assert_eq!(decode_key(&raw), r#"[miscdata] K:"dbVersion\0x""#);
    }

    #[test]
    fn test_sequence_key() {
        let raw = key(11, &[&3u32.to_be_bytes(), &u64::MAX.to_be_bytes()]);
        assert_eq!(
            decode_key(&raw),
            format!("[sequence] F:3 S:{}", u64::MAX)
        );
    }

    #[test]
    fn test_need_key_runs_to_end() {
        let raw = key(12, &[&1u32.to_be_bytes(), b"a\0b"]);
        assert_eq!(decode_key(&raw), r#"[need] F:1 V:"a\0b""#);
    }

    #[test]
    fn test_blocklist_key() {
        assert_eq!(decode_key(&[13, 0xde, 0xad]), "[blocklist] H:dead");
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(decode_key(&[]), "");
        assert_eq!(decode_key(&[99]), "[???] 63");
        assert_eq!(decode_key(&[200, 1]), "[???] c801");
    }

    #[test]
    fn test_folder_is_unsigned() {
        let raw = key(9, &[&u32::MAX.to_be_bytes()]);
        assert_eq!(decode_key(&raw), "[foldermeta] F:4294967295");
    }

    #[test]
    fn test_truncated_keys_render_marker() {
        assert_eq!(
            decode_key(&[0, 0, 0, 0, 7, 0]),
            "[device] <truncated device: need 4 bytes at offset 5, have 6> K:000000000700"
        );
        assert_eq!(
            decode_key(&[11, 0, 0, 0, 1, 0xff]),
            "[sequence] <truncated sequence: need 8 bytes at offset 5, have 6> K:0b00000001ff"
        );

        let short_hash = key(2, &[&1u32.to_be_bytes(), &[0u8; 10]]);
        assert!(decode_key(&short_hash).starts_with("[block] <truncated hash"));
    }

    #[test]
    fn test_tag_only_key_is_truncated_not_panic() {
        for tag in 0u8..=13 {
            let out = decode_key(&[tag]);
            assert!(out.starts_with('['), "tag {} -> {}", tag, out);
        }
    }

    #[test]
    fn test_invalid_utf8_name_is_escaped() {
        let raw = key(1, &[&0u32.to_be_bytes(), &[b'a', 0xff, b'"']]);
        assert_eq!(decode_key(&raw), r#"[global] F:0 N:"a\xff\"""#);
    }

    #[test]
    fn test_single_quote_is_not_escaped() {
        let raw = key(1, &[&0u32.to_be_bytes(), b"don't.txt"]);
        assert_eq!(decode_key(&raw), r#"[global] F:0 N:"don't.txt""#);

        let need = key(12, &[&1u32.to_be_bytes(), b"it's\n"]);
        assert_eq!(decode_key(&need), r#"[need] F:1 V:"it's\n""#);
    }

    #[test]
    fn test_parse_returns_structured_fields() {
        let raw = key(0, &[&7u32.to_be_bytes(), &3u32.to_be_bytes(), b"n"]);
        let parsed = SyncKey::parse(&raw).unwrap();

        assert_eq!(parsed.key_type(), Some(KeyType::Device));
        assert_eq!(
            parsed,
            SyncKey::Device {
                folder: 7,
                device: 3,
                name: b"n",
            }
        );
        assert_eq!(SyncKey::parse(&[42]).unwrap().key_type(), None);
    }

    #[test]
    fn test_key_type_from_u8() {
        for v in 0u8..=13 {
            assert_eq!(KeyType::from_u8(v).map(|t| t as u8), Some(v));
        }
        assert_eq!(KeyType::from_u8(14), None);
    }
}
