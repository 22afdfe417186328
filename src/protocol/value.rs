//! Value Codec Registry
//!
//! Nama format dipetakan ke enum tertutup `ValueFormat`; nama yang
//! tidak dikenal jatuh ke passthrough (`Raw`). Semua codec total:
//! kegagalan decode dirender sebagai marker, bukan error.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::cursor::Cursor;
use super::key::decode_key;

/// Marker saat bson/geohash gagal di-decode
pub const CONVERT_ERROR: &str = "Error converting!";

/// Format tampilan untuk value (dan key, lewat `-keyformat`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueFormat {
    /// Selalu string kosong
    Ignore,
    Bson,
    Base64,
    /// Geohash teks base-32, dirender sebagai titik tengah cell
    Geohash,
    /// 8 byte big-endian unsigned
    Int64,
    /// 8 byte little-endian IEEE-754
    Float64,
    /// Value yang berisi key index lain
    SyncKey,
    /// Bytes apa adanya sebagai teks
    #[default]
    Raw,
}

impl ValueFormat {
    pub const ALL: [ValueFormat; 8] = [
        Self::Ignore,
        Self::Bson,
        Self::Base64,
        Self::Geohash,
        Self::Int64,
        Self::Float64,
        Self::SyncKey,
        Self::Raw,
    ];

    /// Pemetaan total dari nama ke format
    pub fn from_name(name: &str) -> Self {
        match name {
            "ignore" => Self::Ignore,
            "bson" => Self::Bson,
            "base64" => Self::Base64,
            "geohash" => Self::Geohash,
            "int64" => Self::Int64,
            "float64" => Self::Float64,
            "synckey" => Self::SyncKey,
            _ => Self::Raw,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Bson => "bson",
            Self::Base64 => "base64",
            Self::Geohash => "geohash",
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::SyncKey => "synckey",
            Self::Raw => "raw",
        }
    }

    /// Decode raw bytes sesuai format ini
    pub fn decode(self, raw: &[u8]) -> String {
        match self {
            Self::Ignore => String::new(),
            Self::Bson => bson_to_string(raw),
            Self::Base64 => STANDARD.encode(raw),
            Self::Geohash => geohash_to_string(raw),
            Self::Int64 => int64_to_string(raw),
            Self::Float64 => float64_to_string(raw),
            Self::SyncKey => decode_key(raw),
            Self::Raw => String::from_utf8_lossy(raw).into_owned(),
        }
    }
}

impl From<&str> for ValueFormat {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

/// Decode value berdasarkan nama format (default: passthrough)
#[inline]
pub fn decode_value(format_name: &str, raw: &[u8]) -> String {
    ValueFormat::from_name(format_name).decode(raw)
}

fn bson_to_string(raw: &[u8]) -> String {
    let mut reader = raw;
    match bson::Document::from_reader(&mut reader) {
        Ok(doc) => doc.to_string(),
        Err(_) => CONVERT_ERROR.to_string(),
    }
}

fn geohash_to_string(raw: &[u8]) -> String {
    let Ok(hash) = std::str::from_utf8(raw) else {
        return CONVERT_ERROR.to_string();
    };
    match geohash::decode(hash) {
        Ok((center, _lng_err, _lat_err)) => {
            format!("lat: {:.6} lng: {:.6}", center.y, center.x)
        }
        Err(_) => CONVERT_ERROR.to_string(),
    }
}

fn int64_to_string(raw: &[u8]) -> String {
    match Cursor::at(raw, 0).read_array::<8>("int64") {
        Ok(bytes) => u64::from_be_bytes(*bytes).to_string(),
        Err(err) => format!("<{}>", err),
    }
}

// Little-endian, berbeda dengan int64: mengikuti format on-disk
fn float64_to_string(raw: &[u8]) -> String {
    match Cursor::at(raw, 0).read_array::<8>("float64") {
        Ok(bytes) => {
            let v = f64::from_le_bytes(*bytes);
            if v.is_nan() {
                "NaN".to_string()
            } else if v == f64::INFINITY {
                "+Inf".to_string()
            } else if v == f64::NEG_INFINITY {
                "-Inf".to_string()
            } else {
                format!("{:.6}", v)
            }
        }
        Err(err) => format!("<{}>", err),
    }
}
