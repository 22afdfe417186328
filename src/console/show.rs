//! `show` Command
//!
//! Scan snapshot yang sedang terbuka lalu render tabel dua kolom.
//! Flag memakai ejaan single-dash (`-filter range -start a -end b`) dan
//! ditulis ulang ke bentuk double-dash clap sebelum parsing.
//! Nilai flag boleh diawali `-` (mis. `-contain -x`).

use clap::{Parser, ValueEnum};
use tracing::debug;

use crate::protocol::ValueFormat;
use crate::store::{Bounds, Store};

/// Sel header tabel
const KEY_HEADER: &str = "<Key";
const VALUE_HEADER: &str = "Value>";

const FLAGS: [&str; 8] = [
    "filter",
    "keyformat",
    "format",
    "start",
    "end",
    "prefix",
    "contain",
    "tofile",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Filter {
    /// Every record
    #[default]
    All,
    /// Keys in `[start, end)`
    Range,
    /// Keys starting with `prefix`
    Prefix,
    /// Same scan as `all`; use `-contain` to narrow
    Contain,
}

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "show", no_binary_name = true, about = "Show records of the open database")]
pub struct ShowArgs {
    /// Choose filter
    #[arg(long, value_enum, default_value_t = Filter::All)]
    pub filter: Filter,

    /// Choose keys display format
    #[arg(long, default_value = "raw", allow_hyphen_values = true)]
    pub keyformat: String,

    /// Choose values display format
    #[arg(long, default_value = "raw", allow_hyphen_values = true)]
    pub format: String,

    /// Key prefix indicating the beginning of the range
    #[arg(long, allow_hyphen_values = true)]
    pub start: Option<String>,

    /// Key prefix indicating the end of the range (exclusive)
    #[arg(long, allow_hyphen_values = true)]
    pub end: Option<String>,

    /// Key prefix for `-filter prefix`
    #[arg(long, allow_hyphen_values = true)]
    pub prefix: Option<String>,

    /// Only rows whose rendered key contains this text
    #[arg(long, allow_hyphen_values = true)]
    pub contain: Option<String>,

    /// Write the table to this file instead of printing it
    #[arg(long, allow_hyphen_values = true)]
    pub tofile: Option<String>,
}

impl Default for ShowArgs {
    fn default() -> Self {
        Self {
            filter: Filter::All,
            keyformat: "raw".to_string(),
            format: "raw".to_string(),
            start: None,
            end: None,
            prefix: None,
            contain: None,
            tofile: None,
        }
    }
}

impl ShowArgs {
    /// Parse kata-kata setelah `show`
    pub fn parse_words<S: AsRef<str>>(words: &[S]) -> Result<Self, clap::Error> {
        Self::try_parse_from(words.iter().map(|w| normalize_flag(w.as_ref())))
    }

    /// Batas iterasi sesuai `-filter`
    pub fn bounds(&self) -> Bounds {
        let text = |v: &Option<String>| v.as_deref().unwrap_or_default().as_bytes().to_vec();
        match self.filter {
            Filter::All | Filter::Contain => Bounds::All,
            Filter::Range => Bounds::range(text(&self.start), text(&self.end)),
            Filter::Prefix => Bounds::prefix(text(&self.prefix)),
        }
    }
}

/// `-flag` / `-flag=value` -> `--flag` / `--flag=value`, hanya untuk flag yang dikenal
fn normalize_flag(word: &str) -> String {
    if let Some(rest) = word.strip_prefix('-') {
        if !rest.starts_with('-') {
            let name = rest.split('=').next().unwrap_or_default();
            if FLAGS.contains(&name) {
                return format!("-{}", word);
            }
        }
    }
    word.to_string()
}

/// Baris hasil decode (urutan store), setelah filter `-contain`
pub fn collect_rows(store: &Store, args: &ShowArgs) -> Vec<(String, String)> {
    let key_format = ValueFormat::from_name(&args.keyformat);
    let value_format = ValueFormat::from_name(&args.format);
    let contain = args.contain.as_deref().unwrap_or_default();
    let bounds = args.bounds();

    let rows: Vec<_> = store
        .iter(&bounds)
        .filter_map(|record| {
            let key = key_format.decode(record.key);
            key.contains(contain)
                .then(|| (key, value_format.decode(record.value)))
        })
        .collect();

    debug!(
        ?bounds,
        keyformat = key_format.name(),
        format = value_format.name(),
        rows = rows.len(),
        "show scan finished"
    );
    rows
}

/// Header `<Key | Value>` + satu baris per row, kolom key di-pad
pub fn render_table(rows: &[(String, String)]) -> String {
    let width = rows
        .iter()
        .map(|(key, _)| key.chars().count())
        .chain(std::iter::once(KEY_HEADER.len()))
        .max()
        .unwrap_or_default();

    let mut out = format!("{:<width$} | {}\n", KEY_HEADER, VALUE_HEADER, width = width);
    for (key, value) in rows {
        out.push_str(&format!("{:<width$} | {}\n", key, value, width = width));
    }
    out
}

/// Scan + render
pub fn show(store: &Store, args: &ShowArgs) -> String {
    render_table(&collect_rows(store, args))
}
