//! Syncview Pack Binary
//!
//! Build a snapshot file from hex text, one record per line:
//!
//! ```text
//! # key-hex value-hex
//! 0100000007666f6f00 0a0b
//! 0d00ff
//! ```
//!
//! A missing value column means an empty value. Blank lines and `#`
//! comments are skipped.
//!
//! Usage:
//!   syncview_pack --output <PATH> [--input <PATH>]

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use syncview::store::SnapshotWriter;

#[derive(Parser)]
#[command(name = "syncview_pack", version)]
#[command(about = "Pack `<key-hex> <value-hex>` lines into a syncview snapshot", long_about = None)]
struct Cli {
    /// Text input (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Snapshot file to write
    #[arg(short, long)]
    output: PathBuf,
}

fn parse_line(line: &str) -> Result<Option<(Vec<u8>, Vec<u8>)>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut cols = line.split_whitespace();
    let key = cols.next().unwrap_or_default();
    let value = cols.next().unwrap_or_default();
    if cols.next().is_some() {
        return Err("expected at most two columns".to_string());
    }

    let key = hex::decode(key).map_err(|e| format!("bad key hex: {}", e))?;
    let value = hex::decode(value).map_err(|e| format!("bad value hex: {}", e))?;
    Ok(Some((key, value)))
}

fn pack<R: BufRead>(input: R, cli: &Cli) -> Result<usize, Box<dyn std::error::Error>> {
    let mut writer = SnapshotWriter::new();

    for (n, line) in input.lines().enumerate() {
        let line = line?;
        match parse_line(&line) {
            Ok(Some((key, value))) => writer.push(&key, &value)?,
            Ok(None) => {}
            Err(msg) => return Err(format!("line {}: {}", n + 1, msg).into()),
        }
    }

    let records = writer.len();
    writer.write_to(&cli.output)?;
    Ok(records)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.input {
        Some(path) => File::open(path)
            .map_err(Into::into)
            .and_then(|f| pack(BufReader::new(f), &cli)),
        None => pack(io::stdin().lock(), &cli),
    };

    match result {
        Ok(records) => info!(records, output = %cli.output.display(), "snapshot packed"),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("  # comment"), Ok(None));
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("0a0b ff"), Ok(Some((vec![0x0a, 0x0b], vec![0xff]))));
        assert_eq!(parse_line("0d00"), Ok(Some((vec![0x0d, 0x00], vec![]))));
        assert!(parse_line("zz 00").is_err());
        assert!(parse_line("00 00 00").is_err());
    }
}
