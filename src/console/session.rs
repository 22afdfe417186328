//! Console Session
//!
//! Paling banyak satu snapshot terbuka, satu command dalam satu waktu.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::show::{self, ShowArgs};
use crate::error::ConsoleError;
use crate::store::Store;

pub const HELP: &str = "\
Commands:
  open <path>     Open a snapshot file (closes the current one)
  close           Close the open snapshot
  show [flags]    Show records; `show -h` lists the flags
  help            Show this help
  exit, quit      Leave the console";

/// Hasil satu command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Tidak ada yang dicetak
    None,
    Text(String),
    /// Session selesai
    Exit,
}

#[derive(Default)]
pub struct Session {
    store: Option<Store>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Option<&Store> {
        self.store.as_ref()
    }

    /// Buka `path`, menggantikan snapshot yang sedang terbuka.
    /// Jika gagal, snapshot lama tetap terbuka.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<&Store, ConsoleError> {
        let store = Store::open(path.as_ref())?;
        if let Some(old) = self.store.take() {
            debug!(path = %old.path().display(), "previous snapshot closed");
        }

        info!(path = %store.path().display(), records = store.len(), "snapshot opened");
        Ok(self.store.insert(store))
    }

    pub fn close(&mut self) -> Result<(), ConsoleError> {
        let store = self.store.take().ok_or(ConsoleError::NotOpen)?;
        info!(path = %store.path().display(), "snapshot closed");
        Ok(())
    }

    /// Eksekusi satu baris console
    pub fn execute(&mut self, line: &str) -> Result<Output, ConsoleError> {
        let words = split_words(line)?;
        let Some((command, args)) = words.split_first() else {
            return Ok(Output::None);
        };

        match command.as_str() {
            "open" => {
                let [path] = args else {
                    return Err(ConsoleError::Usage("usage: open <path>".to_string()));
                };
                let store = self.open(path)?;
                Ok(Output::Text(format!(
                    "Opened {} ({} records)",
                    store.path().display(),
                    store.len()
                )))
            }
            "close" => {
                self.close()?;
                Ok(Output::Text("Database closed".to_string()))
            }
            "show" => self.show(args),
            "help" => Ok(Output::Text(HELP.to_string())),
            "exit" | "quit" => Ok(Output::Exit),
            other => Err(ConsoleError::Usage(format!(
                "unknown command `{}`, try `help`",
                other
            ))),
        }
    }

    fn show(&self, words: &[String]) -> Result<Output, ConsoleError> {
        let args = match ShowArgs::parse_words(words) {
            Ok(args) => args,
            Err(err) if err.kind() == clap::error::ErrorKind::DisplayHelp => {
                return Ok(Output::Text(err.to_string()));
            }
            Err(err) => return Err(ConsoleError::Usage(err.to_string())),
        };
        let store = self.store.as_ref().ok_or(ConsoleError::NotOpen)?;

        let table = show::show(store, &args);
        match args.tofile.as_deref() {
            Some(path) if !path.is_empty() => {
                fs::write(path, &table)?;
                info!(path, bytes = table.len(), "show output written");
                Ok(Output::None)
            }
            _ => Ok(Output::Text(table)),
        }
    }
}

/// Split berdasarkan whitespace; kutip ganda menggabungkan kata (`"a b"` -> `a b`)
pub fn split_words(line: &str) -> Result<Vec<String>, ConsoleError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        return Err(ConsoleError::Usage("unterminated quote".to_string()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
