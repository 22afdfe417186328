//! Syncview Console Binary
//!
//! Interactive inspector for sync-index snapshots.
//!
//! Usage:
//!   syncview [--db <PATH>] [-c <LINE>]... [-v]

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use syncview::console::{self, Session};

#[derive(Parser)]
#[command(name = "syncview", version)]
#[command(about = "Console interface to sync-index snapshots", long_about = None)]
struct Cli {
    /// Snapshot file to open at startup
    #[arg(long, env = "SYNCVIEW_DB")]
    db: Option<PathBuf>,

    /// Run this console line and exit (repeatable)
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    commands: Vec<String>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

/// Console configuration
struct ConsoleConfig {
    db_path: Option<PathBuf>,
    commands: Vec<String>,
    prompt: String,
    verbose: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            commands: Vec::new(),
            prompt: "syncview> ".to_string(),
            verbose: false,
        }
    }
}

impl From<Cli> for ConsoleConfig {
    fn from(cli: Cli) -> Self {
        Self {
            db_path: cli.db,
            commands: cli.commands,
            verbose: cli.verbose,
            ..Self::default()
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Log ke stderr supaya tabel di stdout tetap bersih
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_console(config: ConsoleConfig) -> Result<(), syncview::ConsoleError> {
    let mut session = Session::new();

    if let Some(path) = &config.db_path {
        session.open(path)?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // One-shot mode: jalankan command lalu keluar
    if !config.commands.is_empty() {
        for line in &config.commands {
            if !console::execute_line(&mut session, line, &mut out)? {
                break;
            }
        }
        return Ok(());
    }

    info!("type `help` for commands, `exit` to leave");
    console::run(&mut session, io::stdin().lock(), &mut out, &config.prompt)?;
    Ok(())
}

fn main() {
    let config = ConsoleConfig::from(Cli::parse());
    init_tracing(config.verbose);

    if let Err(e) = run_console(config) {
        error!("{}", e);
        std::process::exit(1);
    }
}
