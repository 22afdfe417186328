//! Console Layer: Interactive Command Loop
//!
//! Baca satu baris, eksekusi di `Session`, tulis hasilnya.
//! Error per command dirender sebagai `Error: ...` dan loop jalan terus.
//!
//! Note: Binary `syncview` (src/main.rs) memasang tracing subscriber
//! dan memanggil `run` dengan stdin/stdout.

mod session;
mod show;

use std::io::{self, BufRead, Write};

use tracing::warn;

pub use session::{split_words, Output, Session, HELP};
pub use show::{collect_rows, render_table, show, Filter, ShowArgs};

/// Read-eval-print loop sampai EOF atau `exit`
///
/// Prompt kosong = mode non-interaktif (tidak ada prompt yang ditulis).
pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    mut out: W,
    prompt: &str,
) -> io::Result<()> {
    write_prompt(&mut out, prompt)?;

    for line in input.lines() {
        let line = line?;
        if !execute_line(session, &line, &mut out)? {
            break;
        }
        write_prompt(&mut out, prompt)?;
    }

    out.flush()
}

/// Eksekusi satu baris dan tulis output. Returns `false` saat `exit`.
pub fn execute_line<W: Write>(session: &mut Session, line: &str, out: &mut W) -> io::Result<bool> {
    match session.execute(line) {
        Ok(Output::Exit) => return Ok(false),
        Ok(Output::Text(text)) => {
            out.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                out.write_all(b"\n")?;
            }
        }
        Ok(Output::None) => {}
        Err(err) => {
            warn!(%err, line, "command failed");
            writeln!(out, "Error: {}", err)?;
        }
    }
    Ok(true)
}

#[inline(always)]
fn write_prompt<W: Write>(out: &mut W, prompt: &str) -> io::Result<()> {
    if prompt.is_empty() {
        return Ok(());
    }
    out.write_all(prompt.as_bytes())?;
    out.flush()
}
