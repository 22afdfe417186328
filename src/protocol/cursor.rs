//! Bounds-Checked Field Cursor
//!
//! Membaca field big-endian langsung dari slice key tanpa copy.
//! Setiap read dicek terhadap panjang buffer: field yang terpotong
//! menghasilkan `DecodeError`, bukan panic.

use thiserror::Error;

/// Field yang tidak muat di sisa buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("truncated {field}: need {need} bytes at offset {offset}, have {have}")]
    Truncated {
        /// Nama field yang sedang dibaca
        field: &'static str,
        /// Offset awal field di dalam buffer
        offset: usize,
        /// Jumlah byte yang dibutuhkan field
        need: usize,
        /// Panjang buffer sebenarnya
        have: usize,
    },
}

/// Zero-copy cursor di atas raw bytes
pub struct Cursor<'a> {
    buffer: &'a [u8],
    read_pos: usize,
}

impl<'a> Cursor<'a> {
    /// Membuat cursor yang mulai membaca dari `offset`
    #[inline(always)]
    pub fn at(buffer: &'a [u8], offset: usize) -> Self {
        Self {
            buffer,
            read_pos: offset,
        }
    }

    /// Ambil `N` byte berikutnya sebagai array reference
    #[inline(always)]
    pub fn read_array<const N: usize>(
        &mut self,
        field: &'static str,
    ) -> Result<&'a [u8; N], DecodeError> {
        let end = self.read_pos + N;
        let bytes = self
            .buffer
            .get(self.read_pos..end)
            .and_then(|s| <&[u8; N]>::try_from(s).ok())
            .ok_or(DecodeError::Truncated {
                field,
                offset: self.read_pos,
                need: N,
                have: self.buffer.len(),
            })?;
        self.read_pos = end;
        Ok(bytes)
    }

    #[inline(always)]
    pub fn read_u32(&mut self, field: &'static str) -> Result<u32, DecodeError> {
        self.read_array::<4>(field).map(|b| u32::from_be_bytes(*b))
    }

    #[inline(always)]
    pub fn read_u64(&mut self, field: &'static str) -> Result<u64, DecodeError> {
        self.read_array::<8>(field).map(|b| u64::from_be_bytes(*b))
    }

    /// String yang berhenti di byte nol pertama atau di akhir buffer.
    ///
    /// Terminator tidak ikut dikembalikan, tapi cursor melewatinya.
    #[inline(always)]
    pub fn read_nul_terminated(&mut self) -> &'a [u8] {
        let start = self.read_pos.min(self.buffer.len());
        let rest = &self.buffer[start..];
        match rest.iter().position(|&b| b == 0) {
            Some(end) => {
                self.read_pos = start + end + 1;
                &rest[..end]
            }
            None => {
                self.read_pos = self.buffer.len();
                rest
            }
        }
    }

    /// Semua byte yang tersisa
    #[inline(always)]
    pub fn rest(&mut self) -> &'a [u8] {
        let start = self.read_pos.min(self.buffer.len());
        self.read_pos = self.buffer.len();
        &self.buffer[start..]
    }

    /// Remaining bytes
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.read_pos)
    }
}
