//! Element addressing: reading native `u16` elements versus rebuilding the
//! same logical value from a pair of `u8` reads, as a 14/16-bit grayscale
//! image stored as bytes would.

use std::fmt;
use std::hint::black_box;

use anyhow::{Context, Result, ensure};

use crate::driver::Bench;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Wide,
    Packed,
    PackedChunks,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Layout::Wide => "u16 buffer",
            Layout::Packed => "u8 pair buffer",
            Layout::PackedChunks => "u8 pair buffer (chunked)",
        };
        f.write_str(s)
    }
}

#[inline]
pub fn join_pair(hi: u8, lo: u8) -> u16 {
    (u16::from(hi) << 8) | u16::from(lo)
}

#[inline]
pub fn split_pair(v: u16) -> (u8, u8) {
    ((v >> 8) as u8, v as u8)
}

#[allow(clippy::needless_range_loop)]
pub fn sum_wide(pix: &[u16]) -> u16 {
    let mut n = 0u16;
    for i in 0..pix.len() {
        n = n.wrapping_add(pix[i]);
    }
    n
}

/// Indexes both halves explicitly; a trailing odd byte is ignored.
pub fn sum_packed(pix: &[u8]) -> u16 {
    let mut n = 0u16;
    for i in 0..pix.len() / 2 {
        n = n.wrapping_add(join_pair(pix[2 * i], pix[2 * i + 1]));
    }
    n
}

pub fn sum_packed_chunks(pix: &[u8]) -> u16 {
    pix.chunks_exact(2)
        .map(|p| u16::from_be_bytes([p[0], p[1]]))
        .fold(0u16, u16::wrapping_add)
}

/// A zeroed buffer must sum to zero; anything else means the reconstruction
/// is wrong and the timing is meaningless.
pub fn verify_zero_sum(layout: Layout, sum: u16) -> Result<()> {
    ensure!(
        sum == 0,
        "self-check failed: zero-initialized {} summed to {}, expected 0",
        layout,
        sum
    );
    Ok(())
}

/// Zeroed buffer of `len` elements. An unsatisfiable size fails this run
/// instead of aborting the process.
fn zeroed<T: Copy + Default>(layout: Layout, len: Option<usize>) -> Result<Vec<T>> {
    let len = len.with_context(|| format!("{} length overflows usize", layout))?;
    let mut pix = Vec::new();
    pix.try_reserve_exact(len)
        .with_context(|| format!("cannot allocate {} of {} elements", layout, len))?;
    pix.resize(len, T::default());
    Ok(pix)
}

fn elements(b: &Bench) -> Option<usize> {
    usize::try_from(b.iters()).ok()
}

pub(crate) fn bench_uint16(b: &mut Bench) -> Result<()> {
    let pix: Vec<u16> = zeroed(Layout::Wide, elements(b))?;
    b.reset_timer();
    let n = sum_wide(black_box(&pix));
    b.stop_timer();
    verify_zero_sum(Layout::Wide, n)
}

pub(crate) fn bench_uint8_pair(b: &mut Bench) -> Result<()> {
    let pix: Vec<u8> = zeroed(Layout::Packed, elements(b).and_then(|n| n.checked_mul(2)))?;
    b.reset_timer();
    let n = sum_packed(black_box(&pix));
    b.stop_timer();
    verify_zero_sum(Layout::Packed, n)
}

pub(crate) fn bench_uint8_pair_chunks(b: &mut Bench) -> Result<()> {
    let pix: Vec<u8> = zeroed(Layout::PackedChunks, elements(b).and_then(|n| n.checked_mul(2)))?;
    b.reset_timer();
    let n = sum_packed_chunks(black_box(&pix));
    b.stop_timer();
    verify_zero_sum(Layout::PackedChunks, n)
}
