//! Per-pixel iteration over RGBA data.
//!
//! With the `parallel` feature the buffer is split into disjoint row ranges
//! and processed with Rayon. Without it, pixels are visited sequentially on
//! the calling thread. Every transform in this crate is local to one pixel,
//! so both paths produce identical output.

use crate::buffer::CHANNELS;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Apply `f` to every complete RGBA pixel in `data`.
///
/// `row_stride` is the byte length of one row; it sets the unit of work
/// handed to each Rayon task. Trailing bytes that do not form a full pixel
/// are left untouched.
#[cfg(feature = "parallel")]
pub fn for_each_pixel<F>(data: &mut [u8], row_stride: usize, f: F)
where
    F: Fn(&mut [u8]) + Send + Sync,
{
    let chunk = row_stride.max(CHANNELS) / CHANNELS * CHANNELS;
    data.par_chunks_mut(chunk)
        .for_each(|row| row.chunks_exact_mut(CHANNELS).for_each(&f));
}

/// Apply `f` to every complete RGBA pixel in `data`.
///
/// `row_stride` is only used by the parallel build.
#[cfg(not(feature = "parallel"))]
pub fn for_each_pixel<F>(data: &mut [u8], _row_stride: usize, f: F)
where
    F: Fn(&mut [u8]) + Send + Sync,
{
    data.chunks_exact_mut(CHANNELS).for_each(f);
}
