/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Row band scheduling shared by every operation
//!
//! Each operation writes a freshly allocated output whose rows only
//! depend on the read only input view, so output rows can be produced
//! in any order. We split them into contiguous bands, one per worker,
//! and run the bands on scoped threads when the `threads` feature is
//! on; without it the bands run back to back on the calling thread.

use std::num::NonZeroUsize;

/// How many worker threads an operation may use
#[derive(Copy, Clone, Debug, Default)]
pub enum Workers {
    /// One band per available CPU
    #[default]
    Auto,
    /// A fixed worker count, clamped to at least one
    Fixed(usize)
}

impl Workers {
    /// Resolve to a concrete thread count
    pub fn count(self) -> usize {
        match self {
            Workers::Auto => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            Workers::Fixed(n) => n.max(1)
        }
    }
}

/// Run `kernel` over the rows of `out`, split into contiguous bands
///
/// `out` must hold exactly `rows * row_len` elements. The kernel is
/// handed the index of its band's first row and the band's rows as one
/// mutable slice.
pub fn for_each_row_band<T, F>(out: &mut [T], row_len: usize, rows: usize, workers: Workers, kernel: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync
{
    debug_assert_eq!(out.len(), rows * row_len);

    let threads = workers.count().min(rows.max(1));
    let band_rows = rows.div_ceil(threads);

    #[cfg(feature = "threads")]
    {
        std::thread::scope(|scope| {
            for (band, chunk) in out.chunks_mut(band_rows * row_len).enumerate() {
                let kernel = &kernel;
                scope.spawn(move || kernel(band * band_rows, chunk));
            }
        });
    }
    #[cfg(not(feature = "threads"))]
    {
        for (band, chunk) in out.chunks_mut(band_rows * row_len).enumerate() {
            kernel(band * band_rows, chunk);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_cover_every_row_once() {
        let rows = 13;
        let row_len = 4;
        let mut out = vec![0_u32; rows * row_len];

        for_each_row_band(&mut out, row_len, rows, Workers::Fixed(4), |first_row, band| {
            for (i, row) in band.chunks_exact_mut(row_len).enumerate() {
                row.fill((first_row + i) as u32);
            }
        });

        for y in 0..rows {
            assert!(out[y * row_len..(y + 1) * row_len]
                .iter()
                .all(|v| *v == y as u32));
        }
    }

    #[test]
    fn more_workers_than_rows_is_fine() {
        let mut out = vec![0_u8; 3];
        for_each_row_band(&mut out, 3, 1, Workers::Fixed(16), |_, band| band.fill(1));
        assert_eq!(out, [1, 1, 1]);
    }
}
