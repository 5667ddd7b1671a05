/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Cross crate integration tests
//!
//! Exercises the full pipeline: crafted BMP bytes through the codec
//! registry into an [`pixl_image::image::Image`], conversions out of
//! the cache, and processing operations over the results.

#![allow(unused)]

mod pipeline;

/// Build an indexed 8 bpp BMP with a 40 byte info header from logical
/// top to bottom rows of palette indices.
pub fn build_indexed_bmp(width: usize, height: usize, palette: &[[u8; 3]], rows: &[&[u8]]) -> Vec<u8> {
    assert_eq!(rows.len(), height);

    let data_offset = 14 + 40 + palette.len() * 4;
    let row_bytes = (width + 3) & !3;

    let mut out = Vec::new();
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&0_u32.to_le_bytes());
    out.extend_from_slice(&0_u32.to_le_bytes());
    out.extend_from_slice(&(data_offset as u32).to_le_bytes());

    out.extend_from_slice(&40_u32.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes());
    out.extend_from_slice(&1_u16.to_le_bytes());
    out.extend_from_slice(&8_u16.to_le_bytes());
    out.extend_from_slice(&0_u32.to_le_bytes());
    out.extend_from_slice(&[0; 12]);
    out.extend_from_slice(&(palette.len() as u32).to_le_bytes());
    out.extend_from_slice(&0_u32.to_le_bytes());

    for [r, g, b] in palette {
        out.extend_from_slice(&[*b, *g, *r, 0]);
    }

    // positive height means rows are stored bottom up
    for row in rows.iter().rev() {
        let mut packed = vec![0_u8; row_bytes];
        packed[..row.len()].copy_from_slice(row);
        out.extend_from_slice(&packed);
    }
    out
}
