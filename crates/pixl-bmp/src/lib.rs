/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! An indexed BMP decoder
//!
//! Decodes uncompressed palette BMP images (1, 2, 4 and 8 bits per
//! pixel) into 8 bit single channel luminance buffers, reducing each
//! palette entry with BT.709 weights.
//!
//! # Supported
//! - WinBMPv2 through v5 and OS/2 v2 info headers
//! - Bottom up and top down (negative height) row order
//! - Icon and pointer array type fields
//!
//! # Deliberately unsupported, reported as errors
//! - RLE and bitfield compression
//! - Truecolor (16/24/32 bpp) pixel data

pub use crate::decoder::{probe_bmp, BmpDecoder};
pub use crate::errors::BmpErrors;

mod common;
mod decoder;
mod errors;
