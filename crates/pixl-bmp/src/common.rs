/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// BMP type fields this decoder will look at
///
/// `BM` is an ordinary bitmap file; the others are icon and pointer
/// arrays which carry the same headers but size their palettes
/// differently.
pub const BMP_TYPE_FIELDS: [u16; 5] = [
    u16::from_be_bytes(*b"BM"),
    u16::from_be_bytes(*b"IC"),
    u16::from_be_bytes(*b"PT"),
    u16::from_be_bytes(*b"CI"),
    u16::from_be_bytes(*b"CP")
];

/// Info header sizes of the BMP versions in circulation
///
/// 12 is the original core header, 16 and 64 are OS/2 v2,
/// 40 is WinBMPv3, 52/56 are undocumented v3 extensions,
/// 108 is v4 and 124 is v5.
pub const KNOWN_INFO_HEADER_SIZES: [u32; 8] = [12, 16, 40, 52, 56, 64, 108, 124];

pub fn is_icon_type(type_field: u16) -> bool {
    type_field != u16::from_be_bytes(*b"BM")
}

/// Compression schemes named in the info header
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BmpCompression {
    Rgb,
    Rle8,
    Rle4,
    Bitfields,
    Unknown
}

impl BmpCompression {
    pub fn from_u32(num: u32) -> BmpCompression {
        match num {
            0 => BmpCompression::Rgb,
            1 => BmpCompression::Rle8,
            2 => BmpCompression::Rle4,
            3 => BmpCompression::Bitfields,
            _ => BmpCompression::Unknown
        }
    }
}
