/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Formatter};

use pixl_core::buffer::BufferErrors;
use pixl_core::bytestream::CursorError;

/// BMP errors that can occur during decoding
#[non_exhaustive]
pub enum BmpErrors {
    /// The file/bytes do not start with a known BMP type field
    InvalidMagicBytes,
    /// The file is a valid BMP but uses a feature this decoder
    /// does not handle; deliberately an error, never a misdecode
    Unsupported(&'static str),
    /// Generic allocated message
    Generic(String),
    /// Too large dimensions for a given width or height
    TooLargeDimensions(&'static str, usize, usize),
    /// The color table does not fit between the headers and the
    /// pixel data offset
    MalformedPalette(String),
    /// The input ended before the structure being parsed did
    Truncated(CursorError),
    /// Buffer allocation was rejected
    BufferErrors(BufferErrors)
}

impl Debug for BmpErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidMagicBytes => {
                writeln!(f, "Invalid magic bytes, not a BMP type field")
            }
            Self::Unsupported(feature) => {
                writeln!(f, "Unsupported BMP feature: {feature}")
            }
            Self::Generic(message) => {
                writeln!(f, "{message}")
            }
            Self::TooLargeDimensions(dimension, expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions for {dimension}, {found} exceeds {expected}"
                )
            }
            Self::MalformedPalette(message) => {
                writeln!(f, "Malformed palette: {message}")
            }
            Self::Truncated(err) => {
                writeln!(f, "Truncated input: {err:?}")
            }
            Self::BufferErrors(err) => {
                writeln!(f, "{err:?}")
            }
        }
    }
}

impl core::fmt::Display for BmpErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for BmpErrors {}

impl From<CursorError> for BmpErrors {
    fn from(value: CursorError) -> Self {
        BmpErrors::Truncated(value)
    }
}

impl From<BufferErrors> for BmpErrors {
    fn from(value: BufferErrors) -> Self {
        BmpErrors::BufferErrors(value)
    }
}
