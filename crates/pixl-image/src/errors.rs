/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Formatter};

use pixl_core::buffer::BufferErrors;
use pixl_core::pixel::PixelFormat;

/// All errors possible during image orchestration
#[non_exhaustive]
pub enum ImageErrors {
    /// No input bytes were supplied to decode
    EmptyInput,
    /// No registered codec recognized the input bytes
    UnknownFormat,
    /// No supported conversion between two pixel formats
    NoConversionPath(PixelFormat, PixelFormat),
    /// A decoder failed on its input
    DecodeErrors(String),
    /// Buffer allocation was rejected
    BufferErrors(BufferErrors),
    #[cfg(feature = "bmp")]
    BmpDecodeErrors(pixl_bmp::BmpErrors)
}

impl Debug for ImageErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyInput => {
                writeln!(f, "Cannot decode zero bytes")
            }
            Self::UnknownFormat => {
                writeln!(f, "The image format could not be detected by any registered codec")
            }
            Self::NoConversionPath(src, dst) => {
                writeln!(f, "No conversion path from {src:?} to {dst:?}")
            }
            Self::DecodeErrors(message) => {
                writeln!(f, "{message}")
            }
            Self::BufferErrors(err) => {
                writeln!(f, "{err:?}")
            }
            #[cfg(feature = "bmp")]
            Self::BmpDecodeErrors(err) => {
                writeln!(f, "Bmp decoding error: {err:?}")
            }
        }
    }
}

impl core::fmt::Display for ImageErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for ImageErrors {}

impl From<BufferErrors> for ImageErrors {
    fn from(value: BufferErrors) -> Self {
        ImageErrors::BufferErrors(value)
    }
}

#[cfg(feature = "bmp")]
impl From<pixl_bmp::BmpErrors> for ImageErrors {
    fn from(value: pixl_bmp::BmpErrors) -> Self {
        ImageErrors::BmpDecodeErrors(value)
    }
}
