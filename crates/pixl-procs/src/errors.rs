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

/// Errors from processing operations
#[non_exhaustive]
pub enum ProcErrors {
    /// Two operand images do not share a pixel format
    FormatMismatch(PixelFormat, PixelFormat),
    /// Two operand images do not share dimensions
    DimensionMismatch((usize, usize), (usize, usize)),
    /// A target dimension of zero was requested
    ZeroDimension,
    /// Allocating the output failed
    BufferErrors(BufferErrors)
}

impl Debug for ProcErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::FormatMismatch(a, b) => {
                writeln!(f, "Pixel format mismatch, {a:?} vs {b:?}")
            }
            Self::DimensionMismatch(a, b) => {
                writeln!(f, "Dimension mismatch, {}x{} vs {}x{}", a.0, a.1, b.0, b.1)
            }
            Self::ZeroDimension => {
                writeln!(f, "Target width and height must be non zero")
            }
            Self::BufferErrors(err) => {
                writeln!(f, "{err:?}")
            }
        }
    }
}

impl core::fmt::Display for ProcErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for ProcErrors {}

impl From<BufferErrors> for ProcErrors {
    fn from(value: BufferErrors) -> Self {
        ProcErrors::BufferErrors(value)
    }
}
