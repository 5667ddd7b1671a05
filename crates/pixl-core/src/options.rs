/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decoder options shared by all format decoders
//!
//! Options are always passed explicitly through decode entry points,
//! there is no process wide default that can be mutated behind a
//! caller's back.

/// Limits and toggles a decoder consults while parsing
///
/// The defaults are permissive enough for ordinary images while keeping
/// a hostile file from requesting absurd allocations.
#[derive(Copy, Clone, Debug)]
pub struct DecoderOptions {
    max_width:  usize,
    max_height: usize,
    strict:     bool
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            max_width:  1 << 17,
            max_height: 1 << 17,
            strict:     false
        }
    }
}

impl DecoderOptions {
    pub const fn max_width(&self) -> usize {
        self.max_width
    }

    pub const fn max_height(&self) -> usize {
        self.max_height
    }

    /// Whether decoders should hard error on recoverable
    /// file format violations instead of warning
    pub const fn strict_mode(&self) -> bool {
        self.strict
    }

    #[must_use]
    pub fn set_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    #[must_use]
    pub fn set_max_height(mut self, height: usize) -> Self {
        self.max_height = height;
        self
    }

    #[must_use]
    pub fn set_strict_mode(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
