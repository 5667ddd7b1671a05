/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Codec registration and format detection
//!
//! Codecs are plain records registered explicitly on a
//! [`DecodeConfig`]; there is no global registry and nothing is
//! discovered at runtime. Registration order is meaningful, detection
//! scans the list front to back and the first codec whose sniff
//! accepts the header bytes wins, so a caller who registers two
//! overlapping codecs has decided their priority already.

use log::trace;

use pixl_core::buffer::AnyBuffer;
use pixl_core::bytestream::ByteCursor;
use pixl_core::options::DecoderOptions;
use pixl_core::pool::BufferPool;

use crate::errors::ImageErrors;

type SniffFn = Box<dyn Fn(&[u8]) -> bool + Send + Sync>;
type DecodeFn =
    Box<dyn Fn(&mut ByteCursor, &DecodeConfig, &BufferPool) -> Result<AnyBuffer, ImageErrors> + Send + Sync>;

/// One registered image format
pub struct Codec {
    name:        &'static str,
    header_size: usize,
    sniff:       SniffFn,
    decode:      DecodeFn
}

impl Codec {
    /// Describe a codec
    ///
    /// `header_size` is how many leading bytes `sniff` needs to make a
    /// reliable decision; shorter inputs are never offered to it.
    pub fn new<S, D>(name: &'static str, header_size: usize, sniff: S, decode: D) -> Codec
    where
        S: Fn(&[u8]) -> bool + Send + Sync + 'static,
        D: Fn(&mut ByteCursor, &DecodeConfig, &BufferPool) -> Result<AnyBuffer, ImageErrors>
            + Send
            + Sync
            + 'static
    {
        Codec {
            name,
            header_size,
            sniff: Box::new(sniff),
            decode: Box::new(decode)
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn header_size(&self) -> usize {
        self.header_size
    }
}

/// Decode configuration, including the ordered codec list
///
/// Built explicitly by each caller; two callers with different
/// configurations never observe each other.
pub struct DecodeConfig {
    codecs:             Vec<Codec>,
    prefer_contiguous:  bool,
    use_crc_validation: bool,
    options:            DecoderOptions
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeConfig {
    /// An empty configuration with no codecs registered
    pub fn new() -> DecodeConfig {
        DecodeConfig {
            codecs:             Vec::new(),
            prefer_contiguous:  true,
            use_crc_validation: false,
            options:            DecoderOptions::default()
        }
    }

    /// Append a codec; earlier registrations win detection ties
    #[must_use]
    pub fn register(mut self, codec: Codec) -> DecodeConfig {
        self.codecs.push(codec);
        self
    }

    /// Whether decoded color output should be packed (interleaved);
    /// turning this off asks for planar instead. On by default.
    #[must_use]
    pub fn set_prefer_contiguous(mut self, yes: bool) -> DecodeConfig {
        self.prefer_contiguous = yes;
        self
    }

    /// Reserved for codecs with integrity checksums, off by default
    #[must_use]
    pub fn set_crc_validation(mut self, yes: bool) -> DecodeConfig {
        self.use_crc_validation = yes;
        self
    }

    #[must_use]
    pub fn set_decoder_options(mut self, options: DecoderOptions) -> DecodeConfig {
        self.options = options;
        self
    }

    pub const fn prefer_contiguous(&self) -> bool {
        self.prefer_contiguous
    }

    pub const fn crc_validation(&self) -> bool {
        self.use_crc_validation
    }

    pub const fn decoder_options(&self) -> DecoderOptions {
        self.options
    }

    /// Bytes needed to give every registered sniffer a full look
    pub fn max_header_size(&self) -> usize {
        self.codecs.iter().map(Codec::header_size).max().unwrap_or(0)
    }
}

/// Find the first registered codec claiming the bytes under `cursor`
///
/// Peeks without consuming, the cursor position is untouched.
pub fn detect<'b>(cursor: &ByteCursor, config: &'b DecodeConfig) -> Result<&'b Codec, ImageErrors> {
    let header = cursor.peek_up_to(config.max_header_size());

    if header.is_empty() {
        return Err(ImageErrors::EmptyInput);
    }

    for codec in &config.codecs {
        if codec.header_size() <= header.len() && (codec.sniff)(header) {
            trace!("Detected format {}", codec.name());
            return Ok(codec);
        }
    }
    Err(ImageErrors::UnknownFormat)
}

/// Detect and decode the image under `cursor`
pub fn decode(
    cursor: &mut ByteCursor, config: &DecodeConfig, pool: &BufferPool
) -> Result<AnyBuffer, ImageErrors> {
    let start = cursor.position();
    let codec = detect(cursor, config)?;

    cursor.set_position(start);
    (codec.decode)(cursor, config, pool)
}

/// The built in BMP codec, decoding indexed BMP to 8 bit mono
#[cfg(feature = "bmp")]
pub fn bmp_codec() -> Codec {
    // the sniffer reads the info header size at byte 14
    Codec::new(
        "bmp",
        15,
        |bytes| pixl_bmp::probe_bmp(bytes),
        |cursor, config, pool| {
            let data = cursor.peek_up_to(cursor.remaining());
            let mut decoder = pixl_bmp::BmpDecoder::new_with_options(data, config.decoder_options());

            let buffer = decoder.decode(pool)?;
            cursor.skip(cursor.remaining());
            Ok(AnyBuffer::Mono8(buffer))
        }
    )
}
