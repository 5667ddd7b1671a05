/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The `Image` aggregate
//!
//! An image owns one root buffer, the pixels as they came out of a
//! decoder or a caller, plus a cache of format conversions derived
//! from it. Conversions are computed at most once per target format
//! and shared out as `Arc`s; asking for the root format returns the
//! root itself without caching a copy.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::trace;

use pixl_core::buffer::AnyBuffer;
use pixl_core::bytestream::ByteCursor;
use pixl_core::pixel::{BufferLayout, PixelFormat};
use pixl_core::pool::BufferPool;

use crate::codecs::{self, DecodeConfig};
use crate::conversions::convert;
use crate::errors::ImageErrors;

/// One decoded image and its cached format conversions
pub struct Image {
    root:  Arc<AnyBuffer>,
    pool:  BufferPool,
    cache: Mutex<HashMap<PixelFormat, Arc<AnyBuffer>>>
}

impl Image {
    /// Wrap an existing buffer as an image's root representation
    pub fn from_buffer(buffer: AnyBuffer, pool: BufferPool) -> Image {
        Image {
            root: Arc::new(buffer),
            pool,
            cache: Mutex::new(HashMap::new())
        }
    }

    /// Detect and decode `data` with the codecs in `config`
    ///
    /// Color output is converted once up front when the decoder's
    /// layout disagrees with the configuration's contiguity
    /// preference; mono output is a single plane either way.
    pub fn decode(data: &[u8], config: &DecodeConfig, pool: BufferPool) -> Result<Image, ImageErrors> {
        let mut cursor = ByteCursor::new(data);
        let mut buffer = codecs::decode(&mut cursor, config, &pool)?;

        let format = buffer.format();
        if format.is_color() {
            let wanted = if config.prefer_contiguous() {
                BufferLayout::Packed
            } else {
                BufferLayout::Planar
            };

            if format.layout() != wanted {
                let target = PixelFormat::from_parts(wanted, true, format.depth());
                buffer = convert(&buffer.view(), target, &pool)?;
            }
        }
        Ok(Image::from_buffer(buffer, pool))
    }

    /// Format of the root buffer
    pub fn format(&self) -> PixelFormat {
        self.root.format()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.root.dimensions()
    }

    /// The root buffer as decoded
    pub fn root(&self) -> Arc<AnyBuffer> {
        Arc::clone(&self.root)
    }

    /// The image in `target` format, converting at most once
    ///
    /// The first request per format runs the conversion under the
    /// cache lock, so concurrent requests for the same format do the
    /// work exactly once; later requests share the cached buffer.
    pub fn repr(&self, target: PixelFormat) -> Result<Arc<AnyBuffer>, ImageErrors> {
        if target == self.root.format() {
            return Ok(Arc::clone(&self.root));
        }

        let mut cache = self.cache.lock().unwrap();

        if let Some(hit) = cache.get(&target) {
            return Ok(Arc::clone(hit));
        }

        trace!("Converting root {:?} to {:?}", self.root.format(), target);
        let converted = Arc::new(convert(&self.root.view(), target, &self.pool)?);
        cache.insert(target, Arc::clone(&converted));
        Ok(converted)
    }

    /// Number of distinct conversions currently cached
    pub fn cached_conversions(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}
