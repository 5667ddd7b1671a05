/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Image orchestration for the pixl family
//!
//! Ties together the codec registry, the pixel format conversion
//! table and the [`image::Image`] aggregate. A typical decode goes
//!
//! ```no_run
//! use pixl_core::pool::BufferPool;
//! use pixl_image::codecs::{bmp_codec, DecodeConfig};
//! use pixl_image::image::Image;
//!
//! let data = std::fs::read("input.bmp").unwrap();
//! let config = DecodeConfig::new().register(bmp_codec());
//!
//! let image = Image::decode(&data, &config, BufferPool::new()).unwrap();
//! println!("{:?} {:?}", image.format(), image.dimensions());
//! ```

pub use crate::errors::ImageErrors;

pub mod codecs;
pub mod conversions;
pub mod errors;
pub mod image;
