/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Core primitives shared by the pixl family of crates
//!
//! This crate intentionally has a tiny dependency footprint; it holds
//! the types every other crate needs to agree on
//!
//! - [`pool`]: the pooling allocator pixel storage is rented from
//! - [`buffer`]: packed and planar pixel containers and their views
//! - [`pixel`]: component/pixel traits and the closed [`pixel::PixelFormat`] set
//! - [`bytestream`]: the byte cursor decoders parse from
//! - [`options`]: decoder limits passed explicitly down decode calls
#![allow(clippy::len_without_is_empty)]

pub mod buffer;
pub mod bytestream;
pub mod options;
pub mod pixel;
pub mod pool;
