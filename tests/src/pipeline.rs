/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![cfg(test)]

use std::sync::Arc;

use pixl_core::buffer::{AnyBuffer, PixelBuffer};
use pixl_core::pixel::{PixelFormat, Rgb};
use pixl_core::pool::BufferPool;
use pixl_image::codecs::{bmp_codec, DecodeConfig};
use pixl_image::image::Image;
use pixl_procs::{
    binarize, grayscale, image_math, mirror, resize, BinarizeMethod, MathMode, MirrorMode,
    ProcContext, ResizeMethod, Workers
};

use crate::build_indexed_bmp;

fn checkerboard_bmp() -> Vec<u8> {
    // black and white checkerboard, bt709 luminances 0 and 255
    let palette = [[0, 0, 0], [255, 255, 255]];
    let rows: [&[u8]; 4] = [
        &[0, 1, 0, 1],
        &[1, 0, 1, 0],
        &[0, 1, 0, 1],
        &[1, 0, 1, 0]
    ];
    build_indexed_bmp(4, 4, &palette, &rows)
}

#[test]
fn decode_through_registry_and_process() {
    let data = checkerboard_bmp();
    let config = DecodeConfig::new().register(bmp_codec());
    let pool = BufferPool::new();

    let image = Image::decode(&data, &config, pool.clone()).unwrap();
    assert_eq!(image.format(), PixelFormat::Mono8);
    assert_eq!(image.dimensions(), (4, 4));

    let root = image.root();
    let ctx = ProcContext::new(pool).with_workers(Workers::Fixed(2));

    // mirror a checkerboard horizontally: rows invert
    let mirrored = mirror(&root.view(), MirrorMode::Horizontal, &ctx).unwrap();
    let AnyBuffer::Mono8(mirrored) = &mirrored else { panic!() };
    assert_eq!(mirrored.row(0), &[255, 0, 255, 0]);

    // nearest neighbor doubling keeps only the two levels
    let doubled = resize(&root.view(), 8, 8, ResizeMethod::NearestNeighbor, &ctx).unwrap();
    assert_eq!(doubled.dimensions(), (8, 8));

    // binarizing an already two level image is the identity
    let binary = binarize(&root.view(), 0.5, BinarizeMethod::Luminance, &ctx).unwrap();
    assert_eq!(&binary, root.as_ref());
}

#[test]
fn decode_errors_propagate_through_the_registry() {
    let config = DecodeConfig::new().register(bmp_codec());
    let pool = BufferPool::new();

    // valid magic and header size, but RLE compressed
    let mut data = checkerboard_bmp();
    data[30..34].copy_from_slice(&1_u32.to_le_bytes());

    let err = Image::decode(&data, &config, pool);
    assert!(err.is_err());
}

#[test]
fn conversion_cache_serves_processing_pipelines() {
    let pool = BufferPool::new();
    let mut buf = PixelBuffer::<Rgb<u8>>::new(4, 4, &pool).unwrap();
    for (i, px) in buf.pixels_mut().iter_mut().enumerate() {
        *px = Rgb::new(i as u8 * 16, 255 - i as u8 * 16, 128);
    }

    let image = Image::from_buffer(AnyBuffer::Rgb24(buf), pool.clone());

    let wide_a = image.repr(PixelFormat::Rgb48).unwrap();
    let wide_b = image.repr(PixelFormat::Rgb48).unwrap();
    assert!(Arc::ptr_eq(&wide_a, &wide_b));

    // processing a cached conversion leaves the cache untouched
    let ctx = ProcContext::new(pool);
    let gray = grayscale(&wide_a.view(), &ctx).unwrap();
    assert_eq!(gray.format(), PixelFormat::Mono16);
    assert_eq!(image.cached_conversions(), 1);
}

#[test]
fn math_over_two_decoded_images() {
    let palette = [[100, 100, 100]];
    let rows: [&[u8]; 1] = [&[0, 0]];
    let data = build_indexed_bmp(2, 1, &palette, &rows);

    let config = DecodeConfig::new().register(bmp_codec());
    let pool = BufferPool::new();

    let a = Image::decode(&data, &config, pool.clone()).unwrap();
    let b = Image::decode(&data, &config, pool.clone()).unwrap();

    let ctx = ProcContext::new(pool);
    let sum = image_math(&a.root().view(), &b.root().view(), MathMode::Add, &ctx).unwrap();

    let AnyBuffer::Mono8(sum) = sum else { panic!() };
    // gray (100,100,100) has luminance 100, doubled to 200
    assert_eq!(sum.row(0), &[200, 200]);
}

#[test]
fn planar_repr_from_packed_root() {
    let pool = BufferPool::new();
    let mut buf = PixelBuffer::<Rgb<u8>>::new(2, 2, &pool).unwrap();
    buf.set(0, 0, Rgb::new(1, 2, 3));

    // going in through from_buffer the root keeps its layout,
    // repr() produces the planar view on demand
    let image = Image::from_buffer(AnyBuffer::Rgb24(buf), pool);
    let planar = image.repr(PixelFormat::Planar8).unwrap();

    let AnyBuffer::Planar8(planar) = planar.as_ref() else { panic!() };
    assert_eq!(planar.plane(0)[0], 1);
    assert_eq!(planar.plane(1)[0], 2);
    assert_eq!(planar.plane(2)[0], 3);
}
