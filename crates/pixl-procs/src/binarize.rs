/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Threshold an image into a two level mono buffer
//!
//! Output pixels are the source depth's extreme values, black where
//! the metric falls below the threshold and white where it reaches it.
//! The threshold is always given in `[0, 1]` and scaled internally so
//! callers do not care about the source precision.

use pixl_core::buffer::{AnyBuffer, AnyView, PixelBuffer, PixelView, PlanarView};
use pixl_core::pixel::{Component, Pixel, Rgb};

use crate::errors::ProcErrors;
use crate::utils::for_each_row_band;
use crate::ProcContext;

/// The per pixel metric compared against the threshold
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BinarizeMethod {
    /// BT.709 luminance, bright pixels go white
    Luminance,
    /// HSL saturation, colorful pixels go white regardless of brightness
    Saturation,
    /// Largest chroma deviation from the pixel's own luminance,
    /// compared against half the threshold
    MaxChroma
}

/// Binarize `view` with `threshold` in `[0, 1]`
///
/// Mono input always thresholds on its own value. Output is packed
/// mono at the source depth.
pub fn binarize(
    view: &AnyView, threshold: f32, method: BinarizeMethod, ctx: &ProcContext
) -> Result<AnyBuffer, ProcErrors> {
    let threshold = threshold.clamp(0.0, 1.0);

    let out = match view {
        AnyView::Mono8(v) => AnyBuffer::Mono8(binarize_mono(v, threshold, ctx)?),
        AnyView::Mono16(v) => AnyBuffer::Mono16(binarize_mono(v, threshold, ctx)?),
        AnyView::MonoF32(v) => AnyBuffer::MonoF32(binarize_mono(v, threshold, ctx)?),
        AnyView::Rgb24(v) => AnyBuffer::Mono8(binarize_packed(v, threshold, method, ctx)?),
        AnyView::Rgb48(v) => AnyBuffer::Mono16(binarize_packed(v, threshold, method, ctx)?),
        AnyView::RgbF32(v) => AnyBuffer::MonoF32(binarize_packed(v, threshold, method, ctx)?),
        AnyView::Planar8(v) => AnyBuffer::Mono8(binarize_planar(v, threshold, method, ctx)?),
        AnyView::Planar16(v) => AnyBuffer::Mono16(binarize_planar(v, threshold, method, ctx)?),
        AnyView::PlanarF32(v) => AnyBuffer::MonoF32(binarize_planar(v, threshold, method, ctx)?)
    };
    Ok(out)
}

/// Whether a normalized rgb triple passes the threshold
fn passes(r: f32, g: f32, b: f32, threshold: f32, method: BinarizeMethod) -> bool {
    match method {
        BinarizeMethod::Luminance => f32::bt709(r, g, b) >= threshold,
        BinarizeMethod::Saturation => {
            let max = r.max(g).max(b);
            let min = r.min(g).min(b);

            let saturation = if max == min {
                0.0
            } else {
                let lightness = (max + min) * 0.5;
                (max - min) / (1.0 - (2.0 * lightness - 1.0).abs())
            };
            saturation >= threshold
        }
        BinarizeMethod::MaxChroma => {
            let luma = f32::bt709(r, g, b);
            let chroma = (b - luma).abs().max((r - luma).abs());
            chroma >= threshold * 0.5
        }
    }
}

fn level<T: Component>(white: bool) -> T {
    if white {
        T::max_val()
    } else {
        T::min_val()
    }
}

fn binarize_mono<T: Component + Pixel<Component = T>>(
    view: &PixelView<'_, T>, threshold: f32, ctx: &ProcContext
) -> Result<PixelBuffer<T>, ProcErrors> {
    let (width, height) = view.dimensions();
    let src = view.pixels();
    let mut out = PixelBuffer::<T>::new(width, height, &ctx.pool)?;

    for_each_row_band(out.pixels_mut(), width, height, ctx.workers, |first_row, band| {
        let offset = first_row * width;
        for (out_px, px) in band.iter_mut().zip(&src[offset..]) {
            *out_px = level(px.normalized() >= threshold);
        }
    });
    Ok(out)
}

fn binarize_packed<T: Component + Pixel<Component = T>>(
    view: &PixelView<'_, Rgb<T>>, threshold: f32, method: BinarizeMethod, ctx: &ProcContext
) -> Result<PixelBuffer<T>, ProcErrors> {
    let (width, height) = view.dimensions();
    let src = view.pixels();
    let mut out = PixelBuffer::<T>::new(width, height, &ctx.pool)?;

    for_each_row_band(out.pixels_mut(), width, height, ctx.workers, |first_row, band| {
        let offset = first_row * width;
        for (out_px, px) in band.iter_mut().zip(&src[offset..]) {
            let white = passes(
                px.r.normalized(),
                px.g.normalized(),
                px.b.normalized(),
                threshold,
                method
            );
            *out_px = level(white);
        }
    });
    Ok(out)
}

fn binarize_planar<T: Component + Pixel<Component = T>>(
    view: &PlanarView<'_, T>, threshold: f32, method: BinarizeMethod, ctx: &ProcContext
) -> Result<PixelBuffer<T>, ProcErrors> {
    let (width, height) = view.dimensions();
    let (r, g, b) = (view.plane(0), view.plane(1), view.plane(2));
    let mut out = PixelBuffer::<T>::new(width, height, &ctx.pool)?;

    for_each_row_band(out.pixels_mut(), width, height, ctx.workers, |first_row, band| {
        let offset = first_row * width;
        for (i, out_px) in band.iter_mut().enumerate() {
            let j = offset + i;
            let white = passes(
                r[j].normalized(),
                g[j].normalized(),
                b[j].normalized(),
                threshold,
                method
            );
            *out_px = level(white);
        }
    });
    Ok(out)
}
