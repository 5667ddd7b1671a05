/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Resize an image to new dimensions
//!
//! Every output row depends only on the source view, so rows are
//! produced in parallel bands. Packed images resize whole pixels,
//! planar images resize one plane at a time with the same kernels
//! (a plane is just a mono image).

use pixl_core::buffer::{AnyBuffer, AnyView, PixelBuffer, PlanarBuffer};
use pixl_core::pixel::{Component, Pixel};

use crate::errors::ProcErrors;
use crate::utils::for_each_row_band;
use crate::ProcContext;

/// The filter used to sample source pixels
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ResizeMethod {
    /// Nearest source pixel, no interpolation, blocky but exact
    NearestNeighbor,
    /// Weighted average of the 2x2 neighborhood
    Bilinear,
    /// Catmull-Rom cubic over the 4x4 neighborhood
    Bicubic
}

/// Resize `view` to `new_width` x `new_height`
///
/// Returns a freshly allocated buffer in the same format as the input.
pub fn resize(
    view: &AnyView, new_width: usize, new_height: usize, method: ResizeMethod, ctx: &ProcContext
) -> Result<AnyBuffer, ProcErrors> {
    if new_width == 0 || new_height == 0 {
        return Err(ProcErrors::ZeroDimension);
    }

    let out = match view {
        AnyView::Mono8(v) => AnyBuffer::Mono8(resize_packed(v.pixels(), v.dimensions(), new_width, new_height, method, ctx)?),
        AnyView::Mono16(v) => AnyBuffer::Mono16(resize_packed(v.pixels(), v.dimensions(), new_width, new_height, method, ctx)?),
        AnyView::MonoF32(v) => AnyBuffer::MonoF32(resize_packed(v.pixels(), v.dimensions(), new_width, new_height, method, ctx)?),
        AnyView::Rgb24(v) => AnyBuffer::Rgb24(resize_packed(v.pixels(), v.dimensions(), new_width, new_height, method, ctx)?),
        AnyView::Rgb48(v) => AnyBuffer::Rgb48(resize_packed(v.pixels(), v.dimensions(), new_width, new_height, method, ctx)?),
        AnyView::RgbF32(v) => AnyBuffer::RgbF32(resize_packed(v.pixels(), v.dimensions(), new_width, new_height, method, ctx)?),
        AnyView::Planar8(v) => AnyBuffer::Planar8(resize_planar(v.samples(), v.dimensions(), new_width, new_height, method, ctx)?),
        AnyView::Planar16(v) => AnyBuffer::Planar16(resize_planar(v.samples(), v.dimensions(), new_width, new_height, method, ctx)?),
        AnyView::PlanarF32(v) => AnyBuffer::PlanarF32(resize_planar(v.samples(), v.dimensions(), new_width, new_height, method, ctx)?)
    };
    Ok(out)
}

fn resize_packed<P: Pixel>(
    src: &[P], src_dims: (usize, usize), dw: usize, dh: usize, method: ResizeMethod,
    ctx: &ProcContext
) -> Result<PixelBuffer<P>, ProcErrors> {
    let (sw, sh) = src_dims;
    let mut out = PixelBuffer::<P>::new(dw, dh, &ctx.pool)?;

    for_each_row_band(out.pixels_mut(), dw, dh, ctx.workers, |first_row, band| {
        resize_rows(src, sw, sh, band, dw, dh, first_row, method);
    });
    Ok(out)
}

fn resize_planar<T: Component + Pixel>(
    src: &[T], src_dims: (usize, usize), dw: usize, dh: usize, method: ResizeMethod,
    ctx: &ProcContext
) -> Result<PlanarBuffer<T>, ProcErrors> {
    let (sw, sh) = src_dims;
    let plane_len = sw * sh;
    let mut out = PlanarBuffer::<T>::new(dw, dh, &ctx.pool)?;

    for (channel, plane) in out.planes_mut().into_iter().enumerate() {
        let src_plane = &src[channel * plane_len..(channel + 1) * plane_len];

        for_each_row_band(plane, dw, dh, ctx.workers, |first_row, band| {
            resize_rows(src_plane, sw, sh, band, dw, dh, first_row, method);
        });
    }
    Ok(out)
}

/// Fill `band` (rows `first_row..`) of a `dw` x `dh` output
fn resize_rows<P: Pixel>(
    src: &[P], sw: usize, sh: usize, band: &mut [P], dw: usize, dh: usize, first_row: usize,
    method: ResizeMethod
) {
    match method {
        ResizeMethod::NearestNeighbor => {
            for (i, row) in band.chunks_exact_mut(dw).enumerate() {
                let y = first_row + i;
                let sy = (y * sh) / dh;

                for (x, out_px) in row.iter_mut().enumerate() {
                    let sx = (x * sw) / dw;
                    *out_px = src[sy * sw + sx];
                }
            }
        }
        ResizeMethod::Bilinear => {
            let scale_x = sw as f32 / dw as f32;
            let scale_y = sh as f32 / dh as f32;

            for (i, row) in band.chunks_exact_mut(dw).enumerate() {
                let y = first_row + i;
                let fy = ((y as f32 + 0.5) * scale_y - 0.5).max(0.0);
                let y0 = (fy as usize).min(sh - 1);
                let y1 = (y0 + 1).min(sh - 1);
                let ty = fy - y0 as f32;

                for (x, out_px) in row.iter_mut().enumerate() {
                    let fx = ((x as f32 + 0.5) * scale_x - 0.5).max(0.0);
                    let x0 = (fx as usize).min(sw - 1);
                    let x1 = (x0 + 1).min(sw - 1);
                    let tx = fx - x0 as f32;

                    let mut channels = [0.0_f32; 3];
                    for (c, slot) in channels.iter_mut().enumerate().take(P::CHANNELS) {
                        let p00 = src[y0 * sw + x0].channel_f32(c);
                        let p10 = src[y0 * sw + x1].channel_f32(c);
                        let p01 = src[y1 * sw + x0].channel_f32(c);
                        let p11 = src[y1 * sw + x1].channel_f32(c);

                        let top = p00 + (p10 - p00) * tx;
                        let bottom = p01 + (p11 - p01) * tx;
                        *slot = top + (bottom - top) * ty;
                    }
                    *out_px = P::from_channels_f32(channels);
                }
            }
        }
        ResizeMethod::Bicubic => {
            let scale_x = sw as f32 / dw as f32;
            let scale_y = sh as f32 / dh as f32;

            for (i, row) in band.chunks_exact_mut(dw).enumerate() {
                let y = first_row + i;
                let fy = (y as f32 + 0.5) * scale_y - 0.5;
                let y0 = fy.floor();
                let ty = fy - y0;

                for (x, out_px) in row.iter_mut().enumerate() {
                    let fx = (x as f32 + 0.5) * scale_x - 0.5;
                    let x0 = fx.floor();
                    let tx = fx - x0;

                    let mut channels = [0.0_f32; 3];
                    for (c, slot) in channels.iter_mut().enumerate().take(P::CHANNELS) {
                        let mut acc = 0.0_f32;

                        for (j, wy) in cubic_weights(ty).into_iter().enumerate() {
                            let sy = clamp_tap(y0 as isize + j as isize - 1, sh);

                            for (k, wx) in cubic_weights(tx).into_iter().enumerate() {
                                let sx = clamp_tap(x0 as isize + k as isize - 1, sw);
                                acc += wy * wx * src[sy * sw + sx].channel_f32(c);
                            }
                        }
                        *slot = acc;
                    }
                    *out_px = P::from_channels_f32(channels);
                }
            }
        }
    }
}

/// Catmull-Rom weights for the four taps around fractional offset `t`
fn cubic_weights(t: f32) -> [f32; 4] {
    const A: f32 = -0.5;

    let w = |t: f32| -> f32 {
        let t = t.abs();
        if t < 1.0 {
            ((A + 2.0) * t - (A + 3.0)) * t * t + 1.0
        } else if t < 2.0 {
            (((t - 5.0) * t + 8.0) * t - 4.0) * A
        } else {
            0.0
        }
    };

    [w(t + 1.0), w(t), w(t - 1.0), w(t - 2.0)]
}

fn clamp_tap(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}
