/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Convert a color image to single channel gray
//!
//! Uses the 299/587/114 weighting at the source precision; the output
//! is a packed mono buffer at the same depth. Mono input is returned
//! as a deep copy so the caller always owns a fresh buffer.

use pixl_core::buffer::{AnyBuffer, AnyView, PixelBuffer, PixelView, PlanarView};
use pixl_core::pixel::{Pixel, Rgb};

use crate::errors::ProcErrors;
use crate::traits::GrayWeights;
use crate::utils::for_each_row_band;
use crate::ProcContext;

/// Reduce `view` to single channel gray at its own precision
pub fn grayscale(view: &AnyView, ctx: &ProcContext) -> Result<AnyBuffer, ProcErrors> {
    let out = match view {
        // already gray, hand back an independent copy
        AnyView::Mono8(v) => AnyBuffer::Mono8(v.to_owned(&ctx.pool)?),
        AnyView::Mono16(v) => AnyBuffer::Mono16(v.to_owned(&ctx.pool)?),
        AnyView::MonoF32(v) => AnyBuffer::MonoF32(v.to_owned(&ctx.pool)?),
        AnyView::Rgb24(v) => AnyBuffer::Mono8(gray_packed(v, ctx)?),
        AnyView::Rgb48(v) => AnyBuffer::Mono16(gray_packed(v, ctx)?),
        AnyView::RgbF32(v) => AnyBuffer::MonoF32(gray_packed(v, ctx)?),
        AnyView::Planar8(v) => AnyBuffer::Mono8(gray_planar(v, ctx)?),
        AnyView::Planar16(v) => AnyBuffer::Mono16(gray_planar(v, ctx)?),
        AnyView::PlanarF32(v) => AnyBuffer::MonoF32(gray_planar(v, ctx)?)
    };
    Ok(out)
}

fn gray_packed<T: GrayWeights + Pixel<Component = T>>(
    view: &PixelView<'_, Rgb<T>>, ctx: &ProcContext
) -> Result<PixelBuffer<T>, ProcErrors> {
    let (width, height) = view.dimensions();
    let src = view.pixels();
    let mut out = PixelBuffer::<T>::new(width, height, &ctx.pool)?;

    for_each_row_band(out.pixels_mut(), width, height, ctx.workers, |first_row, band| {
        let offset = first_row * width;
        for (out_px, px) in band.iter_mut().zip(&src[offset..]) {
            *out_px = T::gray(px.r, px.g, px.b);
        }
    });
    Ok(out)
}

fn gray_planar<T: GrayWeights + Pixel<Component = T>>(
    view: &PlanarView<'_, T>, ctx: &ProcContext
) -> Result<PixelBuffer<T>, ProcErrors> {
    let (width, height) = view.dimensions();
    let (r, g, b) = (view.plane(0), view.plane(1), view.plane(2));
    let mut out = PixelBuffer::<T>::new(width, height, &ctx.pool)?;

    for_each_row_band(out.pixels_mut(), width, height, ctx.workers, |first_row, band| {
        let offset = first_row * width;
        for (i, out_px) in band.iter_mut().enumerate() {
            let j = offset + i;
            *out_px = T::gray(r[j], g[j], b[j]);
        }
    });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use pixl_core::buffer::PlanarBuffer;
    use pixl_core::pool::BufferPool;

    use super::*;

    fn context() -> ProcContext {
        ProcContext::new(BufferPool::new())
    }

    #[test]
    fn packed_rgb_reduces_with_classic_weights() {
        let ctx = context();
        let mut src = PixelBuffer::<Rgb<u8>>::new(3, 1, &ctx.pool).unwrap();
        src.set(0, 0, Rgb::new(255, 0, 0));
        src.set(1, 0, Rgb::new(0, 255, 0));
        src.set(2, 0, Rgb::new(0, 0, 255));

        let AnyBuffer::Mono8(out) = grayscale(&AnyView::Rgb24(src.view()), &ctx).unwrap() else {
            panic!()
        };
        assert_eq!(out.row(0), &[76, 149, 29]);
    }

    #[test]
    fn planar_and_packed_agree() {
        let ctx = context();

        let mut packed = PixelBuffer::<Rgb<u8>>::new(2, 2, &ctx.pool).unwrap();
        let mut planar = PlanarBuffer::<u8>::new(2, 2, &ctx.pool).unwrap();
        let samples = [(10, 200, 30), (0, 0, 0), (255, 255, 255), (90, 12, 240)];

        for (i, (r, g, b)) in samples.iter().copied().enumerate() {
            packed.set(i % 2, i / 2, Rgb::new(r, g, b));
            planar.plane_mut(0)[i] = r;
            planar.plane_mut(1)[i] = g;
            planar.plane_mut(2)[i] = b;
        }

        let a = grayscale(&AnyView::Rgb24(packed.view()), &ctx).unwrap();
        let b = grayscale(&AnyView::Planar8(planar.view()), &ctx).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn mono_input_copies() {
        let ctx = context();
        let mut src = PixelBuffer::<u16>::new(2, 1, &ctx.pool).unwrap();
        src.set(0, 0, 1000);
        src.set(1, 0, 2000);

        let AnyBuffer::Mono16(out) = grayscale(&AnyView::Mono16(src.view()), &ctx).unwrap() else {
            panic!()
        };
        assert_eq!(out, src);
    }
}
