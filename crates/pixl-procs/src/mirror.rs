/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Mirror an image around its axes
//!
//! ```text
//! Horizontal         Vertical           VerticalHorizontal
//! ┌─────────┐        ┌─────────┐        ┌─────────┐
//! │a b c d e│        │f g h i j│        │j i h g f│
//! │f g h i j│   ->   │a b c d e│   or   │e d c b a│
//! └─────────┘        └─────────┘        └─────────┘
//! ```

use pixl_core::buffer::{AnyBuffer, AnyView, PixelBuffer, PlanarBuffer};
use pixl_core::pixel::{Component, Pixel};

use crate::errors::ProcErrors;
use crate::utils::for_each_row_band;
use crate::ProcContext;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MirrorMode {
    /// Reflect around the central vertical axis, reversing each row
    Horizontal,
    /// Reflect around the central horizontal axis, swapping rows
    Vertical,
    /// Both reflections at once, a 180 degree rotation
    VerticalHorizontal
}

/// Mirror `view` into a fresh buffer of the same format
pub fn mirror(view: &AnyView, mode: MirrorMode, ctx: &ProcContext) -> Result<AnyBuffer, ProcErrors> {
    let out = match view {
        AnyView::Mono8(v) => AnyBuffer::Mono8(mirror_packed(v.pixels(), v.dimensions(), mode, ctx)?),
        AnyView::Mono16(v) => AnyBuffer::Mono16(mirror_packed(v.pixels(), v.dimensions(), mode, ctx)?),
        AnyView::MonoF32(v) => AnyBuffer::MonoF32(mirror_packed(v.pixels(), v.dimensions(), mode, ctx)?),
        AnyView::Rgb24(v) => AnyBuffer::Rgb24(mirror_packed(v.pixels(), v.dimensions(), mode, ctx)?),
        AnyView::Rgb48(v) => AnyBuffer::Rgb48(mirror_packed(v.pixels(), v.dimensions(), mode, ctx)?),
        AnyView::RgbF32(v) => AnyBuffer::RgbF32(mirror_packed(v.pixels(), v.dimensions(), mode, ctx)?),
        AnyView::Planar8(v) => AnyBuffer::Planar8(mirror_planar(v.samples(), v.dimensions(), mode, ctx)?),
        AnyView::Planar16(v) => AnyBuffer::Planar16(mirror_planar(v.samples(), v.dimensions(), mode, ctx)?),
        AnyView::PlanarF32(v) => AnyBuffer::PlanarF32(mirror_planar(v.samples(), v.dimensions(), mode, ctx)?)
    };
    Ok(out)
}

fn mirror_packed<P: Pixel>(
    src: &[P], dims: (usize, usize), mode: MirrorMode, ctx: &ProcContext
) -> Result<PixelBuffer<P>, ProcErrors> {
    let (width, height) = dims;
    let mut out = PixelBuffer::<P>::new(width, height, &ctx.pool)?;

    for_each_row_band(out.pixels_mut(), width, height, ctx.workers, |first_row, band| {
        mirror_rows(src, width, height, band, first_row, mode);
    });
    Ok(out)
}

fn mirror_planar<T: Component + Pixel>(
    src: &[T], dims: (usize, usize), mode: MirrorMode, ctx: &ProcContext
) -> Result<PlanarBuffer<T>, ProcErrors> {
    let (width, height) = dims;
    let plane_len = width * height;
    let mut out = PlanarBuffer::<T>::new(width, height, &ctx.pool)?;

    for (channel, plane) in out.planes_mut().into_iter().enumerate() {
        let src_plane = &src[channel * plane_len..(channel + 1) * plane_len];

        for_each_row_band(plane, width, height, ctx.workers, |first_row, band| {
            mirror_rows(src_plane, width, height, band, first_row, mode);
        });
    }
    Ok(out)
}

/// Fill output rows `first_row..` from their mirrored source positions
fn mirror_rows<P: Pixel>(
    src: &[P], width: usize, height: usize, band: &mut [P], first_row: usize, mode: MirrorMode
) {
    for (i, row) in band.chunks_exact_mut(width).enumerate() {
        let y = first_row + i;

        match mode {
            MirrorMode::Horizontal => {
                let src_row = &src[y * width..(y + 1) * width];
                for (out_px, in_px) in row.iter_mut().zip(src_row.iter().rev()) {
                    *out_px = *in_px;
                }
            }
            MirrorMode::Vertical => {
                let sy = height - 1 - y;
                row.copy_from_slice(&src[sy * width..(sy + 1) * width]);
            }
            MirrorMode::VerticalHorizontal => {
                // single remap: source index (height - y) * width - 1 - x
                let base = (height - y) * width - 1;
                for (x, out_px) in row.iter_mut().enumerate() {
                    *out_px = src[base - x];
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pixl_core::buffer::PixelBuffer;
    use pixl_core::pool::BufferPool;

    use super::*;

    fn context() -> ProcContext {
        ProcContext::new(BufferPool::new())
    }

    fn numbered(width: usize, height: usize, ctx: &ProcContext) -> PixelBuffer<u8> {
        let mut buf = PixelBuffer::<u8>::new(width, height, &ctx.pool).unwrap();
        for (i, px) in buf.pixels_mut().iter_mut().enumerate() {
            *px = i as u8;
        }
        buf
    }

    #[test]
    fn horizontal_reverses_rows() {
        let ctx = context();
        let src = numbered(3, 2, &ctx);

        let AnyBuffer::Mono8(out) = mirror(&AnyView::Mono8(src.view()), MirrorMode::Horizontal, &ctx).unwrap()
        else {
            panic!()
        };
        assert_eq!(out.row(0), &[2, 1, 0]);
        assert_eq!(out.row(1), &[5, 4, 3]);
    }

    #[test]
    fn vertical_swaps_rows() {
        let ctx = context();
        let src = numbered(3, 2, &ctx);

        let AnyBuffer::Mono8(out) = mirror(&AnyView::Mono8(src.view()), MirrorMode::Vertical, &ctx).unwrap()
        else {
            panic!()
        };
        assert_eq!(out.row(0), &[3, 4, 5]);
        assert_eq!(out.row(1), &[0, 1, 2]);
    }

    #[test]
    fn combined_is_a_full_rotation() {
        let ctx = context();
        let src = numbered(3, 2, &ctx);

        let AnyBuffer::Mono8(out) =
            mirror(&AnyView::Mono8(src.view()), MirrorMode::VerticalHorizontal, &ctx).unwrap()
        else {
            panic!()
        };
        assert_eq!(out.row(0), &[5, 4, 3]);
        assert_eq!(out.row(1), &[2, 1, 0]);
    }

    #[test]
    fn mirror_twice_is_identity() {
        use nanorand::Rng;

        let ctx = context();
        let mut pixels = vec![0_u8; 5 * 4];
        nanorand::WyRand::new().fill(&mut pixels);

        let mut src = PixelBuffer::<u8>::new(5, 4, &ctx.pool).unwrap();
        src.pixels_mut().copy_from_slice(&pixels);

        for mode in [MirrorMode::Horizontal, MirrorMode::Vertical, MirrorMode::VerticalHorizontal] {
            let once = mirror(&AnyView::Mono8(src.view()), mode, &ctx).unwrap();
            let twice = mirror(&once.view(), mode, &ctx).unwrap();

            let AnyBuffer::Mono8(twice) = twice else { panic!() };
            assert_eq!(twice.pixels(), src.pixels(), "{mode:?}");
        }
    }

    #[test]
    fn planar_mirrors_every_plane() {
        let ctx = context();
        let mut src = pixl_core::buffer::PlanarBuffer::<u16>::new(2, 1, &ctx.pool).unwrap();
        src.plane_mut(0).copy_from_slice(&[1, 2]);
        src.plane_mut(1).copy_from_slice(&[3, 4]);
        src.plane_mut(2).copy_from_slice(&[5, 6]);

        let AnyBuffer::Planar16(out) =
            mirror(&AnyView::Planar16(src.view()), MirrorMode::Horizontal, &ctx).unwrap()
        else {
            panic!()
        };
        assert_eq!(out.plane(0), &[2, 1]);
        assert_eq!(out.plane(1), &[4, 3]);
        assert_eq!(out.plane(2), &[6, 5]);
    }
}
