/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Saturating arithmetic between two images
//!
//! Operands must agree in format and dimensions, there is no implicit
//! conversion or resize. Arithmetic is per component and saturating:
//! `255 + 1 == 255`, `0 - 1 == 0`, floats clamp to `[0, 1]`.

use pixl_core::buffer::{AnyBuffer, AnyView, PixelBuffer, PlanarBuffer};
use pixl_core::pixel::{Component, Pixel, Rgb};

use crate::errors::ProcErrors;
use crate::utils::for_each_row_band;
use crate::ProcContext;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MathMode {
    Add,
    Subtract,
    Multiply
}

/// Combine two same-format, same-size images per component
pub fn image_math(
    a: &AnyView, b: &AnyView, mode: MathMode, ctx: &ProcContext
) -> Result<AnyBuffer, ProcErrors> {
    if a.dimensions() != b.dimensions() {
        return Err(ProcErrors::DimensionMismatch(a.dimensions(), b.dimensions()));
    }

    let out = match (a, b) {
        (AnyView::Mono8(x), AnyView::Mono8(y)) => {
            AnyBuffer::Mono8(math_packed(x.components(), y.components(), x.dimensions(), mode, ctx)?)
        }
        (AnyView::Mono16(x), AnyView::Mono16(y)) => {
            AnyBuffer::Mono16(math_packed(x.components(), y.components(), x.dimensions(), mode, ctx)?)
        }
        (AnyView::MonoF32(x), AnyView::MonoF32(y)) => {
            AnyBuffer::MonoF32(math_packed(x.components(), y.components(), x.dimensions(), mode, ctx)?)
        }
        (AnyView::Rgb24(x), AnyView::Rgb24(y)) => {
            AnyBuffer::Rgb24(math_rgb(x.components(), y.components(), x.dimensions(), mode, ctx)?)
        }
        (AnyView::Rgb48(x), AnyView::Rgb48(y)) => {
            AnyBuffer::Rgb48(math_rgb(x.components(), y.components(), x.dimensions(), mode, ctx)?)
        }
        (AnyView::RgbF32(x), AnyView::RgbF32(y)) => {
            AnyBuffer::RgbF32(math_rgb(x.components(), y.components(), x.dimensions(), mode, ctx)?)
        }
        (AnyView::Planar8(x), AnyView::Planar8(y)) => {
            AnyBuffer::Planar8(math_planar(x.samples(), y.samples(), x.dimensions(), mode, ctx)?)
        }
        (AnyView::Planar16(x), AnyView::Planar16(y)) => {
            AnyBuffer::Planar16(math_planar(x.samples(), y.samples(), x.dimensions(), mode, ctx)?)
        }
        (AnyView::PlanarF32(x), AnyView::PlanarF32(y)) => {
            AnyBuffer::PlanarF32(math_planar(x.samples(), y.samples(), x.dimensions(), mode, ctx)?)
        }
        _ => return Err(ProcErrors::FormatMismatch(a.format(), b.format()))
    };
    Ok(out)
}

fn combine<T: Component>(a: T, b: T, mode: MathMode) -> T {
    match mode {
        MathMode::Add => a.sat_add(b),
        MathMode::Subtract => a.sat_sub(b),
        MathMode::Multiply => a.sat_mul(b)
    }
}

/// Combine component slices into the rows of `out`
fn math_components<T: Component>(
    a: &[T], b: &[T], out: &mut [T], row_len: usize, rows: usize, mode: MathMode,
    ctx: &ProcContext
) {
    for_each_row_band(out, row_len, rows, ctx.workers, |first_row, band| {
        let offset = first_row * row_len;
        for (i, out_px) in band.iter_mut().enumerate() {
            let j = offset + i;
            *out_px = combine(a[j], b[j], mode);
        }
    });
}

fn math_packed<T: Component + Pixel<Component = T>>(
    a: &[T], b: &[T], dims: (usize, usize), mode: MathMode, ctx: &ProcContext
) -> Result<PixelBuffer<T>, ProcErrors> {
    let (width, height) = dims;
    let mut out = PixelBuffer::<T>::new(width, height, &ctx.pool)?;

    math_components(a, b, out.components_mut(), width, height, mode, ctx);
    Ok(out)
}

fn math_rgb<T: Component>(
    a: &[T], b: &[T], dims: (usize, usize), mode: MathMode, ctx: &ProcContext
) -> Result<PixelBuffer<Rgb<T>>, ProcErrors> {
    let (width, height) = dims;
    let mut out = PixelBuffer::<Rgb<T>>::new(width, height, &ctx.pool)?;

    // row length in components, three per pixel
    math_components(a, b, out.components_mut(), width * 3, height, mode, ctx);
    Ok(out)
}

fn math_planar<T: Component>(
    a: &[T], b: &[T], dims: (usize, usize), mode: MathMode, ctx: &ProcContext
) -> Result<PlanarBuffer<T>, ProcErrors> {
    let (width, height) = dims;
    let mut out = PlanarBuffer::<T>::new(width, height, &ctx.pool)?;

    // treat the three planes as one long row run
    math_components(a, b, out.samples_mut(), width, height * 3, mode, ctx);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use pixl_core::pool::BufferPool;

    use super::*;

    fn context() -> ProcContext {
        ProcContext::new(BufferPool::new())
    }

    fn mono(values: &[u8], ctx: &ProcContext) -> PixelBuffer<u8> {
        let mut buf = PixelBuffer::<u8>::new(values.len(), 1, &ctx.pool).unwrap();
        buf.row_mut(0).copy_from_slice(values);
        buf
    }

    #[test]
    fn add_saturates_at_the_top() {
        let ctx = context();
        let a = mono(&[250, 100, 255], &ctx);
        let b = mono(&[10, 100, 1], &ctx);

        let AnyBuffer::Mono8(out) =
            image_math(&AnyView::Mono8(a.view()), &AnyView::Mono8(b.view()), MathMode::Add, &ctx).unwrap()
        else {
            panic!()
        };
        assert_eq!(out.row(0), &[255, 200, 255]);
    }

    #[test]
    fn subtract_saturates_at_zero() {
        let ctx = context();
        let a = mono(&[0, 100, 5], &ctx);
        let b = mono(&[1, 30, 10], &ctx);

        let AnyBuffer::Mono8(out) =
            image_math(&AnyView::Mono8(a.view()), &AnyView::Mono8(b.view()), MathMode::Subtract, &ctx)
                .unwrap()
        else {
            panic!()
        };
        assert_eq!(out.row(0), &[0, 70, 0]);
    }

    #[test]
    fn float_multiply_clamps_to_unit_range() {
        let ctx = context();
        let mut a = PixelBuffer::<f32>::new(2, 1, &ctx.pool).unwrap();
        let mut b = PixelBuffer::<f32>::new(2, 1, &ctx.pool).unwrap();
        a.row_mut(0).copy_from_slice(&[0.5, 1.0]);
        b.row_mut(0).copy_from_slice(&[0.5, 1.0]);

        let AnyBuffer::MonoF32(out) = image_math(
            &AnyView::MonoF32(a.view()),
            &AnyView::MonoF32(b.view()),
            MathMode::Multiply,
            &ctx
        )
        .unwrap() else {
            panic!()
        };
        assert_eq!(out.row(0), &[0.25, 1.0]);
    }

    #[test]
    fn format_mismatch_is_rejected() {
        let ctx = context();
        let a = mono(&[1, 2], &ctx);
        let b = PixelBuffer::<u16>::new(2, 1, &ctx.pool).unwrap();

        let err = image_math(&AnyView::Mono8(a.view()), &AnyView::Mono16(b.view()), MathMode::Add, &ctx);
        assert!(matches!(err, Err(ProcErrors::FormatMismatch(..))));
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let ctx = context();
        let a = mono(&[1, 2], &ctx);
        let b = mono(&[1, 2, 3], &ctx);

        let err = image_math(&AnyView::Mono8(a.view()), &AnyView::Mono8(b.view()), MathMode::Add, &ctx);
        assert!(matches!(err, Err(ProcErrors::DimensionMismatch(..))));
    }
}
