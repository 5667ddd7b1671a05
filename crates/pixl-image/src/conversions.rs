/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Conversions between the supported pixel formats
//!
//! [`convert`] matches exhaustively over (source, target); what the
//! match does not cover does not exist. Supported are precision
//! changes within the same channel arity, layout changes between
//! packed and planar color, and any combination of both in a single
//! pass. Changing arity is a processing decision, not a conversion:
//! use the grayscale operation for color to mono.
//!
//! Precision rules are fixed so round trips behave
//!
//! - 8 -> 16: `v * 257`, exact, lossless round trip
//! - 16 -> 8: `(v * 255 + 32767) / 65535`, round to nearest
//! - integer <-> float: scale through `[0, 1]`, round on the way back

use pixl_core::buffer::{AnyBuffer, AnyView, PixelBuffer, PixelView, PlanarBuffer, PlanarView};
use pixl_core::pixel::{
    f32_to_u16, f32_to_u8, u16_to_f32, u16_to_u8, u8_to_f32, u8_to_u16, Component, Pixel,
    PixelFormat, Rgb
};
use pixl_core::pool::BufferPool;

use crate::errors::ImageErrors;

/// Sample precision change, one impl per (source, target) pair
trait ConvertInto<D> {
    fn convert(self) -> D;
}

impl ConvertInto<u8> for u8 {
    fn convert(self) -> u8 {
        self
    }
}
impl ConvertInto<u16> for u8 {
    fn convert(self) -> u16 {
        u8_to_u16(self)
    }
}
impl ConvertInto<f32> for u8 {
    fn convert(self) -> f32 {
        u8_to_f32(self)
    }
}
impl ConvertInto<u8> for u16 {
    fn convert(self) -> u8 {
        u16_to_u8(self)
    }
}
impl ConvertInto<u16> for u16 {
    fn convert(self) -> u16 {
        self
    }
}
impl ConvertInto<f32> for u16 {
    fn convert(self) -> f32 {
        u16_to_f32(self)
    }
}
impl ConvertInto<u8> for f32 {
    fn convert(self) -> u8 {
        f32_to_u8(self)
    }
}
impl ConvertInto<u16> for f32 {
    fn convert(self) -> u16 {
        f32_to_u16(self)
    }
}
impl ConvertInto<f32> for f32 {
    fn convert(self) -> f32 {
        self
    }
}

/// Convert `view` into a fresh buffer of `target` format
///
/// The identity conversion is a deep copy; the caller always owns an
/// independent buffer.
pub fn convert(view: &AnyView, target: PixelFormat, pool: &BufferPool) -> Result<AnyBuffer, ImageErrors> {
    match view {
        AnyView::Mono8(v) => convert_mono(v, target, pool),
        AnyView::Mono16(v) => convert_mono(v, target, pool),
        AnyView::MonoF32(v) => convert_mono(v, target, pool),
        AnyView::Rgb24(v) => convert_packed_color(v, target, pool),
        AnyView::Rgb48(v) => convert_packed_color(v, target, pool),
        AnyView::RgbF32(v) => convert_packed_color(v, target, pool),
        AnyView::Planar8(v) => convert_planar_color(v, target, pool),
        AnyView::Planar16(v) => convert_planar_color(v, target, pool),
        AnyView::PlanarF32(v) => convert_planar_color(v, target, pool)
    }
}

/// Component types every source precision can reach
trait AnyPrecision:
    Component + ConvertInto<u8> + ConvertInto<u16> + ConvertInto<f32> + Pixel<Component = Self>
{
}

impl<T> AnyPrecision for T where
    T: Component + ConvertInto<u8> + ConvertInto<u16> + ConvertInto<f32> + Pixel<Component = T>
{
}

fn convert_mono<S: AnyPrecision>(
    view: &PixelView<'_, S>, target: PixelFormat, pool: &BufferPool
) -> Result<AnyBuffer, ImageErrors> {
    match target {
        PixelFormat::Mono8 => Ok(AnyBuffer::Mono8(mono_map(view, pool)?)),
        PixelFormat::Mono16 => Ok(AnyBuffer::Mono16(mono_map(view, pool)?)),
        PixelFormat::MonoF32 => Ok(AnyBuffer::MonoF32(mono_map(view, pool)?)),
        _ => Err(ImageErrors::NoConversionPath(view.format(), target))
    }
}

fn convert_packed_color<S: AnyPrecision>(
    view: &PixelView<'_, Rgb<S>>, target: PixelFormat, pool: &BufferPool
) -> Result<AnyBuffer, ImageErrors> {
    match target {
        PixelFormat::Rgb24 => Ok(AnyBuffer::Rgb24(rgb_map(view, pool)?)),
        PixelFormat::Rgb48 => Ok(AnyBuffer::Rgb48(rgb_map(view, pool)?)),
        PixelFormat::RgbF32 => Ok(AnyBuffer::RgbF32(rgb_map(view, pool)?)),
        PixelFormat::Planar8 => Ok(AnyBuffer::Planar8(packed_to_planar(view, pool)?)),
        PixelFormat::Planar16 => Ok(AnyBuffer::Planar16(packed_to_planar(view, pool)?)),
        PixelFormat::PlanarF32 => Ok(AnyBuffer::PlanarF32(packed_to_planar(view, pool)?)),
        _ => Err(ImageErrors::NoConversionPath(view.format(), target))
    }
}

fn convert_planar_color<S: AnyPrecision>(
    view: &PlanarView<'_, S>, target: PixelFormat, pool: &BufferPool
) -> Result<AnyBuffer, ImageErrors> {
    match target {
        PixelFormat::Rgb24 => Ok(AnyBuffer::Rgb24(planar_to_packed(view, pool)?)),
        PixelFormat::Rgb48 => Ok(AnyBuffer::Rgb48(planar_to_packed(view, pool)?)),
        PixelFormat::RgbF32 => Ok(AnyBuffer::RgbF32(planar_to_packed(view, pool)?)),
        PixelFormat::Planar8 => Ok(AnyBuffer::Planar8(planar_map(view, pool)?)),
        PixelFormat::Planar16 => Ok(AnyBuffer::Planar16(planar_map(view, pool)?)),
        PixelFormat::PlanarF32 => Ok(AnyBuffer::PlanarF32(planar_map(view, pool)?)),
        _ => Err(ImageErrors::NoConversionPath(view.format(), target))
    }
}

fn mono_map<S, D>(view: &PixelView<'_, S>, pool: &BufferPool) -> Result<PixelBuffer<D>, ImageErrors>
where
    S: AnyPrecision + ConvertInto<D>,
    D: Component + Pixel<Component = D>
{
    let (width, height) = view.dimensions();
    let mut out = PixelBuffer::<D>::new(width, height, pool)?;

    for (out_px, px) in out.pixels_mut().iter_mut().zip(view.pixels()) {
        *out_px = px.convert();
    }
    Ok(out)
}

fn rgb_map<S, D>(
    view: &PixelView<'_, Rgb<S>>, pool: &BufferPool
) -> Result<PixelBuffer<Rgb<D>>, ImageErrors>
where
    S: AnyPrecision + ConvertInto<D>,
    D: Component
{
    let (width, height) = view.dimensions();
    let mut out = PixelBuffer::<Rgb<D>>::new(width, height, pool)?;

    for (out_px, px) in out.pixels_mut().iter_mut().zip(view.pixels()) {
        *out_px = Rgb::new(px.r.convert(), px.g.convert(), px.b.convert());
    }
    Ok(out)
}

fn packed_to_planar<S, D>(
    view: &PixelView<'_, Rgb<S>>, pool: &BufferPool
) -> Result<PlanarBuffer<D>, ImageErrors>
where
    S: AnyPrecision + ConvertInto<D>,
    D: Component
{
    let (width, height) = view.dimensions();
    let src = view.pixels();
    let mut out = PlanarBuffer::<D>::new(width, height, pool)?;

    let [r, g, b] = out.planes_mut();
    for (i, px) in src.iter().enumerate() {
        r[i] = px.r.convert();
        g[i] = px.g.convert();
        b[i] = px.b.convert();
    }
    Ok(out)
}

fn planar_to_packed<S, D>(
    view: &PlanarView<'_, S>, pool: &BufferPool
) -> Result<PixelBuffer<Rgb<D>>, ImageErrors>
where
    S: AnyPrecision + ConvertInto<D>,
    D: Component
{
    let (width, height) = view.dimensions();
    let (r, g, b) = (view.plane(0), view.plane(1), view.plane(2));
    let mut out = PixelBuffer::<Rgb<D>>::new(width, height, pool)?;

    for (i, out_px) in out.pixels_mut().iter_mut().enumerate() {
        *out_px = Rgb::new(r[i].convert(), g[i].convert(), b[i].convert());
    }
    Ok(out)
}

fn planar_map<S, D>(view: &PlanarView<'_, S>, pool: &BufferPool) -> Result<PlanarBuffer<D>, ImageErrors>
where
    S: AnyPrecision + ConvertInto<D>,
    D: Component
{
    let (width, height) = view.dimensions();
    let mut out = PlanarBuffer::<D>::new(width, height, pool)?;

    for (out_px, px) in out.samples_mut().iter_mut().zip(view.samples()) {
        *out_px = px.convert();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> BufferPool {
        BufferPool::new()
    }

    #[test]
    fn widening_round_trip_is_lossless() {
        let pool = pool();
        let mut src = PixelBuffer::<u8>::new(16, 16, &pool).unwrap();
        for (i, px) in src.pixels_mut().iter_mut().enumerate() {
            *px = i as u8;
        }

        let wide = convert(&AnyView::Mono8(src.view()), PixelFormat::Mono16, &pool).unwrap();
        let back = convert(&wide.view(), PixelFormat::Mono8, &pool).unwrap();

        let AnyBuffer::Mono8(back) = back else { panic!() };
        assert_eq!(back, src);
    }

    #[test]
    fn float_round_trip_is_lossless_for_u8() {
        let pool = pool();
        let mut src = PixelBuffer::<u8>::new(16, 16, &pool).unwrap();
        for (i, px) in src.pixels_mut().iter_mut().enumerate() {
            *px = i as u8;
        }

        let float = convert(&AnyView::Mono8(src.view()), PixelFormat::MonoF32, &pool).unwrap();
        let back = convert(&float.view(), PixelFormat::Mono8, &pool).unwrap();

        let AnyBuffer::Mono8(back) = back else { panic!() };
        assert_eq!(back, src);
    }

    #[test]
    fn narrowing_uses_round_to_nearest() {
        let pool = pool();
        let mut src = PixelBuffer::<u16>::new(4, 1, &pool).unwrap();
        src.row_mut(0).copy_from_slice(&[128, 129, 32768, 65535]);

        let out = convert(&AnyView::Mono16(src.view()), PixelFormat::Mono8, &pool).unwrap();

        let AnyBuffer::Mono8(out) = out else { panic!() };
        assert_eq!(out.row(0), &[0, 1, 128, 255]);
    }

    #[test]
    fn packed_planar_round_trip_is_bit_exact() {
        let pool = pool();
        let mut src = PixelBuffer::<Rgb<u8>>::new(3, 2, &pool).unwrap();
        for (i, px) in src.pixels_mut().iter_mut().enumerate() {
            *px = Rgb::new(i as u8, (i * 3) as u8, (i * 7) as u8);
        }

        let planar = convert(&AnyView::Rgb24(src.view()), PixelFormat::Planar8, &pool).unwrap();
        let back = convert(&planar.view(), PixelFormat::Rgb24, &pool).unwrap();

        let AnyBuffer::Rgb24(back) = back else { panic!() };
        assert_eq!(back, src);
    }

    #[test]
    fn layout_and_precision_change_in_one_pass() {
        let pool = pool();
        let mut src = PixelBuffer::<Rgb<u8>>::new(2, 1, &pool).unwrap();
        src.set(0, 0, Rgb::new(1, 2, 3));
        src.set(1, 0, Rgb::new(4, 5, 6));

        let out = convert(&AnyView::Rgb24(src.view()), PixelFormat::Planar16, &pool).unwrap();

        let AnyBuffer::Planar16(out) = out else { panic!() };
        assert_eq!(out.plane(0), &[257, 4 * 257]);
        assert_eq!(out.plane(1), &[2 * 257, 5 * 257]);
        assert_eq!(out.plane(2), &[3 * 257, 6 * 257]);
    }

    #[test]
    fn identity_is_a_deep_copy() {
        let pool = pool();
        let mut src = PixelBuffer::<u8>::new(2, 1, &pool).unwrap();
        src.set(0, 0, 9);

        let out = convert(&AnyView::Mono8(src.view()), PixelFormat::Mono8, &pool).unwrap();
        let AnyBuffer::Mono8(out) = out else { panic!() };

        assert_eq!(out, src);
        // independent storage
        src.set(0, 0, 1);
        assert_ne!(out, src);
    }

    #[test]
    fn changing_arity_has_no_path() {
        let pool = pool();
        let src = PixelBuffer::<u8>::new(2, 2, &pool).unwrap();

        let err = convert(&AnyView::Mono8(src.view()), PixelFormat::Rgb24, &pool);
        assert!(matches!(
            err,
            Err(ImageErrors::NoConversionPath(PixelFormat::Mono8, PixelFormat::Rgb24))
        ));
    }
}
