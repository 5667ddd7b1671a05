/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The pixel type system
//!
//! A pixel is described along three axes
//!
//! - precision: the numeric type of one channel sample, [`u8`], [`u16`]
//!   or [`f32`]
//! - arity: one channel (mono) or three channels (rgb)
//! - layout: interleaved (packed) or one plane per channel (planar)
//!
//! The full cross product is closed and finite, which lets the rest of
//! the library dispatch over a plain enum ([`PixelFormat`]) with
//! exhaustive matches instead of runtime type comparisons.

use bytemuck::{Pod, Zeroable};

/// Numeric representation of one channel sample
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PixelDepth {
    /// Samples stored in a [`u8`], full 0-255 range
    Eight,
    /// Samples stored in a [`u16`], full 0-65535 range
    Sixteen,
    /// Samples stored in an [`f32`], nominal 0.0-1.0 range
    Float
}

impl PixelDepth {
    /// Number of bytes one sample occupies
    pub const fn size_of(self) -> usize {
        match self {
            Self::Eight => 1,
            Self::Sixteen => 2,
            Self::Float => 4
        }
    }

    /// Largest representable sample value as a float
    pub const fn max_value(self) -> f32 {
        match self {
            Self::Eight => 255.0,
            Self::Sixteen => 65535.0,
            Self::Float => 1.0
        }
    }
}

/// Physical arrangement of channel samples in memory
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BufferLayout {
    /// All channels of one pixel stored contiguously, `[R,G,B,R,G,B]`
    Packed,
    /// Each channel occupies its own contiguous plane
    Planar
}

/// Static metadata describing one pixel type
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PixelInfo {
    /// Bytes one stored pixel value occupies
    pub bytes_per_pixel:    usize,
    /// Channels held together in one pixel value,
    /// 3 for an interleaved rgb pixel, 1 for a planar sample
    pub channels_per_pixel: usize,
    /// Channels the whole image carries, 3 for planar color,
    /// 1 for mono and for packed color (whose pixels are self contained)
    pub channels_per_image: usize,
    pub is_color:           bool,
    pub depth:              PixelDepth
}

/// One channel sample type
///
/// Implemented for `u8`, `u16` and `f32`. All arithmetic the processing
/// engine performs on samples goes through this trait so kernels stay
/// generic over precision.
pub trait Component:
    Pod + Copy + PartialEq + PartialOrd + Default + core::fmt::Debug + Send + Sync + 'static
{
    const DEPTH: PixelDepth;

    fn min_val() -> Self;
    fn max_val() -> Self;

    /// Saturating addition, clamped to `[min_val, max_val]`
    fn sat_add(self, rhs: Self) -> Self;
    /// Saturating subtraction, clamped to `[min_val, max_val]`
    fn sat_sub(self, rhs: Self) -> Self;
    /// Saturating multiplication, clamped to `[min_val, max_val]`
    fn sat_mul(self, rhs: Self) -> Self;

    /// Raw sample value as a float, no range normalization
    fn to_f32(self) -> f32;
    /// Back from a raw float, rounding and clamping to the valid range
    fn from_f32(v: f32) -> Self;

    /// Sample scaled into `[0.0, 1.0]`
    fn normalized(self) -> f32;
    /// Back from `[0.0, 1.0]`, clamped
    fn from_normalized(v: f32) -> Self;

    /// ITU-R BT.709 luminance of an rgb triple at this precision
    ///
    /// Defined once per precision and reused by binarization and by
    /// decoders that reduce palette entries to brightness.
    fn bt709(r: Self, g: Self, b: Self) -> Self;
}

impl Component for u8 {
    const DEPTH: PixelDepth = PixelDepth::Eight;

    fn min_val() -> u8 {
        u8::MIN
    }
    fn max_val() -> u8 {
        u8::MAX
    }
    fn sat_add(self, rhs: u8) -> u8 {
        self.saturating_add(rhs)
    }
    fn sat_sub(self, rhs: u8) -> u8 {
        self.saturating_sub(rhs)
    }
    fn sat_mul(self, rhs: u8) -> u8 {
        self.saturating_mul(rhs)
    }
    fn to_f32(self) -> f32 {
        f32::from(self)
    }
    fn from_f32(v: f32) -> u8 {
        v.clamp(0.0, 255.0).round() as u8
    }
    fn normalized(self) -> f32 {
        f32::from(self) / 255.0
    }
    fn from_normalized(v: f32) -> u8 {
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    }
    fn bt709(r: u8, g: u8, b: u8) -> u8 {
        bt709_u8(r, g, b)
    }
}

impl Component for u16 {
    const DEPTH: PixelDepth = PixelDepth::Sixteen;

    fn min_val() -> u16 {
        u16::MIN
    }
    fn max_val() -> u16 {
        u16::MAX
    }
    fn sat_add(self, rhs: u16) -> u16 {
        self.saturating_add(rhs)
    }
    fn sat_sub(self, rhs: u16) -> u16 {
        self.saturating_sub(rhs)
    }
    fn sat_mul(self, rhs: u16) -> u16 {
        self.saturating_mul(rhs)
    }
    fn to_f32(self) -> f32 {
        f32::from(self)
    }
    fn from_f32(v: f32) -> u16 {
        v.clamp(0.0, 65535.0).round() as u16
    }
    fn normalized(self) -> f32 {
        f32::from(self) / 65535.0
    }
    fn from_normalized(v: f32) -> u16 {
        (v.clamp(0.0, 1.0) * 65535.0).round() as u16
    }
    fn bt709(r: u16, g: u16, b: u16) -> u16 {
        bt709_u16(r, g, b)
    }
}

impl Component for f32 {
    const DEPTH: PixelDepth = PixelDepth::Float;

    fn min_val() -> f32 {
        0.0
    }
    fn max_val() -> f32 {
        1.0
    }
    fn sat_add(self, rhs: f32) -> f32 {
        (self + rhs).clamp(0.0, 1.0)
    }
    fn sat_sub(self, rhs: f32) -> f32 {
        (self - rhs).clamp(0.0, 1.0)
    }
    fn sat_mul(self, rhs: f32) -> f32 {
        (self * rhs).clamp(0.0, 1.0)
    }
    fn to_f32(self) -> f32 {
        self
    }
    fn from_f32(v: f32) -> f32 {
        v.clamp(0.0, 1.0)
    }
    fn normalized(self) -> f32 {
        self
    }
    fn from_normalized(v: f32) -> f32 {
        v.clamp(0.0, 1.0)
    }
    fn bt709(r: f32, g: f32, b: f32) -> f32 {
        r.mul_add(0.2126, g.mul_add(0.7152, b * 0.0722))
    }
}

/// BT.709 luminance of an 8 bit rgb triple, integer arithmetic,
/// rounded to nearest
pub fn bt709_u8(r: u8, g: u8, b: u8) -> u8 {
    let sum =
        2126 * u32::from(r) + 7152 * u32::from(g) + 722 * u32::from(b);
    ((sum + 5000) / 10000) as u8
}

/// BT.709 luminance of a 16 bit rgb triple
pub fn bt709_u16(r: u16, g: u16, b: u16) -> u16 {
    let sum =
        2126 * u64::from(r) + 7152 * u64::from(g) + 722 * u64::from(b);
    ((sum + 5000) / 10000) as u16
}

/// Widen an 8 bit sample to 16 bits
///
/// `v * 257 == round(v * 65535 / 255)`, which makes the
/// 8 -> 16 -> 8 round trip lossless.
pub fn u8_to_u16(v: u8) -> u16 {
    u16::from(v) * 257
}

/// Narrow a 16 bit sample to 8 bits, rounding to nearest
pub fn u16_to_u8(v: u16) -> u8 {
    ((u32::from(v) * 255 + 32767) / 65535) as u8
}

pub fn u8_to_f32(v: u8) -> f32 {
    f32::from(v) / 255.0
}

pub fn f32_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub fn u16_to_f32(v: u16) -> f32 {
    f32::from(v) / 65535.0
}

pub fn f32_to_u16(v: f32) -> u16 {
    (v.clamp(0.0, 1.0) * 65535.0).round() as u16
}

/// An interleaved three channel pixel
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rgb<T> {
    pub r: T,
    pub g: T,
    pub b: T
}

impl<T> Rgb<T> {
    pub const fn new(r: T, g: T, b: T) -> Rgb<T> {
        Rgb { r, g, b }
    }
}

// Safety: repr(C) over three fields of the same Pod type,
// no padding is possible.
unsafe impl<T: Zeroable> Zeroable for Rgb<T> {}
unsafe impl<T: Pod> Pod for Rgb<T> {}

/// One pixel value as stored in a packed buffer, or one planar sample
///
/// Mono pixels are the bare component types; color pixels are [`Rgb`].
pub trait Pixel: Pod + Copy + PartialEq + Send + Sync + 'static {
    type Component: Component;

    /// Channels stored together in this pixel value
    const CHANNELS: usize;
    const IS_COLOR: bool;

    /// Static descriptor for a packed buffer of this pixel type
    fn info() -> PixelInfo {
        PixelInfo {
            bytes_per_pixel:    Self::CHANNELS * Self::Component::DEPTH.size_of(),
            channels_per_pixel: Self::CHANNELS,
            channels_per_image: 1,
            is_color:           Self::IS_COLOR,
            depth:              Self::Component::DEPTH
        }
    }

    /// Channel sample by index; mono pixels only have channel 0
    fn component(self, index: usize) -> Self::Component;

    /// Channel sample as a raw float, used by interpolating kernels
    fn channel_f32(self, index: usize) -> f32 {
        self.component(index).to_f32()
    }

    /// Rebuild a pixel from raw float channels, clamping each sample.
    /// Mono pixels read element 0 only.
    fn from_channels_f32(channels: [f32; 3]) -> Self;
}

macro_rules! pixel_for_mono {
    ($comp:ty) => {
        impl Pixel for $comp {
            type Component = $comp;

            const CHANNELS: usize = 1;
            const IS_COLOR: bool = false;

            fn component(self, index: usize) -> $comp {
                assert_eq!(index, 0, "mono pixel has a single channel");
                self
            }

            fn from_channels_f32(channels: [f32; 3]) -> $comp {
                <$comp as Component>::from_f32(channels[0])
            }
        }
    };
}

pixel_for_mono!(u8);
pixel_for_mono!(u16);
pixel_for_mono!(f32);

impl<T: Component> Pixel for Rgb<T> {
    type Component = T;

    const CHANNELS: usize = 3;
    const IS_COLOR: bool = true;

    fn component(self, index: usize) -> T {
        match index {
            0 => self.r,
            1 => self.g,
            2 => self.b,
            _ => unreachable!("rgb pixel has three channels")
        }
    }

    fn from_channels_f32(channels: [f32; 3]) -> Rgb<T> {
        Rgb {
            r: T::from_f32(channels[0]),
            g: T::from_f32(channels[1]),
            b: T::from_f32(channels[2])
        }
    }
}

/// The closed set of buffer representations the library understands
///
/// Exactly one format corresponds to every (layout, pixel type) pair,
/// the mapping is total; see [`PixelFormat::from_parts`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PixelFormat {
    /// 8 bit single channel, packed
    Mono8,
    /// 16 bit single channel, packed
    Mono16,
    /// Float single channel, packed
    MonoF32,
    /// 8 bit interleaved rgb
    Rgb24,
    /// 16 bit interleaved rgb
    Rgb48,
    /// Float interleaved rgb
    RgbF32,
    /// 8 bit rgb, one plane per channel
    Planar8,
    /// 16 bit rgb, one plane per channel
    Planar16,
    /// Float rgb, one plane per channel
    PlanarF32
}

impl PixelFormat {
    pub const fn layout(self) -> BufferLayout {
        match self {
            Self::Planar8 | Self::Planar16 | Self::PlanarF32 => BufferLayout::Planar,
            _ => BufferLayout::Packed
        }
    }

    pub const fn is_color(self) -> bool {
        !matches!(self, Self::Mono8 | Self::Mono16 | Self::MonoF32)
    }

    pub const fn depth(self) -> PixelDepth {
        match self {
            Self::Mono8 | Self::Rgb24 | Self::Planar8 => PixelDepth::Eight,
            Self::Mono16 | Self::Rgb48 | Self::Planar16 => PixelDepth::Sixteen,
            Self::MonoF32 | Self::RgbF32 | Self::PlanarF32 => PixelDepth::Float
        }
    }

    /// Channels the whole image carries in this format
    pub const fn channels_per_image(self) -> usize {
        match self.layout() {
            BufferLayout::Planar => 3,
            BufferLayout::Packed => 1
        }
    }

    /// Map a (layout, color-ness, precision) triple to its format
    ///
    /// Total: planar mono collapses onto the packed mono formats since
    /// a single plane and a packed single channel are the same bytes.
    pub const fn from_parts(layout: BufferLayout, is_color: bool, depth: PixelDepth) -> PixelFormat {
        match (layout, is_color, depth) {
            (_, false, PixelDepth::Eight) => Self::Mono8,
            (_, false, PixelDepth::Sixteen) => Self::Mono16,
            (_, false, PixelDepth::Float) => Self::MonoF32,
            (BufferLayout::Packed, true, PixelDepth::Eight) => Self::Rgb24,
            (BufferLayout::Packed, true, PixelDepth::Sixteen) => Self::Rgb48,
            (BufferLayout::Packed, true, PixelDepth::Float) => Self::RgbF32,
            (BufferLayout::Planar, true, PixelDepth::Eight) => Self::Planar8,
            (BufferLayout::Planar, true, PixelDepth::Sixteen) => Self::Planar16,
            (BufferLayout::Planar, true, PixelDepth::Float) => Self::PlanarF32
        }
    }

    /// Static pixel metadata for this format
    pub const fn info(self) -> PixelInfo {
        let depth = self.depth();
        let is_color = self.is_color();
        let (channels_per_pixel, channels_per_image) = match self.layout() {
            BufferLayout::Planar => (1, 3),
            BufferLayout::Packed => {
                if is_color {
                    (3, 1)
                } else {
                    (1, 1)
                }
            }
        };

        PixelInfo {
            bytes_per_pixel: channels_per_pixel * depth.size_of(),
            channels_per_pixel,
            channels_per_image,
            is_color,
            depth
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_is_lossless() {
        for v in 0..=u8::MAX {
            assert_eq!(u16_to_u8(u8_to_u16(v)), v);
            assert_eq!(f32_to_u8(u8_to_f32(v)), v);
        }
    }

    #[test]
    fn narrowing_matches_reference() {
        // fixed reference values for the 16 -> 8 rounding rule
        assert_eq!(u16_to_u8(0), 0);
        assert_eq!(u16_to_u8(65535), 255);
        assert_eq!(u16_to_u8(257), 1);
        assert_eq!(u16_to_u8(128), 0);
        assert_eq!(u16_to_u8(129), 1);
        assert_eq!(u16_to_u8(32768), 128);
    }

    #[test]
    fn bt709_reference_values() {
        assert_eq!(bt709_u8(255, 255, 255), 255);
        assert_eq!(bt709_u8(0, 0, 0), 0);
        assert_eq!(bt709_u8(255, 0, 0), 54);
        assert_eq!(bt709_u8(0, 255, 0), 182);
        assert_eq!(bt709_u8(0, 0, 255), 18);
        assert_eq!(bt709_u8(128, 128, 128), 128);
    }

    #[test]
    fn saturating_float_clamps() {
        assert_eq!(0.8_f32.sat_add(0.5), 1.0);
        assert_eq!(0.2_f32.sat_sub(0.5), 0.0);
    }

    #[test]
    fn format_mapping_is_total() {
        let format = PixelFormat::from_parts(BufferLayout::Planar, false, PixelDepth::Eight);
        // planar mono is the same bytes as packed mono
        assert_eq!(format, PixelFormat::Mono8);
        assert_eq!(
            PixelFormat::from_parts(BufferLayout::Planar, true, PixelDepth::Sixteen),
            PixelFormat::Planar16
        );
    }

    #[test]
    fn packed_color_info() {
        let info = PixelFormat::Rgb48.info();
        assert_eq!(info.bytes_per_pixel, 6);
        assert_eq!(info.channels_per_pixel, 3);
        assert_eq!(info.channels_per_image, 1);
        assert!(info.is_color);
    }
}
