/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Owning pixel containers and their read only views
//!
//! Two physical layouts exist
//!
//! - [`PixelBuffer`]: packed, one contiguous run of `width * height`
//!   pixel values, each value holding all of its channels
//! - [`PlanarBuffer`]: three consecutive planes of `width * height`
//!   component samples
//!
//! Both rent their backing storage from a [`BufferPool`] and give it
//! back exactly once when dropped; ownership makes double return and
//! use after dispose unrepresentable.
//!
//! Out of range row/channel indices are programming errors and panic,
//! they are not recoverable conditions.

use core::fmt::{Debug, Formatter};

use crate::pixel::{BufferLayout, Component, Pixel, PixelFormat};
use crate::pool::{BufferPool, MemoryBlock};

/// Errors raised while constructing buffers
pub enum BufferErrors {
    /// Width or height of zero
    ZeroDimension,
    /// `width * height * channels` overflowed a usize
    TooLargeDimensions(usize, usize)
}

impl Debug for BufferErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ZeroDimension => writeln!(f, "Width and height must be non zero"),
            Self::TooLargeDimensions(width, height) => {
                writeln!(f, "Dimensions {width}x{height} overflow the addressable size")
            }
        }
    }
}

impl core::fmt::Display for BufferErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for BufferErrors {}

fn checked_size(width: usize, height: usize, channels: usize) -> Result<usize, BufferErrors> {
    if width == 0 || height == 0 {
        return Err(BufferErrors::ZeroDimension);
    }
    width
        .checked_mul(height)
        .and_then(|x| x.checked_mul(channels))
        .ok_or(BufferErrors::TooLargeDimensions(width, height))
}

/// An owning, packed pixel container
///
/// Row `y` occupies `[y * width, y * width + width)`.
pub struct PixelBuffer<P: Pixel> {
    width:  usize,
    height: usize,
    pool:   BufferPool,
    // Some until drop
    block:  Option<MemoryBlock>,
    marker: core::marker::PhantomData<P>
}

impl<P: Pixel> PixelBuffer<P> {
    /// Create a zero filled buffer, renting storage from `pool`
    pub fn new(width: usize, height: usize, pool: &BufferPool) -> Result<PixelBuffer<P>, BufferErrors> {
        let pixels = checked_size(width, height, 1)?;
        pixels
            .checked_mul(core::mem::size_of::<P>())
            .ok_or(BufferErrors::TooLargeDimensions(width, height))?;

        let block = pool.rent::<P>(pixels);

        Ok(PixelBuffer {
            width,
            height,
            pool: pool.clone(),
            block: Some(block),
            marker: core::marker::PhantomData
        })
    }

    #[inline]
    fn block(&self) -> &MemoryBlock {
        // invariant: Some for the whole life of the buffer
        self.block.as_ref().unwrap()
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Component count of the whole buffer,
    /// `width * height * channels_per_image` where packed images have
    /// one channel per image (their pixels are self contained)
    pub const fn size(&self) -> usize {
        self.width * self.height
    }

    /// The tagged format of this buffer
    pub fn format(&self) -> PixelFormat {
        PixelFormat::from_parts(BufferLayout::Packed, P::IS_COLOR, <P::Component as Component>::DEPTH)
    }

    /// All pixels in row major order
    pub fn pixels(&self) -> &[P] {
        self.block().slice_of::<P>(self.width * self.height)
    }

    pub fn pixels_mut(&mut self) -> &mut [P] {
        let len = self.width * self.height;
        self.block.as_mut().unwrap().slice_of_mut::<P>(len)
    }

    /// Pixel storage viewed as bare component samples
    pub fn components(&self) -> &[P::Component] {
        bytemuck::cast_slice(self.pixels())
    }

    pub fn components_mut(&mut self) -> &mut [P::Component] {
        bytemuck::cast_slice_mut(self.pixels_mut())
    }

    /// One whole row of pixels
    ///
    /// # Panics
    /// If `y >= height`; an out of range row is a logic error.
    pub fn row(&self, y: usize) -> &[P] {
        &self.pixels()[y * self.width..(y + 1) * self.width]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [P] {
        let width = self.width;
        &mut self.pixels_mut()[y * width..(y + 1) * width]
    }

    /// Whole channel slice; a packed buffer stores every channel inside
    /// its pixels so only channel 0 exists
    ///
    /// # Panics
    /// If `channel != 0`.
    pub fn channel(&self, channel: usize) -> &[P::Component] {
        assert_eq!(channel, 0, "packed buffer only exposes channel 0");
        self.components()
    }

    /// Pixel at `(x, y)`
    pub fn get(&self, x: usize, y: usize) -> P {
        self.pixels()[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, pixel: P) {
        let width = self.width;
        self.pixels_mut()[y * width + x] = pixel;
    }

    /// Deep copy into an independently rented block
    pub fn duplicate(&self) -> PixelBuffer<P> {
        // renting from our own pool cannot fail dimension checks again
        let mut copy = PixelBuffer::new(self.width, self.height, &self.pool).unwrap();
        copy.pixels_mut().copy_from_slice(self.pixels());
        copy
    }

    /// Borrow this buffer as a read only view
    pub fn view(&self) -> PixelView<'_, P> {
        PixelView {
            width:  self.width,
            height: self.height,
            pixels: self.pixels()
        }
    }
}

impl<P: Pixel> PartialEq for PixelBuffer<P> {
    fn eq(&self, other: &Self) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        self.width == other.width && self.height == other.height && self.pixels() == other.pixels()
    }
}

impl<P: Pixel> Debug for PixelBuffer<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(
            f,
            "PixelBuffer<{:?}> {}x{}",
            self.format(),
            self.width,
            self.height
        )
    }
}

impl<P: Pixel> Drop for PixelBuffer<P> {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            self.pool.ret(block);
        }
    }
}

/// An owning, planar color container
///
/// Plane `c`, row `y` occupies
/// `[c * width * height + y * width, + width)`.
pub struct PlanarBuffer<T: Component> {
    width:  usize,
    height: usize,
    pool:   BufferPool,
    // Some until drop
    block:  Option<MemoryBlock>,
    marker: core::marker::PhantomData<T>
}

impl<T: Component> PlanarBuffer<T> {
    /// Channels a planar color buffer always carries
    pub const CHANNELS: usize = 3;

    pub fn new(width: usize, height: usize, pool: &BufferPool) -> Result<PlanarBuffer<T>, BufferErrors> {
        let samples = checked_size(width, height, Self::CHANNELS)?;
        samples
            .checked_mul(core::mem::size_of::<T>())
            .ok_or(BufferErrors::TooLargeDimensions(width, height))?;

        let block = pool.rent::<T>(samples);

        Ok(PlanarBuffer {
            width,
            height,
            pool: pool.clone(),
            block: Some(block),
            marker: core::marker::PhantomData
        })
    }

    #[inline]
    fn block(&self) -> &MemoryBlock {
        self.block.as_ref().unwrap()
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// `width * height * 3`
    pub const fn size(&self) -> usize {
        self.width * self.height * Self::CHANNELS
    }

    pub fn format(&self) -> PixelFormat {
        PixelFormat::from_parts(BufferLayout::Planar, true, T::DEPTH)
    }

    /// Every sample, the three planes laid out back to back
    pub fn samples(&self) -> &[T] {
        self.block().slice_of::<T>(self.size())
    }

    pub fn samples_mut(&mut self) -> &mut [T] {
        let len = self.size();
        self.block.as_mut().unwrap().slice_of_mut::<T>(len)
    }

    /// One whole channel plane
    ///
    /// # Panics
    /// If `channel >= 3`.
    pub fn plane(&self, channel: usize) -> &[T] {
        assert!(channel < Self::CHANNELS, "planar buffer has three channels");
        let plane_len = self.width * self.height;
        &self.samples()[channel * plane_len..(channel + 1) * plane_len]
    }

    pub fn plane_mut(&mut self, channel: usize) -> &mut [T] {
        assert!(channel < Self::CHANNELS, "planar buffer has three channels");
        let plane_len = self.width * self.height;
        &mut self.samples_mut()[channel * plane_len..(channel + 1) * plane_len]
    }

    /// Three mutable planes at once, for deinterleaving writers
    pub fn planes_mut(&mut self) -> [&mut [T]; 3] {
        let plane_len = self.width * self.height;
        let samples = self.samples_mut();
        let (a, rest) = samples.split_at_mut(plane_len);
        let (b, c) = rest.split_at_mut(plane_len);
        [a, b, c]
    }

    /// Row `y` of plane `channel`
    pub fn plane_row(&self, channel: usize, y: usize) -> &[T] {
        let plane = self.plane(channel);
        &plane[y * self.width..(y + 1) * self.width]
    }

    pub fn plane_row_mut(&mut self, channel: usize, y: usize) -> &mut [T] {
        let width = self.width;
        let plane = self.plane_mut(channel);
        &mut plane[y * width..(y + 1) * width]
    }

    pub fn duplicate(&self) -> PlanarBuffer<T> {
        let mut copy = PlanarBuffer::new(self.width, self.height, &self.pool).unwrap();
        copy.samples_mut().copy_from_slice(self.samples());
        copy
    }

    pub fn view(&self) -> PlanarView<'_, T> {
        PlanarView {
            width:   self.width,
            height:  self.height,
            samples: self.samples()
        }
    }
}

impl<T: Component> PartialEq for PlanarBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        self.width == other.width
            && self.height == other.height
            && self.samples() == other.samples()
    }
}

impl<T: Component> Debug for PlanarBuffer<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(
            f,
            "PlanarBuffer<{:?}> {}x{}",
            self.format(),
            self.width,
            self.height
        )
    }
}

impl<T: Component> Drop for PlanarBuffer<T> {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            self.pool.ret(block);
        }
    }
}

/// Read only borrow of a packed buffer
///
/// Every processing operation takes its input through a view, so a
/// transform can never mutate its source.
#[derive(Copy, Clone)]
pub struct PixelView<'a, P: Pixel> {
    width:  usize,
    height: usize,
    pixels: &'a [P]
}

impl<'a, P: Pixel> PixelView<'a, P> {
    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &'a [P] {
        self.pixels
    }

    pub fn components(&self) -> &'a [P::Component] {
        bytemuck::cast_slice(self.pixels)
    }

    pub fn row(&self, y: usize) -> &'a [P] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    pub fn get(&self, x: usize, y: usize) -> P {
        self.pixels[y * self.width + x]
    }

    pub fn format(&self) -> PixelFormat {
        PixelFormat::from_parts(BufferLayout::Packed, P::IS_COLOR, <P::Component as Component>::DEPTH)
    }

    /// Materialize the view into a new owned buffer
    pub fn to_owned(&self, pool: &BufferPool) -> Result<PixelBuffer<P>, BufferErrors> {
        let mut out = PixelBuffer::new(self.width, self.height, pool)?;
        out.pixels_mut().copy_from_slice(self.pixels);
        Ok(out)
    }
}

/// Read only borrow of a planar buffer
#[derive(Copy, Clone)]
pub struct PlanarView<'a, T: Component> {
    width:   usize,
    height:  usize,
    samples: &'a [T]
}

impl<'a, T: Component> PlanarView<'a, T> {
    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn samples(&self) -> &'a [T] {
        self.samples
    }

    pub fn plane(&self, channel: usize) -> &'a [T] {
        assert!(channel < 3, "planar view has three channels");
        let plane_len = self.width * self.height;
        &self.samples[channel * plane_len..(channel + 1) * plane_len]
    }

    pub fn plane_row(&self, channel: usize, y: usize) -> &'a [T] {
        let plane = self.plane(channel);
        &plane[y * self.width..(y + 1) * self.width]
    }

    pub fn format(&self) -> PixelFormat {
        PixelFormat::from_parts(BufferLayout::Planar, true, T::DEPTH)
    }

    pub fn to_owned(&self, pool: &BufferPool) -> Result<PlanarBuffer<T>, BufferErrors> {
        let mut out = PlanarBuffer::new(self.width, self.height, pool)?;
        out.samples_mut().copy_from_slice(self.samples);
        Ok(out)
    }
}

/// Owned buffer of any supported format
///
/// Decoders return this, the processing engine and the conversion table
/// dispatch over it; the set of variants is closed so matches are
/// checked for exhaustiveness at compile time.
#[derive(Debug, PartialEq)]
pub enum AnyBuffer {
    Mono8(PixelBuffer<u8>),
    Mono16(PixelBuffer<u16>),
    MonoF32(PixelBuffer<f32>),
    Rgb24(PixelBuffer<crate::pixel::Rgb<u8>>),
    Rgb48(PixelBuffer<crate::pixel::Rgb<u16>>),
    RgbF32(PixelBuffer<crate::pixel::Rgb<f32>>),
    Planar8(PlanarBuffer<u8>),
    Planar16(PlanarBuffer<u16>),
    PlanarF32(PlanarBuffer<f32>)
}

impl AnyBuffer {
    pub fn format(&self) -> PixelFormat {
        match self {
            Self::Mono8(_) => PixelFormat::Mono8,
            Self::Mono16(_) => PixelFormat::Mono16,
            Self::MonoF32(_) => PixelFormat::MonoF32,
            Self::Rgb24(_) => PixelFormat::Rgb24,
            Self::Rgb48(_) => PixelFormat::Rgb48,
            Self::RgbF32(_) => PixelFormat::RgbF32,
            Self::Planar8(_) => PixelFormat::Planar8,
            Self::Planar16(_) => PixelFormat::Planar16,
            Self::PlanarF32(_) => PixelFormat::PlanarF32
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            Self::Mono8(b) => b.dimensions(),
            Self::Mono16(b) => b.dimensions(),
            Self::MonoF32(b) => b.dimensions(),
            Self::Rgb24(b) => b.dimensions(),
            Self::Rgb48(b) => b.dimensions(),
            Self::RgbF32(b) => b.dimensions(),
            Self::Planar8(b) => b.dimensions(),
            Self::Planar16(b) => b.dimensions(),
            Self::PlanarF32(b) => b.dimensions()
        }
    }

    /// Read only view with the same tag
    pub fn view(&self) -> AnyView<'_> {
        match self {
            Self::Mono8(b) => AnyView::Mono8(b.view()),
            Self::Mono16(b) => AnyView::Mono16(b.view()),
            Self::MonoF32(b) => AnyView::MonoF32(b.view()),
            Self::Rgb24(b) => AnyView::Rgb24(b.view()),
            Self::Rgb48(b) => AnyView::Rgb48(b.view()),
            Self::RgbF32(b) => AnyView::RgbF32(b.view()),
            Self::Planar8(b) => AnyView::Planar8(b.view()),
            Self::Planar16(b) => AnyView::Planar16(b.view()),
            Self::PlanarF32(b) => AnyView::PlanarF32(b.view())
        }
    }

    pub fn duplicate(&self) -> AnyBuffer {
        match self {
            Self::Mono8(b) => AnyBuffer::Mono8(b.duplicate()),
            Self::Mono16(b) => AnyBuffer::Mono16(b.duplicate()),
            Self::MonoF32(b) => AnyBuffer::MonoF32(b.duplicate()),
            Self::Rgb24(b) => AnyBuffer::Rgb24(b.duplicate()),
            Self::Rgb48(b) => AnyBuffer::Rgb48(b.duplicate()),
            Self::RgbF32(b) => AnyBuffer::RgbF32(b.duplicate()),
            Self::Planar8(b) => AnyBuffer::Planar8(b.duplicate()),
            Self::Planar16(b) => AnyBuffer::Planar16(b.duplicate()),
            Self::PlanarF32(b) => AnyBuffer::PlanarF32(b.duplicate())
        }
    }
}

/// Read only view of any supported format
#[derive(Copy, Clone)]
pub enum AnyView<'a> {
    Mono8(PixelView<'a, u8>),
    Mono16(PixelView<'a, u16>),
    MonoF32(PixelView<'a, f32>),
    Rgb24(PixelView<'a, crate::pixel::Rgb<u8>>),
    Rgb48(PixelView<'a, crate::pixel::Rgb<u16>>),
    RgbF32(PixelView<'a, crate::pixel::Rgb<f32>>),
    Planar8(PlanarView<'a, u8>),
    Planar16(PlanarView<'a, u16>),
    PlanarF32(PlanarView<'a, f32>)
}

impl<'a> AnyView<'a> {
    pub fn format(&self) -> PixelFormat {
        match self {
            Self::Mono8(_) => PixelFormat::Mono8,
            Self::Mono16(_) => PixelFormat::Mono16,
            Self::MonoF32(_) => PixelFormat::MonoF32,
            Self::Rgb24(_) => PixelFormat::Rgb24,
            Self::Rgb48(_) => PixelFormat::Rgb48,
            Self::RgbF32(_) => PixelFormat::RgbF32,
            Self::Planar8(_) => PixelFormat::Planar8,
            Self::Planar16(_) => PixelFormat::Planar16,
            Self::PlanarF32(_) => PixelFormat::PlanarF32
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            Self::Mono8(v) => v.dimensions(),
            Self::Mono16(v) => v.dimensions(),
            Self::MonoF32(v) => v.dimensions(),
            Self::Rgb24(v) => v.dimensions(),
            Self::Rgb48(v) => v.dimensions(),
            Self::RgbF32(v) => v.dimensions(),
            Self::Planar8(v) => v.dimensions(),
            Self::Planar16(v) => v.dimensions(),
            Self::PlanarF32(v) => v.dimensions()
        }
    }
}
