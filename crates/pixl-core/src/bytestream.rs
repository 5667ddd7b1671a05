/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A seekable cursor with endian aware reads
//!
//! Inputs to the decode pipeline are fully buffered before parsing
//! begins, so the cursor only has to deal with an in-memory slice.
//! Out of range reads are reported as errors, never panics, since they
//! are how truncated files surface.

use core::fmt::{Debug, Formatter};

/// Errors from cursor reads
pub enum CursorError {
    /// A read went past the end of the buffer.
    /// Holds (requested position, buffer length)
    OutOfBounds(usize, usize),
    Generic(&'static str)
}

impl Debug for CursorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfBounds(position, length) => {
                writeln!(
                    f,
                    "Read at position {position} is out of bounds for length {length}"
                )
            }
            Self::Generic(message) => writeln!(f, "{message}")
        }
    }
}

impl core::fmt::Display for CursorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for CursorError {}

/// A positioned reader over a fully buffered byte slice
#[derive(Clone)]
pub struct ByteCursor<'a> {
    data:     &'a [u8],
    position: usize
}

impl<'a> ByteCursor<'a> {
    /// Create a new cursor at position zero
    pub const fn new(data: &'a [u8]) -> ByteCursor<'a> {
        ByteCursor { data, position: 0 }
    }

    /// Total length of the underlying buffer
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current read position
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Move the read position, positions past the end are allowed
    /// and will fail on the next read
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Advance the position by `num` bytes
    pub fn skip(&mut self, num: usize) {
        self.position = self.position.saturating_add(num);
    }

    /// Number of bytes left from the current position
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    pub fn is_eof(&self) -> bool {
        self.remaining() == 0
    }

    /// Borrow up to `num` bytes starting at the current position without
    /// consuming them; shorter than `num` near the end of the buffer
    pub fn peek_up_to(&self, num: usize) -> &'a [u8] {
        let start = self.position.min(self.data.len());
        let end = self.position.saturating_add(num).min(self.data.len());
        &self.data[start..end]
    }

    fn fetch(&mut self, num: usize) -> Result<&'a [u8], CursorError> {
        let end = self
            .position
            .checked_add(num)
            .ok_or(CursorError::Generic("position overflow"))?;

        if end > self.data.len() {
            return Err(CursorError::OutOfBounds(end, self.data.len()));
        }
        let out = &self.data[self.position..end];
        self.position = end;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, CursorError> {
        self.fetch(1).map(|x| x[0])
    }

    pub fn get_u16_le(&mut self) -> Result<u16, CursorError> {
        let b = self.fetch(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn get_u16_be(&mut self) -> Result<u16, CursorError> {
        let b = self.fetch(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn get_u32_le(&mut self) -> Result<u32, CursorError> {
        let b = self.fetch(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn get_i32_le(&mut self) -> Result<i32, CursorError> {
        self.get_u32_le().map(|x| x as i32)
    }

    /// Read exactly `buf.len()` bytes into `buf`
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), CursorError> {
        let src = self.fetch(buf.len())?;
        buf.copy_from_slice(src);
        Ok(())
    }

    /// Borrow exactly `num` bytes from the current position, consuming them
    pub fn read_slice(&mut self, num: usize) -> Result<&'a [u8], CursorError> {
        self.fetch(num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endian_reads() {
        let data = [0x42, 0x4D, 0x10, 0x00, 0x00, 0x00];
        let mut cursor = ByteCursor::new(&data);

        assert_eq!(cursor.get_u16_be().unwrap(), 0x424D);
        assert_eq!(cursor.get_u32_le().unwrap(), 16);
        assert!(cursor.is_eof());
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let mut cursor = ByteCursor::new(&[1, 2]);
        assert!(cursor.get_u32_le().is_err());
        // failed read does not consume
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn peek_does_not_consume() {
        let data = [9, 8, 7];
        let cursor = ByteCursor::new(&data);
        assert_eq!(cursor.peek_up_to(10), &data);
        assert_eq!(cursor.position(), 0);
    }
}
