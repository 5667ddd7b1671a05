/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

// BMP layout notes, determined from
//
// - http://www.fileformat.info/format/bmp/egff.htm
// - http://fileformats.archiveteam.org/wiki/BMP
// - https://en.wikipedia.org/wiki/BMP_file_format
//
// A file starts with a 14 byte file header: a two byte type field,
// a u32 file size, four reserved bytes and a u32 offset to the pixel
// data. The type field is `BM` for ordinary files; icon and pointer
// arrays use `IC`, `PT`, `CI` or `CP` with the same layout.
//
// The info header follows immediately; its first u32 is its own size,
// which is also the only reliable way to tell the BMP versions apart
// (12 byte core header, 16/64 byte OS/2 v2, 40 byte WinBMPv3, 52/56
// byte v3 extensions, 108 byte v4, 124 byte v5). Headers of 40 bytes
// and up carry a compression field; v4+ carry channel masks and color
// space data which an indexed decode can skip wholesale by seeking to
// `header start + header size`.
//
// Between the headers and the pixel data sits the color table. Entries
// are stored BGR, three bytes each under the core header and four
// (BGR + reserved) everywhere else. When the stated color count is
// zero the table size must be inferred: ordinary files leave a gap of
// exactly the table between header end and the pixel data offset,
// icon arrays always store 2^bpp three byte entries.
//
// Pixel rows are stored bottom up unless the height is negative, and
// every row is zero padded to a four byte boundary.

use log::{trace, warn};

use pixl_core::buffer::PixelBuffer;
use pixl_core::bytestream::ByteCursor;
use pixl_core::options::DecoderOptions;
use pixl_core::pixel::bt709_u8;
use pixl_core::pool::BufferPool;

use crate::common::{is_icon_type, BmpCompression, BMP_TYPE_FIELDS, KNOWN_INFO_HEADER_SIZES};
use crate::BmpErrors;

/// Probe some bytes to see if they consist of a BMP image
///
/// Checks the `BM` type field and that the info header size byte is a
/// known BMP version, which weeds out other formats whose payload
/// happens to start with `BM`.
pub fn probe_bmp(bytes: &[u8]) -> bool {
    if let Some(magic_bytes) = bytes.get(0..2) {
        if magic_bytes == b"BM" {
            // skip file_size   -> 4
            // skip reserved    -> 4
            // skip data offset -> 4
            // read info header size
            if let Some(sz) = bytes.get(14) {
                return KNOWN_INFO_HEADER_SIZES.contains(&u32::from(*sz));
            }
        }
    }
    false
}

/// An indexed BMP decoder
///
/// Decodes uncompressed palette images of 1, 2, 4 or 8 bits per pixel
/// into an 8 bit single channel buffer, reducing each palette entry to
/// its BT.709 luminance. Anything else in the BMP family is rejected
/// with [`BmpErrors::Unsupported`], never misdecoded.
pub struct BmpDecoder<'a> {
    bytes:           ByteCursor<'a>,
    options:         DecoderOptions,
    width:           usize,
    height:          usize,
    top_down:        bool,
    depth:           u16,
    data_offset:     usize,
    lut:             [u8; 256],
    palette_entries: usize,
    decoded_headers: bool,
    is_icon:         bool
}

impl<'a> BmpDecoder<'a> {
    /// Create a decoder with default options
    pub fn new(data: &'a [u8]) -> BmpDecoder<'a> {
        BmpDecoder::new_with_options(data, DecoderOptions::default())
    }

    /// Create a decoder with the given options
    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> BmpDecoder<'a> {
        BmpDecoder {
            bytes: ByteCursor::new(data),
            options,
            width: 0,
            height: 0,
            top_down: false,
            depth: 0,
            data_offset: 0,
            lut: [0; 256],
            palette_entries: 0,
            decoded_headers: false,
            is_icon: false
        }
    }

    /// Image dimensions, present after the headers have been decoded
    pub const fn dimensions(&self) -> Option<(usize, usize)> {
        if self.decoded_headers {
            Some((self.width, self.height))
        } else {
            None
        }
    }

    /// Source bits per pixel, present after the headers have been decoded
    pub const fn bit_depth(&self) -> Option<u16> {
        if self.decoded_headers {
            Some(self.depth)
        } else {
            None
        }
    }

    /// Parse the file header, info header and color table
    ///
    /// Idempotent; the first call does the work.
    pub fn decode_headers(&mut self) -> Result<(), BmpErrors> {
        if self.decoded_headers {
            return Ok(());
        }

        // the type field is the one multi byte field read big endian,
        // so that it compares against the ASCII magic directly
        let type_field = self.bytes.get_u16_be()?;

        if !BMP_TYPE_FIELDS.contains(&type_field) {
            return Err(BmpErrors::InvalidMagicBytes);
        }
        self.is_icon = is_icon_type(type_field);

        let file_size = self.bytes.get_u32_le()?;
        // reserved1 + reserved2
        self.bytes.skip(4);
        self.data_offset = self.bytes.get_u32_le()? as usize;

        trace!("File size: {file_size}");
        trace!("Data offset: {}", self.data_offset);

        let header_start = self.bytes.position();
        let ihsize = self.bytes.get_u32_le()?;

        if !KNOWN_INFO_HEADER_SIZES.contains(&ihsize) {
            return Err(BmpErrors::Unsupported("unknown info header size"));
        }

        let (planes, compression);

        if ihsize == 12 {
            // core header, u16 dimensions, always bottom up
            self.width = usize::from(self.bytes.get_u16_le()?);
            self.height = usize::from(self.bytes.get_u16_le()?);
            planes = self.bytes.get_u16_le()?;
            self.depth = self.bytes.get_u16_le()?;
            compression = BmpCompression::Rgb;
        } else {
            let width = self.bytes.get_i32_le()?;
            let height = self.bytes.get_i32_le()?;

            if width <= 0 {
                return Err(BmpErrors::Generic(format!("invalid width {width}")));
            }
            // negative height flips the row order to top down
            let Some(abs_height) = height.checked_abs() else {
                return Err(BmpErrors::Generic(format!("invalid height {height}")));
            };
            self.top_down = height < 0;
            self.width = width as usize;
            self.height = abs_height as usize;

            planes = self.bytes.get_u16_le()?;
            self.depth = self.bytes.get_u16_le()?;

            compression = if ihsize >= 40 {
                BmpCompression::from_u32(self.bytes.get_u32_le()?)
            } else {
                // the 16 byte OS/2 header stops at the bit count
                BmpCompression::Rgb
            };
        }

        let mut clr_used = 0_usize;

        if ihsize >= 40 {
            // image size, x/y pixels per meter
            self.bytes.skip(12);
            clr_used = self.bytes.get_u32_le()? as usize;
            // clr_important
            self.bytes.skip(4);
        }
        // v4+ channel masks and color space data are irrelevant to an
        // indexed decode, jump straight past them
        self.bytes.set_position(header_start + ihsize as usize);
        let header_end = self.bytes.position();

        trace!("Width: {}", self.width);
        trace!("Height: {}", self.height);
        trace!("Top down: {}", self.top_down);
        trace!("Bit depth: {}", self.depth);
        trace!("Compression: {compression:?}");

        if planes != 1 {
            return Err(BmpErrors::Unsupported("color planes other than 1"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(BmpErrors::Generic("zero width or height".to_string()));
        }
        if self.width > self.options.max_width() {
            return Err(BmpErrors::TooLargeDimensions(
                "width",
                self.options.max_width(),
                self.width
            ));
        }
        if self.height > self.options.max_height() {
            return Err(BmpErrors::TooLargeDimensions(
                "height",
                self.options.max_height(),
                self.height
            ));
        }
        if compression != BmpCompression::Rgb {
            return Err(BmpErrors::Unsupported(
                "compressed pixel data (RLE or bitfields)"
            ));
        }
        if !matches!(self.depth, 1 | 2 | 4 | 8) {
            return Err(BmpErrors::Unsupported(
                "non indexed bit depth, only 1/2/4/8 bpp decode"
            ));
        }

        self.read_palette(ihsize, header_end, clr_used)?;

        self.decoded_headers = true;
        Ok(())
    }

    /// Read the color table and reduce it to a luminance lookup table
    fn read_palette(
        &mut self, ihsize: u32, header_end: usize, clr_used: usize
    ) -> Result<(), BmpErrors> {
        // the core header stores bare BGR triples, every other version
        // adds a reserved byte
        let mut entry_size = if ihsize == 12 { 3 } else { 4 };
        let max_entries = 1_usize << self.depth;

        let entries = if clr_used != 0 {
            if clr_used > max_entries {
                if self.options.strict_mode() {
                    return Err(BmpErrors::Generic(format!(
                        "palette claims {clr_used} colors, more than 2^{} allows",
                        self.depth
                    )));
                }
                warn!("Palette claims {clr_used} colors, clamping to {max_entries}");
                max_entries
            } else {
                clr_used
            }
        } else if self.is_icon {
            // icon and pointer arrays always store a full three byte
            // table regardless of header version
            entry_size = 3;
            max_entries
        } else {
            // infer from the gap between the headers and the pixel data
            let gap = self.data_offset.saturating_sub(header_end);
            (gap / entry_size).min(max_entries)
        };

        if header_end + entries * entry_size > self.data_offset {
            return Err(BmpErrors::MalformedPalette(format!(
                "{entries} entries of {entry_size} bytes overrun the pixel data offset {}",
                self.data_offset
            )));
        }
        if entries == 0 {
            warn!("Indexed BMP without a palette, output will be black");
        }

        for i in 0..entries {
            let entry = self.bytes.read_slice(entry_size)?;
            let (b, g, r) = (entry[0], entry[1], entry[2]);

            self.lut[i] = bt709_u8(r, g, b);
        }
        self.palette_entries = entries;
        Ok(())
    }

    /// Decode the pixel data into an 8 bit luminance buffer
    ///
    /// Calls [`decode_headers`](Self::decode_headers) first when the
    /// caller has not.
    pub fn decode(&mut self, pool: &BufferPool) -> Result<PixelBuffer<u8>, BmpErrors> {
        self.decode_headers()?;

        let mut out = PixelBuffer::<u8>::new(self.width, self.height, pool)?;

        let pixels_per_byte = usize::from(8 / self.depth);
        let mask = ((1_u32 << self.depth) - 1) as u8;
        // rows are zero padded to a four byte boundary
        let row_bytes = (self.width.div_ceil(pixels_per_byte) + 3) & !3;

        self.bytes.set_position(self.data_offset);

        for y in 0..self.height {
            let row = self.bytes.read_slice(row_bytes)?;

            // stored bottom up unless the height was negative
            let out_y = if self.top_down { y } else { self.height - 1 - y };
            let out_row = out.row_mut(out_y);

            for (x, out_px) in out_row.iter_mut().enumerate() {
                let byte = row[x / pixels_per_byte];
                // groups are packed most significant first
                let shift = 8 - self.depth * ((x % pixels_per_byte) as u16 + 1);
                let index = (byte >> shift) & mask;

                *out_px = self.lut[usize::from(index)];
            }
        }

        trace!(
            "Decoded {}x{} {} bpp indexed BMP",
            self.width,
            self.height,
            self.depth
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assemble an indexed BMP with a 40 byte info header.
    ///
    /// `rows` are logical top to bottom indices; a positive `height`
    /// stores them bottom up as real encoders do.
    fn build_bmp(
        width: usize, height: i32, bpp: u16, compression: u32, palette: &[[u8; 3]],
        rows: &[&[u8]]
    ) -> Vec<u8> {
        let data_offset = 14 + 40 + palette.len() * 4;
        let pixels_per_byte = usize::from(8 / bpp.max(1));
        let row_bytes = if bpp >= 8 {
            (width * usize::from(bpp / 8) + 3) & !3
        } else {
            (width.div_ceil(pixels_per_byte) + 3) & !3
        };

        let mut out = Vec::new();
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&0_u32.to_le_bytes()); // file size, unused
        out.extend_from_slice(&0_u32.to_le_bytes()); // reserved
        out.extend_from_slice(&(data_offset as u32).to_le_bytes());

        out.extend_from_slice(&40_u32.to_le_bytes());
        out.extend_from_slice(&(width as i32).to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&1_u16.to_le_bytes()); // planes
        out.extend_from_slice(&bpp.to_le_bytes());
        out.extend_from_slice(&compression.to_le_bytes());
        out.extend_from_slice(&[0; 12]); // image size, resolution
        out.extend_from_slice(&(palette.len() as u32).to_le_bytes());
        out.extend_from_slice(&0_u32.to_le_bytes()); // clr_important

        for [r, g, b] in palette {
            out.extend_from_slice(&[*b, *g, *r, 0]);
        }

        let stored: Vec<&[u8]> = if height >= 0 {
            rows.iter().rev().copied().collect()
        } else {
            rows.to_vec()
        };

        for row in stored {
            let mut packed = vec![0_u8; row_bytes];
            if bpp == 8 {
                packed[..row.len()].copy_from_slice(row);
            } else {
                for (x, index) in row.iter().enumerate() {
                    let shift = 8 - bpp * ((x % pixels_per_byte) as u16 + 1);
                    packed[x / pixels_per_byte] |= index << shift;
                }
            }
            out.extend_from_slice(&packed);
        }
        out
    }

    #[test]
    fn golden_decode_is_palette_luminance() {
        // palette luminances: bt709(255,0,0)=54, (0,255,0)=182, white=255
        let palette = [[255, 0, 0], [0, 255, 0], [255, 255, 255]];
        let rows: [&[u8]; 2] = [&[0, 1, 2], &[2, 1, 0]];
        let data = build_bmp(3, 2, 8, 0, &palette, &rows);

        assert!(probe_bmp(&data));

        let pool = BufferPool::new();
        let mut decoder = BmpDecoder::new(&data);
        let buf = decoder.decode(&pool).unwrap();

        assert_eq!(decoder.dimensions(), Some((3, 2)));
        assert_eq!(buf.row(0), &[54, 182, 255]);
        assert_eq!(buf.row(1), &[255, 182, 54]);
    }

    #[test]
    fn bottom_up_and_top_down_decode_identically() {
        let palette = [[0, 0, 0], [255, 255, 255]];
        let rows: [&[u8]; 3] = [&[1, 0], &[0, 1], &[1, 1]];

        let bottom_up = build_bmp(2, 3, 8, 0, &palette, &rows);
        let top_down = build_bmp(2, -3, 8, 0, &palette, &rows);

        let pool = BufferPool::new();
        let a = BmpDecoder::new(&bottom_up).decode(&pool).unwrap();
        let b = BmpDecoder::new(&top_down).decode(&pool).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn four_bpp_rows_unpack_msb_first() {
        // width 5 at 4 bpp: 3 data bytes, padded to 4
        let palette = [[0, 0, 0], [255, 255, 255], [128, 128, 128]];
        let rows: [&[u8]; 1] = [&[1, 0, 2, 1, 1]];
        let data = build_bmp(5, 1, 4, 0, &palette, &rows);

        let pool = BufferPool::new();
        let buf = BmpDecoder::new(&data).decode(&pool).unwrap();

        assert_eq!(buf.row(0), &[255, 0, 128, 255, 255]);
    }

    #[test]
    fn one_bpp_wide_row() {
        let palette = [[0, 0, 0], [255, 255, 255]];
        let indices: Vec<u8> = (0..10).map(|x| x & 1).collect();
        let rows: [&[u8]; 1] = [&indices];
        let data = build_bmp(10, 1, 1, 0, &palette, &rows);

        let pool = BufferPool::new();
        let buf = BmpDecoder::new(&data).decode(&pool).unwrap();

        let expect: Vec<u8> = indices.iter().map(|x| x * 255).collect();
        assert_eq!(buf.row(0), expect.as_slice());
    }

    #[test]
    fn rle_compression_is_rejected() {
        let palette = [[0, 0, 0], [255, 255, 255]];
        let rows: [&[u8]; 1] = [&[0, 1]];
        let data = build_bmp(2, 1, 8, 1, &palette, &rows);

        let err = BmpDecoder::new(&data).decode(&BufferPool::new());
        assert!(matches!(err, Err(BmpErrors::Unsupported(_))));
    }

    #[test]
    fn truecolor_depth_is_rejected() {
        let data = build_bmp(1, 1, 24, 0, &[], &[&[]]);

        let err = BmpDecoder::new(&data).decode(&BufferPool::new());
        assert!(matches!(err, Err(BmpErrors::Unsupported(_))));
    }

    #[test]
    fn palette_overrunning_pixel_data_is_fatal() {
        let palette = [[0, 0, 0], [255, 255, 255]];
        let rows: [&[u8]; 1] = [&[0, 1]];
        let mut data = build_bmp(2, 1, 8, 0, &palette, &rows);

        // shrink the stated data offset so the table cannot fit
        let bogus_offset = 14 + 40 + 4_u32;
        data[10..14].copy_from_slice(&bogus_offset.to_le_bytes());

        let err = BmpDecoder::new(&data).decode(&BufferPool::new());
        assert!(matches!(err, Err(BmpErrors::MalformedPalette(_))));
    }

    #[test]
    fn truncated_pixel_data_is_an_error() {
        let palette = [[0, 0, 0]];
        let rows: [&[u8]; 2] = [&[0, 0], &[0, 0]];
        let mut data = build_bmp(2, 2, 8, 0, &palette, &rows);
        data.truncate(data.len() - 3);

        let err = BmpDecoder::new(&data).decode(&BufferPool::new());
        assert!(matches!(err, Err(BmpErrors::Truncated(_))));
    }

    #[test]
    fn dimension_limits_are_enforced() {
        let palette = [[0, 0, 0]];
        let rows: [&[u8]; 1] = [&[0, 0, 0, 0]];
        let data = build_bmp(4, 1, 8, 0, &palette, &rows);

        let options = DecoderOptions::default().set_max_width(2);
        let err = BmpDecoder::new_with_options(&data, options).decode(&BufferPool::new());
        assert!(matches!(err, Err(BmpErrors::TooLargeDimensions(..))));
    }

    #[test]
    fn probe_rejects_near_misses() {
        assert!(!probe_bmp(b"PM"));
        assert!(!probe_bmp(b"BM"));

        // valid magic, nonsense header size byte
        let mut data = vec![0_u8; 20];
        data[0..2].copy_from_slice(b"BM");
        data[14] = 99;
        assert!(!probe_bmp(&data));
    }
}
