//! RGBA to PNG encoder
//!
//! Emits exactly one encoding: 8-bit RGBA, filter type 0 on every scanline,
//! and a zlib stream of stored (uncompressed) deflate blocks. The output is a
//! valid PNG any conforming decoder can read back to the original pixels.

mod adler;
mod chunk;
mod crc;
mod zlib;

pub use adler::adler32;
pub use chunk::{kind, PngChunk, MAX_CHUNK_LEN};
pub use crc::{crc32, Crc32};
pub use zlib::{deflate_stored, stored_len, MAX_STORED_BLOCK, ZLIB_HEADER};

use thiserror::Error;
use tracing::trace;

/// Eight-byte file signature
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Largest width or height the format allows
pub const MAX_DIMENSION: u32 = (1 << 31) - 1;

/// Encoder error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PngError {
    #[error("pixel buffer is {actual} bytes, expected {expected} for the given dimensions")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

pub type PngResult<T> = Result<T, PngError>;

/// PNG color types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    Grayscale = 0,
    Rgb = 2,
    Indexed = 3,
    GrayscaleAlpha = 4,
    Rgba = 6,
}

impl ColorType {
    /// Channels per pixel
    pub fn channels(self) -> usize {
        match self {
            Self::Grayscale | Self::Indexed => 1,
            Self::GrayscaleAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Scanline filter type 0: bytes stored as-is
const FILTER_NONE: u8 = 0;

/// Stored-deflate RGBA encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct PngEncoder {
    _private: (),
}

impl PngEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a `width * height * 4` RGBA buffer
    pub fn encode(&self, width: u32, height: u32, rgba: &[u8]) -> PngResult<Vec<u8>> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(PngError::InvalidDimensions { width, height });
        }

        let stride = (width as usize)
            .checked_mul(ColorType::Rgba.channels())
            .ok_or(PngError::InvalidDimensions { width, height })?;
        let expected = stride
            .checked_mul(height as usize)
            .ok_or(PngError::InvalidDimensions { width, height })?;

        // The whole image goes into one IDAT chunk.
        let idat_len = stride
            .checked_add(1)
            .and_then(|row| row.checked_mul(height as usize))
            .and_then(stored_len)
            .ok_or(PngError::InvalidDimensions { width, height })?;
        if idat_len > MAX_CHUNK_LEN {
            return Err(PngError::InvalidDimensions { width, height });
        }
        if rgba.len() != expected {
            return Err(PngError::BufferSizeMismatch {
                expected,
                actual: rgba.len(),
            });
        }

        let literal = filter_scanlines(rgba, stride);
        let idat = deflate_stored(&literal);

        let chunks = [
            PngChunk::new(kind::IHDR, ihdr_body(width, height)),
            PngChunk::new(kind::IDAT, idat),
            PngChunk::new(kind::IEND, Vec::new()),
        ];

        let total = PNG_SIGNATURE.len() + chunks.iter().map(PngChunk::encoded_len).sum::<usize>();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&PNG_SIGNATURE);
        for chunk in &chunks {
            chunk.write_to(&mut out);
        }

        trace!(width, height, bytes = out.len(), "encoded png");
        Ok(out)
    }
}

/// Encode with a default encoder
pub fn encode_rgba(width: u32, height: u32, rgba: &[u8]) -> PngResult<Vec<u8>> {
    PngEncoder::new().encode(width, height, rgba)
}

/// Prefix every scanline with filter byte 0
fn filter_scanlines(rgba: &[u8], stride: usize) -> Vec<u8> {
    let rows = rgba.len() / stride;
    let mut out = Vec::with_capacity(rgba.len() + rows);
    for row in rgba.chunks_exact(stride) {
        out.push(FILTER_NONE);
        out.extend_from_slice(row);
    }
    out
}

fn ihdr_body(width: u32, height: u32) -> Vec<u8> {
    let mut body = Vec::with_capacity(13);
    body.extend_from_slice(&width.to_be_bytes());
    body.extend_from_slice(&height.to_be_bytes());
    body.push(8); // bit depth
    body.push(ColorType::Rgba as u8);
    body.push(0); // compression: deflate
    body.push(0); // filter method
    body.push(0); // no interlace
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_buffer_length() {
        let err = encode_rgba(2, 2, &[0; 15]).unwrap_err();
        assert_eq!(err, PngError::BufferSizeMismatch { expected: 16, actual: 15 });
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        assert_eq!(
            encode_rgba(0, 4, &[]).unwrap_err(),
            PngError::InvalidDimensions { width: 0, height: 4 }
        );
        assert!(matches!(
            encode_rgba(1 << 31, 1, &[]),
            Err(PngError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_rejects_images_too_large_for_one_idat() {
        // 23200 rows of 92801 filtered bytes overflow the 2^31-1 chunk length.
        assert_eq!(
            encode_rgba(23_200, 23_200, &[]).unwrap_err(),
            PngError::InvalidDimensions { width: 23_200, height: 23_200 }
        );
        // 23000x23000 still fits, so the buffer is what gets rejected.
        assert!(matches!(
            encode_rgba(23_000, 23_000, &[]),
            Err(PngError::BufferSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_layout_of_one_pixel_image() {
        let png = encode_rgba(1, 1, &[1, 2, 3, 4]).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);

        // IHDR
        assert_eq!(&png[8..12], &[0, 0, 0, 13]);
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(&png[16..29], &[0, 0, 0, 1, 0, 0, 0, 1, 8, 6, 0, 0, 0]);

        // IDAT: zlib header, one final stored block of 5 bytes, adler
        let idat = 33;
        let len = u32::from_be_bytes([png[idat], png[idat + 1], png[idat + 2], png[idat + 3]]);
        assert_eq!(len, 2 + 5 + 5 + 4);
        assert_eq!(&png[idat + 4..idat + 8], b"IDAT");
        assert_eq!(&png[idat + 8..idat + 10], &ZLIB_HEADER);
        assert_eq!(&png[idat + 15..idat + 20], &[0, 1, 2, 3, 4]);

        // IEND closes the file
        assert_eq!(&png[png.len() - 12..], &[0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let pixels: Vec<u8> = (0..64u8).collect();
        assert_eq!(encode_rgba(4, 4, &pixels), encode_rgba(4, 4, &pixels));
    }

    #[test]
    fn test_color_type_channels() {
        assert_eq!(ColorType::Rgba.channels(), 4);
        assert_eq!(ColorType::Rgb.channels(), 3);
        assert_eq!(ColorType::Rgba as u8, 6);
    }
}
