//! RGBA pixel buffer shared by the adjustment pipeline and the curve engine.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bytes per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Error types for pixel buffer construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Data length does not match `width * height * 4`.
    #[error("Pixel data size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// `width * height * 4` does not fit in memory addressing.
    #[error("Image dimensions {width}x{height} overflow")]
    Overflow { width: u32, height: u32 },
}

/// An 8-bit RGBA raster, row-major.
///
/// The data length always equals `width * height * 4`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPixelBuffer")]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

#[derive(Deserialize)]
struct RawPixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl TryFrom<RawPixelBuffer> for PixelBuffer {
    type Error = BufferError;

    fn try_from(raw: RawPixelBuffer) -> Result<Self, Self::Error> {
        PixelBuffer::new(raw.width, raw.height, raw.data)
    }
}

impl PixelBuffer {
    /// Wrap RGBA data, checking that its length matches the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BufferError> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(BufferError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a buffer filled with a single RGBA color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, BufferError> {
        let len = byte_len(width, height)?;
        let data = rgba.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw RGBA bytes. The length cannot change through this slice.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.data.len() / CHANNELS
    }

    /// Bytes in one row.
    pub fn row_stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// RGBA value at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Convert into an `image` crate buffer for encoding by the host.
    pub fn into_rgba_image(self) -> RgbaImage {
        // Length is guaranteed by construction
        RgbaImage::from_raw(self.width, self.height, self.data)
            .unwrap_or_else(|| RgbaImage::new(0, 0))
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

fn byte_len(width: u32, height: u32) -> Result<usize, BufferError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(BufferError::Overflow { width, height })
}
