// SPDX-License-Identifier: GPL-3.0-only

//! Color frame encoding
//!
//! Packed color buffers are compressed to JPEG:
//! - NV21 buffers are converted to RGB first
//! - Luma-only buffers are written as 8-bit grayscale
//!
//! No alpha channel is ever written.

use crate::constants::JPEG_QUALITY;
use crate::errors::CaptureError;
use crate::media::yuv_converter::{PackedColor, PackedLayout, luma_to_gray, nv21_to_rgb};
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use tracing::debug;

/// JPEG encoder for packed color buffers
#[derive(Debug, Clone, Copy)]
pub struct ColorEncoder {
    quality: u8,
}

impl ColorEncoder {
    /// Create an encoder at the default quality (85)
    pub fn new() -> Self {
        Self {
            quality: JPEG_QUALITY,
        }
    }

    /// Create an encoder at `quality` (clamped to 1-100)
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode a packed buffer as JPEG
    pub fn encode(&self, packed: &PackedColor) -> Result<Vec<u8>, CaptureError> {
        let data = match packed.layout {
            PackedLayout::Nv21 => {
                let rgb = nv21_to_rgb(packed)?;
                self.encode_raw(rgb.as_raw(), packed.width, packed.height, ExtendedColorType::Rgb8)?
            }
            PackedLayout::Luma => {
                let gray = luma_to_gray(packed)?;
                self.encode_raw(gray.as_raw(), packed.width, packed.height, ExtendedColorType::L8)?
            }
        };

        debug!(
            width = packed.width,
            height = packed.height,
            quality = self.quality,
            size = data.len(),
            "JPEG encoding complete"
        );
        Ok(data)
    }

    fn encode_raw(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        color_type: ExtendedColorType,
    ) -> Result<Vec<u8>, CaptureError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);

        let mut encoder = JpegEncoder::new_with_quality(&mut cursor, self.quality);
        encoder
            .encode(pixels, width, height, color_type)
            .map_err(|e| CaptureError::EncodeFailed(format!("JPEG encoding failed: {}", e)))?;

        Ok(buffer)
    }
}

impl Default for ColorEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_nv21(width: u32, height: u32) -> PackedColor {
        let len = crate::media::yuv_converter::nv21_len(width, height);
        PackedColor {
            width,
            height,
            layout: PackedLayout::Nv21,
            data: vec![128u8; len],
        }
    }

    #[test]
    fn test_default_quality() {
        assert_eq!(ColorEncoder::new().quality(), 85);
        assert_eq!(ColorEncoder::with_quality(0).quality(), 1);
        assert_eq!(ColorEncoder::with_quality(250).quality(), 100);
    }

    #[test]
    fn test_nv21_encodes_to_rgb_jpeg() {
        let jpeg = ColorEncoder::new().encode(&gray_nv21(16, 8)).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn test_luma_encodes_to_gray_jpeg() {
        let packed = PackedColor {
            width: 5,
            height: 3,
            layout: PackedLayout::Luma,
            data: vec![200u8; 15],
        };
        let jpeg = ColorEncoder::new().encode(&packed).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.color(), image::ColorType::L8);
    }

    #[test]
    fn test_truncated_buffer_fails() {
        let mut packed = gray_nv21(4, 4);
        packed.data.truncate(10);
        assert!(matches!(
            ColorEncoder::new().encode(&packed),
            Err(CaptureError::EncodeFailed(_))
        ));
    }
}
