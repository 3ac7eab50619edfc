// SPDX-License-Identifier: GPL-3.0-only

//! Depth buffer encoding and decoding
//!
//! The encoding follows the unit the sensor reports:
//!
//! | Source unit        | Encoding   | Payload                                   |
//! |--------------------|------------|-------------------------------------------|
//! | meters (`f32`)     | `png16`    | 16-bit gray PNG, millimeters, saturating  |
//! | millimeters (`u16`)| `f32_gzip` | gzip of row-major little-endian f32 meters|
//!
//! The `f32_gzip` payload carries no dimensions; decoders need the width and
//! height sent alongside it.

use crate::backends::session::types::{DepthSamples, Plane, RawDepthFrame};
use crate::constants::{DEPTH_TAG_F32_GZIP, DEPTH_TAG_PNG16, MM_PER_METER, PNG16_MAX_MM};
use crate::errors::CaptureError;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use image::{DynamicImage, ImageBuffer, ImageFormat, Luma};
use std::fmt;
use std::io::{Cursor, Read, Write};
use tracing::debug;

/// Encoded depth payload, tagged by representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepthEncoding {
    /// 16-bit grayscale PNG of millimeters
    Png16(Vec<u8>),
    /// gzip-compressed little-endian f32 meters
    F32Gzip(Vec<u8>),
}

impl DepthEncoding {
    /// Wire tag of this representation
    pub fn tag(&self) -> &'static str {
        match self {
            DepthEncoding::Png16(_) => DEPTH_TAG_PNG16,
            DepthEncoding::F32Gzip(_) => DEPTH_TAG_F32_GZIP,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            DepthEncoding::Png16(bytes) | DepthEncoding::F32Gzip(bytes) => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            DepthEncoding::Png16(bytes) | DepthEncoding::F32Gzip(bytes) => bytes,
        }
    }

    /// File extension used when the payload is written to disk
    pub fn extension(&self) -> &'static str {
        match self {
            DepthEncoding::Png16(_) => "png",
            DepthEncoding::F32Gzip(_) => "f32.gz",
        }
    }
}

/// Convert meters to saturating millimeters
///
/// Rounds to nearest, then clamps into `[0, 65535]`. NaN maps to 0.
#[inline]
pub fn meters_to_millimeters(meters: f32) -> u16 {
    let mm = (meters * MM_PER_METER).round();
    if mm.is_nan() {
        0
    } else {
        mm.clamp(0.0, PNG16_MAX_MM as f32) as u16
    }
}

/// Convert millimeters to meters
#[inline]
pub fn millimeters_to_meters(mm: u16) -> f32 {
    mm as f32 / MM_PER_METER
}

/// Encode a depth frame in the representation matching its source unit
pub fn encode_depth(frame: &RawDepthFrame) -> Result<DepthEncoding, CaptureError> {
    let w = frame.width as usize;
    let h = frame.height as usize;
    if w == 0 || h == 0 {
        return Err(CaptureError::InvalidFrame(format!(
            "depth frame has empty dimensions {}x{}",
            w, h
        )));
    }
    frame
        .samples
        .plane()
        .validate("depth", w, h, frame.samples.sample_size())?;

    let encoding = match &frame.samples {
        DepthSamples::Meters(plane) => DepthEncoding::Png16(encode_png16(plane, w, h)?),
        DepthSamples::Millimeters(plane) => DepthEncoding::F32Gzip(encode_f32_gzip(plane, w, h)?),
    };

    debug!(
        encoding = encoding.tag(),
        width = w,
        height = h,
        bytes = encoding.bytes().len(),
        "Depth encoded"
    );
    Ok(encoding)
}

fn encode_png16(plane: &Plane, w: usize, h: usize) -> Result<Vec<u8>, CaptureError> {
    let mut millimeters = Vec::with_capacity(w * h);
    for row in 0..h {
        for col in 0..w {
            let offset = plane.offset(row, col);
            let bytes = [
                plane.data[offset],
                plane.data[offset + 1],
                plane.data[offset + 2],
                plane.data[offset + 3],
            ];
            millimeters.push(meters_to_millimeters(f32::from_le_bytes(bytes)));
        }
    }

    let image: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_raw(w as u32, h as u32, millimeters).ok_or_else(|| {
            CaptureError::EncodeFailed("Failed to create 16-bit depth image".into())
        })?;

    let mut buffer = Vec::new();
    DynamicImage::ImageLuma16(image)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| CaptureError::EncodeFailed(format!("PNG16 encoding failed: {}", e)))?;
    Ok(buffer)
}

fn encode_f32_gzip(plane: &Plane, w: usize, h: usize) -> Result<Vec<u8>, CaptureError> {
    let mut raw = Vec::with_capacity(w * h * 4);
    for row in 0..h {
        for col in 0..w {
            let offset = plane.offset(row, col);
            let mm = u16::from_le_bytes([plane.data[offset], plane.data[offset + 1]]);
            raw.extend_from_slice(&millimeters_to_meters(mm).to_le_bytes());
        }
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&raw)
        .and_then(|_| encoder.finish())
        .map_err(|e| CaptureError::EncodeFailed(format!("gzip compression failed: {}", e)))
}

/// Row-major depth in meters
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap {
    pub width: u32,
    pub height: u32,
    pub meters: Vec<f32>,
}

impl DepthMap {
    /// Depth at `(x, y)` in meters, `None` outside the map
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.meters
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Count of samples holding a reading (non-zero, finite)
    pub fn valid_count(&self) -> usize {
        self.meters
            .iter()
            .filter(|m| m.is_finite() && **m > 0.0)
            .count()
    }

    /// Nearest and farthest reading, ignoring samples without one
    pub fn range(&self) -> Option<(f32, f32)> {
        self.meters
            .iter()
            .copied()
            .filter(|m| m.is_finite() && *m > 0.0)
            .fold(None, |acc, m| match acc {
                None => Some((m, m)),
                Some((lo, hi)) => Some((lo.min(m), hi.max(m))),
            })
    }
}

/// Errors decoding a received depth payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepthDecodeError {
    /// Tag is neither `png16` nor `f32_gzip`
    UnknownEncoding(String),
    /// Payload could not be decompressed or decoded
    Corrupt(String),
    /// Sample count does not match the announced dimensions
    SizeMismatch { expected: usize, actual: usize },
    /// Image header disagrees with the announced dimensions
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    /// Announced dimensions cannot describe an in-memory map
    InvalidDimensions { width: u32, height: u32 },
}

impl fmt::Display for DepthDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepthDecodeError::UnknownEncoding(tag) => write!(f, "Unknown depth encoding '{}'", tag),
            DepthDecodeError::Corrupt(msg) => write!(f, "Corrupt depth payload: {}", msg),
            DepthDecodeError::SizeMismatch { expected, actual } => write!(
                f,
                "Depth payload holds {} samples, expected {}",
                actual, expected
            ),
            DepthDecodeError::DimensionMismatch { expected, actual } => write!(
                f,
                "Depth image is {}x{}, expected {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            DepthDecodeError::InvalidDimensions { width, height } => {
                write!(f, "Invalid depth map dimensions {}x{}", width, height)
            }
        }
    }
}

impl std::error::Error for DepthDecodeError {}

/// Decode a depth payload back into meters
///
/// `width` and `height` are required for `f32_gzip`; for `png16` they must
/// match the image header.
pub fn decode_depth(
    tag: &str,
    bytes: &[u8],
    width: u32,
    height: u32,
) -> Result<DepthMap, DepthDecodeError> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .filter(|n| n.checked_mul(4).is_some())
        .ok_or(DepthDecodeError::InvalidDimensions { width, height })?;

    let meters = match tag {
        DEPTH_TAG_F32_GZIP => {
            // Grows with the payload, never with the announced size
            let mut raw = Vec::new();
            GzDecoder::new(bytes)
                .read_to_end(&mut raw)
                .map_err(|e| DepthDecodeError::Corrupt(e.to_string()))?;
            if raw.len() % 4 != 0 {
                return Err(DepthDecodeError::Corrupt(format!(
                    "{} bytes is not a whole number of f32 samples",
                    raw.len()
                )));
            }
            raw.chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect::<Vec<f32>>()
        }
        DEPTH_TAG_PNG16 => {
            let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
                .map_err(|e| DepthDecodeError::Corrupt(e.to_string()))?
                .into_luma16();
            if image.dimensions() != (width, height) {
                return Err(DepthDecodeError::DimensionMismatch {
                    expected: (width, height),
                    actual: image.dimensions(),
                });
            }
            image
                .into_raw()
                .into_iter()
                .map(millimeters_to_meters)
                .collect::<Vec<f32>>()
        }
        other => return Err(DepthDecodeError::UnknownEncoding(other.to_string())),
    };

    if meters.len() != expected {
        return Err(DepthDecodeError::SizeMismatch {
            expected,
            actual: meters.len(),
        });
    }

    Ok(DepthMap {
        width,
        height,
        meters,
    })
}
