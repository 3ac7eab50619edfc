// SPDX-License-Identifier: GPL-3.0-only

//! Planar YUV 4:2:0 to packed NV21 conversion
//!
//! Sensors hand out three planes with arbitrary row and sample strides. Image
//! encoders want one packed buffer, so the planes are resolved into NV21:
//!
//! ```text
//! Y Y Y Y ... (width * height luma samples)
//! V U V U ... (one V,U pair per 2x2 luma block)
//! ```
//!
//! V precedes U in every pair. No resampling happens here; chroma is
//! replicated over its 2x2 block only when converting to RGB.

use crate::backends::session::types::RawColorFrame;
use crate::errors::CaptureError;
use image::{GrayImage, RgbImage};
use tracing::debug;

/// Layout of a packed color buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackedLayout {
    /// Full-resolution Y followed by interleaved V/U pairs
    Nv21,
    /// Luma only (frame had no chroma planes)
    Luma,
}

/// Color frame resolved into a contiguous buffer
#[derive(Debug, Clone)]
pub struct PackedColor {
    pub width: u32,
    pub height: u32,
    pub layout: PackedLayout,
    pub data: Vec<u8>,
}

/// Expected NV21 buffer length for the given dimensions
pub fn nv21_len(width: u32, height: u32) -> usize {
    let (w, h) = (width as usize, height as usize);
    w * h + 2 * (w / 2) * (h / 2)
}

/// Pack a planar frame into NV21 (or plain luma when chroma is absent)
///
/// Frames with chroma must have even, non-zero dimensions; every plane must
/// be long enough for its strided reads.
pub fn yuv420_to_nv21(frame: &RawColorFrame) -> Result<PackedColor, CaptureError> {
    let w = frame.width as usize;
    let h = frame.height as usize;

    if w == 0 || h == 0 {
        return Err(CaptureError::InvalidFrame(format!(
            "color frame has empty dimensions {}x{}",
            w, h
        )));
    }

    frame.luma.validate("luma", w, h, 1)?;

    let Some(chroma) = &frame.chroma else {
        let mut data = Vec::with_capacity(w * h);
        copy_luma(frame, &mut data);
        debug!(width = w, height = h, "Packed luma-only frame");
        return Ok(PackedColor {
            width: frame.width,
            height: frame.height,
            layout: PackedLayout::Luma,
            data,
        });
    };

    if w % 2 != 0 || h % 2 != 0 {
        return Err(CaptureError::InvalidFrame(format!(
            "4:2:0 frame needs even dimensions, got {}x{}",
            w, h
        )));
    }

    let cw = w / 2;
    let ch = h / 2;
    chroma.u.validate("chroma U", cw, ch, 1)?;
    chroma.v.validate("chroma V", cw, ch, 1)?;

    let mut data = Vec::with_capacity(nv21_len(frame.width, frame.height));
    copy_luma(frame, &mut data);

    let (u, v) = (&chroma.u, &chroma.v);
    for row in 0..ch {
        for col in 0..cw {
            data.push(v.data[v.offset(row, col)]);
            data.push(u.data[u.offset(row, col)]);
        }
    }

    debug!(width = w, height = h, bytes = data.len(), "Packed planar frame to NV21");

    Ok(PackedColor {
        width: frame.width,
        height: frame.height,
        layout: PackedLayout::Nv21,
        data,
    })
}

fn copy_luma(frame: &RawColorFrame, out: &mut Vec<u8>) {
    let luma = &frame.luma;
    let w = frame.width as usize;
    for row in 0..frame.height as usize {
        if luma.pixel_stride == 1 {
            let start = luma.offset(row, 0);
            out.extend_from_slice(&luma.data[start..start + w]);
        } else {
            out.extend((0..w).map(|col| luma.data[luma.offset(row, col)]));
        }
    }
}

/// Convert a packed NV21 buffer to RGB (BT.601 limited range)
pub fn nv21_to_rgb(packed: &PackedColor) -> Result<RgbImage, CaptureError> {
    let width = packed.width as usize;
    let height = packed.height as usize;

    if packed.layout != PackedLayout::Nv21 || packed.data.len() < nv21_len(packed.width, packed.height) {
        return Err(CaptureError::EncodeFailed(format!(
            "expected {} NV21 bytes for {}x{}, got {} ({:?})",
            nv21_len(packed.width, packed.height),
            width,
            height,
            packed.data.len(),
            packed.layout
        )));
    }

    let (y_plane, vu_plane) = packed.data.split_at(width * height);
    let mut rgb_data = vec![0u8; width * height * 3];

    for y_idx in 0..height {
        process_row(y_plane, vu_plane, &mut rgb_data, y_idx, width);
    }

    RgbImage::from_raw(packed.width, packed.height, rgb_data)
        .ok_or_else(|| CaptureError::EncodeFailed("Failed to create RGB image from buffer".into()))
}

/// Wrap a packed luma buffer as a grayscale image
pub fn luma_to_gray(packed: &PackedColor) -> Result<GrayImage, CaptureError> {
    GrayImage::from_raw(packed.width, packed.height, packed.data.clone())
        .ok_or_else(|| CaptureError::EncodeFailed("Failed to create gray image from buffer".into()))
}

#[inline]
fn process_row(y_plane: &[u8], vu_plane: &[u8], rgb_data: &mut [u8], y_idx: usize, width: usize) {
    let y_row_start = y_idx * width;
    // VU rows hold width/2 pairs, i.e. width bytes
    let vu_row_start = (y_idx / 2) * width;
    let rgb_row_start = y_idx * width * 3;

    // Process pixels in pairs
    for x_idx in (0..width).step_by(2) {
        let vu_offset = vu_row_start + x_idx;

        // V comes first in NV21
        let v = vu_plane[vu_offset] as i32 - 128;
        let u = vu_plane[vu_offset + 1] as i32 - 128;

        // Pre-compute color contributions
        let r_v = (179 * v) >> 7;
        let g_u = (44 * u) >> 7;
        let g_v = (91 * v) >> 7;
        let b_u = (227 * u) >> 7;

        for x in x_idx..(x_idx + 2).min(width) {
            let y = ((y_plane[y_row_start + x] as i32 - 16) * 149) >> 7;
            let rgb_offset = rgb_row_start + x * 3;
            rgb_data[rgb_offset] = (y + r_v).clamp(0, 255) as u8;
            rgb_data[rgb_offset + 1] = (y - g_u - g_v).clamp(0, 255) as u8;
            rgb_data[rgb_offset + 2] = (y + b_u).clamp(0, 255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::session::types::{ChromaPlanes, Plane};

    fn planar_frame(width: u32, height: u32, luma_padding: usize) -> RawColorFrame {
        let (w, h) = (width as usize, height as usize);
        let stride = w + luma_padding;
        let mut luma = vec![0xEEu8; stride * h];
        for row in 0..h {
            for col in 0..w {
                luma[row * stride + col] = (row * w + col) as u8;
            }
        }
        let (cw, ch) = (w / 2, h / 2);
        let u: Vec<u8> = (0..cw * ch).map(|i| 10 + i as u8).collect();
        let v: Vec<u8> = (0..cw * ch).map(|i| 100 + i as u8).collect();
        RawColorFrame {
            width,
            height,
            luma: Plane::new(luma, stride, 1),
            chroma: Some(ChromaPlanes {
                u: Plane::packed(u, cw, 1),
                v: Plane::packed(v, cw, 1),
            }),
        }
    }

    #[test]
    fn test_nv21_length_and_luma_identity() {
        let frame = planar_frame(6, 4, 3);
        let packed = yuv420_to_nv21(&frame).unwrap();
        assert_eq!(packed.layout, PackedLayout::Nv21);
        assert_eq!(packed.data.len(), 6 * 4 + 2 * 3 * 2);
        for i in 0..24 {
            assert_eq!(packed.data[i], i as u8);
        }
    }

    #[test]
    fn test_v_precedes_u() {
        let frame = planar_frame(4, 4, 0);
        let packed = yuv420_to_nv21(&frame).unwrap();
        assert_eq!(&packed.data[16..], &[100, 10, 101, 11, 102, 12, 103, 13]);
    }

    #[test]
    fn test_chroma_pixel_stride_honoured() {
        let mut frame = planar_frame(4, 2, 0);
        // Interleaved chroma: U at even bytes, V one byte in
        let cbcr = vec![1u8, 2, 3, 4];
        frame.chroma = Some(ChromaPlanes {
            u: Plane::new(cbcr.clone(), 4, 2),
            v: Plane::new(cbcr[1..].to_vec(), 4, 2),
        });
        let packed = yuv420_to_nv21(&frame).unwrap();
        assert_eq!(&packed.data[8..], &[2, 1, 4, 3]);
    }

    #[test]
    fn test_odd_dimensions_rejected() {
        let mut frame = planar_frame(4, 4, 0);
        frame.width = 3;
        assert!(matches!(
            yuv420_to_nv21(&frame),
            Err(CaptureError::InvalidFrame(_))
        ));
    }

    #[test]
    fn test_short_chroma_rejected() {
        let mut frame = planar_frame(4, 4, 0);
        frame.chroma = Some(ChromaPlanes {
            u: Plane::packed(vec![0u8; 3], 2, 1),
            v: Plane::packed(vec![0u8; 4], 2, 1),
        });
        assert!(matches!(
            yuv420_to_nv21(&frame),
            Err(CaptureError::InvalidFrame(_))
        ));
    }

    #[test]
    fn test_luma_only_frame() {
        let mut frame = planar_frame(4, 2, 2);
        frame.chroma = None;
        let packed = yuv420_to_nv21(&frame).unwrap();
        assert_eq!(packed.layout, PackedLayout::Luma);
        assert_eq!(packed.data, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(luma_to_gray(&packed).unwrap().dimensions(), (4, 2));
    }

    #[test]
    fn test_overflowing_luma_stride_rejected() {
        let frame = RawColorFrame {
            width: 2,
            height: 3,
            luma: Plane::new(vec![0u8; 8], usize::MAX / 2, 1),
            chroma: None,
        };
        assert!(matches!(
            yuv420_to_nv21(&frame),
            Err(CaptureError::InvalidFrame(_))
        ));
    }

    #[test]
    fn test_neutral_chroma_gives_gray() {
        let packed = PackedColor {
            width: 2,
            height: 2,
            layout: PackedLayout::Nv21,
            data: vec![128, 128, 128, 128, 128, 128],
        };
        let rgb = nv21_to_rgb(&packed).unwrap();
        let px = rgb.get_pixel(1, 1);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn test_red_chroma_raises_red_channel() {
        // High V pushes red up, green down
        let packed = PackedColor {
            width: 2,
            height: 2,
            layout: PackedLayout::Nv21,
            data: vec![128, 128, 128, 128, 240, 128],
        };
        let rgb = nv21_to_rgb(&packed).unwrap();
        let px = rgb.get_pixel(0, 0);
        assert!(px[0] > px[1]);
        assert!(px[0] > px[2]);
    }
}
