// SPDX-License-Identifier: GPL-3.0-only

//! Confidence map encoding
//!
//! Samples are written verbatim into an 8-bit grayscale PNG. Sensors use
//! very different ranges (0-2 levels vs. 0-255), so no remapping is done.

use crate::backends::session::types::RawConfidenceFrame;
use crate::errors::CaptureError;
use image::{DynamicImage, GrayImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// Encode a confidence frame as 8-bit grayscale PNG
pub fn encode_confidence(frame: &RawConfidenceFrame) -> Result<Vec<u8>, CaptureError> {
    let w = frame.width as usize;
    let h = frame.height as usize;
    if w == 0 || h == 0 {
        return Err(CaptureError::InvalidFrame(format!(
            "confidence frame has empty dimensions {}x{}",
            w, h
        )));
    }

    let plane = &frame.plane;
    plane.validate("confidence", w, h, 1)?;

    let mut samples = Vec::with_capacity(w * h);
    for row in 0..h {
        samples.extend((0..w).map(|col| plane.data[plane.offset(row, col)]));
    }

    let image = GrayImage::from_raw(frame.width, frame.height, samples).ok_or_else(|| {
        CaptureError::EncodeFailed("Failed to create confidence image".into())
    })?;

    let mut buffer = Vec::new();
    DynamicImage::ImageLuma8(image)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| CaptureError::EncodeFailed(format!("PNG encoding failed: {}", e)))?;

    debug!(width = w, height = h, bytes = buffer.len(), "Confidence encoded");
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::session::types::Plane;

    #[test]
    fn test_values_copied_verbatim() {
        // 3x2 with two bytes of row padding
        let data = vec![0u8, 1, 2, 9, 9, 255, 128, 2, 9, 9];
        let frame = RawConfidenceFrame {
            width: 3,
            height: 2,
            plane: Plane::new(data, 5, 1),
        };
        let png = encode_confidence(&frame).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert!(matches!(decoded, DynamicImage::ImageLuma8(_)));
        assert_eq!(decoded.into_luma8().into_raw(), vec![0, 1, 2, 255, 128, 2]);
    }

    #[test]
    fn test_short_plane_rejected() {
        let frame = RawConfidenceFrame {
            width: 4,
            height: 4,
            plane: Plane::packed(vec![0u8; 10], 4, 1),
        };
        assert!(matches!(
            encode_confidence(&frame),
            Err(CaptureError::InvalidFrame(_))
        ));
    }

    #[test]
    fn test_overflowing_stride_rejected() {
        let frame = RawConfidenceFrame {
            width: 2,
            height: 3,
            plane: Plane::new(vec![0u8; 8], usize::MAX / 2, 1),
        };
        assert!(matches!(
            encode_confidence(&frame),
            Err(CaptureError::InvalidFrame(_))
        ));
    }
}
