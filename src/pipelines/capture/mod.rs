// SPDX-License-Identifier: GPL-3.0-only

//! Single-frame capture encoding pipeline
//!
//! ```text
//!                ┌─ color:      planar → NV21 → JPEG ─┐
//! Session frame ─┼─ depth:      png16 | f32_gzip     ─┼─→ CaptureResult
//!                └─ confidence: 8-bit PNG            ─┘
//! ```
//!
//! The three branches share nothing and run concurrently on the blocking
//! pool. The first failure fails the whole capture; there are no partial
//! results.

pub mod encoding;
pub mod result;

pub use encoding::ColorEncoder;
pub use result::{CaptureResponse, CaptureResult};

use crate::backends::session::types::RawFrame;
use crate::errors::CaptureError;
use crate::media::{encode_confidence, encode_depth, yuv420_to_nv21};
use tracing::{debug, info};

/// Encodes raw session frames into capture results
#[derive(Debug, Clone, Copy, Default)]
pub struct CapturePipeline {
    encoder: ColorEncoder,
}

impl CapturePipeline {
    /// Create a pipeline with the default JPEG quality
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline with a custom color encoder
    pub fn with_encoder(encoder: ColorEncoder) -> Self {
        Self { encoder }
    }

    /// Encode all buffers of `frame`
    pub async fn encode(&self, frame: RawFrame) -> Result<CaptureResult, CaptureError> {
        let RawFrame {
            color,
            depth,
            confidence,
            intrinsics,
        } = frame;
        let (width, height) = (color.width, color.height);

        info!(
            width,
            height,
            has_depth = depth.is_some(),
            has_confidence = confidence.is_some(),
            "Encoding captured frame"
        );

        let encoder = self.encoder;
        let color_task = tokio::task::spawn_blocking(move || {
            let packed = yuv420_to_nv21(&color)?;
            encoder.encode(&packed)
        });
        let depth_task =
            tokio::task::spawn_blocking(move || depth.as_ref().map(encode_depth).transpose());
        let confidence_task = tokio::task::spawn_blocking(move || {
            confidence.as_ref().map(encode_confidence).transpose()
        });

        let (rgb_jpeg, depth, confidence_png) = tokio::try_join!(
            join_stage(color_task),
            join_stage(depth_task),
            join_stage(confidence_task),
        )?;

        debug!(
            jpeg_bytes = rgb_jpeg.len(),
            depth_encoding = depth.as_ref().map(|d| d.tag()),
            "Capture encoded"
        );

        Ok(CaptureResult {
            rgb_jpeg,
            depth,
            confidence_png,
            intrinsics,
            width,
            height,
        })
    }
}

async fn join_stage<T>(
    task: tokio::task::JoinHandle<Result<T, CaptureError>>,
) -> Result<T, CaptureError> {
    task.await
        .map_err(|e| CaptureError::EncodeFailed(format!("Encoding task error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::session::{DepthSession, MockProfile, MockSession};

    async fn encode_mock(profile: MockProfile) -> CaptureResult {
        let mut session = MockSession::new(profile);
        session.start().unwrap();
        let frame = session.acquire_frame().unwrap();
        CapturePipeline::new().encode(frame).await.unwrap()
    }

    #[tokio::test]
    async fn test_lidar_frame_uses_png16() {
        let result = encode_mock(MockProfile::Lidar).await;
        assert_eq!(result.depth_encoding(), Some("png16"));
        assert!(result.confidence_png.is_some());
        assert_eq!((result.width, result.height), (64, 48));
    }

    #[tokio::test]
    async fn test_arcore_frame_uses_f32_gzip() {
        let result = encode_mock(MockProfile::ArcoreDepth).await;
        assert_eq!(result.depth_encoding(), Some("f32_gzip"));
    }

    #[tokio::test]
    async fn test_color_only_frame_succeeds() {
        let result = encode_mock(MockProfile::None).await;
        assert!(!result.rgb_jpeg.is_empty());
        assert!(result.depth.is_none());
        assert!(result.confidence_png.is_none());
    }

    #[tokio::test]
    async fn test_odd_resolution_fails_whole_capture() {
        let mut session = MockSession::new(MockProfile::None).resolution(63, 47);
        session.start().unwrap();
        let frame = session.acquire_frame().unwrap();

        let result = CapturePipeline::new().encode(frame).await;
        assert!(matches!(result, Err(CaptureError::InvalidFrame(_))));
    }

    #[tokio::test]
    async fn test_invalid_color_fails_whole_capture() {
        let mut session = MockSession::new(MockProfile::Lidar);
        session.start().unwrap();
        let mut frame = session.acquire_frame().unwrap();
        frame.color.width = 63;

        let result = CapturePipeline::new().encode(frame).await;
        assert!(matches!(result, Err(CaptureError::InvalidFrame(_))));
    }
}
