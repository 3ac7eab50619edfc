// SPDX-License-Identifier: GPL-3.0-only

//! Capture result record and its wire shape

use crate::backends::session::types::CameraIntrinsics;
use crate::media::depth_codec::DepthEncoding;
use serde::{Deserialize, Serialize};

/// Encoded output of one capture
///
/// Depth is a single tagged value, so a result can never carry both depth
/// representations or a tag without a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureResult {
    pub rgb_jpeg: Vec<u8>,
    pub depth: Option<DepthEncoding>,
    pub confidence_png: Option<Vec<u8>>,
    pub intrinsics: CameraIntrinsics,
    /// Color frame width
    pub width: u32,
    /// Color frame height
    pub height: u32,
}

impl CaptureResult {
    /// Wire tag of the depth payload, if any
    pub fn depth_encoding(&self) -> Option<&'static str> {
        self.depth.as_ref().map(DepthEncoding::tag)
    }

    /// Flatten into the boundary record
    pub fn to_response(&self) -> CaptureResponse {
        let (depth_f32, depth_png16) = match &self.depth {
            Some(DepthEncoding::F32Gzip(bytes)) => (Some(bytes.clone()), None),
            Some(DepthEncoding::Png16(bytes)) => (None, Some(bytes.clone())),
            None => (None, None),
        };

        CaptureResponse {
            rgb_jpeg: self.rgb_jpeg.clone(),
            depth_f32,
            depth_png16,
            depth_encoding: self.depth_encoding().map(str::to_string),
            confidence_png: self.confidence_png.clone(),
            intrinsics_json: self.intrinsics.to_json(),
            width: self.width,
            height: self.height,
        }
    }
}

/// Capture result as returned across the call boundary
///
/// Absent payloads serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponse {
    pub rgb_jpeg: Vec<u8>,
    /// Set only for `f32_gzip`
    pub depth_f32: Option<Vec<u8>>,
    /// Set only for `png16`
    pub depth_png16: Option<Vec<u8>>,
    pub depth_encoding: Option<String>,
    pub confidence_png: Option<Vec<u8>>,
    pub intrinsics_json: String,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(depth: Option<DepthEncoding>) -> CaptureResult {
        CaptureResult {
            rgb_jpeg: vec![0xFF, 0xD8],
            depth,
            confidence_png: None,
            intrinsics: CameraIntrinsics {
                fx: 500.0,
                fy: 500.0,
                cx: 320.0,
                cy: 240.0,
            },
            width: 640,
            height: 480,
        }
    }

    #[test]
    fn test_f32_gzip_goes_to_depth_f32() {
        let response = result_with(Some(DepthEncoding::F32Gzip(vec![1, 2]))).to_response();
        assert_eq!(response.depth_f32, Some(vec![1, 2]));
        assert_eq!(response.depth_png16, None);
        assert_eq!(response.depth_encoding.as_deref(), Some("f32_gzip"));
    }

    #[test]
    fn test_png16_goes_to_depth_png16() {
        let response = result_with(Some(DepthEncoding::Png16(vec![3]))).to_response();
        assert_eq!(response.depth_f32, None);
        assert_eq!(response.depth_png16, Some(vec![3]));
        assert_eq!(response.depth_encoding.as_deref(), Some("png16"));
    }

    #[test]
    fn test_absent_depth_serializes_null() {
        let response = result_with(None).to_response();
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["depthF32"].is_null());
        assert!(json["depthPng16"].is_null());
        assert!(json["depthEncoding"].is_null());
        assert!(json["confidencePng"].is_null());
        assert_eq!(json["width"], 640);

        let intrinsics: serde_json::Value =
            serde_json::from_str(json["intrinsicsJson"].as_str().unwrap()).unwrap();
        assert_eq!(intrinsics["cx"], 320.0);
    }
}
