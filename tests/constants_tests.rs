// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use depth_capture::constants::{
    DEPTH_CAPTURE_FAILED, DEPTH_TAG_F32_GZIP, DEPTH_TAG_PNG16, DepthType, JPEG_QUALITY,
    SETTLE_INTERVAL,
};
use std::time::Duration;

#[test]
fn test_depth_type_values() {
    // none, lidar, arcore_depth
    assert_eq!(DepthType::ALL.len(), 3);
}

#[test]
fn test_depth_type_wire_names() {
    for depth_type in DepthType::ALL {
        let json = serde_json::to_string(&depth_type).unwrap();
        assert_eq!(json, format!("\"{}\"", depth_type.as_str()));
        assert_eq!(DepthType::from_name(depth_type.as_str()), Some(depth_type));
    }
    assert_eq!(DepthType::from_name("stereo"), None);
}

#[test]
fn test_boundary_constants() {
    assert_eq!(DEPTH_TAG_PNG16, "png16");
    assert_eq!(DEPTH_TAG_F32_GZIP, "f32_gzip");
    assert_eq!(DEPTH_CAPTURE_FAILED, "DEPTH_CAPTURE_FAILED");
}

#[test]
fn test_capture_defaults() {
    assert_eq!(JPEG_QUALITY, 85);
    assert_eq!(SETTLE_INTERVAL, Duration::from_millis(150));
}
