// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// JPEG quality used for the color payload (0-100 scale)
pub const JPEG_QUALITY: u8 = 85;

/// Wait after starting or resuming a sensing session before a frame is trusted
pub const SETTLE_INTERVAL: Duration = Duration::from_millis(150);

/// Millimeters per meter, used by both depth encodings
pub const MM_PER_METER: f32 = 1000.0;

/// Largest millimeter value representable in a 16-bit depth sample
pub const PNG16_MAX_MM: u16 = u16::MAX;

/// Wire tag for the 16-bit grayscale PNG depth encoding
pub const DEPTH_TAG_PNG16: &str = "png16";

/// Wire tag for the gzip-compressed little-endian f32 depth encoding
pub const DEPTH_TAG_F32_GZIP: &str = "f32_gzip";

/// Error code reported across the call boundary for any failed capture
pub const DEPTH_CAPTURE_FAILED: &str = "DEPTH_CAPTURE_FAILED";

/// Name of the config file inside the application config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Application directory name (config and default output)
pub const APP_DIR_NAME: &str = "depth-capture";

/// Kind of depth sensing available on the device
///
/// Serialized with the wire names used by the capabilities descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DepthType {
    /// No depth sensing
    #[default]
    #[serde(rename = "none")]
    None,
    /// Time-of-flight scanner, depth delivered in meters (f32)
    #[serde(rename = "lidar")]
    Lidar,
    /// Motion-stereo depth, delivered in millimeters (u16)
    #[serde(rename = "arcore_depth")]
    ArcoreDepth,
}

impl DepthType {
    /// Get all variants for iteration
    pub const ALL: [DepthType; 3] = [DepthType::None, DepthType::Lidar, DepthType::ArcoreDepth];

    /// Wire name of this depth type
    pub fn as_str(&self) -> &'static str {
        match self {
            DepthType::None => "none",
            DepthType::Lidar => "lidar",
            DepthType::ArcoreDepth => "arcore_depth",
        }
    }

    /// Parse a wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl std::fmt::Display for DepthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_type_names_round_trip() {
        for depth_type in DepthType::ALL {
            assert_eq!(DepthType::from_name(depth_type.as_str()), Some(depth_type));
        }
        assert_eq!(DepthType::from_name("kinect"), None);
    }

    #[test]
    fn test_depth_type_serde_uses_wire_names() {
        let json = serde_json::to_string(&DepthType::ArcoreDepth).unwrap();
        assert_eq!(json, "\"arcore_depth\"");
    }
}
