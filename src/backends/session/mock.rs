// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic sensing session
//!
//! Produces deterministic frames laid out the way the two vendor sessions
//! lay out theirs, so the whole pipeline can run without sensor hardware:
//!
//! - [`MockProfile::Lidar`]: padded luma rows, one interleaved CbCr buffer
//!   exposed as two planes with pixel stride 2, float meters depth,
//!   confidence levels 0-2
//! - [`MockProfile::ArcoreDepth`]: separate U and V buffers with pixel
//!   stride 2, 16-bit millimeter depth, confidence 0-255
//! - [`MockProfile::None`]: fully planar color, no depth

use super::DepthSession;
use super::types::*;
use crate::constants::DepthType;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// Constant U sample of the synthetic scene
pub const MOCK_U: u8 = 90;
/// Constant V sample of the synthetic scene
pub const MOCK_V: u8 = 200;

/// Extra bytes appended to every padded row
const ROW_PADDING: usize = 16;

/// Device layout emulated by the mock session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MockProfile {
    /// Scene-depth device (meters)
    #[default]
    Lidar,
    /// Depth-API device (millimeters)
    ArcoreDepth,
    /// Color-only device
    None,
}

impl MockProfile {
    pub fn depth_type(&self) -> DepthType {
        match self {
            MockProfile::Lidar => DepthType::Lidar,
            MockProfile::ArcoreDepth => DepthType::ArcoreDepth,
            MockProfile::None => DepthType::None,
        }
    }
}

impl std::str::FromStr for MockProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lidar" => Ok(MockProfile::Lidar),
            "arcore_depth" | "arcore" => Ok(MockProfile::ArcoreDepth),
            "none" => Ok(MockProfile::None),
            other => Err(format!("unknown mock profile '{}'", other)),
        }
    }
}

/// Failure injected by the mock session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockBehavior {
    #[default]
    Normal,
    /// Probe and start fail as if permission were denied
    Unavailable,
    /// Session starts but never delivers a frame
    NoFrames,
}

/// Counters shared between a test and the sessions it creates
#[derive(Debug, Default)]
pub struct MockStats {
    /// Sessions constructed and not yet dropped
    pub open: AtomicUsize,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub frames: AtomicUsize,
}

impl MockStats {
    pub fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn frames(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }
}

/// Synthetic session
pub struct MockSession {
    profile: MockProfile,
    behavior: MockBehavior,
    width: u32,
    height: u32,
    running: bool,
    stats: Arc<MockStats>,
}

impl MockSession {
    /// Create a 64x48 session for `profile`
    pub fn new(profile: MockProfile) -> Self {
        Self::with_stats(profile, Arc::new(MockStats::default()))
    }

    /// Create a session reporting into shared counters
    pub fn with_stats(profile: MockProfile, stats: Arc<MockStats>) -> Self {
        stats.open.fetch_add(1, Ordering::SeqCst);
        Self {
            profile,
            behavior: MockBehavior::Normal,
            width: 64,
            height: 48,
            running: false,
            stats,
        }
    }

    /// Set the color resolution (depth is a quarter of it in each axis)
    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn profile(&self) -> MockProfile {
        self.profile
    }

    fn depth_size(&self) -> (u32, u32) {
        ((self.width / 4).max(1), (self.height / 4).max(1))
    }

    fn intrinsics(&self) -> CameraIntrinsics {
        CameraIntrinsics {
            fx: self.width as f32 * 0.75,
            fy: self.width as f32 * 0.75,
            cx: self.width as f32 / 2.0,
            cy: self.height as f32 / 2.0,
        }
    }

    fn color_frame(&self) -> RawColorFrame {
        let w = self.width as usize;
        let h = self.height as usize;

        let luma_stride = match self.profile {
            MockProfile::Lidar => w + ROW_PADDING,
            _ => w,
        };
        let mut luma = vec![0u8; luma_stride * h];
        for row in 0..h {
            for col in 0..w {
                luma[row * luma_stride + col] = luma_sample(row, col);
            }
        }
        let luma = Plane::new(luma, luma_stride, 1);

        let cw = w / 2;
        let ch = h / 2;
        let chroma = match self.profile {
            MockProfile::Lidar => {
                // One CbCr buffer, V plane starts one byte in
                let stride = cw * 2 + ROW_PADDING;
                let mut cbcr = vec![0u8; stride * ch];
                for row in 0..ch {
                    for col in 0..cw {
                        cbcr[row * stride + col * 2] = MOCK_U;
                        cbcr[row * stride + col * 2 + 1] = MOCK_V;
                    }
                }
                let v = cbcr[1..].to_vec();
                ChromaPlanes {
                    u: Plane::new(cbcr, stride, 2),
                    v: Plane::new(v, stride, 2),
                }
            }
            MockProfile::ArcoreDepth => {
                // Separate buffers, each sample followed by a filler byte
                let stride = cw * 2;
                let mut u = vec![0u8; stride * ch];
                let mut v = vec![0u8; stride * ch];
                for row in 0..ch {
                    for col in 0..cw {
                        u[row * stride + col * 2] = MOCK_U;
                        v[row * stride + col * 2] = MOCK_V;
                    }
                }
                ChromaPlanes {
                    u: Plane::new(u, stride, 2),
                    v: Plane::new(v, stride, 2),
                }
            }
            MockProfile::None => ChromaPlanes {
                u: Plane::packed(vec![MOCK_U; cw * ch], cw, 1),
                v: Plane::packed(vec![MOCK_V; cw * ch], cw, 1),
            },
        };

        RawColorFrame {
            width: self.width,
            height: self.height,
            luma,
            chroma: Some(chroma),
        }
    }

    fn depth_frame(&self) -> Option<RawDepthFrame> {
        let (dw, dh) = self.depth_size();
        let (w, h) = (dw as usize, dh as usize);

        let samples = match self.profile {
            MockProfile::Lidar => {
                let mut bytes = Vec::with_capacity(w * h * 4);
                for row in 0..h {
                    for col in 0..w {
                        bytes.extend_from_slice(&mock_depth_meters(row, col).to_le_bytes());
                    }
                }
                DepthSamples::Meters(Plane::packed(bytes, w, 4))
            }
            MockProfile::ArcoreDepth => {
                let mut bytes = Vec::with_capacity(w * h * 2);
                for row in 0..h {
                    for col in 0..w {
                        let mm = (mock_depth_meters(row, col) * 1000.0).round() as u16;
                        bytes.extend_from_slice(&mm.to_le_bytes());
                    }
                }
                DepthSamples::Millimeters(Plane::packed(bytes, w, 2))
            }
            MockProfile::None => return None,
        };

        Some(RawDepthFrame {
            width: dw,
            height: dh,
            samples,
        })
    }

    fn confidence_frame(&self) -> Option<RawConfidenceFrame> {
        let (dw, dh) = self.depth_size();
        let (w, h) = (dw as usize, dh as usize);

        let levels: u32 = match self.profile {
            MockProfile::Lidar => 3,
            MockProfile::ArcoreDepth => 256,
            MockProfile::None => return None,
        };
        let mut data = Vec::with_capacity(w * h);
        for _row in 0..h {
            for col in 0..w {
                data.push((col as u32 * levels / w as u32) as u8);
            }
        }

        Some(RawConfidenceFrame {
            width: dw,
            height: dh,
            plane: Plane::packed(data, w, 1),
        })
    }
}

/// Luma of the synthetic scene at `(row, col)`
pub fn luma_sample(row: usize, col: usize) -> u8 {
    ((row * 3 + col * 5) % 256) as u8
}

/// Depth in meters of the synthetic tilted plane; `(0, 0)` has no reading
pub fn mock_depth_meters(row: usize, col: usize) -> f32 {
    if row == 0 && col == 0 {
        return 0.0;
    }
    0.5 + row as f32 * 0.01 + col as f32 * 0.001
}

impl DepthSession for MockSession {
    fn backend_type(&self) -> SessionBackendType {
        SessionBackendType::Mock
    }

    fn probe(&self) -> SessionResult<Capabilities> {
        if self.behavior == MockBehavior::Unavailable {
            return Err(SessionError::PermissionDenied(
                "mock session configured as unavailable".into(),
            ));
        }
        Ok(Capabilities::with_depth(self.profile.depth_type()))
    }

    fn start(&mut self) -> SessionResult<()> {
        if self.behavior == MockBehavior::Unavailable {
            return Err(SessionError::PermissionDenied(
                "mock session configured as unavailable".into(),
            ));
        }
        if !self.running {
            info!(profile = ?self.profile, width = self.width, height = self.height, "Starting mock session");
            self.running = true;
            self.stats.starts.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn acquire_frame(&mut self) -> SessionResult<RawFrame> {
        if !self.running || self.behavior == MockBehavior::NoFrames {
            return Err(SessionError::NoFrame);
        }

        let frame = RawFrame {
            color: self.color_frame(),
            depth: self.depth_frame(),
            confidence: self.confidence_frame(),
            intrinsics: self.intrinsics(),
        };
        self.stats.frames.fetch_add(1, Ordering::SeqCst);
        debug!(
            has_depth = frame.depth.is_some(),
            has_confidence = frame.confidence.is_some(),
            "Mock frame produced"
        );
        Ok(frame)
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.stats.stops.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.stop();
        self.stats.open.fetch_sub(1, Ordering::SeqCst);
    }
}
