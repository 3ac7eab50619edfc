// SPDX-License-Identifier: GPL-3.0-only
// Shared types for sensing session abstraction

//! Raw frame and capability types exchanged with sensing sessions

use crate::constants::DepthType;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One plane of a raw sensor buffer
///
/// Samples need not be contiguous: sample `(row, col)` starts at
/// `row * row_stride + col * pixel_stride` bytes into `data`.
#[derive(Clone)]
pub struct Plane {
    pub data: Arc<[u8]>,
    /// Bytes between the starts of consecutive rows (may include padding)
    pub row_stride: usize,
    /// Bytes between the starts of consecutive samples in a row
    pub pixel_stride: usize,
}

impl Plane {
    pub fn new(data: impl Into<Arc<[u8]>>, row_stride: usize, pixel_stride: usize) -> Self {
        Self {
            data: data.into(),
            row_stride,
            pixel_stride,
        }
    }

    /// Tightly packed plane (no row padding)
    pub fn packed(data: impl Into<Arc<[u8]>>, width: usize, bytes_per_sample: usize) -> Self {
        Self::new(data, width * bytes_per_sample, bytes_per_sample)
    }

    /// Byte offset of sample `(row, col)`
    ///
    /// Only in range for planes that passed [`Plane::validate`].
    #[inline]
    pub fn offset(&self, row: usize, col: usize) -> usize {
        row * self.row_stride + col * self.pixel_stride
    }

    /// Check the plane can serve `cols` x `rows` samples of `sample_size` bytes
    pub fn validate(
        &self,
        name: &str,
        cols: usize,
        rows: usize,
        sample_size: usize,
    ) -> SessionResult<()> {
        if cols == 0 || rows == 0 {
            return Ok(());
        }
        if self.pixel_stride < sample_size {
            return Err(SessionError::InvalidFrame(format!(
                "{} plane pixel stride {} is smaller than sample size {}",
                name, self.pixel_stride, sample_size
            )));
        }
        let required = (rows - 1)
            .checked_mul(self.row_stride)
            .and_then(|r| (cols - 1).checked_mul(self.pixel_stride)?.checked_add(r))
            .and_then(|o| o.checked_add(sample_size))
            .ok_or_else(|| {
                SessionError::InvalidFrame(format!(
                    "{} plane strides ({}, {}) overflow for {}x{} samples",
                    name, self.row_stride, self.pixel_stride, cols, rows
                ))
            })?;
        if self.data.len() < required {
            return Err(SessionError::InvalidFrame(format!(
                "{} plane holds {} bytes, {}x{} samples need {}",
                name,
                self.data.len(),
                cols,
                rows,
                required
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Plane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Plane({} bytes, row_stride={}, pixel_stride={})",
            self.data.len(),
            self.row_stride,
            self.pixel_stride
        )
    }
}

/// Half-resolution chroma planes of a 4:2:0 frame
#[derive(Debug, Clone)]
pub struct ChromaPlanes {
    pub u: Plane,
    pub v: Plane,
}

/// Planar luma/chroma camera image
#[derive(Debug, Clone)]
pub struct RawColorFrame {
    pub width: u32,
    pub height: u32,
    pub luma: Plane,
    /// Chroma at half resolution in both axes, or absent for luma-only sensors
    pub chroma: Option<ChromaPlanes>,
}

/// Depth samples in the unit the sensor reports them
#[derive(Debug, Clone)]
pub enum DepthSamples {
    /// Unsigned 16-bit little-endian millimeters
    Millimeters(Plane),
    /// 32-bit little-endian float meters
    Meters(Plane),
}

impl DepthSamples {
    pub fn plane(&self) -> &Plane {
        match self {
            DepthSamples::Millimeters(plane) | DepthSamples::Meters(plane) => plane,
        }
    }

    /// Bytes per sample for this unit
    pub fn sample_size(&self) -> usize {
        match self {
            DepthSamples::Millimeters(_) => 2,
            DepthSamples::Meters(_) => 4,
        }
    }
}

/// Per-pixel distance buffer
///
/// Any value may mean "no reading"; values are passed through untouched apart
/// from unit conversion and clamping.
#[derive(Debug, Clone)]
pub struct RawDepthFrame {
    pub width: u32,
    pub height: u32,
    pub samples: DepthSamples,
}

/// Per-pixel depth confidence, treated as opaque 8-bit intensity
#[derive(Debug, Clone)]
pub struct RawConfidenceFrame {
    pub width: u32,
    pub height: u32,
    pub plane: Plane,
}

/// Camera calibration in pixel units of the color frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
}

impl CameraIntrinsics {
    /// Serialize as `{"fx":..,"fy":..,"cx":..,"cy":..}`
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{{\"fx\":{},\"fy\":{},\"cx\":{},\"cy\":{}}}",
                self.fx, self.fy, self.cx, self.cy
            )
        })
    }

    /// Parse the JSON produced by [`CameraIntrinsics::to_json`]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Everything one capture pulls from a session
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub color: RawColorFrame,
    pub depth: Option<RawDepthFrame>,
    pub confidence: Option<RawConfidenceFrame>,
    pub intrinsics: CameraIntrinsics,
}

/// Static description of the device's depth sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub has_depth: bool,
    pub depth_type: DepthType,
    pub supports_confidence: bool,
}

impl Capabilities {
    /// Descriptor for devices without depth sensing
    pub fn none() -> Self {
        Self::default()
    }

    /// Descriptor for a device whose depth sensing is of `depth_type`
    pub fn with_depth(depth_type: DepthType) -> Self {
        let has_depth = depth_type != DepthType::None;
        Self {
            has_depth,
            depth_type,
            supports_confidence: has_depth,
        }
    }
}

/// Session backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionBackendType {
    /// Synthetic frames laid out like a vendor session
    #[default]
    Mock,
    /// Frames recorded to disk
    Replay,
}

impl std::fmt::Display for SessionBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionBackendType::Mock => write!(f, "mock"),
            SessionBackendType::Replay => write!(f, "replay"),
        }
    }
}

impl std::str::FromStr for SessionBackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mock" => Ok(SessionBackendType::Mock),
            "replay" => Ok(SessionBackendType::Replay),
            other => Err(format!("unknown session backend '{}'", other)),
        }
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Error types for session operations
#[derive(Debug, Clone)]
pub enum SessionError {
    /// Sensing hardware is missing on this device
    NotAvailable(String),
    /// Camera/AR permission was not granted
    PermissionDenied(String),
    /// Session failed to start
    StartFailed(String),
    /// Session is running but produced no frame
    NoFrame,
    /// A buffer does not match its declared geometry
    InvalidFrame(String),
    /// General I/O error
    IoError(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::NotAvailable(msg) => write!(f, "Session not available: {}", msg),
            SessionError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            SessionError::StartFailed(msg) => write!(f, "Session start failed: {}", msg),
            SessionError::NoFrame => write!(f, "No frame produced"),
            SessionError::InvalidFrame(msg) => write!(f, "Invalid frame: {}", msg),
            SessionError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::IoError(err.to_string())
    }
}
