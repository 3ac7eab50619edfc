// SPDX-License-Identifier: GPL-3.0-only

//! Depth Capture - single-frame RGB + depth capture for AR sensing sessions
//!
//! This library pulls one frame from a depth-sensing session and turns its
//! raw buffers into compact payloads: a JPEG color image, a depth map in one
//! of two encodings, and an optional confidence PNG.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Depth session abstraction (mock and replay sessions)
//! - [`media`]: Color conversion, depth and confidence codecs
//! - [`pipelines`]: The capture encoding pipeline
//! - [`service`]: Capabilities and capture operations
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```no_run
//! use depth_capture::{Config, DepthCaptureService};
//!
//! # async fn run() -> Result<(), depth_capture::ChannelError> {
//! let service = DepthCaptureService::from_config(&Config::default());
//! let capabilities = service.get_capabilities().await;
//! if capabilities.has_depth {
//!     let result = service.capture_frame().await?;
//!     println!("{:?}", result.depth_encoding());
//! }
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod media;
pub mod pipelines;
pub mod service;

// Re-export commonly used types
pub use backends::session::{
    Capabilities, CameraIntrinsics, DepthSession, MockProfile, SessionBackendType, SessionManager,
};
pub use config::Config;
pub use constants::DepthType;
pub use errors::{AppError, AppResult, CaptureError, ChannelError};
pub use media::{DepthEncoding, DepthMap, decode_depth};
pub use pipelines::capture::{CapturePipeline, CaptureResponse, CaptureResult};
pub use service::DepthCaptureService;
