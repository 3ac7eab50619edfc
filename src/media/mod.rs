// SPDX-License-Identifier: GPL-3.0-only

//! Pure conversion stages for captured buffers
//!
//! Every function here is a pure transform over one frame's raw buffers, so
//! the stages can run in parallel without coordination.
//!
//! # Modules
//!
//! - [`yuv_converter`]: planar 4:2:0 → packed NV21, NV21 → RGB
//! - [`depth_codec`]: depth → `png16` / `f32_gzip`, and back
//! - [`confidence`]: confidence → 8-bit PNG

pub mod confidence;
pub mod depth_codec;
pub mod yuv_converter;

// Re-export commonly used types
pub use confidence::encode_confidence;
pub use depth_codec::{DepthEncoding, DepthMap, decode_depth, encode_depth};
pub use yuv_converter::{PackedColor, PackedLayout, yuv420_to_nv21};
