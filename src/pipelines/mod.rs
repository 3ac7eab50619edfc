// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines for captured frames
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌───────────────┐
//! │ Session      │ ──▶ │ Capture Pipeline  │ ──▶ │ CaptureResult │
//! │ RawFrame     │     │  - YUV→NV21→JPEG  │     │               │
//! │              │     │  - Depth codec    │     │               │
//! │              │     │  - Confidence PNG │     │               │
//! └──────────────┘     └───────────────────┘     └───────────────┘
//! ```

pub mod capture;
