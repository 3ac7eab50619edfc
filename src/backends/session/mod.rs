// SPDX-License-Identifier: GPL-3.0-only

//! Sensing session abstraction
//!
//! A session is the external collaborator that owns the camera and depth
//! sensors. Capture code only ever sees the raw buffers it hands out.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │ DepthCaptureService │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │   SessionManager    │  ← Lock-guarded reuse, settling interval
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ DepthSession Trait  │  ← Common interface
//! └──────────┬──────────┘
//!            │
//!       ┌────┴─────┐
//!       ▼          ▼
//!   ┌──────┐  ┌────────┐
//!   │ Mock │  │ Replay │
//!   └──────┘  └────────┘
//! ```

pub mod manager;
pub mod mock;
pub mod replay;
pub mod types;

pub use manager::SessionManager;
pub use mock::{MockProfile, MockSession};
pub use replay::ReplaySession;
pub use types::*;

use std::path::PathBuf;

/// Sensing session trait
///
/// Methods block; callers run them off any latency-sensitive context.
pub trait DepthSession: Send {
    /// Get the backend type identifier
    fn backend_type(&self) -> SessionBackendType;

    /// Report depth capabilities without starting capture
    fn probe(&self) -> SessionResult<Capabilities>;

    /// Start or resume sensing
    fn start(&mut self) -> SessionResult<()>;

    /// Check if sensing is running
    fn is_running(&self) -> bool;

    /// Pull the most recent frame
    ///
    /// Only valid after [`DepthSession::start`].
    fn acquire_frame(&mut self) -> SessionResult<RawFrame>;

    /// Stop sensing and release sensor resources
    fn stop(&mut self);
}

/// Settings needed to construct any session backend
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub mock_profile: MockProfile,
    pub replay_dir: Option<PathBuf>,
}

/// Create a session for the given backend type
pub fn get_session_for_type(
    backend_type: SessionBackendType,
    options: &SessionOptions,
) -> SessionResult<Box<dyn DepthSession>> {
    match backend_type {
        SessionBackendType::Mock => Ok(Box::new(MockSession::new(options.mock_profile))),
        SessionBackendType::Replay => {
            let dir = options.replay_dir.clone().ok_or_else(|| {
                SessionError::NotAvailable("replay backend needs a recording directory".into())
            })?;
            Ok(Box::new(ReplaySession::new(dir)))
        }
    }
}
