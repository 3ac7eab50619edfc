// SPDX-License-Identifier: GPL-3.0-only

//! Depth capture service
//!
//! The request/response surface handed to the application layer:
//!
//! - `get_capabilities() -> Capabilities`
//! - `capture_frame() -> CaptureResult | ChannelError`
//!
//! Each call is independent. A failed capture reports one
//! `DEPTH_CAPTURE_FAILED` error and may simply be retried by the caller.

use crate::backends::session::{Capabilities, SessionManager, SessionOptions};
use crate::config::Config;
use crate::errors::{CaptureError, ChannelError};
use crate::pipelines::capture::{CapturePipeline, CaptureResult, ColorEncoder};
use std::time::Duration;
use tracing::{error, info};

/// Capture service composed of a session manager and an encoding pipeline
#[derive(Clone)]
pub struct DepthCaptureService {
    sessions: SessionManager,
    pipeline: CapturePipeline,
}

impl DepthCaptureService {
    pub fn new(sessions: SessionManager, pipeline: CapturePipeline) -> Self {
        Self { sessions, pipeline }
    }

    /// Build a service from user configuration
    pub fn from_config(config: &Config) -> Self {
        let options = SessionOptions {
            mock_profile: config.mock_profile,
            replay_dir: config.replay_dir.clone(),
        };
        let sessions = SessionManager::new(config.backend, options)
            .settle_interval(Duration::from_millis(config.settle_interval_ms));
        let pipeline = CapturePipeline::with_encoder(ColorEncoder::with_quality(config.jpeg_quality));
        Self::new(sessions, pipeline)
    }

    /// Report whether depth sensing is available
    ///
    /// Idempotent; leaves no session open.
    pub async fn get_capabilities(&self) -> Capabilities {
        self.sessions.capabilities().await
    }

    /// Capture and encode one frame
    pub async fn capture_frame(&self) -> Result<CaptureResult, ChannelError> {
        self.try_capture().await.map_err(|e| {
            error!(error = %e, "Depth capture failed");
            ChannelError::from(e)
        })
    }

    async fn try_capture(&self) -> Result<CaptureResult, CaptureError> {
        let frame = self.sessions.acquire().await?;
        let result = self.pipeline.encode(frame).await?;
        info!(
            width = result.width,
            height = result.height,
            depth_encoding = result.depth_encoding(),
            "Depth capture complete"
        );
        Ok(result)
    }

    /// Release the reused capture session
    pub async fn shutdown(&self) {
        self.sessions.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::session::mock::{MockBehavior, MockProfile, MockSession};
    use crate::backends::session::{DepthSession, manager::SessionFactory};
    use std::sync::Arc;

    fn service(profile: MockProfile, behavior: MockBehavior) -> DepthCaptureService {
        let factory: SessionFactory = Arc::new(move || {
            Ok(Box::new(MockSession::new(profile).behavior(behavior)) as Box<dyn DepthSession>)
        });
        let sessions = SessionManager::with_factory(factory).settle_interval(Duration::ZERO);
        DepthCaptureService::new(sessions, CapturePipeline::new())
    }

    #[tokio::test]
    async fn test_unavailable_session_reports_channel_error() {
        let svc = service(MockProfile::Lidar, MockBehavior::Unavailable);
        let err = svc.capture_frame().await.unwrap_err();
        assert_eq!(err.code, "DEPTH_CAPTURE_FAILED");
        assert!(err.message.starts_with("Session unavailable"));
    }

    #[tokio::test]
    async fn test_no_frame_reports_channel_error() {
        let svc = service(MockProfile::Lidar, MockBehavior::NoFrames);
        let err = svc.capture_frame().await.unwrap_err();
        assert_eq!(err.message, "No AR frame available");
    }

    #[tokio::test]
    async fn test_capture_after_shutdown_reopens_session() {
        let svc = service(MockProfile::ArcoreDepth, MockBehavior::Normal);
        assert!(svc.capture_frame().await.is_ok());
        assert!(svc.capture_frame().await.is_ok());
        svc.shutdown().await;
        assert!(svc.capture_frame().await.is_ok());
    }

    #[tokio::test]
    async fn test_from_config_defaults() {
        let svc = DepthCaptureService::from_config(&Config::default());
        let caps = svc.get_capabilities().await;
        assert!(caps.has_depth);
    }
}
