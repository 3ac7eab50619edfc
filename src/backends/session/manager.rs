// SPDX-License-Identifier: GPL-3.0-only

//! Sensing session lifecycle manager
//!
//! The manager provides:
//! - Capability probes on a throwaway session
//! - Reuse of one capture session across calls, one capture at a time
//! - The settling wait after a session starts

use super::types::*;
use super::{DepthSession, SessionOptions, get_session_for_type};
use crate::constants::SETTLE_INTERVAL;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Creates fresh sessions on demand
pub type SessionFactory = Arc<dyn Fn() -> SessionResult<Box<dyn DepthSession>> + Send + Sync>;

/// Sensing session manager
///
/// Cheap to clone; clones share the same reused session.
#[derive(Clone)]
pub struct SessionManager {
    factory: SessionFactory,
    /// Reused capture session. Held across the whole acquire, which
    /// serializes captures against it.
    session: Arc<Mutex<Option<Box<dyn DepthSession>>>>,
    settle_interval: Duration,
}

impl SessionManager {
    /// Create a manager for the given backend type
    pub fn new(backend_type: SessionBackendType, options: SessionOptions) -> Self {
        info!(backend = %backend_type, "Creating session manager");
        let factory: SessionFactory = Arc::new(move || get_session_for_type(backend_type, &options));
        Self::with_factory(factory)
    }

    /// Create a manager around a custom session factory
    pub fn with_factory(factory: SessionFactory) -> Self {
        Self {
            factory,
            session: Arc::new(Mutex::new(None)),
            settle_interval: SETTLE_INTERVAL,
        }
    }

    /// Override the settling interval
    pub fn settle_interval(mut self, interval: Duration) -> Self {
        self.settle_interval = interval;
        self
    }

    /// Probe depth capabilities
    ///
    /// Uses a session of its own, stopped and dropped before returning, so
    /// the reused capture session is never touched. Any failure reports a
    /// device without depth.
    pub async fn capabilities(&self) -> Capabilities {
        let factory = self.factory.clone();
        let probed = tokio::task::spawn_blocking(move || {
            let mut session = factory()?;
            let capabilities = session.probe();
            session.stop();
            capabilities
        })
        .await;

        match probed {
            Ok(Ok(capabilities)) => {
                debug!(?capabilities, "Capabilities probed");
                capabilities
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Capability probe failed, reporting no depth");
                Capabilities::none()
            }
            Err(e) => {
                warn!(error = %e, "Capability probe task failed, reporting no depth");
                Capabilities::none()
            }
        }
    }

    /// Acquire one frame from the reused session
    ///
    /// Opens and starts the session on first use, waiting the settling
    /// interval before pulling a frame. Concurrent callers queue on the
    /// session lock.
    pub async fn acquire(&self) -> SessionResult<RawFrame> {
        let mut guard = self.session.lock().await;

        let mut session = match guard.take() {
            Some(session) => session,
            None => (self.factory)()?,
        };

        if !session.is_running() {
            let (returned, started) = tokio::task::spawn_blocking(move || {
                let started = session.start();
                (session, started)
            })
            .await
            .map_err(|e| SessionError::StartFailed(format!("start task failed: {}", e)))?;
            session = returned;

            if let Err(e) = started {
                warn!(error = %e, "Session failed to start");
                return Err(e);
            }

            debug!(interval_ms = self.settle_interval.as_millis() as u64, "Waiting for session to settle");
            tokio::time::sleep(self.settle_interval).await;
        }

        let (session, frame) = tokio::task::spawn_blocking(move || {
            let frame = session.acquire_frame();
            (session, frame)
        })
        .await
        .map_err(|e| SessionError::IoError(format!("acquire task failed: {}", e)))?;

        *guard = Some(session);
        frame
    }

    /// Stop and drop the reused session
    pub async fn shutdown(&self) {
        let mut guard = self.session.lock().await;
        if let Some(mut session) = guard.take() {
            info!(backend = %session.backend_type(), "Shutting down session");
            session.stop();
        }
    }

    /// Check if a capture session is currently held
    pub async fn has_session(&self) -> bool {
        self.session.lock().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::session::mock::{MockBehavior, MockProfile, MockSession, MockStats};
    use crate::constants::DepthType;

    fn mock_manager(profile: MockProfile, behavior: MockBehavior) -> (SessionManager, Arc<MockStats>) {
        let stats = Arc::new(MockStats::default());
        let factory_stats = stats.clone();
        let factory: SessionFactory = Arc::new(move || {
            Ok(Box::new(
                MockSession::with_stats(profile, factory_stats.clone()).behavior(behavior),
            ) as Box<dyn DepthSession>)
        });
        let manager = SessionManager::with_factory(factory).settle_interval(Duration::ZERO);
        (manager, stats)
    }

    #[tokio::test]
    async fn test_capabilities_leave_no_open_session() {
        let (manager, stats) = mock_manager(MockProfile::Lidar, MockBehavior::Normal);
        let caps = manager.capabilities().await;
        assert_eq!(caps, Capabilities::with_depth(DepthType::Lidar));
        assert_eq!(stats.open(), 0);
        assert!(!manager.has_session().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_interval_only_after_start() {
        let (manager, stats) = mock_manager(MockProfile::Lidar, MockBehavior::Normal);
        let manager = manager.settle_interval(Duration::from_millis(150));

        let started = tokio::time::Instant::now();
        manager.acquire().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(150));

        // Session already running, no second wait
        let reused = tokio::time::Instant::now();
        manager.acquire().await.unwrap();
        assert!(reused.elapsed() < Duration::from_millis(150));
        assert_eq!(stats.starts(), 1);

        // A fresh session settles again
        manager.shutdown().await;
        let restarted = tokio::time::Instant::now();
        manager.acquire().await.unwrap();
        assert!(restarted.elapsed() >= Duration::from_millis(150));
        assert_eq!(stats.starts(), 2);
    }

    #[tokio::test]
    async fn test_capabilities_are_idempotent() {
        let (manager, _stats) = mock_manager(MockProfile::ArcoreDepth, MockBehavior::Normal);
        let first = manager.capabilities().await;
        let second = manager.capabilities().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_probe_failure_reports_none() {
        let (manager, stats) = mock_manager(MockProfile::Lidar, MockBehavior::Unavailable);
        assert_eq!(manager.capabilities().await, Capabilities::none());
        assert_eq!(stats.open(), 0);
    }

    #[tokio::test]
    async fn test_session_reused_across_captures() {
        let (manager, stats) = mock_manager(MockProfile::Lidar, MockBehavior::Normal);
        manager.acquire().await.unwrap();
        manager.acquire().await.unwrap();
        assert_eq!(stats.starts(), 1);
        assert_eq!(stats.frames(), 2);
        assert_eq!(stats.open(), 1);

        manager.shutdown().await;
        assert_eq!(stats.open(), 0);
        assert_eq!(stats.stops(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_captures_are_serialized() {
        let (manager, stats) = mock_manager(MockProfile::ArcoreDepth, MockBehavior::Normal);
        let a = manager.clone();
        let b = manager.clone();
        let (ra, rb) = tokio::join!(a.acquire(), b.acquire());
        assert!(ra.is_ok() && rb.is_ok());
        assert_eq!(stats.starts(), 1);
        assert_eq!(stats.open(), 1);
    }

    #[tokio::test]
    async fn test_start_failure_is_reported() {
        let (manager, stats) = mock_manager(MockProfile::Lidar, MockBehavior::Unavailable);
        let result = manager.acquire().await;
        assert!(matches!(result, Err(SessionError::PermissionDenied(_))));
        assert!(!manager.has_session().await);
        assert_eq!(stats.open(), 0);
    }

    #[tokio::test]
    async fn test_missing_frame_keeps_session() {
        let (manager, _stats) = mock_manager(MockProfile::Lidar, MockBehavior::NoFrames);
        assert!(matches!(manager.acquire().await, Err(SessionError::NoFrame)));
        assert!(manager.has_session().await);
    }
}
