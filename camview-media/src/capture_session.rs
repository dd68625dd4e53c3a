//! Capture session lifecycle
//!
//! A [`CaptureSession`] owns at most one live stream. Every call to
//! [`CaptureSession::set_target`] releases the held stream before asking the
//! platform for a new one, and bumps a generation counter. When an
//! acquisition resolves, its result is committed only if the generation is
//! still the one it was issued under; otherwise the result is stale, its
//! tracks are stopped and it is dropped without touching the session state.
//!
//! The platform cannot cancel an in-flight request, so overlapping calls are
//! expected: the user may switch camera or resolution faster than
//! `getUserMedia` resolves. Dropping a `set_target` future before it
//! resolves returns the session to uninitialized.

use camview_core::{
    CaptureTarget, MediaPlatform, MediaStreamHandle, StreamConstraints, StreamSettings,
    ViewerError, ViewerResult,
};
use camview_diagnostics::SessionStats;
use parking_lot::Mutex;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Session state machine, holding the stream handle when active
#[derive(Debug)]
pub enum SessionState<S> {
    /// No target requested
    Uninitialized,
    /// Acquisition in flight; the platform may be showing a permission prompt
    AwaitingPermission {
        /// Requested target
        target: CaptureTarget,
    },
    /// Stream live for a target
    Active {
        /// Held stream
        stream: S,
        /// Target the stream was acquired for
        target: CaptureTarget,
    },
    /// Acquisition failed; nothing is held
    Error {
        /// Target that failed
        target: CaptureTarget,
        /// Failure
        error: ViewerError,
    },
}

impl<S> SessionState<S> {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::AwaitingPermission { .. } => "awaiting-permission",
            SessionState::Active { .. } => "active",
            SessionState::Error { .. } => "error",
        }
    }

    fn target(&self) -> Option<&CaptureTarget> {
        match self {
            SessionState::Uninitialized => None,
            SessionState::AwaitingPermission { target }
            | SessionState::Active { target, .. }
            | SessionState::Error { target, .. } => Some(target),
        }
    }
}

/// Stream-free view of [`SessionState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// No target requested
    Uninitialized,
    /// Acquisition in flight
    AwaitingPermission(CaptureTarget),
    /// Stream live
    Active {
        /// Target the stream serves
        target: CaptureTarget,
        /// Platform stream id
        stream_id: String,
        /// Dimensions the platform chose, informational only
        settings: Option<StreamSettings>,
    },
    /// Acquisition failed
    Error(ViewerError),
}

/// What happened to a [`CaptureSession::set_target`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The new stream is now active
    Committed,
    /// The target was already active; nothing changed
    Unchanged,
    /// A newer target was requested meanwhile; this result was discarded
    Superseded,
}

struct SessionInner<S> {
    generation: u64,
    active: bool,
    state: SessionState<S>,
}

impl<S: MediaStreamHandle> SessionInner<S> {
    /// Swap in a new state, stopping the tracks of any held stream first
    fn transition(&mut self, next: SessionState<S>) -> usize {
        let previous = std::mem::replace(&mut self.state, next);
        match previous {
            SessionState::Active { stream, target } => {
                let stopped = stream.stop_all_tracks();
                debug!("Released stream {} for {} ({} track(s))", stream.id(), target, stopped);
                stopped
            }
            _ => 0,
        }
    }
}

/// Resets the session if a `set_target` future is dropped mid-acquisition
///
/// The platform releases whatever stream the abandoned request produces;
/// this only keeps the session from waiting on it forever.
struct AcquisitionGuard<'a, S: MediaStreamHandle> {
    inner: &'a Mutex<SessionInner<S>>,
    stats: &'a SessionStats,
    generation: u64,
    armed: bool,
}

impl<S: MediaStreamHandle> AcquisitionGuard<'_, S> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<S: MediaStreamHandle> Drop for AcquisitionGuard<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.inner.lock();
        if inner.generation == self.generation {
            inner.generation += 1;
            inner.transition(SessionState::Uninitialized);
        }
        self.stats.record_superseded();
        debug!("Acquisition for generation {} cancelled", self.generation);
    }
}

/// Logical owner of at most one live camera stream
pub struct CaptureSession<P: MediaPlatform> {
    platform: Rc<P>,
    stats: Arc<SessionStats>,
    inner: Mutex<SessionInner<P::Stream>>,
}

impl<P: MediaPlatform> CaptureSession<P> {
    /// Create an inactive session
    pub fn new(platform: Rc<P>, stats: Arc<SessionStats>) -> Self {
        Self {
            platform,
            stats,
            inner: Mutex::new(SessionInner {
                generation: 0,
                active: false,
                state: SessionState::Uninitialized,
            }),
        }
    }

    /// Accept targets from now on
    pub fn activate(&self) {
        let mut inner = self.inner.lock();
        if !inner.active {
            debug!("Capture session activated");
            inner.active = true;
        }
    }

    /// Release everything and stop accepting targets
    ///
    /// In-flight acquisitions become stale; their streams are stopped when
    /// they arrive.
    pub fn deactivate(&self) {
        let stopped = {
            let mut inner = self.inner.lock();
            inner.active = false;
            inner.generation += 1;
            inner.transition(SessionState::Uninitialized)
        };
        self.stats.record_tracks_stopped(stopped);
        info!("🛑 Capture session deactivated, {} track(s) stopped", stopped);
    }

    /// Acquire a stream for `target`, replacing whatever is held
    ///
    /// The device is required exactly; the resolution is a preference the
    /// platform may substitute. Failures are not retried and never fall back
    /// to another device or resolution.
    ///
    /// # Errors
    ///
    /// [`ViewerError::PermissionDenied`] when access is refused,
    /// [`ViewerError::StreamStartFailed`] for any other acquisition failure,
    /// [`ViewerError::InvalidState`] when the session is not active. Stale
    /// failures are reported as [`CommitOutcome::Superseded`] instead.
    pub async fn set_target(&self, target: CaptureTarget) -> ViewerResult<CommitOutcome> {
        let (generation, stopped) = {
            let mut inner = self.inner.lock();
            if !inner.active {
                return Err(ViewerError::InvalidState {
                    expected: "active session".to_string(),
                    actual: "inactive session".to_string(),
                });
            }
            if let SessionState::Active {
                target: current, ..
            } = &inner.state
            {
                if *current == target {
                    return Ok(CommitOutcome::Unchanged);
                }
            }

            inner.generation += 1;
            let stopped = inner.transition(SessionState::AwaitingPermission {
                target: target.clone(),
            });
            (inner.generation, stopped)
        };
        self.stats.record_tracks_stopped(stopped);
        self.stats.record_acquisition_started();
        info!("📹 Requesting stream for {} (generation {})", target, generation);

        let mut guard = AcquisitionGuard {
            inner: &self.inner,
            stats: &self.stats,
            generation,
            armed: true,
        };
        let result = self
            .platform
            .request_stream(&StreamConstraints::for_target(&target))
            .await;
        guard.disarm();

        let mut inner = self.inner.lock();
        if inner.generation != generation {
            if let Ok(stream) = &result {
                let stopped = stream.stop_all_tracks();
                self.stats.record_tracks_stopped(stopped);
            }
            self.stats.record_superseded();
            warn!(
                "Discarding stale result for {} (generation {}, current {})",
                target, generation, inner.generation
            );
            return Ok(CommitOutcome::Superseded);
        }

        match result {
            Ok(stream) => {
                match stream.settings() {
                    Some(settings) => info!(
                        "✅ Stream {} active for {} at {}x{}",
                        stream.id(),
                        target,
                        settings.width,
                        settings.height
                    ),
                    None => info!("✅ Stream {} active for {}", stream.id(), target),
                }
                let stopped = inner.transition(SessionState::Active { stream, target });
                self.stats.record_tracks_stopped(stopped);
                self.stats.record_committed();
                Ok(CommitOutcome::Committed)
            }
            Err(platform_error) => {
                let error = ViewerError::from_acquisition(platform_error);
                warn!("Stream start failed for {}: {}", target, error);
                let stopped = inner.transition(SessionState::Error {
                    target,
                    error: error.clone(),
                });
                self.stats.record_tracks_stopped(stopped);
                self.stats.record_failed();
                Err(error)
            }
        }
    }

    /// Stream-free view of the current state
    pub fn state(&self) -> SessionStatus {
        match &self.inner.lock().state {
            SessionState::Uninitialized => SessionStatus::Uninitialized,
            SessionState::AwaitingPermission { target } => {
                SessionStatus::AwaitingPermission(target.clone())
            }
            SessionState::Active { stream, target } => SessionStatus::Active {
                target: target.clone(),
                stream_id: stream.id(),
                settings: stream.settings(),
            },
            SessionState::Error { error, .. } => SessionStatus::Error(error.clone()),
        }
    }

    /// Name of the current state
    pub fn state_name(&self) -> &'static str {
        self.inner.lock().state.name()
    }

    /// Whether a stream is held
    pub fn has_active_stream(&self) -> bool {
        matches!(self.inner.lock().state, SessionState::Active { .. })
    }

    /// Most recently requested target
    pub fn target(&self) -> Option<CaptureTarget> {
        self.inner.lock().state.target().cloned()
    }

    /// Current acquisition failure
    pub fn error(&self) -> Option<ViewerError> {
        match &self.inner.lock().state {
            SessionState::Error { error, .. } => Some(error.clone()),
            _ => None,
        }
    }

    /// Id of the held stream
    pub fn active_stream_id(&self) -> Option<String> {
        self.with_stream(|stream| stream.map(MediaStreamHandle::id))
    }

    /// Dimensions the platform delivered for the held stream
    pub fn active_settings(&self) -> Option<StreamSettings> {
        self.with_stream(|stream| stream.and_then(MediaStreamHandle::settings))
    }

    /// Tracks of the held stream that are still live
    pub fn held_track_count(&self) -> usize {
        self.with_stream(|stream| stream.map_or(0, MediaStreamHandle::live_track_count))
    }

    /// Request counter; grows with every target and deactivation
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Run `f` with the held stream, if any
    pub fn with_stream<R>(&self, f: impl FnOnce(Option<&P::Stream>) -> R) -> R {
        let inner = self.inner.lock();
        match &inner.state {
            SessionState::Active { stream, .. } => f(Some(stream)),
            _ => f(None),
        }
    }
}

impl<P: MediaPlatform> Drop for CaptureSession<P> {
    fn drop(&mut self) {
        let stopped = self.inner.get_mut().transition(SessionState::Uninitialized);
        if stopped > 0 {
            self.stats.record_tracks_stopped(stopped);
            debug!("Capture session dropped, {} track(s) stopped", stopped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::SimulatedPlatform;
    use camview_core::ResolutionOption;

    fn session(platform: &SimulatedPlatform) -> CaptureSession<SimulatedPlatform> {
        let session = CaptureSession::new(Rc::new(platform.clone()), Arc::new(SessionStats::new()));
        session.activate();
        session
    }

    #[tokio::test]
    async fn test_inactive_session_rejects_targets() {
        let platform = SimulatedPlatform::new().with_camera("cam-1", "Cam");
        let session = CaptureSession::new(Rc::new(platform), Arc::new(SessionStats::new()));

        let result = session
            .set_target(CaptureTarget::new("cam-1", ResolutionOption::HD))
            .await;
        assert!(matches!(result, Err(ViewerError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_same_target_is_unchanged() {
        let platform = SimulatedPlatform::new().with_camera("cam-1", "Cam");
        let session = session(&platform);
        let target = CaptureTarget::new("cam-1", ResolutionOption::HD);

        assert_eq!(
            session.set_target(target.clone()).await,
            Ok(CommitOutcome::Committed)
        );
        let stream_id = session.active_stream_id();
        assert_eq!(session.set_target(target).await, Ok(CommitOutcome::Unchanged));
        assert_eq!(session.active_stream_id(), stream_id);
        assert_eq!(platform.issued_stream_count(), 1);
    }

    #[tokio::test]
    async fn test_drop_stops_held_tracks() {
        let platform = SimulatedPlatform::new().with_camera("cam-1", "Cam");
        {
            let session = session(&platform);
            session
                .set_target(CaptureTarget::new("cam-1", ResolutionOption::SD))
                .await
                .unwrap();
            assert_eq!(platform.live_track_count(), 1);
        }
        assert_eq!(platform.live_track_count(), 0);
    }

    #[tokio::test]
    async fn test_status_reports_substituted_settings() {
        let platform = SimulatedPlatform::new().with_limited_camera("cam-1", "Cam", 1920, 1080);
        let session = session(&platform);

        session
            .set_target(CaptureTarget::new("cam-1", ResolutionOption::UHD))
            .await
            .unwrap();

        match session.state() {
            SessionStatus::Active { settings, .. } => {
                assert_eq!(
                    settings,
                    Some(StreamSettings {
                        width: 1920,
                        height: 1080
                    })
                );
            }
            other => panic!("Expected active session, got {:?}", other),
        }
        assert_eq!(session.state_name(), "active");
    }
}
