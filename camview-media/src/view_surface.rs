//! Video surface binding

use crate::capture_session::CaptureSession;
use camview_core::{ElementId, MediaPlatform, MediaStreamHandle};
use parking_lot::Mutex;
use serde::Serialize;
use std::rc::Rc;
use tracing::debug;

/// Placeholder shown while no stream is bound
pub const NO_STREAM_PLACEHOLDER: &str = "No camera stream";

const OPACITY_WITH_STREAM: f32 = 1.0;
const OPACITY_WITHOUT_STREAM: f32 = 0.3;

/// How the surface should be drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceAppearance {
    /// A stream is bound
    pub has_stream: bool,
    /// Surface opacity
    pub opacity: f32,
    /// Text overlay, set when no stream is bound
    pub placeholder: Option<&'static str>,
    /// Whether the fullscreen toggle is offered
    pub show_fullscreen_toggle: bool,
}

/// Render target for the active stream
pub struct ViewSurface<P: MediaPlatform> {
    platform: Rc<P>,
    surface: ElementId,
    bound: Mutex<Option<String>>,
}

impl<P: MediaPlatform> ViewSurface<P> {
    /// Surface rendering into the element `surface`
    pub fn new(platform: Rc<P>, surface: ElementId) -> Self {
        Self {
            platform,
            surface,
            bound: Mutex::new(None),
        }
    }

    /// Element the stream is rendered into
    pub fn element(&self) -> &ElementId {
        &self.surface
    }

    /// Bind `stream`, or detach with `None`
    ///
    /// The platform is only touched when the bound stream changes, so
    /// repeated binds of the same stream do not restart playback.
    pub fn bind(&self, stream: Option<&P::Stream>) {
        let next = stream.map(MediaStreamHandle::id);
        let mut bound = self.bound.lock();
        if *bound == next {
            return;
        }
        match &next {
            Some(id) => debug!("Binding stream {} to #{}", id, self.surface),
            None => debug!("Detaching #{}", self.surface),
        }
        self.platform.attach_stream(&self.surface, stream);
        *bound = next;
    }

    /// Bind whatever `session` currently holds
    pub fn sync(&self, session: &CaptureSession<P>) {
        session.with_stream(|stream| self.bind(stream));
    }

    /// Id of the bound stream
    pub fn bound_stream_id(&self) -> Option<String> {
        self.bound.lock().clone()
    }

    /// Whether a stream is bound
    pub fn has_stream(&self) -> bool {
        self.bound.lock().is_some()
    }

    /// Visual state; the toggle is hidden while an error is shown
    pub fn appearance(&self, error_active: bool) -> SurfaceAppearance {
        let has_stream = self.has_stream();
        SurfaceAppearance {
            has_stream,
            opacity: if has_stream {
                OPACITY_WITH_STREAM
            } else {
                OPACITY_WITHOUT_STREAM
            },
            placeholder: (!has_stream).then_some(NO_STREAM_PLACEHOLDER),
            show_fullscreen_toggle: has_stream && !error_active,
        }
    }

    /// Detach from the element
    pub fn deactivate(&self) {
        self.bind(None);
    }
}
