//! Host platform seams
//!
//! Everything the viewer needs from its host goes through [`MediaPlatform`]
//! (device probing, enumeration, stream acquisition, binding a stream to a
//! video surface) and [`DisplayPlatform`] (fullscreen request, exit and
//! change notifications). The futures are not `Send`: browser handles live
//! on the single UI thread.

use crate::device::MediaDeviceInfo;
use crate::error::PlatformError;
use crate::resolution::CaptureTarget;
use async_trait::async_trait;
use serde::Serialize;

/// Identifier of a DOM element (container or video surface)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ElementId(String);

impl ElementId {
    /// Wrap an element id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Video constraints for a stream request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamConstraints {
    /// Any camera, video only; used to trigger the permission prompt
    Probe,
    /// Exact device with preferred (`ideal`) dimensions
    Target {
        /// Required device identifier
        device_id: String,
        /// Preferred width
        ideal_width: u32,
        /// Preferred height
        ideal_height: u32,
    },
}

impl StreamConstraints {
    /// Constraints for acquiring a capture target
    pub fn for_target(target: &CaptureTarget) -> Self {
        StreamConstraints::Target {
            device_id: target.device_id.clone(),
            ideal_width: target.resolution.width,
            ideal_height: target.resolution.height,
        }
    }

    /// Required device, if any
    pub fn device_id(&self) -> Option<&str> {
        match self {
            StreamConstraints::Probe => None,
            StreamConstraints::Target { device_id, .. } => Some(device_id),
        }
    }
}

/// Settings the platform actually applied to a video track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamSettings {
    /// Delivered width
    pub width: u32,
    /// Delivered height
    pub height: u32,
}

/// A live media stream owned by the viewer
///
/// Holding one keeps the hardware busy until [`stop_all_tracks`] is called.
///
/// [`stop_all_tracks`]: MediaStreamHandle::stop_all_tracks
pub trait MediaStreamHandle {
    /// Platform stream id
    fn id(&self) -> String;

    /// Number of tracks that are still live
    fn live_track_count(&self) -> usize;

    /// Stop every track; returns how many were live before the call
    fn stop_all_tracks(&self) -> usize;

    /// Dimensions the platform chose for the video track
    fn settings(&self) -> Option<StreamSettings>;
}

/// Media capture capabilities of the host
#[async_trait(?Send)]
pub trait MediaPlatform {
    /// Stream handle type produced by this platform
    type Stream: MediaStreamHandle;

    /// Whether the host exposes camera capture at all
    fn supports_capture(&self) -> bool;

    /// Request a video-only stream
    ///
    /// The host cannot cancel a pending request. If the returned future is
    /// dropped before it yields, the implementation must stop the tracks of
    /// whatever stream the host delivers afterwards.
    async fn request_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Self::Stream, PlatformError>;

    /// Enumerate every media device the host reports
    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, PlatformError>;

    /// Point the video surface at a stream, or clear it
    fn attach_stream(&self, surface: &ElementId, stream: Option<&Self::Stream>);
}

/// Callback invoked with the element currently in fullscreen, if any
pub type FullscreenListener = Box<dyn Fn(Option<ElementId>)>;

/// Registration of a fullscreen-change listener
///
/// Dropping the handle unregisters the listener.
pub struct ListenerHandle {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl ListenerHandle {
    /// Create a handle that runs `cancel` when dropped
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Fullscreen capabilities of the host
#[async_trait(?Send)]
pub trait DisplayPlatform {
    /// Element the platform currently shows fullscreen
    fn fullscreen_element(&self) -> Option<ElementId>;

    /// Ask the platform to show `element` fullscreen
    async fn request_fullscreen(&self, element: &ElementId) -> Result<(), PlatformError>;

    /// Ask the platform to leave fullscreen
    async fn exit_fullscreen(&self) -> Result<(), PlatformError>;

    /// Register for fullscreen-change notifications, whatever their cause
    fn on_fullscreen_change(&self, listener: FullscreenListener) -> ListenerHandle;
}
