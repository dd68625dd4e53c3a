//! # camview core
//!
//! Shared vocabulary of the camera viewer: the error taxonomy, device and
//! resolution types, and the traits through which the viewer reaches the
//! host platform's media-capture and fullscreen capabilities.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod device;
pub mod error;
pub mod platform;
pub mod resolution;

// Re-export main types
pub use device::{DeviceDescriptor, DeviceKind, MediaDeviceInfo};
pub use error::{ErrorCategory, PlatformError, ViewerError, ViewerResult};
pub use platform::{
    DisplayPlatform, ElementId, FullscreenListener, ListenerHandle, MediaPlatform,
    MediaStreamHandle, StreamConstraints, StreamSettings,
};
pub use resolution::{CaptureTarget, ResolutionOption};
