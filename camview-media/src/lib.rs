//! # camview media
//!
//! Camera discovery, capture-session lifecycle, video surface binding and
//! fullscreen control for the camview viewer. Every component talks to the
//! host only through the `camview-core` platform traits, so the same code
//! runs against the browser ([`platform::WebPlatform`], wasm32 only) and the
//! in-memory [`platform::SimulatedPlatform`].

#![warn(clippy::all)]

pub mod capture_session;
pub mod device_catalog;
pub mod fullscreen;
pub mod platform;
pub mod view_surface;

// Re-export main types
pub use capture_session::{CaptureSession, CommitOutcome, SessionState, SessionStatus};
pub use device_catalog::{CatalogState, DeviceCatalog};
pub use fullscreen::{FullscreenController, FullscreenNotifier, ToggleAction};
pub use platform::{Completion, NotificationDelivery, SimulatedPlatform, SimulatedStream};
pub use view_surface::{SurfaceAppearance, ViewSurface, NO_STREAM_PLACEHOLDER};

#[cfg(target_arch = "wasm32")]
pub use platform::{WebPlatform, WebStream};
