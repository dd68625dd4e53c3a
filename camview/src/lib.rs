//! # camview - Browser Camera Viewer
//!
//! camview lets a person pick a connected camera and a capture resolution,
//! shows the live feed and toggles the player into fullscreen. It is a thin
//! layer over the host's media-capture and fullscreen capabilities, reached
//! through the `MediaPlatform` and `DisplayPlatform` traits.
//!
//! ## Key Features
//!
//! - **One stream at a time**: the held stream is released before a new one is requested
//! - **Stale-result safe**: only the newest camera or resolution choice is ever applied
//! - **Platform-driven fullscreen**: escape-key exits are mirrored like programmatic ones
//! - **Testable**: a scriptable in-memory platform ships alongside the browser one
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use camview::{CameraViewer, SimulatedPlatform, ViewerConfig};
//! use std::rc::Rc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ViewerConfig::default().container("player").surface("player-video");
//!     camview::init_logging(&config);
//!
//!     let platform = Rc::new(
//!         SimulatedPlatform::new()
//!             .with_camera("front", "Front Camera")
//!             .with_camera("back", "Back Camera"),
//!     );
//!     let viewer = CameraViewer::new(platform, config)?;
//!     let mut events = viewer.subscribe();
//!
//!     viewer.activate().await?;
//!     viewer.select_device("back").await?;
//!     viewer.toggle_fullscreen().await;
//!
//!     while let Ok(Some(event)) = events.try_next() {
//!         println!("Viewer event: {:?}", event);
//!     }
//!     println!("{}", viewer.snapshot().to_json());
//!
//!     viewer.deactivate();
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export core types for easy access
pub use camview_core::{
    CaptureTarget, DeviceDescriptor, DisplayPlatform, ElementId, ErrorCategory, MediaPlatform,
    MediaStreamHandle, PlatformError, ResolutionOption, StreamSettings, ViewerError,
    ViewerResult,
};

pub use camview_media::{
    CommitOutcome, Completion, NotificationDelivery, SessionStatus, SimulatedPlatform,
    SurfaceAppearance, ToggleAction,
};

#[cfg(target_arch = "wasm32")]
pub use camview_media::WebPlatform;

pub use camview_diagnostics::{DebugLogger, SessionStatsSnapshot};

// Public API modules
pub mod config;
pub mod event;
pub mod viewer;

// Re-export main API types
pub use config::ViewerConfig;
pub use event::{EventFilter, EventStream, FilteredEventStream, ViewerEvent};
pub use viewer::{CameraViewer, DeviceEntry, ResolutionEntry, ViewerSnapshot};

/// Install the `tracing` subscriber at the level `config` asks for
///
/// Returns `false` when a subscriber was already installed.
pub fn init_logging(config: &ViewerConfig) -> bool {
    DebugLogger::init_logging(config.debug_logging)
}
