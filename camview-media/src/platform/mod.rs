//! Host platform implementations

pub mod simulated;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use simulated::{Completion, NotificationDelivery, SimulatedPlatform, SimulatedStream, SimulatedTrack};
#[cfg(target_arch = "wasm32")]
pub use web::{WebPlatform, WebStream};
