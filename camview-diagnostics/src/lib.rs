//! # camview diagnostics
//!
//! Logging setup and lifecycle counters for the camera viewer.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod debug_logger;
pub mod session_stats;

// Re-export main types
pub use debug_logger::DebugLogger;
pub use session_stats::{SessionStats, SessionStatsSnapshot};
