//! Counters for the capture-session lifecycle

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifecycle counters, updated in place by the viewer components
#[derive(Debug, Default)]
pub struct SessionStats {
    acquisitions_started: AtomicU64,
    acquisitions_committed: AtomicU64,
    acquisitions_failed: AtomicU64,
    acquisitions_superseded: AtomicU64,
    tracks_stopped: AtomicU64,
    fullscreen_rejections: AtomicU64,
}

impl SessionStats {
    /// Fresh counters
    pub fn new() -> Self {
        Self::default()
    }

    /// A stream request was issued
    pub fn record_acquisition_started(&self) {
        self.acquisitions_started.fetch_add(1, Ordering::Relaxed);
    }

    /// A stream became the active stream
    pub fn record_committed(&self) {
        self.acquisitions_committed.fetch_add(1, Ordering::Relaxed);
    }

    /// A stream request failed for the current target
    pub fn record_failed(&self) {
        self.acquisitions_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// A result arrived for a target that was no longer wanted
    pub fn record_superseded(&self) {
        self.acquisitions_superseded.fetch_add(1, Ordering::Relaxed);
    }

    /// Tracks were stopped
    pub fn record_tracks_stopped(&self, count: usize) {
        self.tracks_stopped
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// The platform refused a fullscreen request
    pub fn record_fullscreen_rejection(&self) {
        self.fullscreen_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> SessionStatsSnapshot {
        SessionStatsSnapshot {
            acquisitions_started: self.acquisitions_started.load(Ordering::Relaxed),
            acquisitions_committed: self.acquisitions_committed.load(Ordering::Relaxed),
            acquisitions_failed: self.acquisitions_failed.load(Ordering::Relaxed),
            acquisitions_superseded: self.acquisitions_superseded.load(Ordering::Relaxed),
            tracks_stopped: self.tracks_stopped.load(Ordering::Relaxed),
            fullscreen_rejections: self.fullscreen_rejections.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`SessionStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatsSnapshot {
    /// Stream requests issued
    pub acquisitions_started: u64,
    /// Streams that became active
    pub acquisitions_committed: u64,
    /// Requests that failed for the wanted target
    pub acquisitions_failed: u64,
    /// Results discarded because a newer target was requested
    pub acquisitions_superseded: u64,
    /// Tracks stopped across all releases
    pub tracks_stopped: u64,
    /// Fullscreen requests the platform refused
    pub fullscreen_rejections: u64,
}

impl SessionStatsSnapshot {
    /// Requests whose outcome has not been observed yet
    pub fn in_flight(&self) -> u64 {
        self.acquisitions_started.saturating_sub(
            self.acquisitions_committed + self.acquisitions_failed + self.acquisitions_superseded,
        )
    }

    /// JSON form for debug overlays and logs
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
