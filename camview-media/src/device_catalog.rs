//! Camera discovery and selection
//!
//! The catalog is populated once, after a permission probe: most platforms
//! only reveal device labels after camera access has been granted at least
//! once, so the catalog first opens (and immediately releases) a throwaway
//! stream, then enumerates.

use camview_core::{
    DeviceDescriptor, MediaPlatform, MediaStreamHandle, StreamConstraints, ViewerError,
    ViewerResult,
};
use camview_diagnostics::SessionStats;
use parking_lot::Mutex;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle of the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogState {
    /// Not activated yet
    Uninitialized,
    /// Permission probe or enumeration in flight
    Probing,
    /// Devices known, one selected
    Ready {
        /// Cameras in enumeration order
        devices: Vec<DeviceDescriptor>,
        /// Identifier of the selected camera
        selected: String,
    },
    /// Terminal failure, never retried
    Failed(ViewerError),
}

impl CatalogState {
    fn name(&self) -> &'static str {
        match self {
            CatalogState::Uninitialized => "uninitialized",
            CatalogState::Probing => "probing",
            CatalogState::Ready { .. } => "ready",
            CatalogState::Failed(_) => "failed",
        }
    }
}

/// Puts a catalog back to uninitialized if discovery is dropped midway
struct ProbeGuard<'a> {
    state: &'a Mutex<CatalogState>,
    armed: bool,
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.state.lock() = CatalogState::Uninitialized;
            debug!("Camera discovery cancelled");
        }
    }
}

/// Owner of the selectable camera list
pub struct DeviceCatalog<P: MediaPlatform> {
    platform: Rc<P>,
    stats: Arc<SessionStats>,
    state: Mutex<CatalogState>,
}

impl<P: MediaPlatform> DeviceCatalog<P> {
    /// Create an empty catalog
    pub fn new(platform: Rc<P>, stats: Arc<SessionStats>) -> Self {
        Self {
            platform,
            stats,
            state: Mutex::new(CatalogState::Uninitialized),
        }
    }

    /// Probe permission, enumerate and select the first camera
    ///
    /// Runs once. Later calls return the outcome of the first run without
    /// touching the platform. A run whose future is dropped does not count.
    pub async fn activate(&self) -> ViewerResult<Vec<DeviceDescriptor>> {
        {
            let mut state = self.state.lock();
            match &*state {
                CatalogState::Uninitialized => {}
                CatalogState::Ready { devices, .. } => return Ok(devices.clone()),
                CatalogState::Failed(error) => return Err(error.clone()),
                CatalogState::Probing => {
                    return Err(ViewerError::InvalidState {
                        expected: "uninitialized".to_string(),
                        actual: "probing".to_string(),
                    })
                }
            }
            *state = CatalogState::Probing;
        }

        let mut guard = ProbeGuard {
            state: &self.state,
            armed: true,
        };
        let outcome = self.discover().await;
        guard.armed = false;

        let mut state = self.state.lock();
        match outcome {
            Ok(devices) => {
                let selected = devices[0].id().to_string();
                info!(
                    "📷 Found {} camera(s), selecting {}",
                    devices.len(),
                    devices[0].display_name(0)
                );
                *state = CatalogState::Ready {
                    devices: devices.clone(),
                    selected,
                };
                Ok(devices)
            }
            Err(error) => {
                warn!("Camera discovery failed: {}", error);
                *state = CatalogState::Failed(error.clone());
                Err(error)
            }
        }
    }

    async fn discover(&self) -> ViewerResult<Vec<DeviceDescriptor>> {
        if !self.platform.supports_capture() {
            return Err(ViewerError::CapabilityUnsupported);
        }

        let probe = self
            .platform
            .request_stream(&StreamConstraints::Probe)
            .await
            .map_err(ViewerError::from_probe)?;
        let stopped = probe.stop_all_tracks();
        self.stats.record_tracks_stopped(stopped);
        debug!("Permission probe released {} track(s)", stopped);

        let devices: Vec<DeviceDescriptor> = self
            .platform
            .enumerate_devices()
            .await
            .map_err(ViewerError::from_probe)?
            .iter()
            .filter_map(DeviceDescriptor::from_info)
            .collect();

        if devices.is_empty() {
            return Err(ViewerError::NoDeviceFound);
        }
        Ok(devices)
    }

    /// Switch the selected camera
    pub fn select(&self, device_id: &str) -> ViewerResult<DeviceDescriptor> {
        let mut state = self.state.lock();
        match &mut *state {
            CatalogState::Ready { devices, selected } => {
                let device = devices
                    .iter()
                    .find(|device| device.id() == device_id)
                    .cloned()
                    .ok_or_else(|| ViewerError::DeviceNotFound {
                        device_id: device_id.to_string(),
                    })?;
                if *selected != device_id {
                    debug!("Camera selection {} -> {}", selected, device_id);
                    *selected = device_id.to_string();
                }
                Ok(device)
            }
            other => Err(ViewerError::InvalidState {
                expected: "ready".to_string(),
                actual: other.name().to_string(),
            }),
        }
    }

    /// Cameras in enumeration order, empty unless ready
    pub fn devices(&self) -> Vec<DeviceDescriptor> {
        match &*self.state.lock() {
            CatalogState::Ready { devices, .. } => devices.clone(),
            _ => Vec::new(),
        }
    }

    /// Currently selected camera
    pub fn selected(&self) -> Option<DeviceDescriptor> {
        match &*self.state.lock() {
            CatalogState::Ready { devices, selected } => devices
                .iter()
                .find(|device| device.id() == selected.as_str())
                .cloned(),
            _ => None,
        }
    }

    /// Terminal error, if discovery failed
    pub fn error(&self) -> Option<ViewerError> {
        match &*self.state.lock() {
            CatalogState::Failed(error) => Some(error.clone()),
            _ => None,
        }
    }

    /// Snapshot of the lifecycle state
    pub fn state(&self) -> CatalogState {
        self.state.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Completion, SimulatedPlatform};

    fn catalog(platform: SimulatedPlatform) -> DeviceCatalog<SimulatedPlatform> {
        DeviceCatalog::new(Rc::new(platform), Arc::new(SessionStats::new()))
    }

    #[test]
    fn test_select_requires_ready_catalog() {
        let catalog = catalog(SimulatedPlatform::new().with_camera("cam-1", "Cam"));
        assert!(matches!(
            catalog.select("cam-1"),
            Err(ViewerError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_device_keeps_selection() {
        let catalog = catalog(
            SimulatedPlatform::new()
                .with_camera("cam-1", "Front")
                .with_camera("cam-2", "Back"),
        );
        catalog.activate().await.unwrap();

        let error = catalog.select("cam-9").unwrap_err();
        assert_eq!(
            error,
            ViewerError::DeviceNotFound {
                device_id: "cam-9".to_string()
            }
        );
        assert_eq!(catalog.selected().unwrap().id(), "cam-1");

        assert_eq!(catalog.select("cam-2").unwrap().label(), "Back");
        assert_eq!(catalog.selected().unwrap().id(), "cam-2");
    }

    #[tokio::test]
    async fn test_activation_runs_once() {
        let platform = SimulatedPlatform::new().with_camera("cam-1", "Cam");
        let catalog = catalog(platform.clone());

        catalog.activate().await.unwrap();
        catalog.activate().await.unwrap();
        assert_eq!(platform.issued_stream_count(), 1);
    }

    #[test]
    fn test_cancelled_activation_can_be_retried() {
        let platform = SimulatedPlatform::new()
            .with_camera("cam-1", "Cam")
            .manual_completion();
        let catalog = catalog(platform.clone());

        let mut discovery = tokio_test::task::spawn(catalog.activate());
        tokio_test::assert_pending!(discovery.poll());
        assert_eq!(catalog.state(), CatalogState::Probing);
        drop(discovery);
        assert_eq!(catalog.state(), CatalogState::Uninitialized);

        // The abandoned permission request still resolves and must not stay lit
        assert!(platform.complete_oldest());
        assert_eq!(platform.live_track_count(), 0);

        platform.set_completion(Completion::Immediate);
        let devices = tokio_test::block_on(catalog.activate()).unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(catalog.selected().unwrap().id(), "cam-1");
    }
}
