//! Integration tests for camera discovery
//!
//! Covers the permission probe, enumeration filtering, default selection and
//! the terminal failure states of the device catalog.

use camview_core::{PlatformError, StreamConstraints, ViewerError};
use camview_diagnostics::SessionStats;
use camview_media::*;
use std::rc::Rc;
use std::sync::Arc;

fn catalog(platform: &SimulatedPlatform) -> DeviceCatalog<SimulatedPlatform> {
    DeviceCatalog::new(Rc::new(platform.clone()), Arc::new(SessionStats::new()))
}

// ============================================================================
// DISCOVERY TESTS
// ============================================================================

#[tokio::test]
async fn test_first_camera_selected_by_default() {
    let platform = SimulatedPlatform::new()
        .with_camera("cam-front", "Front Camera")
        .with_camera("cam-back", "Back Camera");
    let catalog = catalog(&platform);

    let devices = catalog.activate().await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(catalog.selected().unwrap().id(), "cam-front");
    assert!(matches!(catalog.state(), CatalogState::Ready { .. }));
}

#[tokio::test]
async fn test_probe_precedes_enumeration_and_is_released() {
    let platform = SimulatedPlatform::new().with_camera("cam-1", "Studio Cam");
    let catalog = catalog(&platform);

    let devices = catalog.activate().await.unwrap();

    assert_eq!(platform.request_log(), vec![StreamConstraints::Probe]);
    assert_eq!(platform.live_track_count(), 0);
    // Labels only become visible once access was granted
    assert_eq!(devices[0].label(), "Studio Cam");
}

#[tokio::test]
async fn test_microphones_are_filtered_out() {
    let platform = SimulatedPlatform::new()
        .with_microphone("mic-1", "Headset")
        .with_camera("cam-1", "Webcam")
        .with_microphone("mic-2", "Array");
    let catalog = catalog(&platform);

    let devices = catalog.activate().await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id(), "cam-1");
    assert_eq!(catalog.selected().unwrap().id(), "cam-1");
}

#[tokio::test]
async fn test_probe_stats_count_released_tracks() {
    let platform = SimulatedPlatform::new().with_camera("cam-1", "Cam");
    let stats = Arc::new(SessionStats::new());
    let catalog = DeviceCatalog::new(Rc::new(platform), stats.clone());

    catalog.activate().await.unwrap();

    assert_eq!(stats.snapshot().tracks_stopped, 1);
}

// ============================================================================
// FAILURE TESTS
// ============================================================================

#[tokio::test]
async fn test_no_camera_reports_no_device_found() {
    let platform = SimulatedPlatform::new();
    let catalog = catalog(&platform);

    assert_eq!(catalog.activate().await, Err(ViewerError::NoDeviceFound));
    assert!(catalog.devices().is_empty());
    assert!(catalog.selected().is_none());
    assert_eq!(catalog.error(), Some(ViewerError::NoDeviceFound));
}

#[tokio::test]
async fn test_only_microphones_reports_no_device_found() {
    let platform = SimulatedPlatform::new().with_microphone("mic-1", "Headset");
    let catalog = catalog(&platform);

    assert_eq!(catalog.activate().await, Err(ViewerError::NoDeviceFound));
}

#[tokio::test]
async fn test_denied_permission_is_distinct() {
    let platform = SimulatedPlatform::new()
        .with_camera("cam-1", "Cam")
        .deny_permission();
    let catalog = catalog(&platform);

    let error = catalog.activate().await.unwrap_err();

    assert_eq!(error, ViewerError::PermissionDenied);
    assert!(!error.is_recoverable());
}

#[tokio::test]
async fn test_missing_capture_support() {
    let platform = SimulatedPlatform::new()
        .with_camera("cam-1", "Cam")
        .without_capture_support();
    let catalog = catalog(&platform);

    assert_eq!(
        catalog.activate().await,
        Err(ViewerError::CapabilityUnsupported)
    );
    assert_eq!(platform.issued_stream_count(), 0);
}

#[tokio::test]
async fn test_enumeration_failure() {
    let platform = SimulatedPlatform::new()
        .with_camera("cam-1", "Cam")
        .with_enumeration_error(PlatformError::Other {
            message: "enumeration blocked".to_string(),
        });
    let catalog = catalog(&platform);

    let error = catalog.activate().await.unwrap_err();

    assert!(matches!(error, ViewerError::DeviceEnumerationFailed { .. }));
    assert_eq!(platform.live_track_count(), 0);
}

#[tokio::test]
async fn test_failure_is_terminal() {
    let platform = SimulatedPlatform::new().deny_permission();
    let catalog = catalog(&platform);

    catalog.activate().await.unwrap_err();
    catalog.activate().await.unwrap_err();

    assert_eq!(platform.request_log().len(), 1);
    assert!(matches!(catalog.state(), CatalogState::Failed(_)));
}
