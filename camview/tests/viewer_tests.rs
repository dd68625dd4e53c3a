//! Integration tests for the camera viewer shell
//!
//! These exercise the composed viewer the way a page would: activate,
//! change selections, toggle fullscreen, tear down, and read snapshots and
//! events after each step.

use camview::*;
use std::rc::Rc;

fn viewer(platform: &SimulatedPlatform) -> CameraViewer<SimulatedPlatform> {
    CameraViewer::new(
        Rc::new(platform.clone()),
        ViewerConfig::default().container("player").surface("player-video"),
    )
    .unwrap()
}

fn two_cameras() -> SimulatedPlatform {
    SimulatedPlatform::new()
        .with_camera("front", "Front Camera")
        .with_camera("back", "Back Camera")
}

fn event_types(events: &mut EventStream) -> Vec<&'static str> {
    events.drain().iter().map(ViewerEvent::event_type).collect()
}

// ============================================================================
// ACTIVATION TESTS
// ============================================================================

#[tokio::test]
async fn test_activation_starts_default_camera() {
    let platform = two_cameras();
    let viewer = viewer(&platform);
    let mut events = viewer.subscribe();

    viewer.activate().await.unwrap();

    let snapshot = viewer.snapshot();
    assert_eq!(snapshot.devices.len(), 2);
    assert_eq!(snapshot.selected_device.as_deref(), Some("front"));
    assert_eq!(snapshot.selected_resolution, 1);
    assert_eq!(snapshot.resolutions.len(), 4);
    assert!(snapshot.banner.is_none());
    assert!(!snapshot.controls_disabled);
    assert!(snapshot.surface.has_stream);
    assert!(snapshot.surface.show_fullscreen_toggle);
    assert_eq!(snapshot.session_state, "active");
    assert_eq!(
        platform.attached_stream(&ElementId::new("player-video")),
        match viewer.session_status() {
            SessionStatus::Active { stream_id, .. } => Some(stream_id),
            other => panic!("Expected active session, got {:?}", other),
        }
    );

    assert_eq!(event_types(&mut events), vec!["catalog_ready", "stream_started"]);
}

#[tokio::test]
async fn test_configured_default_resolution() {
    let platform = two_cameras();
    let viewer = CameraViewer::new(
        Rc::new(platform.clone()),
        ViewerConfig::default().default_resolution(2),
    )
    .unwrap();

    viewer.activate().await.unwrap();

    match viewer.session_status() {
        SessionStatus::Active { target, .. } => {
            assert_eq!(target.resolution, ResolutionOption::FULL_HD)
        }
        other => panic!("Expected active session, got {:?}", other),
    }
}

#[tokio::test]
async fn test_activation_is_idempotent() {
    let platform = two_cameras();
    let viewer = viewer(&platform);

    viewer.activate().await.unwrap();
    viewer.activate().await.unwrap();

    // Probe plus one stream
    assert_eq!(platform.issued_stream_count(), 2);
    assert_eq!(platform.listener_count(), 1);
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let result = CameraViewer::new(
        Rc::new(SimulatedPlatform::new()),
        ViewerConfig::default().default_resolution(4),
    );
    assert!(matches!(
        result,
        Err(ViewerError::InvalidResolution { index: 4 })
    ));
}

// ============================================================================
// BANNER TESTS
// ============================================================================

#[tokio::test]
async fn test_denied_permission_banner() {
    let platform = two_cameras().deny_permission();
    let viewer = viewer(&platform);

    let error = viewer.activate().await.unwrap_err();

    assert_eq!(error, ViewerError::PermissionDenied);
    let snapshot = viewer.snapshot();
    assert_eq!(
        snapshot.banner.as_deref(),
        Some("Camera access was denied. Allow camera access in the browser settings and reload the page.")
    );
    assert!(snapshot.controls_disabled);
    assert!(!snapshot.surface.has_stream);
    assert!(!snapshot.surface.show_fullscreen_toggle);
    assert_eq!(snapshot.surface.placeholder, Some("No camera stream"));
}

#[tokio::test]
async fn test_activating_again_after_failure_reports_it() {
    let platform = two_cameras().deny_permission();
    let viewer = viewer(&platform);

    assert_eq!(viewer.activate().await, Err(ViewerError::PermissionDenied));
    let requests = platform.request_log().len();

    assert_eq!(viewer.activate().await, Err(ViewerError::PermissionDenied));
    assert_eq!(platform.request_log().len(), requests);
    assert_eq!(viewer.banner_error(), Some(ViewerError::PermissionDenied));
}

#[tokio::test]
async fn test_no_camera_banner() {
    let platform = SimulatedPlatform::new().with_microphone("mic", "Headset");
    let viewer = viewer(&platform);
    let mut events = viewer.subscribe();

    assert_eq!(viewer.activate().await, Err(ViewerError::NoDeviceFound));

    let snapshot = viewer.snapshot();
    assert!(snapshot.devices.is_empty());
    assert!(snapshot.selected_device.is_none());
    assert_eq!(snapshot.banner.as_deref(), Some("No camera was found."));
    assert_eq!(event_types(&mut events), vec!["catalog_failed"]);
}

#[tokio::test]
async fn test_unsupported_platform_banner() {
    let platform = two_cameras().without_capture_support();
    let viewer = viewer(&platform);

    assert_eq!(
        viewer.activate().await,
        Err(ViewerError::CapabilityUnsupported)
    );
    assert_eq!(
        viewer.snapshot().banner.as_deref(),
        Some("This browser does not support camera capture.")
    );
}

#[tokio::test]
async fn test_stream_failure_banner_clears_on_recovery() {
    let platform = two_cameras().with_failing_device(
        "back",
        PlatformError::Aborted {
            message: "device in use".to_string(),
        },
    );
    let viewer = viewer(&platform);
    viewer.activate().await.unwrap();

    let error = viewer.select_device("back").await.unwrap_err();
    assert!(matches!(error, ViewerError::StreamStartFailed { .. }));
    let snapshot = viewer.snapshot();
    assert_eq!(
        snapshot.banner.as_deref(),
        Some("Could not start the camera stream.")
    );
    assert!(!snapshot.surface.has_stream);
    assert_eq!(platform.live_track_count(), 0);

    // Controls stay usable while the banner is shown
    viewer.select_device("front").await.unwrap();
    let snapshot = viewer.snapshot();
    assert!(snapshot.banner.is_none());
    assert!(snapshot.surface.has_stream);
}

// ============================================================================
// SELECTION TESTS
// ============================================================================

#[tokio::test]
async fn test_device_switch_replaces_stream() {
    let platform = two_cameras();
    let viewer = viewer(&platform);
    viewer.activate().await.unwrap();
    let mut events = viewer.subscribe();

    viewer.select_device("back").await.unwrap();

    assert_eq!(viewer.snapshot().selected_device.as_deref(), Some("back"));
    assert_eq!(platform.live_track_count(), 1);
    assert_eq!(
        event_types(&mut events),
        vec!["device_selected", "stream_stopped", "stream_started"]
    );
}

#[tokio::test]
async fn test_reselecting_current_device_keeps_stream() {
    let platform = two_cameras();
    let viewer = viewer(&platform);
    viewer.activate().await.unwrap();
    let issued = platform.issued_stream_count();

    viewer.select_device("front").await.unwrap();
    viewer.select_resolution(1).await.unwrap();

    assert_eq!(platform.issued_stream_count(), issued);
}

#[tokio::test]
async fn test_invalid_selections_change_nothing() {
    let platform = two_cameras();
    let viewer = viewer(&platform);
    viewer.activate().await.unwrap();
    let before = viewer.snapshot();

    assert_eq!(
        viewer.select_resolution(9).await,
        Err(ViewerError::InvalidResolution { index: 9 })
    );
    assert!(matches!(
        viewer.select_device("webcam-9").await,
        Err(ViewerError::DeviceNotFound { .. })
    ));

    assert_eq!(viewer.snapshot(), before);
}

#[tokio::test]
async fn test_resolution_before_activation_is_kept() {
    let platform = two_cameras();
    let viewer = viewer(&platform);

    viewer.select_resolution(0).await.unwrap();
    viewer.activate().await.unwrap();

    assert_eq!(viewer.snapshot().selected_resolution, 0);
    match viewer.session_status() {
        SessionStatus::Active {
            settings: Some(settings),
            ..
        } => assert_eq!((settings.width, settings.height), (640, 480)),
        other => panic!("Expected active session, got {:?}", other),
    }
}

#[tokio::test]
async fn test_overlapping_selections_apply_newest() {
    let platform = two_cameras();
    let viewer = viewer(&platform);
    viewer.activate().await.unwrap();
    platform.set_completion(Completion::Manual);
    let mut events = viewer.subscribe();

    let release = async {
        while platform.pending_requests() < 2 {
            tokio::task::yield_now().await;
        }
        platform.complete_oldest();
        platform.complete_oldest();
    };
    let (first, second, ()) = tokio::join!(
        viewer.select_device("back"),
        viewer.select_resolution(3),
        release
    );
    first.unwrap();
    second.unwrap();

    match viewer.session_status() {
        SessionStatus::Active { target, .. } => {
            assert_eq!(target, CaptureTarget::new("back", ResolutionOption::UHD))
        }
        other => panic!("Expected active session, got {:?}", other),
    }
    assert_eq!(platform.live_track_count(), 1);
    assert!(event_types(&mut events).contains(&"stale_result_discarded"));
    assert_eq!(viewer.stats().acquisitions_superseded, 1);
}

// ============================================================================
// FULLSCREEN TESTS
// ============================================================================

#[tokio::test]
async fn test_fullscreen_round_trip_with_deferred_notifications() {
    let platform = two_cameras().deferred_fullscreen_events();
    let viewer = viewer(&platform);
    viewer.activate().await.unwrap();
    let mut events = viewer.subscribe();

    assert_eq!(viewer.toggle_fullscreen().await, ToggleAction::Enter);
    assert_eq!(viewer.toggle_fullscreen().await, ToggleAction::Exit);
    assert!(!viewer.snapshot().fullscreen);

    platform.deliver_fullscreen_changes();

    assert!(!viewer.snapshot().fullscreen);
    assert_eq!(
        events.drain(),
        vec![
            ViewerEvent::FullscreenChanged { fullscreen: true },
            ViewerEvent::FullscreenChanged { fullscreen: false },
        ]
    );
}

#[tokio::test]
async fn test_user_exit_is_mirrored() {
    let platform = two_cameras();
    let viewer = viewer(&platform);
    viewer.activate().await.unwrap();

    viewer.toggle_fullscreen().await;
    assert!(viewer.snapshot().fullscreen);
    assert_eq!(
        platform.fullscreen_element(),
        Some(ElementId::new("player"))
    );

    platform.simulate_user_exit();
    assert!(!viewer.snapshot().fullscreen);
}

#[tokio::test]
async fn test_rejected_fullscreen_is_not_an_error() {
    let platform = two_cameras();
    platform.set_reject_fullscreen(true);
    let viewer = viewer(&platform);
    viewer.activate().await.unwrap();

    viewer.toggle_fullscreen().await;

    let snapshot = viewer.snapshot();
    assert!(!snapshot.fullscreen);
    assert!(snapshot.banner.is_none());
    assert_eq!(viewer.stats().fullscreen_rejections, 1);
}

// ============================================================================
// TEARDOWN TESTS
// ============================================================================

#[tokio::test]
async fn test_deactivate_releases_everything() {
    let platform = two_cameras();
    let viewer = viewer(&platform);
    viewer.activate().await.unwrap();
    let mut events = viewer.subscribe();

    viewer.deactivate();

    assert_eq!(platform.live_track_count(), 0);
    assert_eq!(platform.listener_count(), 0);
    assert_eq!(platform.attached_stream(&ElementId::new("player-video")), None);
    assert!(!viewer.is_active());
    assert_eq!(event_types(&mut events), vec!["stream_stopped"]);
    assert_eq!(viewer.snapshot().session_state, "uninitialized");
}

#[tokio::test]
async fn test_dropping_viewer_releases_stream() {
    let platform = two_cameras();
    {
        let viewer = viewer(&platform);
        viewer.activate().await.unwrap();
        assert_eq!(platform.live_track_count(), 1);
    }
    assert_eq!(platform.live_track_count(), 0);
    assert_eq!(platform.listener_count(), 0);
}

#[tokio::test]
async fn test_reactivation_restarts_stream() {
    let platform = two_cameras();
    let viewer = viewer(&platform);
    viewer.activate().await.unwrap();
    viewer.select_device("back").await.unwrap();
    viewer.deactivate();

    viewer.activate().await.unwrap();

    assert!(viewer.snapshot().surface.has_stream);
    assert_eq!(viewer.snapshot().selected_device.as_deref(), Some("back"));
    assert_eq!(platform.live_track_count(), 1);
}

#[tokio::test]
async fn test_snapshot_json() {
    let platform = two_cameras();
    let viewer = viewer(&platform);
    viewer.activate().await.unwrap();

    let json: serde_json::Value = serde_json::from_str(&viewer.snapshot().to_json()).unwrap();
    assert_eq!(json["selected_device"], "front");
    assert_eq!(json["resolutions"][3]["label"], "4K");
    assert_eq!(json["surface"]["has_stream"], true);
}

// ============================================================================
// CANCELLATION TESTS
// ============================================================================

#[test]
fn test_cancelled_activation_can_be_retried() {
    let platform = two_cameras().manual_completion();
    let viewer = viewer(&platform);

    let mut activation = tokio_test::task::spawn(viewer.activate());
    tokio_test::assert_pending!(activation.poll());
    drop(activation);

    // Abandoned permission request resolves with nobody listening
    assert!(platform.complete_oldest());
    assert_eq!(platform.live_track_count(), 0);

    platform.set_completion(Completion::Immediate);
    tokio_test::block_on(viewer.activate()).unwrap();

    let snapshot = viewer.snapshot();
    assert_eq!(snapshot.selected_device.as_deref(), Some("front"));
    assert!(snapshot.surface.has_stream);
    assert_eq!(platform.live_track_count(), 1);
}

#[tokio::test]
async fn test_cancelled_selection_leaves_camera_off() {
    let platform = two_cameras();
    let viewer = viewer(&platform);
    viewer.activate().await.unwrap();

    platform.set_completion(Completion::Manual);
    let mut selection = tokio_test::task::spawn(viewer.select_device("back"));
    tokio_test::assert_pending!(selection.poll());
    drop(selection);

    assert_eq!(viewer.session_status(), SessionStatus::Uninitialized);
    assert!(platform.complete_oldest());
    assert_eq!(platform.live_track_count(), 0);
    assert_eq!(viewer.stats().in_flight(), 0);

    platform.set_completion(Completion::Immediate);
    viewer.select_device("back").await.unwrap();
    assert!(viewer.snapshot().surface.has_stream);
    assert_eq!(platform.live_track_count(), 1);
}
