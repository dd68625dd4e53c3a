//! Integration tests for fullscreen control and the video surface

use camview_core::{CaptureTarget, DisplayPlatform, ElementId, ResolutionOption};
use camview_diagnostics::SessionStats;
use camview_media::*;
use std::rc::Rc;
use std::sync::Arc;

fn controller(platform: &SimulatedPlatform) -> FullscreenController<SimulatedPlatform> {
    FullscreenController::new(
        Rc::new(platform.clone()),
        ElementId::new("viewer-container"),
        Arc::new(SessionStats::new()),
    )
}

// ============================================================================
// FULLSCREEN TESTS
// ============================================================================

#[tokio::test]
async fn test_toggle_twice_with_deferred_notifications() {
    let platform = SimulatedPlatform::new().deferred_fullscreen_events();
    let controller = controller(&platform);
    controller.activate();
    let original = controller.is_fullscreen();

    assert_eq!(controller.toggle().await, ToggleAction::Enter);
    // Mirror only follows delivered notifications
    assert_eq!(controller.is_fullscreen(), original);
    assert_eq!(controller.toggle().await, ToggleAction::Exit);

    assert_eq!(platform.deliver_fullscreen_changes(), 2);
    assert_eq!(controller.is_fullscreen(), original);
}

#[tokio::test]
async fn test_mirror_follows_each_notification() {
    let platform = SimulatedPlatform::new().deferred_fullscreen_events();
    let controller = controller(&platform);
    controller.activate();

    controller.toggle().await;
    platform.deliver_fullscreen_changes();
    assert!(controller.is_fullscreen());

    controller.toggle().await;
    assert!(controller.is_fullscreen());
    platform.deliver_fullscreen_changes();
    assert!(!controller.is_fullscreen());
}

#[tokio::test]
async fn test_activation_seeds_mirror_from_platform() {
    let platform = SimulatedPlatform::new();
    platform
        .request_fullscreen(&ElementId::new("viewer-container"))
        .await
        .unwrap();

    let controller = controller(&platform);
    assert!(!controller.is_fullscreen());
    controller.activate();
    assert!(controller.is_fullscreen());

    assert_eq!(controller.toggle().await, ToggleAction::Exit);
    assert!(!controller.is_fullscreen());
}

#[tokio::test]
async fn test_deactivated_controller_ignores_changes() {
    let platform = SimulatedPlatform::new();
    let controller = controller(&platform);
    controller.activate();
    controller.deactivate();

    controller.toggle().await;

    assert!(!controller.is_fullscreen());
    assert_eq!(
        platform.fullscreen_element(),
        Some(ElementId::new("viewer-container"))
    );
}

#[tokio::test]
async fn test_rejected_exit_is_ignored() {
    let platform = SimulatedPlatform::new();
    let controller = controller(&platform);
    controller.activate();
    controller.toggle().await;
    platform.set_reject_fullscreen(true);

    assert_eq!(controller.toggle().await, ToggleAction::Exit);
    assert!(controller.is_fullscreen());
}

// ============================================================================
// SURFACE TESTS
// ============================================================================

#[tokio::test]
async fn test_surface_follows_session() {
    let platform = SimulatedPlatform::new()
        .with_camera("cam-a", "Camera A")
        .with_camera("cam-b", "Camera B");
    let shared = Rc::new(platform.clone());
    let session = CaptureSession::new(shared.clone(), Arc::new(SessionStats::new()));
    let surface = ViewSurface::new(shared, ElementId::new("viewer-video"));
    session.activate();

    session
        .set_target(CaptureTarget::new("cam-a", ResolutionOption::HD))
        .await
        .unwrap();
    surface.sync(&session);
    assert_eq!(
        platform.attached_stream(&ElementId::new("viewer-video")),
        session.active_stream_id()
    );
    assert!(surface.appearance(false).show_fullscreen_toggle);

    session
        .set_target(CaptureTarget::new("cam-b", ResolutionOption::HD))
        .await
        .unwrap();
    surface.sync(&session);
    assert_eq!(surface.bound_stream_id(), session.active_stream_id());

    session.deactivate();
    surface.sync(&session);
    let appearance = surface.appearance(false);
    assert!(!appearance.has_stream);
    assert_eq!(appearance.placeholder, Some(NO_STREAM_PLACEHOLDER));
    assert_eq!(platform.attached_stream(&ElementId::new("viewer-video")), None);
    assert_eq!(platform.live_track_count(), 0);
}
