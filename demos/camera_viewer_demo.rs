//! Camera Viewer Demo
//!
//! Drives the full viewer lifecycle against the in-memory platform: camera
//! discovery, switching cameras and resolutions, an overlapping switch whose
//! first result arrives late, fullscreen toggling and teardown.

use anyhow::Context;
use camview::{
    CameraViewer, Completion, EventFilter, FilteredEventStream, SimulatedPlatform, ViewerConfig,
    ViewerSnapshot,
};
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("🎥 camview Camera Viewer Demo");
    println!("=============================");

    let platform = SimulatedPlatform::new()
        .with_camera("front", "Front Camera")
        .with_limited_camera("usb", "", 1920, 1080)
        .with_microphone("mic", "Built-in Microphone");
    let config = ViewerConfig::default()
        .container("player")
        .surface("player-video");
    let viewer = CameraViewer::new(Rc::new(platform.clone()), config)
        .context("building the viewer")?;
    let mut events = FilteredEventStream::new(viewer.subscribe(), EventFilter::all());

    // Demo 1: Discovery and default camera
    println!("\n📋 Demo 1: Discovery");
    viewer.activate().await.context("activating the viewer")?;
    print_snapshot(&viewer.snapshot());

    // Demo 2: Camera and resolution changes
    println!("\n📹 Demo 2: Switching camera and resolution");
    viewer.select_device("usb").await?;
    viewer.select_resolution(3).await?;
    println!(
        "   Requested 4K, platform delivered {:?}",
        viewer.session_status()
    );

    // Demo 3: Overlapping switches
    println!("\n⏱️  Demo 3: Overlapping switches, first result arrives last");
    platform.set_completion(Completion::Manual);
    let release = async {
        while platform.pending_requests() < 2 {
            tokio::task::yield_now().await;
        }
        platform.complete_newest();
        tokio::task::yield_now().await;
        platform.complete_oldest();
    };
    let (first, second, ()) = tokio::join!(
        viewer.select_device("front"),
        viewer.select_resolution(0),
        release
    );
    first?;
    second?;
    platform.set_completion(Completion::Immediate);
    println!("   Live tracks after the race: {}", platform.live_track_count());

    // Demo 4: Fullscreen
    println!("\n🖥️  Demo 4: Fullscreen");
    viewer.toggle_fullscreen().await;
    println!("   Fullscreen: {}", viewer.snapshot().fullscreen);
    platform.simulate_user_exit();
    println!("   After escape: {}", viewer.snapshot().fullscreen);

    // Demo 5: Teardown
    println!("\n🛑 Demo 5: Teardown");
    viewer.deactivate();
    print_snapshot(&viewer.snapshot());
    println!("   Live tracks: {}", platform.live_track_count());

    println!("\n📡 Events:");
    while let Ok(Some(event)) = events.try_next() {
        println!("   • {}", event.event_type());
    }
    println!("\n📊 Stats: {}", viewer.stats().to_json());

    println!("\n✨ Camera viewer demo completed!");
    Ok(())
}

fn print_snapshot(snapshot: &ViewerSnapshot) {
    for device in &snapshot.devices {
        let marker = if snapshot.selected_device.as_deref() == Some(device.id.as_str()) {
            "▶"
        } else {
            " "
        };
        println!("   {} {} ({})", marker, device.name, device.id);
    }
    let resolution = &snapshot.resolutions[snapshot.selected_resolution];
    println!("   Resolution: {} ({}x{})", resolution.label, resolution.width, resolution.height);
    if let Some(banner) = &snapshot.banner {
        println!("   ⚠️  {}", banner);
    }
    println!(
        "   Session: {}, surface opacity {}",
        snapshot.session_state, snapshot.surface.opacity
    );
}
