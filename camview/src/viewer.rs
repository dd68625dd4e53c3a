//! Presentation shell composing the viewer components

use crate::config::ViewerConfig;
use crate::event::{EventStream, ViewerEvent};
use camview_core::{
    CaptureTarget, DisplayPlatform, MediaPlatform, ResolutionOption, ViewerError, ViewerResult,
};
use camview_diagnostics::{SessionStats, SessionStatsSnapshot};
use camview_media::{
    CaptureSession, CatalogState, CommitOutcome, DeviceCatalog, FullscreenController, SessionStatus,
    SurfaceAppearance, ToggleAction, ViewSurface,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::rc::Rc;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// One entry of the device selector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceEntry {
    /// Device identifier
    pub id: String,
    /// Label, or `Camera N` when the platform gave none
    pub name: String,
}

/// One entry of the resolution selector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionEntry {
    /// Selector index
    pub index: usize,
    /// Short label
    pub label: &'static str,
    /// Preferred width
    pub width: u32,
    /// Preferred height
    pub height: u32,
}

/// Everything needed to render the viewer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerSnapshot {
    /// Device selector entries
    pub devices: Vec<DeviceEntry>,
    /// Selected device identifier
    pub selected_device: Option<String>,
    /// Resolution selector entries
    pub resolutions: Vec<ResolutionEntry>,
    /// Selected resolution index
    pub selected_resolution: usize,
    /// Error banner text
    pub banner: Option<String>,
    /// Whether the selectors should be shown disabled
    pub controls_disabled: bool,
    /// Video surface state
    pub surface: SurfaceAppearance,
    /// Mirrored fullscreen flag
    pub fullscreen: bool,
    /// Capture session state name
    pub session_state: &'static str,
}

impl ViewerSnapshot {
    /// JSON form for hosts that render outside Rust
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

struct ShellState {
    active: bool,
    resolution_index: usize,
    banner: Option<ViewerError>,
}

/// Camera viewer: device selector, resolution selector, error banner and
/// video surface over one host platform
///
/// # Example
/// ```rust,no_run
/// use camview::{CameraViewer, SimulatedPlatform, ViewerConfig};
/// use std::rc::Rc;
///
/// # async fn example() -> Result<(), camview::ViewerError> {
/// let platform = Rc::new(SimulatedPlatform::new().with_camera("cam-1", "Webcam"));
/// let viewer = CameraViewer::new(platform, ViewerConfig::default())?;
/// viewer.activate().await?;
/// viewer.select_resolution(2).await?;
/// println!("{:?}", viewer.snapshot());
/// viewer.deactivate();
/// # Ok(())
/// # }
/// ```
pub struct CameraViewer<P: MediaPlatform + DisplayPlatform> {
    config: ViewerConfig,
    stats: Arc<SessionStats>,
    events: broadcast::Sender<ViewerEvent>,
    catalog: DeviceCatalog<P>,
    session: CaptureSession<P>,
    surface: ViewSurface<P>,
    fullscreen: FullscreenController<P>,
    shell: Mutex<ShellState>,
}

impl<P: MediaPlatform + DisplayPlatform> CameraViewer<P> {
    /// Build a viewer; nothing touches the platform until [`activate`](Self::activate)
    pub fn new(platform: Rc<P>, config: ViewerConfig) -> ViewerResult<Self> {
        config.validate()?;

        let stats = Arc::new(SessionStats::new());
        let (events, _) = broadcast::channel(config.event_capacity);

        let notify = events.clone();
        let fullscreen = FullscreenController::new(
            platform.clone(),
            config.container_element(),
            stats.clone(),
        )
        .with_notifier(move |fullscreen| {
            let _ = notify.send(ViewerEvent::FullscreenChanged { fullscreen });
        });

        Ok(Self {
            catalog: DeviceCatalog::new(platform.clone(), stats.clone()),
            session: CaptureSession::new(platform.clone(), stats.clone()),
            surface: ViewSurface::new(platform, config.surface_element()),
            fullscreen,
            shell: Mutex::new(ShellState {
                active: false,
                resolution_index: config.default_resolution_index,
                banner: None,
            }),
            config,
            stats,
            events,
        })
    }

    /// Start listening for fullscreen changes, discover cameras and start
    /// the default camera at the configured resolution
    ///
    /// Discovery and start failures are returned and also kept as the
    /// banner error of the [`snapshot`](Self::snapshot). Activating again
    /// after a terminal discovery failure returns that failure.
    pub async fn activate(&self) -> ViewerResult<()> {
        {
            let mut shell = self.shell.lock();
            if shell.active {
                match self.catalog.state() {
                    CatalogState::Failed(error) => return Err(error),
                    // A previous activation was dropped before discovery finished
                    CatalogState::Uninitialized => {}
                    CatalogState::Probing | CatalogState::Ready { .. } => return Ok(()),
                }
            }
            shell.active = true;
        }
        info!("🚀 Activating camera viewer");

        self.fullscreen.activate();
        self.session.activate();

        match self.catalog.activate().await {
            Ok(devices) => {
                self.emit(ViewerEvent::CatalogReady { devices });
            }
            Err(error) => {
                self.shell.lock().banner = Some(error.clone());
                self.emit(ViewerEvent::CatalogFailed {
                    error: error.clone(),
                });
                return Err(error);
            }
        }

        self.apply_selection().await
    }

    /// Switch to another camera
    pub async fn select_device(&self, device_id: &str) -> ViewerResult<()> {
        let device = self.catalog.select(device_id)?;
        self.emit(ViewerEvent::DeviceSelected {
            device_id: device.id().to_string(),
        });
        self.apply_selection().await
    }

    /// Switch to another entry of the resolution set
    pub async fn select_resolution(&self, index: usize) -> ViewerResult<()> {
        let resolution = ResolutionOption::by_index(index)?;
        self.shell.lock().resolution_index = index;
        self.emit(ViewerEvent::ResolutionSelected { resolution });

        if self.catalog.selected().is_none() {
            debug!("No camera selected yet, keeping {} for later", resolution);
            return Ok(());
        }
        self.apply_selection().await
    }

    /// Enter or leave fullscreen
    pub async fn toggle_fullscreen(&self) -> ToggleAction {
        self.fullscreen.toggle().await
    }

    /// Release the camera and stop listening to the platform
    pub fn deactivate(&self) {
        let released = self.session.active_stream_id();
        self.fullscreen.deactivate();
        self.surface.deactivate();
        self.session.deactivate();
        self.shell.lock().active = false;

        if let Some(stream_id) = released {
            self.emit(ViewerEvent::StreamStopped { stream_id });
        }
        info!("👋 Camera viewer deactivated");
    }

    async fn apply_selection(&self) -> ViewerResult<()> {
        let Some(device) = self.catalog.selected() else {
            return Ok(());
        };
        let resolution = ResolutionOption::by_index(self.shell.lock().resolution_index)?;
        let target = CaptureTarget::new(device.id(), resolution);

        let replacing = match self.session.state() {
            SessionStatus::Active {
                target: current,
                stream_id,
                ..
            } => {
                if current == target {
                    return Ok(());
                }
                Some(stream_id)
            }
            _ => None,
        };
        self.surface.bind(None);
        if let Some(stream_id) = replacing {
            self.emit(ViewerEvent::StreamStopped { stream_id });
        }

        match self.session.set_target(target.clone()).await {
            Ok(CommitOutcome::Committed) => {
                self.surface.sync(&self.session);
                self.shell.lock().banner = None;
                if let Some(stream_id) = self.session.active_stream_id() {
                    self.emit(ViewerEvent::StreamStarted {
                        target,
                        stream_id,
                        settings: self.session.active_settings(),
                    });
                }
                Ok(())
            }
            Ok(CommitOutcome::Unchanged) => Ok(()),
            Ok(CommitOutcome::Superseded) => {
                self.emit(ViewerEvent::StaleResultDiscarded { target });
                Ok(())
            }
            Err(error) if error.is_banner_error() => {
                self.surface.sync(&self.session);
                self.shell.lock().banner = Some(error.clone());
                warn!("Camera stream unavailable: {}", error);
                self.emit(ViewerEvent::StreamFailed {
                    target,
                    error: error.clone(),
                });
                Err(error)
            }
            Err(error) => Err(error),
        }
    }

    fn emit(&self, event: ViewerEvent) {
        debug!("📡 Viewer event: {}", event.event_type());
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Renderable state of the whole viewer
    pub fn snapshot(&self) -> ViewerSnapshot {
        let (resolution_index, banner) = {
            let shell = self.shell.lock();
            (shell.resolution_index, shell.banner.clone())
        };
        let banner_active = banner.is_some();

        ViewerSnapshot {
            devices: self
                .catalog
                .devices()
                .iter()
                .enumerate()
                .map(|(position, device)| DeviceEntry {
                    id: device.id().to_string(),
                    name: device.display_name(position),
                })
                .collect(),
            selected_device: self.catalog.selected().map(|device| device.id().to_string()),
            resolutions: ResolutionOption::ALL
                .iter()
                .enumerate()
                .map(|(index, option)| ResolutionEntry {
                    index,
                    label: option.label,
                    width: option.width,
                    height: option.height,
                })
                .collect(),
            selected_resolution: resolution_index,
            banner: banner.as_ref().map(ViewerError::user_message),
            controls_disabled: banner_active,
            surface: self.surface.appearance(banner_active),
            fullscreen: self.fullscreen.is_fullscreen(),
            session_state: self.session.state_name(),
        }
    }

    /// Subscribe to viewer events
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    /// Lifecycle counters
    pub fn stats(&self) -> SessionStatsSnapshot {
        self.stats.snapshot()
    }

    /// Configuration the viewer was built with
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Current capture session state
    pub fn session_status(&self) -> SessionStatus {
        self.session.state()
    }

    /// Error currently shown in the banner
    pub fn banner_error(&self) -> Option<ViewerError> {
        self.shell.lock().banner.clone()
    }

    /// Whether the viewer is active
    pub fn is_active(&self) -> bool {
        self.shell.lock().active
    }
}
