//! In-memory host platform
//!
//! Behaves like a browser for the purposes of the viewer: device labels stay
//! empty until a stream was granted once, exact-device requests for unknown
//! cameras are overconstrained, and resolution preferences are clamped to
//! what a camera supports. Stream requests can complete immediately or be
//! held until the caller releases them, and fullscreen-change notifications
//! can be delivered immediately or queued.

use async_trait::async_trait;
use camview_core::{
    DeviceKind, DisplayPlatform, ElementId, FullscreenListener, ListenerHandle, MediaDeviceInfo,
    MediaPlatform, MediaStreamHandle, PlatformError, StreamConstraints, StreamSettings,
};
use futures::channel::oneshot;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use tracing::debug;
use uuid::Uuid;

/// Resolution delivered for a probe when a camera declares no limit
const PROBE_SETTINGS: StreamSettings = StreamSettings {
    width: 640,
    height: 480,
};

/// When stream requests resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Resolve inside the request call
    Immediate,
    /// Hold until [`SimulatedPlatform::complete_request`] or a sibling is called
    Manual,
}

/// When fullscreen-change listeners run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationDelivery {
    /// Synchronously with the change
    Immediate,
    /// Queued until [`SimulatedPlatform::deliver_fullscreen_changes`]
    Deferred,
}

/// One track of a simulated stream
#[derive(Debug, Clone)]
pub struct SimulatedTrack {
    id: String,
    live: Rc<Cell<bool>>,
}

impl SimulatedTrack {
    /// Track id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the track still holds the camera
    pub fn is_live(&self) -> bool {
        self.live.get()
    }

    /// Stop the track; returns whether it was live
    pub fn stop(&self) -> bool {
        self.live.replace(false)
    }
}

/// Stream handed out by [`SimulatedPlatform`]
#[derive(Debug)]
pub struct SimulatedStream {
    id: String,
    device_id: String,
    tracks: Vec<SimulatedTrack>,
    settings: StreamSettings,
}

impl SimulatedStream {
    /// Camera the stream was opened on
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Tracks of the stream
    pub fn tracks(&self) -> &[SimulatedTrack] {
        &self.tracks
    }
}

impl MediaStreamHandle for SimulatedStream {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn live_track_count(&self) -> usize {
        self.tracks.iter().filter(|track| track.is_live()).count()
    }

    fn stop_all_tracks(&self) -> usize {
        self.tracks.iter().filter(|track| track.stop()).count()
    }

    fn settings(&self) -> Option<StreamSettings> {
        Some(self.settings)
    }
}

#[derive(Debug, Clone)]
struct SimulatedDevice {
    info: MediaDeviceInfo,
    max_resolution: Option<StreamSettings>,
}

type StreamResult = Result<SimulatedStream, PlatformError>;

struct PendingRequest {
    constraints: StreamConstraints,
    responder: oneshot::Sender<StreamResult>,
}

/// Receiving end of a held request
///
/// A stream delivered after the caller stopped polling is still stopped.
struct PendingResponse(oneshot::Receiver<StreamResult>);

impl Drop for PendingResponse {
    fn drop(&mut self) {
        if let Ok(Some(Ok(orphan))) = self.0.try_recv() {
            orphan.stop_all_tracks();
        }
    }
}

type SharedListener = Rc<dyn Fn(Option<ElementId>)>;

struct SimulatedState {
    devices: Vec<SimulatedDevice>,
    capture_supported: bool,
    permission_granted: bool,
    permission_used: bool,
    enumeration_error: Option<PlatformError>,
    failing_devices: HashMap<String, PlatformError>,
    completion: Completion,
    pending: VecDeque<PendingRequest>,
    issued_tracks: Vec<Rc<Cell<bool>>>,
    issued_streams: usize,
    request_log: Vec<StreamConstraints>,
    attached: HashMap<ElementId, Option<String>>,
    fullscreen: Option<ElementId>,
    reject_fullscreen: bool,
    delivery: NotificationDelivery,
    queued_notifications: VecDeque<Option<ElementId>>,
    listeners: Vec<(u64, SharedListener)>,
    next_listener_id: u64,
}

impl SimulatedState {
    fn new() -> Self {
        Self {
            devices: Vec::new(),
            capture_supported: true,
            permission_granted: true,
            permission_used: false,
            enumeration_error: None,
            failing_devices: HashMap::new(),
            completion: Completion::Immediate,
            pending: VecDeque::new(),
            issued_tracks: Vec::new(),
            issued_streams: 0,
            request_log: Vec::new(),
            attached: HashMap::new(),
            fullscreen: None,
            reject_fullscreen: false,
            delivery: NotificationDelivery::Immediate,
            queued_notifications: VecDeque::new(),
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    fn resolve(&mut self, constraints: &StreamConstraints) -> StreamResult {
        if !self.capture_supported {
            return Err(PlatformError::NotSupported {
                message: "mediaDevices is not available".to_string(),
            });
        }
        if !self.permission_granted {
            return Err(PlatformError::NotAllowed {
                message: "Permission denied".to_string(),
            });
        }

        let mut cameras = self
            .devices
            .iter()
            .filter(|device| device.info.kind == DeviceKind::VideoInput);

        let (device_id, settings) = match constraints {
            StreamConstraints::Probe => {
                let device = cameras.next().ok_or_else(|| PlatformError::NotFound {
                    message: "Requested device not found".to_string(),
                })?;
                (
                    device.info.device_id.clone(),
                    device.max_resolution.unwrap_or(PROBE_SETTINGS),
                )
            }
            StreamConstraints::Target {
                device_id,
                ideal_width,
                ideal_height,
            } => {
                if let Some(error) = self.failing_devices.get(device_id) {
                    return Err(error.clone());
                }
                let device = cameras
                    .find(|device| &device.info.device_id == device_id)
                    .ok_or_else(|| PlatformError::Overconstrained {
                        constraint: "deviceId".to_string(),
                    })?;
                let settings = match device.max_resolution {
                    Some(max) => StreamSettings {
                        width: (*ideal_width).min(max.width),
                        height: (*ideal_height).min(max.height),
                    },
                    None => StreamSettings {
                        width: *ideal_width,
                        height: *ideal_height,
                    },
                };
                (device.info.device_id.clone(), settings)
            }
        };

        Ok(self.issue_stream(device_id, settings))
    }

    fn issue_stream(&mut self, device_id: String, settings: StreamSettings) -> SimulatedStream {
        let live = Rc::new(Cell::new(true));
        self.issued_tracks.push(live.clone());
        self.issued_streams += 1;
        self.permission_used = true;

        let stream = SimulatedStream {
            id: Uuid::new_v4().to_string(),
            device_id,
            tracks: vec![SimulatedTrack {
                id: Uuid::new_v4().to_string(),
                live,
            }],
            settings,
        };
        debug!(
            "🎬 Simulated stream {} opened on {} ({}x{})",
            stream.id, stream.device_id, settings.width, settings.height
        );
        stream
    }
}

/// Scriptable platform for tests and demos
#[derive(Clone)]
pub struct SimulatedPlatform {
    state: Rc<RefCell<SimulatedState>>,
}

impl SimulatedPlatform {
    /// Platform with capture support, granted permission and no devices
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SimulatedState::new())),
        }
    }

    /// Add a camera
    pub fn with_camera(self, device_id: &str, label: &str) -> Self {
        self.push_device(MediaDeviceInfo::video_input(device_id, label), None);
        self
    }

    /// Add a camera that cannot exceed `width` x `height`
    pub fn with_limited_camera(self, device_id: &str, label: &str, width: u32, height: u32) -> Self {
        self.push_device(
            MediaDeviceInfo::video_input(device_id, label),
            Some(StreamSettings { width, height }),
        );
        self
    }

    /// Add a microphone, which the catalog must ignore
    pub fn with_microphone(self, device_id: &str, label: &str) -> Self {
        self.push_device(MediaDeviceInfo::audio_input(device_id, label), None);
        self
    }

    /// Refuse every stream request with `NotAllowed`
    pub fn deny_permission(self) -> Self {
        self.state.borrow_mut().permission_granted = false;
        self
    }

    /// Pretend the host has no media capture at all
    pub fn without_capture_support(self) -> Self {
        self.state.borrow_mut().capture_supported = false;
        self
    }

    /// Make enumeration fail
    pub fn with_enumeration_error(self, error: PlatformError) -> Self {
        self.state.borrow_mut().enumeration_error = Some(error);
        self
    }

    /// Make requests for one camera fail
    pub fn with_failing_device(self, device_id: &str, error: PlatformError) -> Self {
        self.state
            .borrow_mut()
            .failing_devices
            .insert(device_id.to_string(), error);
        self
    }

    /// Hold stream requests until released
    pub fn manual_completion(self) -> Self {
        self.state.borrow_mut().completion = Completion::Manual;
        self
    }

    /// Queue fullscreen-change notifications
    pub fn deferred_fullscreen_events(self) -> Self {
        self.state.borrow_mut().delivery = NotificationDelivery::Deferred;
        self
    }

    /// Switch request completion mode at runtime
    pub fn set_completion(&self, completion: Completion) {
        self.state.borrow_mut().completion = completion;
    }

    /// Refuse fullscreen requests and exits
    pub fn set_reject_fullscreen(&self, reject: bool) {
        self.state.borrow_mut().reject_fullscreen = reject;
    }

    fn push_device(&self, info: MediaDeviceInfo, max_resolution: Option<StreamSettings>) {
        self.state.borrow_mut().devices.push(SimulatedDevice {
            info,
            max_resolution,
        });
    }

    /// Stream requests waiting to be released
    pub fn pending_requests(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Constraints of the waiting requests, oldest first
    pub fn pending_constraints(&self) -> Vec<StreamConstraints> {
        self.state
            .borrow()
            .pending
            .iter()
            .map(|request| request.constraints.clone())
            .collect()
    }

    /// Resolve the waiting request at `index` as the platform would
    pub fn complete_request(&self, index: usize) -> bool {
        let (request, outcome) = {
            let mut state = self.state.borrow_mut();
            let Some(request) = state.pending.remove(index) else {
                return false;
            };
            let outcome = state.resolve(&request.constraints);
            (request, outcome)
        };
        Self::respond(request, outcome);
        true
    }

    /// Resolve the oldest waiting request
    pub fn complete_oldest(&self) -> bool {
        self.complete_request(0)
    }

    /// Resolve the newest waiting request
    pub fn complete_newest(&self) -> bool {
        match self.pending_requests() {
            0 => false,
            count => self.complete_request(count - 1),
        }
    }

    /// Fail the waiting request at `index`
    pub fn fail_request(&self, index: usize, error: PlatformError) -> bool {
        let request = self.state.borrow_mut().pending.remove(index);
        match request {
            Some(request) => {
                Self::respond(request, Err(error));
                true
            }
            None => false,
        }
    }

    fn respond(request: PendingRequest, outcome: StreamResult) {
        // Receiver gone: nobody will ever stop these tracks.
        if let Err(Ok(orphan)) = request.responder.send(outcome) {
            orphan.stop_all_tracks();
        }
    }

    /// Tracks still holding a camera, across every stream ever issued
    pub fn live_track_count(&self) -> usize {
        self.state
            .borrow()
            .issued_tracks
            .iter()
            .filter(|live| live.get())
            .count()
    }

    /// Streams issued so far, probes included
    pub fn issued_stream_count(&self) -> usize {
        self.state.borrow().issued_streams
    }

    /// Every stream request seen, in order
    pub fn request_log(&self) -> Vec<StreamConstraints> {
        self.state.borrow().request_log.clone()
    }

    /// Stream id currently bound to a surface
    pub fn attached_stream(&self, surface: &ElementId) -> Option<String> {
        self.state
            .borrow()
            .attached
            .get(surface)
            .cloned()
            .flatten()
    }

    /// Registered fullscreen-change listeners
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Leave fullscreen the way a user pressing escape does
    pub fn simulate_user_exit(&self) {
        let in_fullscreen = self.state.borrow().fullscreen.is_some();
        if in_fullscreen {
            self.set_fullscreen(None);
        }
    }

    /// Run queued fullscreen-change listeners; returns how many notifications ran
    pub fn deliver_fullscreen_changes(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.state.borrow_mut().queued_notifications.pop_front();
            match next {
                Some(element) => {
                    self.notify(element);
                    delivered += 1;
                }
                None => return delivered,
            }
        }
    }

    fn set_fullscreen(&self, element: Option<ElementId>) {
        let deliver_now = {
            let mut state = self.state.borrow_mut();
            state.fullscreen = element.clone();
            match state.delivery {
                NotificationDelivery::Immediate => true,
                NotificationDelivery::Deferred => {
                    state.queued_notifications.push_back(element.clone());
                    false
                }
            }
        };
        if deliver_now {
            self.notify(element);
        }
    }

    fn notify(&self, element: Option<ElementId>) {
        let listeners: Vec<SharedListener> = self
            .state
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(element.clone());
        }
    }
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimulatedPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SimulatedPlatform")
            .field("devices", &state.devices.len())
            .field("capture_supported", &state.capture_supported)
            .field("permission_granted", &state.permission_granted)
            .field("pending", &state.pending.len())
            .field("fullscreen", &state.fullscreen)
            .finish()
    }
}

#[async_trait(?Send)]
impl MediaPlatform for SimulatedPlatform {
    type Stream = SimulatedStream;

    fn supports_capture(&self) -> bool {
        self.state.borrow().capture_supported
    }

    async fn request_stream(&self, constraints: &StreamConstraints) -> StreamResult {
        let receiver = {
            let mut state = self.state.borrow_mut();
            state.request_log.push(constraints.clone());
            match state.completion {
                Completion::Immediate => return state.resolve(constraints),
                Completion::Manual => {
                    let (responder, receiver) = oneshot::channel();
                    state.pending.push_back(PendingRequest {
                        constraints: constraints.clone(),
                        responder,
                    });
                    receiver
                }
            }
        };

        let mut pending = PendingResponse(receiver);
        (&mut pending.0).await.unwrap_or_else(|_| {
            Err(PlatformError::Aborted {
                message: "request dropped".to_string(),
            })
        })
    }

    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, PlatformError> {
        let state = self.state.borrow();
        if !state.capture_supported {
            return Err(PlatformError::NotSupported {
                message: "mediaDevices is not available".to_string(),
            });
        }
        if let Some(error) = &state.enumeration_error {
            return Err(error.clone());
        }

        let reveal_labels = state.permission_used;
        Ok(state
            .devices
            .iter()
            .map(|device| MediaDeviceInfo {
                device_id: device.info.device_id.clone(),
                label: if reveal_labels {
                    device.info.label.clone()
                } else {
                    String::new()
                },
                kind: device.info.kind,
            })
            .collect())
    }

    fn attach_stream(&self, surface: &ElementId, stream: Option<&SimulatedStream>) {
        self.state
            .borrow_mut()
            .attached
            .insert(surface.clone(), stream.map(|stream| stream.id.clone()));
    }
}

#[async_trait(?Send)]
impl DisplayPlatform for SimulatedPlatform {
    fn fullscreen_element(&self) -> Option<ElementId> {
        self.state.borrow().fullscreen.clone()
    }

    async fn request_fullscreen(&self, element: &ElementId) -> Result<(), PlatformError> {
        {
            let state = self.state.borrow();
            if state.reject_fullscreen {
                return Err(PlatformError::NotAllowed {
                    message: "fullscreen request denied".to_string(),
                });
            }
            if state.fullscreen.as_ref() == Some(element) {
                return Ok(());
            }
        }
        self.set_fullscreen(Some(element.clone()));
        Ok(())
    }

    async fn exit_fullscreen(&self) -> Result<(), PlatformError> {
        {
            let state = self.state.borrow();
            if state.reject_fullscreen {
                return Err(PlatformError::NotAllowed {
                    message: "fullscreen exit denied".to_string(),
                });
            }
            if state.fullscreen.is_none() {
                return Err(PlatformError::Other {
                    message: "document is not in fullscreen".to_string(),
                });
            }
        }
        self.set_fullscreen(None);
        Ok(())
    }

    fn on_fullscreen_change(&self, listener: FullscreenListener) -> ListenerHandle {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_listener_id;
            state.next_listener_id += 1;
            state.listeners.push((id, SharedListener::from(listener)));
            id
        };

        let state = Rc::downgrade(&self.state);
        ListenerHandle::new(move || {
            if let Some(state) = state.upgrade() {
                state
                    .borrow_mut()
                    .listeners
                    .retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }
}
