//! Browser platform (WASM)
//!
//! Binds the viewer to `navigator.mediaDevices`, the `<video>` element's
//! `srcObject` and the document Fullscreen API through `web-sys`.

use async_trait::async_trait;
use camview_core::{
    DeviceKind, DisplayPlatform, ElementId, FullscreenListener, ListenerHandle, MediaDeviceInfo,
    MediaPlatform, MediaStreamHandle, PlatformError, StreamConstraints, StreamSettings,
};
use js_sys::{Array, Function, Object, Promise, Reflect};
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, DomException, HtmlMediaElement, MediaDeviceKind, MediaDevices, MediaStream,
    MediaStreamConstraints, MediaStreamTrack, MediaStreamTrackState, Window,
};

const FULLSCREEN_CHANGE: &str = "fullscreenchange";

fn platform_error(value: JsValue) -> PlatformError {
    match value.dyn_ref::<DomException>() {
        Some(exception) => PlatformError::from_dom_exception(&exception.name(), &exception.message()),
        None => PlatformError::Other {
            message: value
                .as_string()
                .unwrap_or_else(|| format!("{:?}", value)),
        },
    }
}

/// Call a promise-returning method such as `requestFullscreen` and wait for it
///
/// Engines that still return `undefined` are treated as having accepted the
/// call.
async fn call_and_settle(target: &JsValue, method: &str) -> Result<(), PlatformError> {
    let function = Reflect::get(target, &JsValue::from_str(method))
        .map_err(platform_error)?
        .dyn_into::<Function>()
        .map_err(|_| PlatformError::NotSupported {
            message: format!("{} is not available", method),
        })?;
    let returned = function.call0(target).map_err(platform_error)?;
    match returned.dyn_into::<Promise>() {
        Ok(promise) => JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(platform_error),
        Err(_) => Ok(()),
    }
}

/// `getUserMedia` promise that is still owed to a caller
///
/// Dropped before it was settled, it hooks the promise so the stream the
/// browser eventually grants is stopped instead of keeping the camera lit.
struct PendingStream {
    promise: Option<Promise>,
}

impl PendingStream {
    fn new(promise: &Promise) -> Self {
        Self {
            promise: Some(promise.clone()),
        }
    }

    fn settle(&mut self) {
        self.promise = None;
    }
}

impl Drop for PendingStream {
    fn drop(&mut self) {
        let Some(promise) = self.promise.take() else {
            return;
        };
        let release = Closure::once_into_js(|value: JsValue| {
            if let Ok(stream) = value.dyn_into::<MediaStream>() {
                let stopped = WebStream { stream }.stop_all_tracks();
                debug!("Released {} track(s) of an abandoned stream request", stopped);
            }
        });
        let ignore = Function::new_no_args("");
        let then = Reflect::get(&promise, &JsValue::from_str("then"))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok());
        match then {
            Some(then) => {
                if let Err(error) = then.call2(&promise, &release, &ignore) {
                    warn!("Could not release abandoned stream request: {:?}", error);
                }
            }
            None => warn!("Abandoned stream request is not a thenable"),
        }
    }
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), PlatformError> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(platform_error)
}

fn video_constraints(constraints: &StreamConstraints) -> Result<JsValue, PlatformError> {
    match constraints {
        StreamConstraints::Probe => Ok(JsValue::TRUE),
        StreamConstraints::Target {
            device_id,
            ideal_width,
            ideal_height,
        } => {
            let exact = Object::new();
            set(&exact, "exact", &JsValue::from_str(device_id))?;
            let width = Object::new();
            set(&width, "ideal", &JsValue::from(*ideal_width))?;
            let height = Object::new();
            set(&height, "ideal", &JsValue::from(*ideal_height))?;

            let video = Object::new();
            set(&video, "deviceId", &exact)?;
            set(&video, "width", &width)?;
            set(&video, "height", &height)?;
            Ok(video.into())
        }
    }
}

/// A `MediaStream` obtained from `getUserMedia`
#[derive(Debug, Clone)]
pub struct WebStream {
    stream: MediaStream,
}

impl WebStream {
    fn tracks(&self) -> Vec<MediaStreamTrack> {
        self.stream
            .get_tracks()
            .iter()
            .filter_map(|value| value.dyn_into::<MediaStreamTrack>().ok())
            .collect()
    }

    /// Underlying browser stream
    pub fn media_stream(&self) -> &MediaStream {
        &self.stream
    }
}

impl MediaStreamHandle for WebStream {
    fn id(&self) -> String {
        self.stream.id()
    }

    fn live_track_count(&self) -> usize {
        self.tracks()
            .iter()
            .filter(|track| track.ready_state() == MediaStreamTrackState::Live)
            .count()
    }

    fn stop_all_tracks(&self) -> usize {
        let mut stopped = 0;
        for track in self.tracks() {
            if track.ready_state() == MediaStreamTrackState::Live {
                stopped += 1;
            }
            track.stop();
        }
        stopped
    }

    fn settings(&self) -> Option<StreamSettings> {
        let track = self.tracks().into_iter().find(|track| track.kind() == "video")?;
        let settings = track.get_settings();
        let dimension = |key: &str| {
            Reflect::get(&settings, &JsValue::from_str(key))
                .ok()
                .and_then(|value| value.as_f64())
                .map(|value| value as u32)
        };
        Some(StreamSettings {
            width: dimension("width")?,
            height: dimension("height")?,
        })
    }
}

/// Platform backed by the page the viewer runs in
#[derive(Debug, Clone)]
pub struct WebPlatform {
    window: Window,
    document: Document,
}

impl WebPlatform {
    /// Bind to the current window
    pub fn new() -> Result<Self, PlatformError> {
        let window = web_sys::window().ok_or_else(|| PlatformError::NotSupported {
            message: "no window".to_string(),
        })?;
        let document = window.document().ok_or_else(|| PlatformError::NotSupported {
            message: "no document".to_string(),
        })?;
        Ok(Self { window, document })
    }

    fn media_devices(&self) -> Result<MediaDevices, PlatformError> {
        let navigator = self.window.navigator();
        let present = Reflect::has(&navigator, &JsValue::from_str("mediaDevices")).unwrap_or(false);
        if !present {
            return Err(PlatformError::NotSupported {
                message: "navigator.mediaDevices is not available".to_string(),
            });
        }
        navigator.media_devices().map_err(platform_error)
    }
}

#[async_trait(?Send)]
impl MediaPlatform for WebPlatform {
    type Stream = WebStream;

    fn supports_capture(&self) -> bool {
        self.media_devices().is_ok()
    }

    async fn request_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<WebStream, PlatformError> {
        let media_devices = self.media_devices()?;

        let request = MediaStreamConstraints::new();
        request.set_audio(&JsValue::FALSE);
        request.set_video(&video_constraints(constraints)?);

        let promise = media_devices
            .get_user_media_with_constraints(&request)
            .map_err(platform_error)?;
        let mut pending = PendingStream::new(&promise);
        let value = JsFuture::from(promise).await;
        pending.settle();
        let stream = value
            .map_err(platform_error)?
            .dyn_into::<MediaStream>()
            .map_err(|_| PlatformError::Other {
                message: "getUserMedia did not return a MediaStream".to_string(),
            })?;

        debug!("🎥 Browser stream {} acquired", stream.id());
        Ok(WebStream { stream })
    }

    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, PlatformError> {
        let media_devices = self.media_devices()?;
        let promise = media_devices.enumerate_devices().map_err(platform_error)?;
        let value = JsFuture::from(promise).await.map_err(platform_error)?;

        let devices = Array::from(&value)
            .iter()
            .filter_map(|entry| entry.dyn_into::<web_sys::MediaDeviceInfo>().ok())
            .filter_map(|info| {
                let kind = match info.kind() {
                    MediaDeviceKind::Videoinput => DeviceKind::VideoInput,
                    MediaDeviceKind::Audioinput => DeviceKind::AudioInput,
                    MediaDeviceKind::Audiooutput => DeviceKind::AudioOutput,
                    _ => return None,
                };
                Some(MediaDeviceInfo {
                    device_id: info.device_id(),
                    label: info.label(),
                    kind,
                })
            })
            .collect();
        Ok(devices)
    }

    fn attach_stream(&self, surface: &ElementId, stream: Option<&WebStream>) {
        let element = self
            .document
            .get_element_by_id(surface.as_str())
            .and_then(|element| element.dyn_into::<HtmlMediaElement>().ok());
        match element {
            Some(video) => video.set_src_object(stream.map(|stream| &stream.stream)),
            None => warn!("Video surface #{} not found", surface),
        }
    }
}

#[async_trait(?Send)]
impl DisplayPlatform for WebPlatform {
    fn fullscreen_element(&self) -> Option<ElementId> {
        self.document
            .fullscreen_element()
            .map(|element| ElementId::new(element.id()))
    }

    async fn request_fullscreen(&self, element: &ElementId) -> Result<(), PlatformError> {
        let target = self
            .document
            .get_element_by_id(element.as_str())
            .ok_or_else(|| PlatformError::NotFound {
                message: format!("element #{} not found", element),
            })?;
        call_and_settle(&target, "requestFullscreen").await
    }

    async fn exit_fullscreen(&self) -> Result<(), PlatformError> {
        if self.document.fullscreen_element().is_none() {
            return Err(PlatformError::Other {
                message: "document is not in fullscreen".to_string(),
            });
        }
        call_and_settle(&self.document, "exitFullscreen").await
    }

    fn on_fullscreen_change(&self, listener: FullscreenListener) -> ListenerHandle {
        let document = self.document.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            let element = document
                .fullscreen_element()
                .map(|element| ElementId::new(element.id()));
            listener(element);
        });

        if let Err(error) = self
            .document
            .add_event_listener_with_callback(FULLSCREEN_CHANGE, callback.as_ref().unchecked_ref())
        {
            warn!("Could not subscribe to {}: {:?}", FULLSCREEN_CHANGE, error);
        }

        let document = self.document.clone();
        ListenerHandle::new(move || {
            if let Err(error) = document.remove_event_listener_with_callback(
                FULLSCREEN_CHANGE,
                callback.as_ref().unchecked_ref(),
            ) {
                warn!("Could not unsubscribe from {}: {:?}", FULLSCREEN_CHANGE, error);
            }
        })
    }
}
