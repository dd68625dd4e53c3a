//! Device descriptors reported by the host platform

use serde::{Deserialize, Serialize};

/// Kind of a media device as reported by enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Camera
    VideoInput,
    /// Microphone
    AudioInput,
    /// Speaker or headphones
    AudioOutput,
}

impl DeviceKind {
    /// Parse the `kind` string of a `MediaDeviceInfo`
    pub fn from_web_kind(kind: &str) -> Option<Self> {
        match kind {
            "videoinput" => Some(DeviceKind::VideoInput),
            "audioinput" => Some(DeviceKind::AudioInput),
            "audiooutput" => Some(DeviceKind::AudioOutput),
            _ => None,
        }
    }
}

/// Raw enumeration entry, any kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDeviceInfo {
    /// Platform-assigned identifier
    pub device_id: String,
    /// Human-readable label, empty before permission was granted
    pub label: String,
    /// Device kind
    pub kind: DeviceKind,
}

impl MediaDeviceInfo {
    /// Create a video input entry
    pub fn video_input(device_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            label: label.into(),
            kind: DeviceKind::VideoInput,
        }
    }

    /// Create an audio input entry
    pub fn audio_input(device_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            label: label.into(),
            kind: DeviceKind::AudioInput,
        }
    }
}

/// A camera the viewer can select
///
/// Only ever built from a video input entry and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceDescriptor {
    id: String,
    label: String,
}

impl DeviceDescriptor {
    /// Build a descriptor from an enumeration entry, `None` unless it is a camera
    pub fn from_info(info: &MediaDeviceInfo) -> Option<Self> {
        if info.kind != DeviceKind::VideoInput {
            return None;
        }
        Some(Self {
            id: info.device_id.clone(),
            label: info.label.clone(),
        })
    }

    /// Opaque platform identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Label as reported, possibly empty
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Always [`DeviceKind::VideoInput`]
    pub fn kind(&self) -> DeviceKind {
        DeviceKind::VideoInput
    }

    /// Label for display, `"Camera N"` when the platform gave none
    pub fn display_name(&self, position: usize) -> String {
        if self.label.trim().is_empty() {
            format!("Camera {}", position + 1)
        } else {
            self.label.clone()
        }
    }
}
