//! Fixed capture resolution options and capture targets

use crate::error::{ViewerError, ViewerResult};
use serde::Serialize;

/// One entry of the fixed resolution set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResolutionOption {
    /// Label shown in the selector
    pub label: &'static str,
    /// Preferred width in pixels
    pub width: u32,
    /// Preferred height in pixels
    pub height: u32,
}

impl ResolutionOption {
    const fn new(label: &'static str, width: u32, height: u32) -> Self {
        Self {
            label,
            width,
            height,
        }
    }

    /// 640x480
    pub const SD: Self = Self::new("480p", 640, 480);
    /// 1280x720
    pub const HD: Self = Self::new("720p", 1280, 720);
    /// 1920x1080
    pub const FULL_HD: Self = Self::new("1080p", 1920, 1080);
    /// 3840x2160
    pub const UHD: Self = Self::new("4K", 3840, 2160);

    /// All options, in selector order
    pub const ALL: [Self; 4] = [Self::SD, Self::HD, Self::FULL_HD, Self::UHD];

    /// Index of the option selected when nothing else was chosen
    pub const DEFAULT_INDEX: usize = 1;

    /// Look up an option by selector index
    pub fn by_index(index: usize) -> ViewerResult<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(ViewerError::InvalidResolution { index })
    }

    /// Selector index of this option
    pub fn index(&self) -> Option<usize> {
        Self::ALL.iter().position(|option| option == self)
    }

    /// Width times height
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

impl Default for ResolutionOption {
    fn default() -> Self {
        Self::ALL[Self::DEFAULT_INDEX]
    }
}

impl std::fmt::Display for ResolutionOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}x{})", self.label, self.width, self.height)
    }
}

/// What a capture session is asked to acquire
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaptureTarget {
    /// Exact device identifier
    pub device_id: String,
    /// Preferred resolution
    pub resolution: ResolutionOption,
}

impl CaptureTarget {
    /// Create a target for a device and resolution
    pub fn new(device_id: impl Into<String>, resolution: ResolutionOption) -> Self {
        Self {
            device_id: device_id.into(),
            resolution,
        }
    }
}

impl std::fmt::Display for CaptureTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {}", self.device_id, self.resolution)
    }
}
