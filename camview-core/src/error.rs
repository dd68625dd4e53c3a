//! Error types for the camera viewer
//!
//! Two layers of errors exist. [`PlatformError`] is what a host platform
//! reports back from a media or fullscreen call, named after the
//! DOMException kinds a browser raises. [`ViewerError`] is the viewer-level
//! taxonomy that components surface to the presentation shell.

use thiserror::Error;

/// Failure reported by the host platform
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The user or the platform refused access (`NotAllowedError`)
    #[error("Not allowed: {message}")]
    NotAllowed {
        /// Platform message
        message: String,
    },

    /// No device matched the request (`NotFoundError`)
    #[error("Not found: {message}")]
    NotFound {
        /// Platform message
        message: String,
    },

    /// The capability is missing entirely (`NotSupportedError`)
    #[error("Not supported: {message}")]
    NotSupported {
        /// Platform message
        message: String,
    },

    /// A required constraint could not be satisfied (`OverconstrainedError`)
    #[error("Overconstrained: {constraint}")]
    Overconstrained {
        /// Name of the offending constraint
        constraint: String,
    },

    /// The device is busy or the request was interrupted (`AbortError`, `NotReadableError`)
    #[error("Aborted: {message}")]
    Aborted {
        /// Platform message
        message: String,
    },

    /// Anything else
    #[error("Platform error: {message}")]
    Other {
        /// Platform message
        message: String,
    },
}

impl PlatformError {
    /// Map a DOMException name onto a platform error
    pub fn from_dom_exception(name: &str, message: &str) -> Self {
        let message = message.to_string();
        match name {
            "NotAllowedError" | "SecurityError" | "PermissionDeniedError" => {
                PlatformError::NotAllowed { message }
            }
            "NotFoundError" | "DevicesNotFoundError" => PlatformError::NotFound { message },
            "NotSupportedError" | "TypeError" => PlatformError::NotSupported { message },
            "OverconstrainedError" | "ConstraintNotSatisfiedError" => {
                PlatformError::Overconstrained {
                    constraint: message,
                }
            }
            "AbortError" | "NotReadableError" | "TrackStartError" => {
                PlatformError::Aborted { message }
            }
            _ => PlatformError::Other { message },
        }
    }

    /// Whether this error means the user refused camera access
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, PlatformError::NotAllowed { .. })
    }
}

/// Main error type for viewer operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewerError {
    /// Camera access was refused
    #[error("Camera permission denied")]
    PermissionDenied,

    /// Enumeration produced no video input device
    #[error("No camera found")]
    NoDeviceFound,

    /// The platform cannot capture video at all
    #[error("Camera capture is not supported on this platform")]
    CapabilityUnsupported,

    /// Acquiring a stream for the selected target failed
    #[error("Failed to start camera stream: {reason}")]
    StreamStartFailed {
        /// Failure reason
        reason: String,
    },

    /// The platform rejected a fullscreen request or exit
    #[error("Fullscreen request failed: {reason}")]
    FullscreenRequestFailed {
        /// Failure reason
        reason: String,
    },

    /// Probing or enumerating devices failed for a reason other than denial
    #[error("Device enumeration failed: {reason}")]
    DeviceEnumerationFailed {
        /// Failure reason
        reason: String,
    },

    /// The requested device is not part of the catalog
    #[error("Device not found: {device_id}")]
    DeviceNotFound {
        /// Device identifier
        device_id: String,
    },

    /// Resolution index outside the fixed option set
    #[error("Invalid resolution index: {index}")]
    InvalidResolution {
        /// Requested index
        index: usize,
    },

    /// A configuration value is unusable
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfiguration {
        /// Offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Operation issued in a state that cannot serve it
    #[error("Invalid state: expected {expected}, got {actual}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },
}

/// Result type alias for viewer operations
pub type ViewerResult<T> = Result<T, ViewerError>;

impl ViewerError {
    /// Translate a failed capability probe
    pub fn from_probe(error: PlatformError) -> Self {
        match error {
            PlatformError::NotAllowed { .. } => ViewerError::PermissionDenied,
            PlatformError::NotSupported { .. } => ViewerError::CapabilityUnsupported,
            PlatformError::NotFound { .. } => ViewerError::NoDeviceFound,
            other => ViewerError::DeviceEnumerationFailed {
                reason: other.to_string(),
            },
        }
    }

    /// Translate a failed stream acquisition
    ///
    /// Refusal stays distinguishable from a generic start failure.
    pub fn from_acquisition(error: PlatformError) -> Self {
        match error {
            PlatformError::NotAllowed { .. } => ViewerError::PermissionDenied,
            other => ViewerError::StreamStartFailed {
                reason: other.to_string(),
            },
        }
    }

    /// Get error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ViewerError::PermissionDenied => "PERMISSION_DENIED",
            ViewerError::NoDeviceFound => "NO_DEVICE_FOUND",
            ViewerError::CapabilityUnsupported => "CAPABILITY_UNSUPPORTED",
            ViewerError::StreamStartFailed { .. } => "STREAM_START_FAILED",
            ViewerError::FullscreenRequestFailed { .. } => "FULLSCREEN_REQUEST_FAILED",
            ViewerError::DeviceEnumerationFailed { .. } => "DEVICE_ENUMERATION_FAILED",
            ViewerError::DeviceNotFound { .. } => "DEVICE_NOT_FOUND",
            ViewerError::InvalidResolution { .. } => "INVALID_RESOLUTION",
            ViewerError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            ViewerError::InvalidState { .. } => "INVALID_STATE",
        }
    }

    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            ViewerError::PermissionDenied => ErrorCategory::Permission,
            ViewerError::NoDeviceFound => ErrorCategory::Device,
            ViewerError::CapabilityUnsupported => ErrorCategory::Platform,
            ViewerError::StreamStartFailed { .. } => ErrorCategory::Stream,
            ViewerError::FullscreenRequestFailed { .. } => ErrorCategory::Display,
            ViewerError::DeviceEnumerationFailed { .. } => ErrorCategory::Device,
            ViewerError::DeviceNotFound { .. } => ErrorCategory::Device,
            ViewerError::InvalidResolution { .. } => ErrorCategory::Configuration,
            ViewerError::InvalidConfiguration { .. } => ErrorCategory::Configuration,
            ViewerError::InvalidState { .. } => ErrorCategory::State,
        }
    }

    /// Whether a new user action (re-selecting a device or resolution) can recover
    ///
    /// Permission-level and capability failures need a page reload.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ViewerError::PermissionDenied => false,
            ViewerError::NoDeviceFound => false,
            ViewerError::CapabilityUnsupported => false,
            ViewerError::DeviceEnumerationFailed { .. } => false,
            ViewerError::StreamStartFailed { .. } => true,
            ViewerError::FullscreenRequestFailed { .. } => true,
            ViewerError::DeviceNotFound { .. } => true,
            ViewerError::InvalidResolution { .. } => true,
            ViewerError::InvalidConfiguration { .. } => false,
            ViewerError::InvalidState { .. } => true,
        }
    }

    /// Whether the error belongs in the visible error banner
    pub fn is_banner_error(&self) -> bool {
        matches!(
            self,
            ViewerError::PermissionDenied
                | ViewerError::NoDeviceFound
                | ViewerError::CapabilityUnsupported
                | ViewerError::StreamStartFailed { .. }
                | ViewerError::DeviceEnumerationFailed { .. }
        )
    }

    /// Human-readable banner text
    pub fn user_message(&self) -> String {
        match self {
            ViewerError::PermissionDenied => "Camera access was denied. Allow camera access in the browser settings and reload the page.".to_string(),
            ViewerError::NoDeviceFound => "No camera was found.".to_string(),
            ViewerError::CapabilityUnsupported => {
                "This browser does not support camera capture.".to_string()
            }
            ViewerError::StreamStartFailed { .. } => "Could not start the camera stream.".to_string(),
            ViewerError::DeviceEnumerationFailed { .. } => {
                "Could not list camera devices.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Access refused by the user or policy
    Permission,
    /// Device discovery and selection
    Device,
    /// Missing platform capability
    Platform,
    /// Stream acquisition
    Stream,
    /// Fullscreen presentation
    Display,
    /// Invalid parameters
    Configuration,
    /// State management
    State,
}
