//! Configuration types and defaults

use camview_core::{ElementId, ResolutionOption, ViewerError, ViewerResult};
use serde::{Deserialize, Serialize};

/// Viewer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Element toggled into fullscreen
    pub container_id: String,
    /// `<video>` element the stream is rendered into
    pub surface_id: String,
    /// Resolution selected before the user picks one
    pub default_resolution_index: usize,
    /// Default the log filter to `debug`
    pub debug_logging: bool,
    /// Events buffered per subscriber before the slowest one lags
    pub event_capacity: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            container_id: "camview-container".to_string(),
            surface_id: "camview-video".to_string(),
            default_resolution_index: ResolutionOption::DEFAULT_INDEX,
            debug_logging: false,
            event_capacity: 64,
        }
    }
}

impl ViewerConfig {
    /// Set the fullscreen container element
    pub fn container(mut self, id: &str) -> Self {
        self.container_id = id.to_string();
        self
    }

    /// Set the video surface element
    pub fn surface(mut self, id: &str) -> Self {
        self.surface_id = id.to_string();
        self
    }

    /// Set the initially selected resolution
    pub fn default_resolution(mut self, index: usize) -> Self {
        self.default_resolution_index = index;
        self
    }

    /// Enable debug logging
    pub fn debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    /// Set the per-subscriber event buffer
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Check that every field is usable
    pub fn validate(&self) -> ViewerResult<()> {
        if self.container_id.is_empty() {
            return Err(invalid("container_id", "element id is empty"));
        }
        if self.surface_id.is_empty() {
            return Err(invalid("surface_id", "element id is empty"));
        }
        if self.container_id == self.surface_id {
            return Err(invalid(
                "surface_id",
                "surface and container must be different elements",
            ));
        }
        ResolutionOption::by_index(self.default_resolution_index)?;
        if self.event_capacity == 0 {
            return Err(invalid("event_capacity", "must be at least 1"));
        }
        Ok(())
    }

    /// Resolution selected before the user picks one
    pub fn default_resolution_option(&self) -> ViewerResult<ResolutionOption> {
        ResolutionOption::by_index(self.default_resolution_index)
    }

    pub(crate) fn container_element(&self) -> ElementId {
        ElementId::new(self.container_id.as_str())
    }

    pub(crate) fn surface_element(&self) -> ElementId {
        ElementId::new(self.surface_id.as_str())
    }
}

fn invalid(field: &str, reason: &str) -> ViewerError {
    ViewerError::InvalidConfiguration {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
