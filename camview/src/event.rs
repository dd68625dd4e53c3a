//! Event system for viewer lifecycle changes

use camview_core::{CaptureTarget, DeviceDescriptor, ResolutionOption, StreamSettings, ViewerError};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::debug;

/// Events emitted by a [`CameraViewer`](crate::CameraViewer)
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// Device discovery finished
    CatalogReady {
        /// Cameras in enumeration order
        devices: Vec<DeviceDescriptor>,
    },
    /// Device discovery failed for good
    CatalogFailed {
        /// Failure
        error: ViewerError,
    },
    /// The selected camera changed
    DeviceSelected {
        /// New device identifier
        device_id: String,
    },
    /// The selected resolution changed
    ResolutionSelected {
        /// New resolution
        resolution: ResolutionOption,
    },
    /// A stream became active
    StreamStarted {
        /// Target it was acquired for
        target: CaptureTarget,
        /// Platform stream id
        stream_id: String,
        /// Dimensions the platform delivered
        settings: Option<StreamSettings>,
    },
    /// The active stream was released
    StreamStopped {
        /// Platform stream id
        stream_id: String,
    },
    /// Acquisition failed for the current target
    StreamFailed {
        /// Target that failed
        target: CaptureTarget,
        /// Failure
        error: ViewerError,
    },
    /// A result arrived after a newer target was requested and was dropped
    StaleResultDiscarded {
        /// Target the result belonged to
        target: CaptureTarget,
    },
    /// The container entered or left fullscreen
    FullscreenChanged {
        /// New mirrored flag
        fullscreen: bool,
    },
}

impl ViewerEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            ViewerEvent::CatalogReady { .. } => "catalog_ready",
            ViewerEvent::CatalogFailed { .. } => "catalog_failed",
            ViewerEvent::DeviceSelected { .. } => "device_selected",
            ViewerEvent::ResolutionSelected { .. } => "resolution_selected",
            ViewerEvent::StreamStarted { .. } => "stream_started",
            ViewerEvent::StreamStopped { .. } => "stream_stopped",
            ViewerEvent::StreamFailed { .. } => "stream_failed",
            ViewerEvent::StaleResultDiscarded { .. } => "stale_result_discarded",
            ViewerEvent::FullscreenChanged { .. } => "fullscreen_changed",
        }
    }

    /// Check if this is a device or resolution selection event
    pub fn is_selection_event(&self) -> bool {
        matches!(
            self,
            ViewerEvent::CatalogReady { .. }
                | ViewerEvent::DeviceSelected { .. }
                | ViewerEvent::ResolutionSelected { .. }
        )
    }

    /// Check if this is a stream lifecycle event
    pub fn is_stream_event(&self) -> bool {
        matches!(
            self,
            ViewerEvent::StreamStarted { .. }
                | ViewerEvent::StreamStopped { .. }
                | ViewerEvent::StaleResultDiscarded { .. }
        )
    }

    /// Check if this is a fullscreen event
    pub fn is_fullscreen_event(&self) -> bool {
        matches!(self, ViewerEvent::FullscreenChanged { .. })
    }

    /// Check if this is an error event
    pub fn is_error_event(&self) -> bool {
        matches!(
            self,
            ViewerEvent::CatalogFailed { .. } | ViewerEvent::StreamFailed { .. }
        )
    }
}

/// Stream of viewer events for async iteration
#[derive(Debug)]
pub struct EventStream {
    receiver: broadcast::Receiver<ViewerEvent>,
}

impl EventStream {
    /// Create a new event stream with a receiver
    pub fn new(receiver: broadcast::Receiver<ViewerEvent>) -> Self {
        Self { receiver }
    }

    /// Get the next event from the stream
    ///
    /// Events a slow subscriber missed are skipped. Returns `None` once the
    /// viewer is gone.
    pub async fn next(&mut self) -> Option<ViewerEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Event subscriber lagged, {} event(s) skipped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Try to get the next event without waiting
    pub fn try_next(&mut self) -> Result<Option<ViewerEvent>, TryRecvError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Ok(Some(event)),
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!("Event subscriber lagged, {} event(s) skipped", skipped);
                }
                Err(TryRecvError::Closed) => return Err(TryRecvError::Closed),
            }
        }
    }

    /// Drain every event already queued
    pub fn drain(&mut self) -> Vec<ViewerEvent> {
        let mut events = Vec::new();
        while let Ok(Some(event)) = self.try_next() {
            events.push(event);
        }
        events
    }
}

/// Event filter for selective event processing
#[derive(Debug, Clone)]
pub struct EventFilter {
    /// Whether to include selection events
    pub include_selection_events: bool,
    /// Whether to include stream events
    pub include_stream_events: bool,
    /// Whether to include fullscreen events
    pub include_fullscreen_events: bool,
    /// Whether to include error events
    pub include_error_events: bool,
    /// Specific event types to include (if specified, overrides other filters)
    pub specific_event_types: Option<Vec<String>>,
}

impl EventFilter {
    /// Create a filter that includes all events
    pub fn all() -> Self {
        Self {
            include_selection_events: true,
            include_stream_events: true,
            include_fullscreen_events: true,
            include_error_events: true,
            specific_event_types: None,
        }
    }

    /// Create a filter that includes only stream events
    pub fn stream_only() -> Self {
        Self {
            include_stream_events: true,
            ..Self::none()
        }
    }

    /// Create a filter that includes only error events
    pub fn errors_only() -> Self {
        Self {
            include_error_events: true,
            ..Self::none()
        }
    }

    /// Create a filter for specific event types
    pub fn specific(event_types: Vec<String>) -> Self {
        Self {
            specific_event_types: Some(event_types),
            ..Self::none()
        }
    }

    fn none() -> Self {
        Self {
            include_selection_events: false,
            include_stream_events: false,
            include_fullscreen_events: false,
            include_error_events: false,
            specific_event_types: None,
        }
    }

    /// Check if an event should be included based on this filter
    pub fn should_include(&self, event: &ViewerEvent) -> bool {
        if let Some(ref specific_types) = self.specific_event_types {
            return specific_types.iter().any(|kind| kind == event.event_type());
        }

        (self.include_selection_events && event.is_selection_event())
            || (self.include_stream_events && event.is_stream_event())
            || (self.include_fullscreen_events && event.is_fullscreen_event())
            || (self.include_error_events && event.is_error_event())
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}

/// Filtered event stream that only yields events matching a filter
#[derive(Debug)]
pub struct FilteredEventStream {
    stream: EventStream,
    filter: EventFilter,
}

impl FilteredEventStream {
    /// Create a new filtered event stream
    pub fn new(stream: EventStream, filter: EventFilter) -> Self {
        Self { stream, filter }
    }

    /// Get the next event that matches the filter
    pub async fn next(&mut self) -> Option<ViewerEvent> {
        loop {
            let event = self.stream.next().await?;
            if self.filter.should_include(&event) {
                return Some(event);
            }
        }
    }

    /// Try to get the next filtered event without waiting
    pub fn try_next(&mut self) -> Result<Option<ViewerEvent>, TryRecvError> {
        loop {
            match self.stream.try_next()? {
                Some(event) if self.filter.should_include(&event) => return Ok(Some(event)),
                Some(_) => {}
                None => return Ok(None),
            }
        }
    }

    /// Update the filter
    pub fn set_filter(&mut self, filter: EventFilter) {
        self.filter = filter;
    }

    /// Get the current filter
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}
