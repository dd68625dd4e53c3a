//! Fullscreen presentation of the viewer container
//!
//! The platform owns the fullscreen flag. The controller keeps a mirror of
//! it that is written only by the platform's change notifications, so exits
//! the user triggers outside the viewer (escape key, browser chrome) are
//! reflected the same way as programmatic ones.

use camview_core::{DisplayPlatform, ElementId, ListenerHandle, ViewerError};
use camview_diagnostics::SessionStats;
use parking_lot::Mutex;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Callback run when the mirrored flag changes
pub type FullscreenNotifier = Rc<dyn Fn(bool)>;

/// What a toggle asked the platform for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    /// Request fullscreen on the container
    Enter,
    /// Leave fullscreen
    Exit,
}

/// Toggles the container between normal and fullscreen presentation
pub struct FullscreenController<D: DisplayPlatform> {
    platform: Rc<D>,
    container: ElementId,
    mirror: Rc<Cell<bool>>,
    subscription: Mutex<Option<ListenerHandle>>,
    notifier: Option<FullscreenNotifier>,
    stats: Arc<SessionStats>,
}

impl<D: DisplayPlatform> FullscreenController<D> {
    /// Controller for the element `container`
    pub fn new(platform: Rc<D>, container: ElementId, stats: Arc<SessionStats>) -> Self {
        Self {
            platform,
            container,
            mirror: Rc::new(Cell::new(false)),
            subscription: Mutex::new(None),
            notifier: None,
            stats,
        }
    }

    /// Run `notifier` whenever the mirrored flag changes
    pub fn with_notifier(mut self, notifier: impl Fn(bool) + 'static) -> Self {
        self.notifier = Some(Rc::new(notifier));
        self
    }

    /// Element toggled into fullscreen
    pub fn container(&self) -> &ElementId {
        &self.container
    }

    /// Seed the mirror and start listening for platform changes
    pub fn activate(&self) {
        let mut subscription = self.subscription.lock();
        if subscription.is_some() {
            return;
        }

        let current = self.platform.fullscreen_element().as_ref() == Some(&self.container);
        self.mirror.set(current);

        let mirror = self.mirror.clone();
        let container = self.container.clone();
        let notifier = self.notifier.clone();
        let handle = self.platform.on_fullscreen_change(Box::new(move |element| {
            let now = element.as_ref() == Some(&container);
            let before = mirror.replace(now);
            if before != now {
                info!("🖥️ Fullscreen {}", if now { "entered" } else { "exited" });
                if let Some(notify) = &notifier {
                    notify(now);
                }
            }
        }));
        *subscription = Some(handle);
        debug!("Fullscreen listener registered for #{}", self.container);
    }

    /// Stop listening; the mirror keeps its last value
    pub fn deactivate(&self) {
        if self.subscription.lock().take().is_some() {
            debug!("Fullscreen listener removed for #{}", self.container);
        }
    }

    /// Whether a listener is registered
    pub fn is_active(&self) -> bool {
        self.subscription.lock().is_some()
    }

    /// Mirrored fullscreen flag
    pub fn is_fullscreen(&self) -> bool {
        self.mirror.get()
    }

    /// Enter fullscreen unless the container already is the fullscreen
    /// element, in which case leave it
    ///
    /// The mirror is not touched here; it follows the notification the
    /// platform sends once the change happened. A refusal is logged and
    /// counted, never returned.
    pub async fn toggle(&self) -> ToggleAction {
        let in_fullscreen = self.platform.fullscreen_element().as_ref() == Some(&self.container);
        let (action, result) = if in_fullscreen {
            (ToggleAction::Exit, self.platform.exit_fullscreen().await)
        } else {
            (
                ToggleAction::Enter,
                self.platform.request_fullscreen(&self.container).await,
            )
        };

        if let Err(error) = result {
            let error = ViewerError::FullscreenRequestFailed {
                reason: error.to_string(),
            };
            self.stats.record_fullscreen_rejection();
            warn!("{:?} ignored: {}", action, error);
        }
        action
    }
}
