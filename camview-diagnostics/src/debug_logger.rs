//! Structured logging setup

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber
#[derive(Debug, Clone)]
pub struct DebugLogger {
    debug: bool,
    with_target: bool,
}

impl DebugLogger {
    /// Logger at `info` level unless `RUST_LOG` says otherwise
    pub fn new() -> Self {
        Self {
            debug: false,
            with_target: true,
        }
    }

    /// Default to `debug` instead of `info`
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Include the module target in each line
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Filter used when `RUST_LOG` is unset
    pub fn default_directive(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }

    /// Install the subscriber
    ///
    /// Returns `false` when a global subscriber was already set, which makes
    /// repeated calls harmless.
    pub fn install(&self) -> bool {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive()));

        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(self.with_target)
            .try_init()
            .is_ok();
        if installed {
            tracing::debug!("📝 Logging initialized ({})", self.default_directive());
        }
        installed
    }

    /// Initialize logging with defaults
    pub fn init_logging(debug: bool) -> bool {
        Self::new().debug(debug).install()
    }
}

impl Default for DebugLogger {
    fn default() -> Self {
        Self::new()
    }
}
