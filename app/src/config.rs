//! Application configuration.

use std::time::Duration;
use todosync_runtime::StoreConfig;

/// Configuration passed to [`TodoApp::launch`](crate::TodoApp::launch).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Runtime configuration of the underlying store.
    ///
    /// Its `shutdown_timeout` bounds [`TodoApp::teardown`](crate::TodoApp::teardown).
    pub store: StoreConfig,

    /// How long [`TodoApp::wait_until_ready`](crate::TodoApp::wait_until_ready)
    /// waits for the session gate to settle.
    ///
    /// Default: 60 seconds, the sign-in flow is interactive
    pub ready_timeout: Duration,
}

impl AppConfig {
    /// Create a configuration with the given store configuration.
    #[must_use]
    pub const fn new(store: StoreConfig) -> Self {
        Self {
            store,
            ready_timeout: Duration::from_secs(60),
        }
    }

    /// Set the store configuration.
    #[must_use]
    pub const fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Set how long to wait for the session gate to settle.
    #[must_use]
    pub const fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Set the teardown timeout.
    #[must_use]
    pub const fn with_teardown_timeout(mut self, timeout: Duration) -> Self {
        self.store = self.store.with_shutdown_timeout(timeout);
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
