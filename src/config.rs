//! # Client Configuration
//!
//! Connection settings and application-supplied lifecycle callbacks.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::dispatch::EventHandler;

/// Realtime client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Transport endpoint, e.g. `wss://host/realtime`
    pub url: String,

    /// Bearer token appended as the `token` query parameter
    pub token: String,

    /// Retry ceiling; beyond it the client stays closed
    pub max_reconnect_attempts: u32,

    /// Heartbeat tick period; staleness threshold is twice this
    pub heartbeat_interval: Duration,

    /// Capacity of the missed-event buffer
    pub missed_event_buffer_size: usize,
}

impl ClientConfig {
    /// Create a configuration with the default tuning knobs
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            max_reconnect_attempts: 20,
            heartbeat_interval: Duration::from_secs(25),
            missed_event_buffer_size: 100,
        }
    }
}

/// A lifecycle notification callback
pub type LifecycleCallback = Arc<dyn Fn() + Send + Sync>;

/// Application-supplied lifecycle callbacks.
///
/// All callbacks are optional. `on_retries_exhausted` is the explicit
/// terminal-failure signal: it fires once when the retry ceiling is
/// reached. `on_disconnect` fires only on transport closes, so a streak of
/// refused connections reports exhaustion without any disconnect.
#[derive(Clone, Default)]
pub struct ClientCallbacks {
    /// Invoked on every successful (re)connect, before the buffer flush
    pub on_connect: Option<LifecycleCallback>,

    /// Invoked on every transport close
    pub on_disconnect: Option<LifecycleCallback>,

    /// Invoked once when no further automatic reconnects will happen
    pub on_retries_exhausted: Option<LifecycleCallback>,

    /// Initial event handler, registered before the first connect
    pub on_event: Option<Arc<dyn EventHandler>>,
}

impl ClientCallbacks {
    /// Create an empty callback set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connect callback
    pub fn with_on_connect(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_connect = Some(Arc::new(f));
        self
    }

    /// Set the disconnect callback
    pub fn with_on_disconnect(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_disconnect = Some(Arc::new(f));
        self
    }

    /// Set the terminal-failure callback
    pub fn with_on_retries_exhausted(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_retries_exhausted = Some(Arc::new(f));
        self
    }

    /// Set the initial event handler
    pub fn with_on_event(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.on_event = Some(handler);
        self
    }

    pub(crate) fn emit_connect(&self) {
        if let Some(f) = &self.on_connect {
            f();
        }
    }

    pub(crate) fn emit_disconnect(&self) {
        if let Some(f) = &self.on_disconnect {
            f();
        }
    }

    pub(crate) fn emit_retries_exhausted(&self) {
        if let Some(f) = &self.on_retries_exhausted {
            f();
        }
    }
}

impl fmt::Debug for ClientCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCallbacks")
            .field("on_connect", &self.on_connect.is_some())
            .field("on_disconnect", &self.on_disconnect.is_some())
            .field("on_retries_exhausted", &self.on_retries_exhausted.is_some())
            .field("on_event", &self.on_event.is_some())
            .finish()
    }
}
