//! # Client Facade
//!
//! [`RealtimeClient`] is the single entry point composing the connection
//! task, the dispatcher, and the shared lifecycle state.
//!
//! The client is explicitly owned and constructor-injected; there is no
//! process-wide instance. Replacing a client for a new session is a
//! close-then-create at the call site: `old.destroy()` followed by
//! `RealtimeClient::new(..)`.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{ClientCallbacks, ClientConfig};
use crate::connection::{run_connection, Command, Shared};
use crate::dispatch::{Dispatcher, EventHandler, HandlerId};
use crate::event::RealtimeEvent;
use crate::state::ConnectionState;
use crate::transport::Connector;

/// Capacity of the facade-to-task command channel
const COMMAND_CHANNEL_CAPACITY: usize = 4;

/// A registered handler. Calling [`unsubscribe`](HandlerGuard::unsubscribe)
/// stops further delivery to this handler only.
///
/// Registry membership is explicit: dropping the guard does NOT remove the
/// handler.
#[derive(Debug)]
pub struct HandlerGuard {
    id: HandlerId,
    dispatcher: Arc<Dispatcher>,
}

impl HandlerGuard {
    /// The registry id of this handler
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Remove the handler from the registry
    pub fn unsubscribe(self) {
        self.dispatcher.remove_handler(self.id);
    }
}

/// The realtime event-stream client.
///
/// One instance per logical session; only one transport is alive at a time.
/// All methods are safe to call in any state: misuse degrades to a no-op,
/// never a panic or an error.
pub struct RealtimeClient {
    config: ClientConfig,
    callbacks: ClientCallbacks,
    connector: Arc<dyn Connector>,
    dispatcher: Arc<Dispatcher>,
    shared: Arc<Shared>,
    task: Mutex<Option<(JoinHandle<()>, mpsc::Sender<Command>)>>,
}

impl RealtimeClient {
    /// Create a client. No connection is made until [`connect`](Self::connect).
    pub fn new(
        config: ClientConfig,
        callbacks: ClientCallbacks,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(config.missed_event_buffer_size));
        if let Some(handler) = &callbacks.on_event {
            dispatcher.add_handler(Arc::clone(handler));
        }

        Self {
            config,
            callbacks,
            connector,
            dispatcher,
            shared: Arc::new(Shared::new()),
            task: Mutex::new(None),
        }
    }

    /// Start the connection lifecycle.
    ///
    /// Idempotent: a no-op while a cycle is already running and after
    /// [`destroy`](Self::destroy). Calling it again after retries were
    /// exhausted starts a fresh cycle with the attempt counter reset.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&self) {
        if self.shared.is_destroyed() {
            return;
        }

        if let Ok(mut slot) = self.task.lock() {
            if let Some((handle, _)) = slot.as_ref() {
                if !handle.is_finished() {
                    return;
                }
            }

            self.shared.attempts.store(0, Ordering::SeqCst);
            let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
            let handle = tokio::spawn(run_connection(
                self.config.clone(),
                self.callbacks.clone(),
                Arc::clone(&self.connector),
                Arc::clone(&self.dispatcher),
                Arc::clone(&self.shared),
                cmd_rx,
            ));
            *slot = Some((handle, cmd_tx));
        }
    }

    /// Register a handler for every subsequently delivered non-heartbeat
    /// event. Returns a guard whose `unsubscribe()` removes it.
    pub fn add_handler(&self, handler: Arc<dyn EventHandler>) -> HandlerGuard {
        let id = self.dispatcher.add_handler(handler);
        HandlerGuard {
            id,
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }

    /// Hand an event to the dispatch path: delivered immediately while
    /// connected, buffered for the flush on the next successful connection
    /// otherwise.
    pub fn dispatch(&self, event: RealtimeEvent) {
        if self.shared.is_destroyed() {
            return;
        }
        self.dispatcher.deliver(event);
    }

    /// Whether the transport is currently open
    pub fn is_connected(&self) -> bool {
        self.shared.state.get() == ConnectionState::Open
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.shared.state.get()
    }

    /// Number of events waiting for the next successful connection
    pub fn buffered_len(&self) -> usize {
        self.dispatcher.buffered_len()
    }

    /// Terminal shutdown: cancels any pending reconnect, stops the
    /// heartbeat ticks, closes the transport, and flags the instance so no
    /// future reconnect is ever scheduled.
    ///
    /// Idempotent. After `destroy()`, `connect()` is a no-op.
    pub fn destroy(&self) {
        if self.shared.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }

        // The terminal transition happens here so observers see it at once;
        // the task is woken to drop the transport and run its close path.
        self.shared.state.transition(ConnectionState::Destroyed);

        if let Ok(slot) = self.task.lock() {
            if let Some((_, cmd_tx)) = slot.as_ref() {
                let _ = cmd_tx.try_send(Command::Destroy);
            }
        }
    }
}

impl std::fmt::Debug for RealtimeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeClient")
            .field("url", &self.config.url)
            .field("state", &self.shared.state.get())
            .field("handlers", &self.dispatcher.handler_count())
            .finish()
    }
}
