//! # Event Dispatcher
//!
//! Fan-out of decoded domain events to registered handlers, in arrival
//! order, exactly once per handler per event. Events that arrive while the
//! client is disconnected land in the missed-event buffer and are drained,
//! oldest first, on the next successful connection.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::buffer::MissedEventBuffer;
use crate::event::RealtimeEvent;

/// An application-supplied event consumer.
///
/// Implemented for any `Fn(&RealtimeEvent)` closure.
pub trait EventHandler: Send + Sync {
    /// Called once per delivered event
    fn handle(&self, event: &RealtimeEvent);
}

impl<F> EventHandler for F
where
    F: Fn(&RealtimeEvent) + Send + Sync,
{
    fn handle(&self, event: &RealtimeEvent) {
        self(event)
    }
}

/// Identifier of a registered handler
pub type HandlerId = u64;

/// Dispatcher holding the handler registry and the missed-event buffer
#[derive(Debug)]
pub struct Dispatcher {
    /// Registered handlers in registration order
    handlers: RwLock<Vec<(HandlerId, Arc<dyn EventHandler>)>>,

    /// Next handler id
    next_id: AtomicU64,

    /// Events awaiting the next successful connection
    buffer: Mutex<MissedEventBuffer>,

    /// Whether immediate delivery is possible
    connected: AtomicBool,
}

impl std::fmt::Debug for dyn EventHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EventHandler")
    }
}

impl Dispatcher {
    /// Create a dispatcher with the given buffer capacity
    pub fn new(buffer_capacity: usize) -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            buffer: Mutex::new(MissedEventBuffer::new(buffer_capacity)),
            connected: AtomicBool::new(false),
        }
    }

    /// Register a handler; it sees every event delivered from now on
    pub fn add_handler(&self, handler: Arc<dyn EventHandler>) -> HandlerId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut handlers) = self.handlers.write() {
            handlers.push((id, handler));
        }
        id
    }

    /// Remove a handler. Unknown ids are ignored
    pub fn remove_handler(&self, id: HandlerId) {
        if let Ok(mut handlers) = self.handlers.write() {
            handlers.retain(|(handler_id, _)| *handler_id != id);
        }
    }

    /// Number of registered handlers
    pub fn handler_count(&self) -> usize {
        self.handlers.read().map(|h| h.len()).unwrap_or(0)
    }

    /// Mark whether immediate delivery is possible
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Whether immediate delivery is possible
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Deliver an event: immediately when connected, buffered otherwise
    pub fn deliver(&self, event: RealtimeEvent) {
        if self.is_connected() {
            self.fan_out(&event);
        } else if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(event);
        }
    }

    /// Drain the missed-event buffer through the normal delivery path,
    /// oldest first. Called on every successful (re)connection, before any
    /// newly arriving frame is processed.
    pub fn flush(&self) {
        let drained = match self.buffer.lock() {
            Ok(mut buffer) => buffer.drain(),
            Err(_) => return,
        };
        for event in &drained {
            self.fan_out(event);
        }
    }

    /// Number of buffered events
    pub fn buffered_len(&self) -> usize {
        self.buffer.lock().map(|b| b.len()).unwrap_or(0)
    }

    /// Invoke every registered handler, in registration order.
    ///
    /// Handlers run outside the registry lock so a handler may unsubscribe
    /// itself (or register another handler) without deadlocking.
    fn fan_out(&self, event: &RealtimeEvent) {
        let snapshot: Vec<Arc<dyn EventHandler>> = match self.handlers.read() {
            Ok(handlers) => handlers.iter().map(|(_, h)| Arc::clone(h)).collect(),
            Err(_) => return,
        };
        for handler in snapshot {
            handler.handle(event);
        }
    }
}
