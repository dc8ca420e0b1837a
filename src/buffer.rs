//! # Missed-Event Buffer
//!
//! Bounded FIFO queue for events that could not be delivered immediately.
//! Bounded and lossy under sustained disconnection: overflow evicts the
//! oldest entry to admit the newest.

use std::collections::VecDeque;

use crate::event::RealtimeEvent;

/// Default buffer capacity
pub const DEFAULT_BUFFER_CAPACITY: usize = 100;

/// Bounded FIFO of undelivered events
#[derive(Debug)]
pub struct MissedEventBuffer {
    capacity: usize,
    queue: VecDeque<RealtimeEvent>,
}

impl MissedEventBuffer {
    /// Create a buffer with the given capacity (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            queue: VecDeque::with_capacity(capacity),
        }
    }

    /// Append an event, evicting the oldest entry on overflow
    pub fn push(&mut self, event: RealtimeEvent) {
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(event);
    }

    /// Remove and return all buffered events in arrival order
    pub fn drain(&mut self) -> Vec<RealtimeEvent> {
        self.queue.drain(..).collect()
    }

    /// Number of buffered events
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for MissedEventBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}
