//! # Connection State Machine
//!
//! Explicit lifecycle states with guarded transitions. The guard makes
//! misuse structural: `connect()` while a cycle is in flight, or anything
//! after destruction, falls out as a rejected transition rather than an
//! incidental read of socket readiness.

use std::sync::RwLock;

/// Lifecycle state of the single underlying transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection attempt has been made yet
    Idle,
    /// A transport is being established
    Connecting,
    /// The transport is open and frames flow
    Open,
    /// A deliberate close is in progress
    Closing,
    /// No transport; a new connecting cycle may follow
    Closed,
    /// Terminal. Nothing leaves this state
    Destroyed,
}

impl ConnectionState {
    /// Whether a transition from `self` to `next` is legal
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;

        // Destruction is reachable from everywhere except itself
        if next == Destroyed {
            return self != Destroyed;
        }

        match (self, next) {
            (Idle, Connecting) => true,
            (Connecting, Open) | (Connecting, Closed) => true,
            (Open, Closing) | (Open, Closed) => true,
            (Closing, Closed) => true,
            (Closed, Connecting) => true,
            _ => false,
        }
    }

    /// Whether no further transition can ever occur
    pub fn is_terminal(self) -> bool {
        self == ConnectionState::Destroyed
    }
}

/// Shared, guarded state cell
#[derive(Debug)]
pub struct StateCell {
    inner: RwLock<ConnectionState>,
}

impl StateCell {
    /// Create a cell in the `Idle` state
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ConnectionState::Idle),
        }
    }

    /// Read the current state
    pub fn get(&self) -> ConnectionState {
        self.inner
            .read()
            .map(|state| *state)
            .unwrap_or(ConnectionState::Closed)
    }

    /// Attempt a guarded transition. Returns `false` if the transition is
    /// illegal, in which case the state is unchanged.
    pub fn transition(&self, next: ConnectionState) -> bool {
        if let Ok(mut state) = self.inner.write() {
            if state.can_transition_to(next) {
                *state = next;
                return true;
            }
        }
        false
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
