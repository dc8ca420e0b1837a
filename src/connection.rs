//! # Connection Manager
//!
//! The background task that owns the single transport and translates its
//! lifecycle into internal signals: heartbeat stamps, dispatcher delivery,
//! reconnect scheduling, and lifecycle callbacks.
//!
//! All waiting happens inside one `tokio::select!` loop, so frame handling,
//! heartbeat ticks, backoff sleeps, and destruction are serialized by the
//! task itself; no locking is needed around the transport.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};

use crate::backoff::ReconnectPolicy;
use crate::config::{ClientCallbacks, ClientConfig};
use crate::dispatch::Dispatcher;
use crate::errors::ClientError;
use crate::event::{parse_inbound, InboundFrame};
use crate::heartbeat::{HeartbeatMonitor, PING_FRAME};
use crate::logger::Logger;
use crate::state::{ConnectionState, StateCell};
use crate::transport::{endpoint_url, Connector, Transport};

/// Control messages from the facade to the connection task
#[derive(Debug)]
pub(crate) enum Command {
    /// Terminal shutdown; the task exits without scheduling a retry
    Destroy,
}

/// State shared between the facade and the connection task
#[derive(Debug)]
pub(crate) struct Shared {
    /// Guarded lifecycle state
    pub state: StateCell,

    /// Set once by `destroy()`; never cleared
    pub destroyed: AtomicBool,

    /// Failed attempts in the current streak; reset to zero on every
    /// successful open
    pub attempts: AtomicU32,
}

impl Shared {
    pub fn new() -> Self {
        Self {
            state: StateCell::new(),
            destroyed: AtomicBool::new(false),
            attempts: AtomicU32::new(0),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

/// Why the connected loop ended
enum CloseCause {
    /// Server closed, transport errored, or the outbound sink failed
    TransportClosed,
    /// No server heartbeat within twice the interval
    HeartbeatStale,
    /// `destroy()` was called
    Destroyed,
}

/// Outcome of one backoff wait
enum BackoffOutcome {
    /// Delay elapsed; run the next connecting cycle
    Retry,
    /// Attempt ceiling reached; the client stays closed
    Exhausted,
    /// `destroy()` was called during the wait
    Destroyed,
}

/// Run the connection lifecycle until destroyed or retries are exhausted.
pub(crate) async fn run_connection(
    config: ClientConfig,
    callbacks: ClientCallbacks,
    connector: Arc<dyn Connector>,
    dispatcher: Arc<Dispatcher>,
    shared: Arc<Shared>,
    mut cmd_rx: mpsc::Receiver<Command>,
) {
    let policy = ReconnectPolicy::with_max_attempts(config.max_reconnect_attempts);
    let monitor = HeartbeatMonitor::new(config.heartbeat_interval);
    let url = endpoint_url(&config.url, &config.token);

    loop {
        if shared.is_destroyed() {
            break;
        }

        shared.state.transition(ConnectionState::Connecting);

        // A Destroy arriving mid-handshake abandons the attempt.
        let connect_result = tokio::select! {
            result = connector.connect(&url) => result,
            _ = cmd_rx.recv() => {
                shared.state.transition(ConnectionState::Closed);
                break;
            }
        };

        let mut transport = match connect_result {
            Ok(transport) => transport,
            Err(e) => {
                // Construction failure takes the same path as a drop
                let error = e.to_string();
                Logger::warn(
                    "REALTIME_CONNECT_FAILED",
                    &[("url", config.url.as_str()), ("error", error.as_str())],
                );
                shared.state.transition(ConnectionState::Closed);
                match wait_backoff(&policy, &shared, &callbacks, &mut cmd_rx).await {
                    BackoffOutcome::Retry => continue,
                    BackoffOutcome::Exhausted | BackoffOutcome::Destroyed => break,
                }
            }
        };

        // Transport open: reset the retry curve, stamp liveness, notify,
        // then flush buffered events before any new frame is processed.
        shared.attempts.store(0, Ordering::SeqCst);
        monitor.mark_alive();
        shared.state.transition(ConnectionState::Open);
        dispatcher.set_connected(true);
        Logger::info("REALTIME_CONNECTED", &[("url", config.url.as_str())]);
        callbacks.emit_connect();
        dispatcher.flush();

        let cause = run_open(&mut transport, &monitor, &dispatcher, &mut cmd_rx).await;

        // Single close path for every cause.
        match cause {
            CloseCause::HeartbeatStale => {
                Logger::warn("REALTIME_HEARTBEAT_STALE", &[("url", config.url.as_str())]);
                shared.state.transition(ConnectionState::Closing);
            }
            CloseCause::Destroyed => {
                shared.state.transition(ConnectionState::Closing);
            }
            CloseCause::TransportClosed => {}
        }
        drop(transport);
        dispatcher.set_connected(false);
        shared.state.transition(ConnectionState::Closed);
        Logger::info("REALTIME_DISCONNECTED", &[("url", config.url.as_str())]);
        callbacks.emit_disconnect();

        if matches!(cause, CloseCause::Destroyed) || shared.is_destroyed() {
            break;
        }

        match wait_backoff(&policy, &shared, &callbacks, &mut cmd_rx).await {
            BackoffOutcome::Retry => continue,
            BackoffOutcome::Exhausted | BackoffOutcome::Destroyed => break,
        }
    }

    if shared.is_destroyed() {
        shared.state.transition(ConnectionState::Destroyed);
        Logger::info("REALTIME_DESTROYED", &[]);
    }
}

/// Drive the open transport until it closes, goes stale, or is destroyed.
async fn run_open(
    transport: &mut Transport,
    monitor: &HeartbeatMonitor,
    dispatcher: &Dispatcher,
    cmd_rx: &mut mpsc::Receiver<Command>,
) -> CloseCause {
    // First tick one full interval from now; liveness was just stamped.
    let mut ticks = interval_at(Instant::now() + monitor.interval(), monitor.interval());

    loop {
        tokio::select! {
            frame = transport.inbound.recv() => match frame {
                Some(text) => match parse_inbound(&text) {
                    Some(InboundFrame::Heartbeat) => monitor.mark_alive(),
                    Some(InboundFrame::Event(event)) => dispatcher.deliver(event),
                    // Malformed frames are dropped without a trace
                    None => {}
                },
                None => return CloseCause::TransportClosed,
            },

            _ = ticks.tick() => {
                if monitor.is_stale() {
                    return CloseCause::HeartbeatStale;
                }
                if let Err(e) = transport.outbound.send(PING_FRAME.to_string()).await {
                    let error = ClientError::SendFailed(e.to_string()).to_string();
                    Logger::warn("REALTIME_SEND_FAILED", &[("error", error.as_str())]);
                    return CloseCause::TransportClosed;
                }
            }

            // Destroy, or the facade was dropped
            _ = cmd_rx.recv() => return CloseCause::Destroyed,
        }
    }
}

/// Schedule one retry: sleep out the backoff delay, or report exhaustion
/// once the attempt budget is spent.
async fn wait_backoff(
    policy: &ReconnectPolicy,
    shared: &Shared,
    callbacks: &ClientCallbacks,
    cmd_rx: &mut mpsc::Receiver<Command>,
) -> BackoffOutcome {
    let scheduled = shared.attempts.fetch_add(1, Ordering::SeqCst) + 1;

    let Some(delay) = policy.delay(scheduled) else {
        let error = ClientError::RetriesExhausted(policy.max_attempts).to_string();
        Logger::warn("REALTIME_RETRIES_EXHAUSTED", &[("error", error.as_str())]);
        callbacks.emit_retries_exhausted();
        return BackoffOutcome::Exhausted;
    };

    let attempt = scheduled.to_string();
    let delay_ms = delay.as_millis().to_string();
    Logger::info(
        "REALTIME_RECONNECT_SCHEDULED",
        &[("attempt", attempt.as_str()), ("delay_ms", delay_ms.as_str())],
    );

    tokio::select! {
        _ = tokio::time::sleep(delay) => BackoffOutcome::Retry,
        _ = cmd_rx.recv() => BackoffOutcome::Destroyed,
    }
}
