//! # eventline - Realtime event-stream client
//!
//! A persistent server connection with silent-failure detection, automatic
//! recovery, and fan-out of decoded events to application handlers.
//!
//! ## Architecture
//!
//! - **Event** model: wire/domain representation of one server event
//! - **Heartbeat Monitor**: liveness of the active connection
//! - **Reconnect Policy**: retry delays and the attempt ceiling
//! - **Connection Manager**: owns the single transport, wires its lifecycle
//! - **Dispatcher**: handler registry + missed-event buffer
//! - **Client Facade**: `connect` / `add_handler` / `is_connected` / `destroy`
//!
//! Data flows one way: transport → connection manager → heartbeat monitor
//! (liveness frames) or dispatcher (domain frames) → handlers. Control
//! flows the other way: facade → connection manager → reconnect policy on
//! failure → next connecting cycle.

pub mod backoff;
pub mod buffer;
pub mod client;
pub mod config;
mod connection;
pub mod dispatch;
pub mod errors;
pub mod event;
pub mod heartbeat;
pub mod logger;
pub mod state;
pub mod transport;

pub use backoff::ReconnectPolicy;
pub use buffer::MissedEventBuffer;
pub use client::{HandlerGuard, RealtimeClient};
pub use config::{ClientCallbacks, ClientConfig};
pub use dispatch::{Dispatcher, EventHandler, HandlerId};
pub use errors::{ClientError, ClientResult};
pub use event::{parse_inbound, InboundFrame, RealtimeEvent, HEARTBEAT_EVENT_TYPE};
pub use heartbeat::{HeartbeatMonitor, PING_FRAME};
pub use state::ConnectionState;
pub use transport::{Connector, Transport, WebSocketConnector};
