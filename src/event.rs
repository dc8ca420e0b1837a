//! # Realtime Events
//!
//! Wire/domain model for a single server-originated event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved `event_type` value for liveness frames. Consumed internally,
/// never delivered to application handlers.
pub const HEARTBEAT_EVENT_TYPE: &str = "heartbeat";

/// One server-originated occurrence.
///
/// `correlation_id` is always present on the wire; absence is encoded as
/// `null`, never by omitting the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeEvent {
    /// Logical channel identifier
    pub topic: String,

    /// Owning tenant/organization
    pub tenant_id: String,

    /// Type of the affected domain object
    pub entity_type: String,

    /// Identifier of the affected domain object
    pub entity_id: String,

    /// Event discriminator
    pub event_type: String,

    /// Open mapping interpreted only by the application
    #[serde(default)]
    pub payload: Map<String, Value>,

    /// Event timestamp (RFC 3339 on the wire)
    pub ts: DateTime<Utc>,

    /// Optional causal-tracing identifier
    #[serde(default)]
    pub correlation_id: Option<String>,
}

impl RealtimeEvent {
    /// Create an event with an empty payload and the current timestamp
    pub fn new(
        topic: impl Into<String>,
        tenant_id: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            tenant_id: tenant_id.into(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            event_type: event_type.into(),
            payload: Map::new(),
            ts: Utc::now(),
            correlation_id: None,
        }
    }

    /// Attach a payload
    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }

    /// Attach a correlation id
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Whether this is a liveness frame rather than a domain event
    pub fn is_heartbeat(&self) -> bool {
        self.event_type == HEARTBEAT_EVENT_TYPE
    }
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// Server liveness signal; refreshes the heartbeat timestamp and stops there
    Heartbeat,
    /// Domain event for the dispatcher
    Event(RealtimeEvent),
}

/// Parse one inbound text frame.
///
/// Heartbeat frames are recognized by `event_type` alone so the server may
/// send them without the full event envelope. Anything that fails to parse
/// is discarded (`None`), never surfaced.
pub fn parse_inbound(text: &str) -> Option<InboundFrame> {
    let value: Value = serde_json::from_str(text).ok()?;

    if value.get("event_type").and_then(Value::as_str) == Some(HEARTBEAT_EVENT_TYPE) {
        return Some(InboundFrame::Heartbeat);
    }

    serde_json::from_value(value).ok().map(InboundFrame::Event)
}
