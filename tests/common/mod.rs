//! Shared test fixtures: a scripted in-memory connector standing in for
//! the WebSocket transport.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use tokio::sync::mpsc;

use eventline::{
    ClientError, ClientResult, Connector, EventHandler, RealtimeEvent, Transport,
};

/// Server-side handle to one mock transport.
///
/// Dropping the handle drops the frame sender, which the client observes
/// as the transport closing.
pub struct ServerHandle {
    /// Frames pushed here arrive on the client's inbound stream
    pub frames: mpsc::Sender<String>,
    /// Frames the client sent (keepalive pings)
    pub sent: mpsc::Receiver<String>,
}

/// Connector whose first `fail_first` connection attempts are refused;
/// every later attempt yields a fresh in-memory transport whose server
/// side is published on the handle channel.
pub struct MockConnector {
    fail_first: u32,
    attempts: AtomicU32,
    handles: Mutex<mpsc::UnboundedSender<ServerHandle>>,
}

impl MockConnector {
    pub fn new(fail_first: u32) -> (Arc<Self>, mpsc::UnboundedReceiver<ServerHandle>) {
        let (handle_tx, handle_rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            fail_first,
            attempts: AtomicU32::new(0),
            handles: Mutex::new(handle_tx),
        });
        (connector, handle_rx)
    }

    /// A connector that refuses every attempt
    pub fn always_failing() -> Arc<Self> {
        Self::new(u32::MAX).0
    }

    /// Total connection attempts observed
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Connector for MockConnector {
    fn connect(&self, _url: &str) -> BoxFuture<'static, ClientResult<Transport>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);

        let outcome = if attempt < self.fail_first {
            Err(ClientError::ConnectionFailed("connection refused".into()))
        } else {
            let (frames_tx, inbound_rx) = mpsc::channel(64);
            let (outbound_tx, sent_rx) = mpsc::channel(64);
            let handle = ServerHandle {
                frames: frames_tx,
                sent: sent_rx,
            };
            let _ = self.handles.lock().unwrap().send(handle);
            Ok(Transport {
                outbound: outbound_tx,
                inbound: inbound_rx,
            })
        };

        Box::pin(async move { outcome })
    }
}

/// Wire form of a domain event with the given entity id
pub fn event_frame(id: &str) -> String {
    serde_json::json!({
        "topic": "orders",
        "tenant_id": "acme",
        "entity_type": "order",
        "entity_id": id,
        "event_type": "order.created",
        "payload": {},
        "ts": "2026-08-30T12:00:00Z",
        "correlation_id": null
    })
    .to_string()
}

/// Wire form of a server heartbeat
pub fn heartbeat_frame() -> String {
    r#"{"event_type":"heartbeat"}"#.to_string()
}

/// A handler that forwards each delivered entity id over a channel
pub fn channel_handler() -> (Arc<dyn EventHandler>, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handler: Arc<dyn EventHandler> = Arc::new(move |event: &RealtimeEvent| {
        let _ = tx.send(event.entity_id.clone());
    });
    (handler, rx)
}
