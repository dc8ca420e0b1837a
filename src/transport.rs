//! # Transport Layer
//!
//! Abstraction over the single underlying socket. A [`Transport`] is a pair
//! of channels: an outbound sink for text frames and an inbound stream of
//! text frames. The inbound channel closing is the one and only close
//! signal; transport errors collapse into it, so the connection manager has
//! a single close path.
//!
//! [`WebSocketConnector`] is the production implementation on
//! tokio-tungstenite. Tests substitute their own [`Connector`].

use futures_util::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::errors::{ClientError, ClientResult};

/// Capacity of the outbound frame channel
const OUTBOUND_CHANNEL_CAPACITY: usize = 64;

/// Capacity of the inbound frame channel
const INBOUND_CHANNEL_CAPACITY: usize = 256;

/// A live transport handle.
///
/// Dropping the handle force-closes the transport: both pump tasks notice
/// their channel end is gone and wind the socket down.
#[derive(Debug)]
pub struct Transport {
    /// Text frames to the server
    pub outbound: mpsc::Sender<String>,

    /// Text frames from the server; `None` means the transport closed
    pub inbound: mpsc::Receiver<String>,
}

/// Opens transports against an endpoint URL
pub trait Connector: Send + Sync + 'static {
    /// Establish a new transport. Failures are reported as
    /// [`ClientError::ConnectionFailed`] and feed the reconnect path.
    fn connect(&self, url: &str) -> BoxFuture<'static, ClientResult<Transport>>;
}

/// Build the endpoint URL with the bearer token as a query parameter
pub fn endpoint_url(url: &str, token: &str) -> String {
    format!("{}?token={}", url, urlencoding::encode(token))
}

/// Production connector over tokio-tungstenite
#[derive(Debug, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    /// Create a connector
    pub fn new() -> Self {
        Self
    }
}

impl Connector for WebSocketConnector {
    fn connect(&self, url: &str) -> BoxFuture<'static, ClientResult<Transport>> {
        let url = url.to_string();

        Box::pin(async move {
            let (ws_stream, _response) = connect_async(&url)
                .await
                .map_err(|e| ClientError::ConnectionFailed(e.to_string()))?;

            let (mut ws_sink, mut ws_source) = ws_stream.split();
            let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(OUTBOUND_CHANNEL_CAPACITY);
            let (inbound_tx, inbound_rx) = mpsc::channel::<String>(INBOUND_CHANNEL_CAPACITY);

            // Outbound pump: forwards frames until the handle is dropped,
            // then closes the socket.
            tokio::spawn(async move {
                while let Some(text) = outbound_rx.recv().await {
                    if ws_sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                let _ = ws_sink.close().await;
            });

            // Inbound pump: text frames are forwarded; close frames, stream
            // end, and socket errors all end the pump, which closes the
            // inbound channel.
            tokio::spawn(async move {
                while let Some(frame) = ws_source.next().await {
                    match frame {
                        Ok(Message::Text(text)) => {
                            if inbound_tx.send(text).await.is_err() {
                                break;
                            }
                        }
                        Ok(Message::Close(_)) | Err(_) => break,
                        // Binary and ping/pong control frames carry no events
                        Ok(_) => {}
                    }
                }
            });

            Ok(Transport {
                outbound: outbound_tx,
                inbound: inbound_rx,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_encodes_token() {
        let url = endpoint_url("wss://example.test/realtime", "a token+/=");
        assert_eq!(
            url,
            "wss://example.test/realtime?token=a%20token%2B%2F%3D"
        );
    }

    #[test]
    fn test_endpoint_url_plain_token() {
        let url = endpoint_url("wss://example.test/realtime", "abc123");
        assert_eq!(url, "wss://example.test/realtime?token=abc123");
    }

    #[tokio::test]
    async fn test_transport_close_signalled_by_channel_end() {
        // A transport built from bare channels reports close when the
        // sender side is dropped, the same way the socket pumps do.
        let (_outbound_tx, _outbound_rx) = mpsc::channel::<String>(4);
        let (inbound_tx, inbound_rx) = mpsc::channel::<String>(4);

        let mut transport = Transport {
            outbound: _outbound_tx,
            inbound: inbound_rx,
        };

        inbound_tx.send("frame".to_string()).await.unwrap();
        drop(inbound_tx);

        assert_eq!(transport.inbound.recv().await.as_deref(), Some("frame"));
        assert_eq!(transport.inbound.recv().await, None);
    }
}
