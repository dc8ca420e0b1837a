//! # Client Errors
//!
//! Error types for the realtime client.
//!
//! These errors circulate between internal components only. Nothing here
//! crosses the public API boundary: transport failures feed the reconnect
//! path and malformed frames are discarded.

use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Realtime client errors
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    // ==================
    // Transport Errors
    // ==================
    /// Transport could not be established
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Outbound frame could not be sent
    #[error("Send failed: {0}")]
    SendFailed(String),

    // ==================
    // Lifecycle Errors
    // ==================
    /// Retry ceiling reached, no further automatic reconnects
    #[error("Reconnect attempts exhausted (max: {0})")]
    RetriesExhausted(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::ConnectionFailed("refused".into());
        assert_eq!(err.to_string(), "Connection failed: refused");

        let err = ClientError::SendFailed("channel closed".into());
        assert_eq!(err.to_string(), "Send failed: channel closed");

        let err = ClientError::RetriesExhausted(20);
        assert_eq!(err.to_string(), "Reconnect attempts exhausted (max: 20)");
    }
}
