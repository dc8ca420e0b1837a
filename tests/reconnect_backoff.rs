//! Reconnect scheduling tests
//!
//! Backoff delays, the attempt ceiling, the terminal-failure signal, and
//! the counter reset after a successful open. Paused-clock timing makes
//! the virtual delays exact.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use common::MockConnector;
use eventline::{ClientCallbacks, ClientConfig, ConnectionState, RealtimeClient};

fn test_config() -> ClientConfig {
    ClientConfig::new("wss://example.test/realtime", "secret")
}

#[tokio::test(start_paused = true)]
async fn failed_attempts_back_off_then_succeed() {
    // Attempts 1 and 2 are refused; the third opens.
    let (connector, mut handles) = MockConnector::new(2);
    let (connect_tx, mut connected) = mpsc::unbounded_channel();
    let callbacks = ClientCallbacks::new().with_on_connect(move || {
        let _ = connect_tx.send(());
    });
    let client = RealtimeClient::new(test_config(), callbacks, Arc::clone(&connector) as Arc<dyn eventline::Connector>);

    let started = Instant::now();
    client.connect();
    let _server = handles.recv().await.unwrap();
    connected.recv().await.unwrap();

    // Retry delays: 1000ms then 1500ms
    let elapsed = started.elapsed();
    assert!(
        elapsed >= Duration::from_millis(2500) && elapsed < Duration::from_millis(2600),
        "unexpected total backoff: {:?}",
        elapsed
    );
    assert_eq!(connector.attempts(), 3);
    assert!(client.is_connected());
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_max_attempts() {
    let connector = MockConnector::always_failing();
    let (exhausted_tx, mut exhausted) = mpsc::unbounded_channel();
    let callbacks = ClientCallbacks::new().with_on_retries_exhausted(move || {
        let _ = exhausted_tx.send(());
    });

    let config = ClientConfig {
        max_reconnect_attempts: 2,
        ..test_config()
    };
    let client = RealtimeClient::new(config, callbacks, Arc::clone(&connector) as Arc<dyn eventline::Connector>);

    client.connect();
    exhausted.recv().await.unwrap();

    // Two failures in a row, no third attempt ever
    assert_eq!(connector.attempts(), 2);
    assert_eq!(client.state(), ConnectionState::Closed);
    assert!(!client.is_connected());

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(connector.attempts(), 2);

    // The signal fires exactly once
    assert!(exhausted.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn attempt_counter_resets_after_successful_open() {
    let (connector, mut handles) = MockConnector::new(0);
    let client = RealtimeClient::new(test_config(), ClientCallbacks::new(), Arc::clone(&connector) as Arc<dyn eventline::Connector>);

    client.connect();
    let server1 = handles.recv().await.unwrap();

    // Server drops the connection; with the counter reset on open, the
    // retry fires at the fast end of the curve.
    let dropped = Instant::now();
    drop(server1);
    let server2 = handles.recv().await.unwrap();
    let first_retry = dropped.elapsed();
    assert!(
        first_retry >= Duration::from_millis(1000) && first_retry < Duration::from_millis(1100),
        "unexpected first retry delay: {:?}",
        first_retry
    );

    // And again after the second stable open
    let dropped = Instant::now();
    drop(server2);
    let _server3 = handles.recv().await.unwrap();
    let second_retry = dropped.elapsed();
    assert!(
        second_retry >= Duration::from_millis(1000) && second_retry < Duration::from_millis(1100),
        "unexpected retry delay after reset: {:?}",
        second_retry
    );

    assert_eq!(connector.attempts(), 3);
}

#[tokio::test(start_paused = true)]
async fn connect_after_exhaustion_starts_a_fresh_cycle() {
    // The exhausted client stays closed until the application explicitly
    // asks for a new cycle.
    let (connector, mut handles) = MockConnector::new(2);
    let (exhausted_tx, mut exhausted) = mpsc::unbounded_channel();
    let callbacks = ClientCallbacks::new().with_on_retries_exhausted(move || {
        let _ = exhausted_tx.send(());
    });

    let config = ClientConfig {
        max_reconnect_attempts: 2,
        ..test_config()
    };
    let client = RealtimeClient::new(config, callbacks, Arc::clone(&connector) as Arc<dyn eventline::Connector>);

    client.connect();
    exhausted.recv().await.unwrap();
    assert_eq!(client.state(), ConnectionState::Closed);

    // Third mock attempt succeeds
    client.connect();
    let _server = handles.recv().await.unwrap();
    assert!(client.is_connected());
    assert_eq!(connector.attempts(), 3);
}
