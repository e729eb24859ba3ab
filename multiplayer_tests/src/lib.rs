// Test-only board client for multiplayer integration tests.
//
// Wraps a real `SyncClient` (from `hexboard_client`), which itself owns a
// real `NetClient`, and adds synchronous waiting helpers so tests can drive
// several clients through one relay step by step:
// edit → broadcast → relay fan-out → receive → apply → compare boards.
//
// The only test-specific code here is the blocking loops around
// `SyncClient::receive()`. All networking and board logic uses the same
// code paths as a real front end.
//
// See also: `tests/full_pipeline.rs` for the scenarios.

use std::net::SocketAddr;
use std::thread;
use std::time::{Duration, Instant};

use hexboard_client::{Applied, SyncClient, SyncConfig};
use hexboard_relay::server::{RelayConfig, RelayHandle, start_relay};

/// Default timeout for blocking waits.
const POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// Sleep duration between poll attempts.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long a client must see no traffic to count as quiet.
const QUIET_WINDOW: Duration = Duration::from_millis(150);

/// Start a relay on a random localhost port.
pub fn start_test_relay() -> (RelayHandle, SocketAddr) {
    start_relay(RelayConfig {
        port: 0,
        session_name: "integration-test".into(),
        ..RelayConfig::default()
    })
    .expect("start_relay failed")
}

/// A test board client wrapping a real `SyncClient`.
pub struct TestBoardClient {
    pub sync: SyncClient,
}

impl TestBoardClient {
    /// Connect with default config (starting roster, resync on).
    pub fn connect(addr: SocketAddr, name: &str) -> Self {
        Self::connect_with(
            addr,
            SyncConfig {
                player_name: name.into(),
                ..SyncConfig::default()
            },
        )
    }

    pub fn connect_with(addr: SocketAddr, config: SyncConfig) -> Self {
        let mut sync = SyncClient::new(config);
        sync.connect(&addr.to_string())
            .expect("TestBoardClient::connect failed");
        Self { sync }
    }

    /// Block until at least `count` inbound events are queued (not applied).
    pub fn wait_for_pending(&mut self, count: usize) {
        let start = Instant::now();
        while self.sync.receive() < count {
            assert!(
                start.elapsed() < POLL_TIMEOUT,
                "timed out waiting for {count} inbound event(s), have {}",
                self.sync.pending()
            );
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Wait for exactly one event and apply it.
    pub fn apply_next(&mut self) -> Applied {
        self.wait_for_pending(1);
        let mut applied = self.sync.apply_pending();
        assert_eq!(applied.len(), 1, "expected one event, got {applied:?}");
        applied.remove(0)
    }

    /// Wait for `count` events and apply them all, in arrival order.
    pub fn apply_exactly(&mut self, count: usize) -> Vec<Applied> {
        self.wait_for_pending(count);
        let applied = self.sync.apply_pending();
        assert_eq!(applied.len(), count, "unexpected extra events: {applied:?}");
        applied
    }

    /// Assert nothing arrives within the quiet window.
    pub fn assert_quiet(&mut self) {
        let start = Instant::now();
        while start.elapsed() < QUIET_WINDOW {
            assert_eq!(
                self.sync.receive(),
                0,
                "expected no traffic, got {} event(s)",
                self.sync.pending()
            );
            thread::sleep(POLL_INTERVAL);
        }
    }

    pub fn disconnect(&mut self) {
        self.sync.disconnect();
    }
}

/// Pump every client until none of them has seen traffic for the quiet
/// window. Returns everything each client applied, in client order.
pub fn settle(clients: &mut [&mut TestBoardClient]) -> Vec<Vec<Applied>> {
    let mut applied: Vec<Vec<Applied>> = clients.iter().map(|_| Vec::new()).collect();
    let start = Instant::now();
    let mut last_traffic = Instant::now();
    while last_traffic.elapsed() < QUIET_WINDOW {
        assert!(start.elapsed() < POLL_TIMEOUT, "clients never settled");
        for (client, log) in clients.iter_mut().zip(applied.iter_mut()) {
            let batch = client.sync.pump();
            if !batch.is_empty() {
                last_traffic = Instant::now();
                log.extend(batch);
            }
        }
        thread::sleep(POLL_INTERVAL);
    }
    applied
}
