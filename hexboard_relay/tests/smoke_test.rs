// Integration smoke test for the relay server.
//
// Starts a relay on localhost and talks to it with plain TCP sockets using
// the protocol crate's framing and message types, no board code involved.
// Covers the handshake, fan-out that skips the sender, per-sender ordering,
// silent disconnects, and both rejection paths. The last test drives the
// same flow through `NetClient`.

use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use hexboard_protocol::framing::{read_json, write_json, write_message};
use hexboard_protocol::message::{ClientMessage, PROTOCOL_VERSION, ServerMessage};
use hexboard_protocol::types::RelayPlayerId;
use hexboard_relay::client::{ClientError, NetClient};
use hexboard_relay::server::{RelayConfig, RelayHandle, start_relay};

struct RawPeer {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    id: RelayPlayerId,
}

impl RawPeer {
    fn broadcast(&mut self, payload: &[u8]) {
        write_json(
            &mut self.writer,
            &ClientMessage::Broadcast {
                payload: payload.to_vec(),
            },
        )
        .unwrap();
    }

    fn recv(&mut self) -> ServerMessage {
        read_json(&mut self.reader).unwrap()
    }

    fn recv_relayed(&mut self) -> (RelayPlayerId, Vec<u8>) {
        match self.recv() {
            ServerMessage::Relayed { from, payload } => (from, payload),
            other => panic!("expected Relayed, got {other:?}"),
        }
    }

    /// Nothing arrives within a short window.
    fn assert_silent(&mut self) {
        self.reader
            .get_ref()
            .set_read_timeout(Some(Duration::from_millis(150)))
            .unwrap();
        let result = read_json::<_, ServerMessage>(&mut self.reader);
        assert!(result.is_err(), "unexpected message: {result:?}");
        self.reader
            .get_ref()
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
    }
}

fn start(max_peers: u32) -> (RelayHandle, SocketAddr) {
    start_relay(RelayConfig {
        port: 0,
        session_name: "smoke-test".into(),
        max_peers,
        ..RelayConfig::default()
    })
    .unwrap()
}

/// Connect and send Hello; return the raw halves and the first response.
fn hello(
    addr: SocketAddr,
    name: &str,
    version: u32,
) -> (BufReader<TcpStream>, BufWriter<TcpStream>, ServerMessage) {
    let stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut writer = BufWriter::new(stream);
    write_json(
        &mut writer,
        &ClientMessage::Hello {
            protocol_version: version,
            player_name: name.into(),
        },
    )
    .unwrap();
    let response = read_json(&mut reader).unwrap();
    (reader, writer, response)
}

fn join(addr: SocketAddr, name: &str) -> RawPeer {
    let (reader, writer, response) = hello(addr, name, PROTOCOL_VERSION);
    let id = match response {
        ServerMessage::Welcome { player_id, .. } => player_id,
        other => panic!("expected Welcome, got {other:?}"),
    };
    RawPeer { reader, writer, id }
}

#[test]
fn broadcast_reaches_everyone_but_the_sender() {
    let (handle, addr) = start(8);
    let mut a = join(addr, "A");
    let mut b = join(addr, "B");
    let mut c = join(addr, "C");

    let payload = br#"{"event":"move","pieces":[{"x":1,"y":1,"rotation":0,"health":10}]}"#;
    a.broadcast(payload);

    for peer in [&mut b, &mut c] {
        let (from, got) = peer.recv_relayed();
        assert_eq!(from, a.id);
        assert_eq!(got, payload);
    }
    a.assert_silent();

    handle.stop();
}

#[test]
fn payload_is_not_inspected() {
    let (handle, addr) = start(8);
    let mut a = join(addr, "A");
    let mut b = join(addr, "B");

    let garbage = [0xFF, 0x00, 0x7B, 0x22];
    a.broadcast(&garbage);
    assert_eq!(b.recv_relayed().1, garbage);

    handle.stop();
}

#[test]
fn per_sender_order_is_preserved() {
    let (handle, addr) = start(8);
    let mut a = join(addr, "A");
    let mut b = join(addr, "B");

    for i in 0..50u8 {
        a.broadcast(&[i]);
    }
    for i in 0..50u8 {
        assert_eq!(b.recv_relayed().1, vec![i]);
    }

    handle.stop();
}

#[test]
fn welcome_counts_connections() {
    let (handle, addr) = start(8);
    let (_r1, _w1, first) = hello(addr, "A", PROTOCOL_VERSION);
    let (_r2, _w2, second) = hello(addr, "B", PROTOCOL_VERSION);
    match (first, second) {
        (
            ServerMessage::Welcome {
                peer_count: 1,
                session_name,
                ..
            },
            ServerMessage::Welcome { peer_count: 2, .. },
        ) => assert_eq!(session_name, "smoke-test"),
        other => panic!("unexpected welcomes: {other:?}"),
    }
    handle.stop();
}

#[test]
fn late_joiner_gets_no_history() {
    let (handle, addr) = start(8);
    let mut a = join(addr, "A");
    let mut b = join(addr, "B");
    a.broadcast(b"before");
    assert_eq!(b.recv_relayed().1, b"before");

    let mut late = join(addr, "Late");
    late.assert_silent();

    a.broadcast(b"after");
    assert_eq!(late.recv_relayed().1, b"after");

    handle.stop();
}

#[test]
fn goodbye_and_drop_are_silent_and_stop_delivery() {
    let (handle, addr) = start(8);
    let mut a = join(addr, "A");
    let mut b = join(addr, "B");
    let c = join(addr, "C");

    write_json(&mut b.writer, &ClientMessage::Goodbye).unwrap();
    drop(c.writer);
    drop(c.reader);
    std::thread::sleep(Duration::from_millis(200));

    // Nobody is told, and broadcasts still work for whoever remains.
    a.assert_silent();
    let mut d = join(addr, "D");
    a.broadcast(b"still here");
    assert_eq!(d.recv_relayed().1, b"still here");
    a.assert_silent();

    // b's socket is closed by its own Goodbye path; nothing more arrives.
    let leftover = read_json::<_, ServerMessage>(&mut b.reader);
    assert!(leftover.is_err(), "b should receive nothing: {leftover:?}");

    handle.stop();
}

#[test]
fn wrong_protocol_version_is_rejected() {
    let (handle, addr) = start(8);
    let (_r, _w, response) = hello(addr, "Old", PROTOCOL_VERSION + 1);
    match response {
        ServerMessage::Rejected { reason } => {
            assert!(reason.contains("protocol version"), "{reason}");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    handle.stop();
}

#[test]
fn full_relay_rejects_and_frees_slot_on_leave() {
    let (handle, addr) = start(1);
    let mut first = join(addr, "First");

    let (_r, _w, response) = hello(addr, "Second", PROTOCOL_VERSION);
    assert_eq!(
        response,
        ServerMessage::Rejected {
            reason: "session is full".into()
        }
    );

    write_json(&mut first.writer, &ClientMessage::Goodbye).unwrap();
    std::thread::sleep(Duration::from_millis(200));
    let _third = join(addr, "Third");

    handle.stop();
}

#[test]
fn non_hello_first_frame_drops_connection() {
    let (handle, addr) = start(8);
    let stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut writer = BufWriter::new(stream);
    write_message(&mut writer, b"not json at all").unwrap();

    let err = read_json::<_, ServerMessage>(&mut reader).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);

    handle.stop();
}

#[test]
fn net_client_round_trip() {
    let (handle, addr) = start(8);
    let (mut alice, alice_welcome) = NetClient::connect(addr, "Alice").unwrap();
    let (bob, bob_welcome) = NetClient::connect(addr, "Bob").unwrap();
    assert_eq!(alice_welcome.peer_count, 1);
    assert_eq!(bob_welcome.peer_count, 2);
    assert_ne!(alice.player_id(), bob.player_id());

    alice.broadcast(b"hi").unwrap();
    match bob.recv_timeout(Duration::from_secs(5)) {
        Some(ServerMessage::Relayed { from, payload }) => {
            assert_eq!(from, alice.player_id());
            assert_eq!(payload, b"hi");
        }
        other => panic!("expected Relayed, got {other:?}"),
    }
    assert!(alice.recv_timeout(Duration::from_millis(150)).is_none());

    alice.disconnect();
    assert!(alice.is_closed());
    assert!(!bob.is_closed());

    handle.stop();
}

#[test]
fn net_client_surfaces_rejection() {
    let (handle, addr) = start(8);
    match NetClient::connect_with_version(addr, "Old", 0) {
        Err(ClientError::Rejected(reason)) => assert!(reason.contains("protocol version")),
        Err(other) => panic!("expected Rejected, got {other}"),
        Ok(_) => panic!("expected Rejected, got Welcome"),
    }
    handle.stop();
}

#[test]
fn stopping_the_relay_closes_clients() {
    let (handle, addr) = start(8);
    let (client, _) = NetClient::connect(addr, "Alice").unwrap();
    handle.stop();

    for _ in 0..50 {
        if client.is_closed() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("client never saw the relay close");
}
