// Relay envelope messages.
//
// - `ClientMessage`: sent by a board client to the relay.
// - `ServerMessage`: sent by the relay to a board client.
//
// Board traffic rides inside `Broadcast`/`Relayed` as an opaque byte
// payload. The relay copies those bytes from one connection to every other
// connection without decoding them, so it has no idea what a board is. The
// client side encodes and decodes the payload with `event.rs`.

use serde::{Deserialize, Serialize};

use crate::types::RelayPlayerId;

/// Current envelope version. The relay refuses a `Hello` with any other.
pub const PROTOCOL_VERSION: u32 = 1;

/// Messages sent by a client to the relay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Join the relay (handshake).
    Hello {
        protocol_version: u32,
        player_name: String,
    },
    /// Forward `payload` to every other connected client.
    Broadcast { payload: Vec<u8> },
    /// Client is leaving.
    Goodbye,
}

/// Messages sent by the relay to a client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Handshake accepted. `peer_count` includes the new client.
    Welcome {
        player_id: RelayPlayerId,
        session_name: String,
        peer_count: u32,
    },
    /// Handshake refused; the relay closes the connection afterwards.
    Rejected { reason: String },
    /// A payload broadcast by another client, byte-for-byte.
    Relayed {
        from: RelayPlayerId,
        payload: Vec<u8>,
    },
}
