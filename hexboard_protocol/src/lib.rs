// hexboard_protocol: wire protocol between board clients and the relay.
//
// Shared by `hexboard_relay` and `hexboard_client`. Two layers:
//
// - The relay envelope (`message.rs`): handshake, broadcast, relayed
//   delivery. This is all the relay understands.
// - Board events (`event.rs`): `move`, `roll`, and the full-state repair
//   pair. Clients put these inside the envelope's opaque payload; the relay
//   forwards them without looking.
//
// Module overview:
// - `types.rs`:    `RelayPlayerId`.
// - `message.rs`:  `ClientMessage`, `ServerMessage`, `PROTOCOL_VERSION`.
// - `event.rs`:    `BoardEvent` and its JSON encoding.
// - `framing.rs`:  4-byte big-endian length prefix + JSON body over any
//                  `Read`/`Write`.
//
// No async runtime: framing works on blocking `std::io` streams, which is
// what the relay's thread-per-reader loop and the client's reader thread use.

pub mod event;
pub mod framing;
pub mod message;
pub mod types;

pub use event::BoardEvent;
pub use framing::{MAX_MESSAGE_SIZE, read_json, read_message, write_json, write_message};
pub use message::{ClientMessage, PROTOCOL_VERSION, ServerMessage};
pub use types::RelayPlayerId;
