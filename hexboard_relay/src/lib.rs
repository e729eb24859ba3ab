// hexboard_relay: stateless fan-out relay for shared hexboard sessions.
//
// The relay accepts TCP connections from board clients, and every payload a
// client broadcasts is copied to every other open connection. It never
// decodes a payload, keeps no board state, sends no history to newcomers,
// and tells no one when a connection closes. All board logic stays on the
// clients (`hexboard_client`).
//
// Module overview:
// - `session.rs`:  The connection set: admission checks, fan-out that skips
//                  the sender, silent removal.
// - `server.rs`:   TCP listener, handshake and reader threads, and the main
//                  event loop. Uses `std::net` with a thread-per-reader
//                  architecture and an `mpsc` channel to funnel events into
//                  the single-threaded `Session`.
// - `client.rs`:   `NetClient`, the client half of the connection, used by
//                  `hexboard_client` and the integration tests.
//
// The relay can run as a standalone binary (`main.rs`) or be embedded in
// another process via `start_relay`.

pub mod client;
pub mod server;
pub mod session;

pub use client::{ClientError, NetClient, WelcomeInfo};
pub use server::{RelayConfig, RelayHandle, start_relay};
