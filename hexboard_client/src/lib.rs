// hexboard_client: the board side of a shared hexboard session.
//
// A `SyncClient` owns one `BoardState` and one relay connection. Local edits
// (add, remove, move, rotate, health, pointer drag/drop) mutate the board
// and broadcast the whole piece sequence; inbound snapshots overwrite the
// board slot by slot, last one received wins. Dice rolls are shown locally
// and broadcast for display.
//
// Module overview:
// - `config.rs`:  `SyncConfig` and `ConnectionState`.
// - `sync.rs`:    `SyncClient`, inbound application, fault handling and
//                 the full-state repair path.
//
// Rendering and input capture live outside this crate: a front end reads
// `SyncClient::board()` to draw and calls the pointer and edit operations.

pub mod config;
pub mod sync;

pub use config::{ConnectionState, SyncConfig};
pub use sync::{Applied, DropOutcome, SyncClient, SyncError};
