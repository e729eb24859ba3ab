// Board events: the payloads clients exchange through the relay.
//
// Encoded as internally tagged JSON, e.g.
//
//   {"event":"move","pieces":[{"x":1,"y":1,"rotation":0,"health":10}, ...]}
//   {"event":"roll","value":4}
//
// `move` carries the sender's whole board in order; receivers overwrite
// their own board slot by slot. `roll` is display-only and is relayed as-is
// even when outside 1..=6. `snapshot_request` and `full_state` form the
// repair path a client uses after refusing a snapshot of the wrong length.
// The relay only broadcasts, so `full_state` names its requester and every
// other receiver ignores it.

use hexboard_board::{PieceRecord, PieceSnapshot};
use serde::{Deserialize, Serialize};

use crate::types::RelayPlayerId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BoardEvent {
    /// The sender's full piece sequence after a local mutation.
    Move { pieces: Vec<PieceSnapshot> },
    /// A local dice roll.
    Roll { value: i32 },
    /// The sender's board no longer lines up with its peers; any peer may
    /// answer with `FullState`.
    SnapshotRequest,
    /// Complete board, kinds included, replacing the requester's sequence.
    FullState {
        requester: RelayPlayerId,
        pieces: Vec<PieceRecord>,
    },
}

impl BoardEvent {
    /// Short event name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            BoardEvent::Move { .. } => "move",
            BoardEvent::Roll { .. } => "roll",
            BoardEvent::SnapshotRequest => "snapshot_request",
            BoardEvent::FullState { .. } => "full_state",
        }
    }

    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn decode(payload: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(payload)
    }
}
