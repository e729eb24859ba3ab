// Wire shapes for board snapshots.
//
// A `move` event carries `Vec<PieceSnapshot>`: only the mutable fields of
// each piece, in board order. `x`/`y` are the axial `q`/`r` of the cell.
// Health is optional on the wire; a receiver that gets no health for a slot
// keeps its own value.
//
// `PieceRecord` is the full-state form used to repair a board whose length
// no longer matches its peers. It includes the kind so the receiver can
// rebuild pieces it has never seen.
//
// Numbers are signed on the wire so that a misbehaving peer's negative
// health or off-grid rotation deserializes cleanly and gets clamped on
// apply, rather than failing the whole message.

use serde::{Deserialize, Serialize};

use crate::hex::AxialCoord;
use crate::piece::{Piece, PieceKind, Rotation, clamp_health};

/// Mutable fields of one piece, as sent in a `move` event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub x: i32,
    pub y: i32,
    pub rotation: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<i64>,
}

impl PieceSnapshot {
    pub fn position(&self) -> AxialCoord {
        AxialCoord::new(self.x, self.y)
    }
}

impl From<&Piece> for PieceSnapshot {
    fn from(piece: &Piece) -> Self {
        Self {
            x: piece.position.q,
            y: piece.position.r,
            rotation: i32::from(piece.rotation),
            health: Some(i64::from(piece.health)),
        }
    }
}

/// A complete piece, as sent in a full-state repair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceRecord {
    pub kind: PieceKind,
    pub x: i32,
    pub y: i32,
    pub rotation: i32,
    pub health: i64,
}

impl From<&Piece> for PieceRecord {
    fn from(piece: &Piece) -> Self {
        Self {
            kind: piece.kind,
            x: piece.position.q,
            y: piece.position.r,
            rotation: i32::from(piece.rotation),
            health: i64::from(piece.health),
        }
    }
}

impl From<&PieceRecord> for Piece {
    fn from(record: &PieceRecord) -> Self {
        Piece {
            position: AxialCoord::new(record.x, record.y),
            kind: record.kind,
            rotation: Rotation::from_degrees(record.rotation),
            health: clamp_health(record.health),
        }
    }
}
