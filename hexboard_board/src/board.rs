// Per-client board: an ordered sequence of pieces.
//
// Every participant holds its own `BoardState`. Local input mutates it
// directly; inbound `move` snapshots overwrite it positionally through
// `replace_all`. Index is the only piece identity the protocol has, so two
// boards agree only while they have the same length and the same kind at
// every index.
//
// `replace_all` is the one place that trust can break. A snapshot whose
// length differs from the local board is refused as a whole
// (`SnapshotError::LengthMismatch`) and the board is left exactly as it was;
// the caller decides whether to ask peers for a full state. Applying a
// snapshot of the right length is idempotent.
//
// Positions are never validated: pieces may stack on one cell and may sit
// outside any drawn grid radius.

use serde::{Deserialize, Serialize};

use crate::hex::{AxialCoord, HexLayout, PixelPoint};
use crate::piece::{Piece, PieceKind, Rotation, clamp_health};
use crate::snapshot::{PieceRecord, PieceSnapshot};

/// Pixel radius around a piece centre that counts as grabbing it.
pub const GRAB_RADIUS: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("no piece at index {index} (board holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot holds {remote} pieces but the local board holds {local}")]
    LengthMismatch { local: usize, remote: usize },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pieces: Vec<Piece>,
}

impl BoardState {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// The roster every client loads with: a player at the origin and a
    /// skeleton at (2, 2).
    pub fn starting_roster() -> Self {
        Self::from_pieces(vec![
            Piece::new(PieceKind::Player, AxialCoord::new(0, 0)),
            Piece::new(PieceKind::Skeleton, AxialCoord::new(2, 2)),
        ])
    }

    pub fn from_pieces(pieces: Vec<Piece>) -> Self {
        Self { pieces }
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Piece> {
        self.pieces.get(index)
    }

    fn piece_mut(&mut self, index: usize) -> Result<&mut Piece, BoardError> {
        let len = self.pieces.len();
        self.pieces
            .get_mut(index)
            .ok_or(BoardError::IndexOutOfRange { index, len })
    }

    /// Append a new piece with the kind's default health, facing 0.
    pub fn add_piece(&mut self, position: AxialCoord, kind: PieceKind) -> Piece {
        let piece = Piece::new(kind, position);
        self.pieces.push(piece);
        piece
    }

    /// Delete by index. Later pieces shift down one slot.
    pub fn remove_piece(&mut self, index: usize) -> Result<Piece, BoardError> {
        if index >= self.pieces.len() {
            return Err(BoardError::IndexOutOfRange {
                index,
                len: self.pieces.len(),
            });
        }
        Ok(self.pieces.remove(index))
    }

    pub fn move_piece(&mut self, index: usize, position: AxialCoord) -> Result<(), BoardError> {
        self.piece_mut(index)?.position = position;
        Ok(())
    }

    /// Turn one facing clockwise. Returns the new rotation.
    pub fn rotate_piece(&mut self, index: usize) -> Result<Rotation, BoardError> {
        let piece = self.piece_mut(index)?;
        piece.rotation = piece.rotation.rotated_cw();
        Ok(piece.rotation)
    }

    /// `health = max(0, health + delta)`. Returns the new health.
    pub fn adjust_health(&mut self, index: usize, delta: i32) -> Result<u32, BoardError> {
        Ok(self.piece_mut(index)?.apply_health_delta(delta))
    }

    /// Overwrite position, rotation and health of every piece, slot by slot.
    ///
    /// Refuses the whole snapshot if its length differs from the board's;
    /// nothing is modified in that case.
    pub fn replace_all(&mut self, snapshot: &[PieceSnapshot]) -> Result<(), SnapshotError> {
        if snapshot.len() != self.pieces.len() {
            return Err(SnapshotError::LengthMismatch {
                local: self.pieces.len(),
                remote: snapshot.len(),
            });
        }
        for (piece, snap) in self.pieces.iter_mut().zip(snapshot) {
            piece.position = snap.position();
            piece.rotation = Rotation::from_degrees(snap.rotation);
            if let Some(health) = snap.health {
                piece.health = clamp_health(health);
            }
        }
        Ok(())
    }

    /// Replace the entire sequence, length and kinds included.
    pub fn load_full_state(&mut self, records: &[PieceRecord]) {
        self.pieces = records.iter().map(Piece::from).collect();
    }

    /// First piece standing on `position`.
    pub fn find_at(&self, position: AxialCoord) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.position == position)
    }

    /// Index of the first piece standing on `position`.
    pub fn index_at(&self, position: AxialCoord) -> Option<usize> {
        self.pieces.iter().position(|p| p.position == position)
    }

    /// Index of the first piece whose drawn centre is strictly within
    /// `radius` pixels of `point`.
    pub fn pick_at_pixel(
        &self,
        layout: &HexLayout,
        point: PixelPoint,
        radius: f64,
    ) -> Option<usize> {
        self.pieces
            .iter()
            .position(|p| layout.axial_to_pixel(p.position).distance_to(point) < radius)
    }

    /// The `move` payload for the current board.
    pub fn to_snapshot(&self) -> Vec<PieceSnapshot> {
        self.pieces.iter().map(PieceSnapshot::from).collect()
    }

    /// The full-state payload for the current board.
    pub fn to_full_state(&self) -> Vec<PieceRecord> {
        self.pieces.iter().map(PieceRecord::from).collect()
    }
}
