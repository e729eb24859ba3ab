// hexboard_board: the shared hex board each participant holds.
//
// Pure data and geometry: no networking, no rendering, no clocks. Both the
// sync client and the protocol crate build on these types.
//
// Module overview:
// - `hex.rs`:      Axial coordinates, the pointy-top pixel layout, cube
//                  rounding, and grid-radius helpers.
// - `piece.rs`:    `Piece`, the closed `PieceKind` table (health, glyph,
//                  colour), and the `Rotation` facing type.
// - `board.rs`:    `BoardState`, the ordered piece sequence and its local
//                  mutations, plus checked positional `replace_all`.
// - `snapshot.rs`: Wire shapes for `move` snapshots and full-state repairs.

pub mod board;
pub mod hex;
pub mod piece;
pub mod snapshot;

pub use board::{BoardError, BoardState, GRAB_RADIUS, SnapshotError};
pub use hex::{
    AxialCoord, HEX_SIZE, HexLayout, PixelPoint, cell_distance_from_origin, cells_within,
    round_to_nearest_cell,
};
pub use piece::{KindInfo, Piece, PieceKind, Rotation, UnknownKind};
pub use snapshot::{PieceRecord, PieceSnapshot};
