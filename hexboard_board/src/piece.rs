// Pieces and the closed table of piece kinds.
//
// `PieceKind` is a closed enum; everything that used to hang off a free-form
// kind string (starting health, the glyph drawn on the token, its colour)
// comes from the `KindInfo` row returned by `PieceKind::info`. Colour is
// therefore never stored on a piece.
//
// `Rotation` keeps the multiple-of-60 invariant in the type: every
// constructor snaps to one of the six facings, including the serde path, so
// a bad value from the wire can't produce an off-grid facing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::hex::AxialCoord;

/// Per-kind display and stat data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KindInfo {
    pub name: &'static str,
    pub default_health: u32,
    pub glyph: char,
    pub color: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    Skeleton,
    Ghoul,
    Wraith,
    Construct,
    Player,
}

impl PieceKind {
    pub const ALL: [PieceKind; 5] = [
        PieceKind::Skeleton,
        PieceKind::Ghoul,
        PieceKind::Wraith,
        PieceKind::Construct,
        PieceKind::Player,
    ];

    pub const fn info(self) -> KindInfo {
        match self {
            PieceKind::Skeleton => KindInfo {
                name: "skeleton",
                default_health: 3,
                glyph: 'S',
                color: "blue",
            },
            PieceKind::Ghoul => KindInfo {
                name: "ghoul",
                default_health: 4,
                glyph: 'G',
                color: "green",
            },
            PieceKind::Wraith => KindInfo {
                name: "wraith",
                default_health: 5,
                glyph: 'W',
                color: "purple",
            },
            PieceKind::Construct => KindInfo {
                name: "construct",
                default_health: 8,
                glyph: 'C',
                color: "gray",
            },
            PieceKind::Player => KindInfo {
                name: "player",
                default_health: 10,
                glyph: 'P',
                color: "red",
            },
        }
    }

    pub const fn default_health(self) -> u32 {
        self.info().default_health
    }

    pub const fn glyph(self) -> char {
        self.info().glyph
    }

    pub const fn color(self) -> &'static str {
        self.info().color
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown piece kind: {0:?}")]
pub struct UnknownKind(pub String);

impl FromStr for PieceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PieceKind::ALL
            .into_iter()
            .find(|kind| kind.info().name.eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Facing in degrees, always one of 0, 60, 120, 180, 240, 300.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "i32", into = "i32")]
pub struct Rotation(u16);

impl Rotation {
    pub const STEP: u16 = 60;

    /// Wrap into `[0, 360)` and snap down to a facing.
    pub fn from_degrees(degrees: i32) -> Self {
        let wrapped = degrees.rem_euclid(360) as u16;
        Self(wrapped - wrapped % Self::STEP)
    }

    pub const fn degrees(self) -> u16 {
        self.0
    }

    /// One facing clockwise: `(rotation + 60) mod 360`.
    pub const fn rotated_cw(self) -> Self {
        Self((self.0 + Self::STEP) % 360)
    }
}

impl From<i32> for Rotation {
    fn from(degrees: i32) -> Self {
        Self::from_degrees(degrees)
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        i32::from(rotation.0)
    }
}

/// One token on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub position: AxialCoord,
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub health: u32,
}

impl Piece {
    /// A fresh piece: kind default health, facing 0.
    pub const fn new(kind: PieceKind, position: AxialCoord) -> Self {
        Self {
            position,
            kind,
            rotation: Rotation(0),
            health: kind.default_health(),
        }
    }

    pub const fn color(&self) -> &'static str {
        self.kind.color()
    }

    pub const fn glyph(&self) -> char {
        self.kind.glyph()
    }

    /// Apply a health change, flooring at zero.
    pub fn apply_health_delta(&mut self, delta: i32) -> u32 {
        self.health = clamp_health(i64::from(self.health) + i64::from(delta));
        self.health
    }
}

/// Clamp a signed health value into the non-negative range a piece can hold.
pub(crate) fn clamp_health(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}
