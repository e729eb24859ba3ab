// Hex-grid coordinate system.
//
// Cells are addressed with axial coordinates `(q, r)`. The third cube
// coordinate `s = -q - r` is derived on demand for distance checks and
// rounding, never stored. The pixel mapping is the pointy-top layout:
//
//   x = size * (√3·q + √3/2·r)
//   y = size * (3/2·r)
//
// `HexLayout::pixel_to_axial` is the exact inverse followed by cube rounding,
// so a pointer press anywhere inside a hexagon snaps to that hexagon's cell.
// Everything here is pure and total: no I/O, no error paths.
//
// The grid itself is unbounded. `cells_within` and `distance_from_origin`
// exist for drawing a finite board outline; they say nothing about where a
// piece may legally stand.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default hex radius in pixels (centre to corner).
pub const HEX_SIZE: f64 = 30.0;

const SQRT_3: f64 = 1.732_050_807_568_877;

/// One cell of the hex grid.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AxialCoord {
    pub q: i32,
    pub r: i32,
}

impl AxialCoord {
    pub const ORIGIN: Self = Self::new(0, 0);

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The derived cube coordinate `s = -q - r`, widened to i64.
    pub const fn cube_s(self) -> i64 {
        -(self.q as i64) - self.r as i64
    }

    /// Number of steps between two cells.
    pub fn distance(self, other: Self) -> i64 {
        let dq = i64::from(self.q) - i64::from(other.q);
        let dr = i64::from(self.r) - i64::from(other.r);
        cube_distance(dq, dr)
    }

    pub fn distance_from_origin(self) -> i64 {
        cell_distance_from_origin(self.q, self.r)
    }
}

impl fmt::Display for AxialCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// A point in canvas space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Pixel mapping for a pointy-top grid. `origin` is where cell (0, 0) is
/// drawn; it is added on the way out and removed on the way in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HexLayout {
    pub size: f64,
    pub origin: PixelPoint,
}

impl Default for HexLayout {
    fn default() -> Self {
        Self {
            size: HEX_SIZE,
            origin: PixelPoint::default(),
        }
    }
}

impl HexLayout {
    pub const fn new(size: f64, origin: PixelPoint) -> Self {
        Self { size, origin }
    }

    /// Centre of `cell` in canvas space.
    pub fn axial_to_pixel(&self, cell: AxialCoord) -> PixelPoint {
        let q = f64::from(cell.q);
        let r = f64::from(cell.r);
        PixelPoint {
            x: self.size * (SQRT_3 * q + SQRT_3 / 2.0 * r) + self.origin.x,
            y: self.size * (1.5 * r) + self.origin.y,
        }
    }

    /// Inverse of `axial_to_pixel` without rounding: fractional `(q, r)`.
    pub fn pixel_to_fractional(&self, point: PixelPoint) -> (f64, f64) {
        let x = point.x - self.origin.x;
        let y = point.y - self.origin.y;
        let q = (SQRT_3 / 3.0 * x - y / 3.0) / self.size;
        let r = (2.0 / 3.0 * y) / self.size;
        (q, r)
    }

    /// The cell containing `point`.
    pub fn pixel_to_axial(&self, point: PixelPoint) -> AxialCoord {
        let (fq, fr) = self.pixel_to_fractional(point);
        round_to_nearest_cell(fq, fr)
    }

    /// The six outline corners of `cell`, starting at 30° and going
    /// clockwise in screen space (y grows downward).
    pub fn hex_corners(&self, cell: AxialCoord) -> [PixelPoint; 6] {
        let center = self.axial_to_pixel(cell);
        std::array::from_fn(|i| {
            let angle = PI / 180.0 * (60.0 * i as f64 + 30.0);
            PixelPoint {
                x: center.x + self.size * angle.cos(),
                y: center.y + self.size * angle.sin(),
            }
        })
    }
}

/// Cube rounding: snap fractional axial coordinates to the nearest cell.
///
/// Each cube component is rounded independently, then the component with
/// the largest rounding error is recomputed from the other two so that
/// `x + y + z == 0` holds exactly. Ties go to x first, then y, then z.
pub fn round_to_nearest_cell(fq: f64, fr: f64) -> AxialCoord {
    let x = fq;
    let z = fr;
    let y = -x - z;

    let mut rx = x.round();
    let mut ry = y.round();
    let mut rz = z.round();

    let x_diff = (rx - x).abs();
    let y_diff = (ry - y).abs();
    let z_diff = (rz - z).abs();

    if x_diff > y_diff && x_diff > z_diff {
        rx = -ry - rz;
    } else if y_diff > z_diff {
        ry = -rx - rz;
    } else {
        rz = -rx - ry;
    }
    debug_assert_eq!(rx + ry + rz, 0.0);

    AxialCoord {
        q: rx as i32,
        r: rz as i32,
    }
}

/// Ring index of `(q, r)`: `max(|q|, |s|, |r|)` in cube form.
pub fn cell_distance_from_origin(q: i32, r: i32) -> i64 {
    cube_distance(i64::from(q), i64::from(r))
}

// Inputs are at most 2^32 in magnitude, so none of this can overflow i64.
fn cube_distance(q: i64, r: i64) -> i64 {
    let s = -q - r;
    q.abs().max(s.abs()).max(r.abs())
}

/// Every cell of a hexagon-shaped grid of the given radius, ordered by
/// `(q, r)`. A radius of 0 is the single origin cell; a negative radius is
/// empty.
pub fn cells_within(radius: i32) -> Vec<AxialCoord> {
    let mut cells = Vec::new();
    if radius < 0 {
        return cells;
    }
    for q in -radius..=radius {
        for r in -radius..=radius {
            if cell_distance_from_origin(q, r) <= i64::from(radius) {
                cells.push(AxialCoord::new(q, r));
            }
        }
    }
    cells
}
