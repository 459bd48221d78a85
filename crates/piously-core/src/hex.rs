//! Hex coordinate system using cube coordinates (x, y, z).
//!
//! The Piously board is an irregular patch of hexes assembled from movable
//! rooms, so there is no fixed grid: a coordinate either has a hex on it or
//! it doesn't. Cube coordinates keep the neighbor math, straight-line
//! ("leap") math, and 60-degree rotations all integer-exact.
//!
//! Axial conversions exist for external collaborators (renderers, input
//! shims) that prefer two components.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};

/// One of the six hex directions, clockwise starting from East.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East,
    SouthEast,
    SouthWest,
    West,
    NorthWest,
    NorthEast,
}

impl Direction {
    /// All six directions in clockwise order starting from East.
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::NorthEast,
    ];

    /// The unit cube vector for this direction.
    pub const fn delta(self) -> HexCoord {
        match self {
            Direction::East => HexCoord { x: 1, y: -1, z: 0 },
            Direction::SouthEast => HexCoord { x: 0, y: -1, z: 1 },
            Direction::SouthWest => HexCoord { x: -1, y: 0, z: 1 },
            Direction::West => HexCoord { x: -1, y: 1, z: 0 },
            Direction::NorthWest => HexCoord { x: 0, y: 1, z: -1 },
            Direction::NorthEast => HexCoord { x: 1, y: 0, z: -1 },
        }
    }
}

/// Cube coordinate for the hex grid.
///
/// Invariant: `x + y + z == 0`. Constructors debug-assert it; arithmetic
/// preserves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl HexCoord {
    /// Create a new cube coordinate.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        debug_assert!(x + y + z == 0, "cube coordinate must sum to zero");
        Self { x, y, z }
    }

    /// Convert from axial coordinates (`q = x`, `r = z`).
    pub const fn from_axial(q: i32, r: i32) -> Self {
        Self::new(q, -q - r, r)
    }

    /// Convert to axial coordinates `(q, r)`.
    pub const fn to_axial(self) -> (i32, i32) {
        (self.x, self.z)
    }

    /// The six neighboring coordinates, in `Direction::ALL` order.
    pub fn neighbors(self) -> [HexCoord; 6] {
        Direction::ALL.map(|d| self + d.delta())
    }

    /// The neighboring coordinate in a specific direction.
    pub fn neighbor(self, direction: Direction) -> HexCoord {
        self + direction.delta()
    }

    /// Distance to another coordinate in hex steps.
    pub fn distance_to(self, other: HexCoord) -> u32 {
        let d = self - other;
        ((d.x.abs() + d.y.abs() + d.z.abs()) / 2) as u32
    }

    /// Scale by an integer factor.
    pub const fn scaled(self, k: i32) -> HexCoord {
        HexCoord {
            x: self.x * k,
            y: self.y * k,
            z: self.z * k,
        }
    }

    /// Rotate 60 degrees clockwise about the origin.
    pub const fn rotated_cw(self) -> HexCoord {
        HexCoord {
            x: -self.z,
            y: -self.x,
            z: -self.y,
        }
    }

    /// Rotate 60 degrees counterclockwise about the origin.
    pub const fn rotated_ccw(self) -> HexCoord {
        HexCoord {
            x: -self.y,
            y: -self.z,
            z: -self.x,
        }
    }

    /// Decompose `self` (as a displacement) into a unit direction step and
    /// a positive length, or `None` if the displacement is zero or does not
    /// lie along one of the six directions.
    ///
    /// This is the arithmetic half of the leap rule: two hexes are aligned
    /// iff their displacement divided by the gcd of its components is a
    /// unit vector.
    pub fn unit_step(self) -> Option<(HexCoord, i32)> {
        let g = gcd(gcd(self.x.abs(), self.y.abs()), self.z.abs());
        if g == 0 {
            return None;
        }
        let step = HexCoord {
            x: self.x / g,
            y: self.y / g,
            z: self.z / g,
        };
        if Direction::ALL.iter().any(|d| d.delta() == step) {
            Some((step, g))
        } else {
            None
        }
    }
}

impl Add for HexCoord {
    type Output = HexCoord;

    fn add(self, rhs: HexCoord) -> HexCoord {
        HexCoord {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Sub for HexCoord {
    type Output = HexCoord;

    fn sub(self, rhs: HexCoord) -> HexCoord {
        HexCoord {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl Neg for HexCoord {
    type Output = HexCoord;

    fn neg(self) -> HexCoord {
        HexCoord {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

fn gcd(a: i32, b: i32) -> i32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
