//! Integer world coordinates and the six facing directions.
//!
//! Axis convention: +x east, +y up, +z south. `Orientation` gives each
//! controller exactly one facing; template walks and scan cursors derive
//! their frames from it.

use serde::{Deserialize, Serialize};

/// Integer (x, y, z) world coordinate. Immutable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position3 {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// This position displaced by the given deltas.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// This position moved `n` blocks along `dir`.
    pub fn along(self, dir: Orientation, n: i32) -> Self {
        let (dx, dy, dz) = dir.unit();
        self.offset(dx * n, dy * n, dz * n)
    }
}

/// One of the six facing directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Orientation {
    /// Unit vector for this facing.
    pub fn unit(self) -> (i32, i32, i32) {
        match self {
            Orientation::North => (0, 0, -1),
            Orientation::South => (0, 0, 1),
            Orientation::East => (1, 0, 0),
            Orientation::West => (-1, 0, 0),
            Orientation::Up => (0, 1, 0),
            Orientation::Down => (0, -1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Orientation::North => Orientation::South,
            Orientation::South => Orientation::North,
            Orientation::East => Orientation::West,
            Orientation::West => Orientation::East,
            Orientation::Up => Orientation::Down,
            Orientation::Down => Orientation::Up,
        }
    }

    /// Horizontal facing rotated 90 degrees clockwise around +y (viewed
    /// from above). Vertical facings rotate to East as a fixed convention
    /// so template frames stay total.
    pub fn rotate_cw_y(self) -> Self {
        match self {
            Orientation::North => Orientation::East,
            Orientation::East => Orientation::South,
            Orientation::South => Orientation::West,
            Orientation::West => Orientation::North,
            Orientation::Up | Orientation::Down => Orientation::East,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_and_along_agree() {
        let p = Position3::new(10, 64, -3);
        assert_eq!(p.along(Orientation::North, 2), p.offset(0, 0, -2));
        assert_eq!(p.along(Orientation::Up, 5), p.offset(0, 5, 0));
        assert_eq!(p.along(Orientation::West, 1), p.offset(-1, 0, 0));
    }

    #[test]
    fn opposite_is_involution() {
        for dir in [
            Orientation::North,
            Orientation::South,
            Orientation::East,
            Orientation::West,
            Orientation::Up,
            Orientation::Down,
        ] {
            assert_eq!(dir.opposite().opposite(), dir);
            let (a, b, c) = dir.unit();
            let (x, y, z) = dir.opposite().unit();
            assert_eq!((a + x, b + y, c + z), (0, 0, 0));
        }
    }

    #[test]
    fn rotation_cycles_horizontals() {
        let mut dir = Orientation::North;
        for _ in 0..4 {
            dir = dir.rotate_cw_y();
        }
        assert_eq!(dir, Orientation::North);
    }

    #[test]
    fn positions_order_for_btree_keys() {
        let a = Position3::new(0, 0, 0);
        let b = Position3::new(0, 0, 1);
        assert!(a < b);
    }
}
