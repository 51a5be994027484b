//! World-space positions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer block coordinate in world space.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct BlockPos {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl BlockPos {
    /// Construct a block position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Offset by the given deltas.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Chunk coordinates `(x >> 4, z >> 4)` containing this block.
    pub const fn chunk(self) -> (i32, i32) {
        (self.x >> 4, self.z >> 4)
    }

    /// Block-center location at this position.
    pub fn center(self) -> Location {
        Location::new(self.x as f64 + 0.5, self.y as f64, self.z as f64 + 0.5)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

/// Precise location with view angles, as used for teleports and entities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
    /// Yaw in degrees.
    pub yaw: f32,
    /// Pitch in degrees.
    pub pitch: f32,
}

impl Location {
    /// Construct a location with zero view angles.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Copy the view angles of `other`.
    pub fn with_angles_of(self, other: Location) -> Self {
        Self {
            yaw: other.yaw,
            pitch: other.pitch,
            ..self
        }
    }

    /// Floor to the containing block.
    pub fn block(self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }

    /// Offset by the given deltas.
    pub fn offset(self, dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
            ..self
        }
    }

    /// Squared euclidean distance.
    pub fn distance_squared(self, other: Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Euclidean distance.
    pub fn distance(self, other: Location) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_of_negative_block_floors() {
        assert_eq!(BlockPos::new(-1, 64, -17).chunk(), (-1, -2));
        assert_eq!(BlockPos::new(15, 0, 16).chunk(), (0, 1));
    }

    #[test]
    fn location_block_floors_toward_negative_infinity() {
        let loc = Location::new(-0.5, 64.9, 3.2);
        assert_eq!(loc.block(), BlockPos::new(-1, 64, 3));
    }

    #[test]
    fn distance_matches_pythagoras() {
        let a = Location::new(0.0, 0.0, 0.0);
        let b = Location::new(3.0, 0.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-9);
    }
}
