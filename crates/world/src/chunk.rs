use std::fmt;

use crate::material::{Axis, Material};

/// Chunk width (X axis) in voxels.
pub const CHUNK_SIZE_X: usize = 16;
/// Chunk depth (Z axis) in voxels.
pub const CHUNK_SIZE_Z: usize = 16;

/// Vertical extent of a world. `max_y` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct HeightBounds {
    pub min_y: i32,
    pub max_y: i32,
}

impl HeightBounds {
    /// Vanilla overworld range, `[-64, 320)`.
    pub const OVERWORLD: Self = Self {
        min_y: -64,
        max_y: 320,
    };

    pub const fn new(min_y: i32, max_y: i32) -> Self {
        Self { min_y, max_y }
    }

    /// Number of layers.
    pub fn height(&self) -> usize {
        (self.max_y - self.min_y).max(0) as usize
    }

    #[inline]
    pub fn contains(&self, y: i32) -> bool {
        y >= self.min_y && y < self.max_y
    }
}

impl Default for HeightBounds {
    fn default() -> Self {
        Self::OVERWORLD
    }
}

/// Chunk-local position (X, layer, Z). `y` is the layer index above `min_y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl LocalPos {
    /// Convert to a linear index within the voxel array.
    pub fn index(self) -> usize {
        debug_assert!(self.x < CHUNK_SIZE_X);
        debug_assert!(self.z < CHUNK_SIZE_Z);
        (self.y * CHUNK_SIZE_Z + self.z) * CHUNK_SIZE_X + self.x
    }
}

/// Chunk coordinate (X,Z) in chunk space.
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by x, then z).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing the given world block column.
    pub const fn containing(block_x: i32, block_z: i32) -> Self {
        Self::new(block_x >> 4, block_z >> 4)
    }

    /// World coordinates of the chunk's (0, 0) column.
    pub const fn origin(self) -> (i32, i32) {
        (self.x * CHUNK_SIZE_X as i32, self.z * CHUNK_SIZE_Z as i32)
    }

    /// World coordinates of the column the populators classify (`chunk * 16 + 8`).
    pub const fn center(self) -> (i32, i32) {
        let (x, z) = self.origin();
        (x + 8, z + 8)
    }

    /// Whether the world column lies inside this chunk.
    pub const fn contains_column(self, block_x: i32, block_z: i32) -> bool {
        (block_x >> 4) == self.x && (block_z >> 4) == self.z
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Per-voxel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Voxel {
    pub material: Material,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis: Option<Axis>,
}

impl Voxel {
    pub const AIR: Voxel = Voxel {
        material: Material::Air,
        axis: None,
    };

    pub const fn of(material: Material) -> Self {
        Self {
            material,
            axis: None,
        }
    }

    pub const fn with_axis(material: Material, axis: Axis) -> Self {
        Self {
            material,
            axis: Some(axis),
        }
    }

    #[inline]
    pub fn is_air(&self) -> bool {
        self.material.is_air()
    }
}

impl From<Material> for Voxel {
    fn from(material: Material) -> Self {
        Voxel::of(material)
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    /// Generation passes that have run over a chunk.
    pub struct ChunkStage: u8 {
        const TERRAIN = 0b0000_0001;
        const SURFACE = 0b0000_0010;
        const BEDROCK = 0b0000_0100;
        const POPULATED = 0b0000_1000;
    }
}

/// One 16-wide column of voxels spanning the world's height bounds.
#[derive(Clone)]
pub struct Chunk {
    position: ChunkPos,
    bounds: HeightBounds,
    voxels: Vec<Voxel>,
    stage: ChunkStage,
}

impl Chunk {
    /// Allocate a fresh chunk filled with air.
    pub fn new(position: ChunkPos, bounds: HeightBounds) -> Self {
        Self {
            position,
            bounds,
            voxels: vec![Voxel::AIR; CHUNK_SIZE_X * CHUNK_SIZE_Z * bounds.height()],
            stage: ChunkStage::empty(),
        }
    }

    #[inline]
    pub fn position(&self) -> ChunkPos {
        self.position
    }

    #[inline]
    pub fn bounds(&self) -> HeightBounds {
        self.bounds
    }

    fn index(&self, x: usize, y: i32, z: usize) -> Option<usize> {
        if x >= CHUNK_SIZE_X || z >= CHUNK_SIZE_Z || !self.bounds.contains(y) {
            return None;
        }
        let layer = (y - self.bounds.min_y) as usize;
        Some(LocalPos { x, y: layer, z }.index())
    }

    /// Fetch a voxel copy. `y` is a world coordinate.
    pub fn voxel(&self, x: usize, y: i32, z: usize) -> Option<Voxel> {
        self.index(x, y, z).map(|idx| self.voxels[idx])
    }

    pub fn material(&self, x: usize, y: i32, z: usize) -> Option<Material> {
        self.voxel(x, y, z).map(|v| v.material)
    }

    /// Raw voxel storage, x fastest, then z, then y.
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// Set a voxel. Returns false when the position is outside the chunk.
    pub fn set_voxel(&mut self, x: usize, y: i32, z: usize, voxel: Voxel) -> bool {
        let Some(idx) = self.index(x, y, z) else {
            return false;
        };
        self.voxels[idx] = voxel;
        true
    }

    /// Highest non-air layer in a column, as a world y.
    pub fn highest_block_y(&self, x: usize, z: usize) -> Option<i32> {
        (self.bounds.min_y..self.bounds.max_y)
            .rev()
            .find(|&y| self.material(x, y, z).is_some_and(|m| !m.is_air()))
    }

    /// Count cells holding `material`.
    pub fn count(&self, material: Material) -> usize {
        self.voxels
            .iter()
            .filter(|voxel| voxel.material == material)
            .count()
    }

    pub fn stage(&self) -> ChunkStage {
        self.stage
    }

    pub fn mark_stage(&mut self, stage: ChunkStage) {
        self.stage.insert(stage);
    }
}
