//! Vanilla oak and birch trees for the stand-in terrain.

use crate::chunk::{Chunk, Voxel, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::material::{Axis, Material};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeType {
    Oak,
    Birch,
}

impl TreeType {
    pub fn log(self) -> Material {
        match self {
            TreeType::Oak => Material::OakLog,
            TreeType::Birch => Material::BirchLog,
        }
    }

    pub fn leaves(self) -> Material {
        match self {
            TreeType::Oak => Material::OakLeaves,
            TreeType::Birch => Material::BirchLeaves,
        }
    }

    pub fn trunk_height(self) -> i32 {
        match self {
            TreeType::Oak => 5,
            TreeType::Birch => 6,
        }
    }
}

/// Tree anchored at the world position of its lowest log.
#[derive(Debug, Clone)]
pub struct Tree {
    pub world_x: i32,
    pub world_y: i32,
    pub world_z: i32,
    pub tree_type: TreeType,
}

impl Tree {
    pub fn new(world_x: i32, world_y: i32, world_z: i32, tree_type: TreeType) -> Self {
        Self {
            world_x,
            world_y,
            world_z,
            tree_type,
        }
    }

    /// Stamp the tree into `chunk`. Cells outside the chunk are dropped and
    /// existing blocks are never replaced.
    pub fn generate_into_chunk(&self, chunk: &mut Chunk) {
        let trunk = self.tree_type.trunk_height();
        let log = Voxel::with_axis(self.tree_type.log(), Axis::Y);
        let leaves = Voxel::of(self.tree_type.leaves());

        for dy in 0..trunk {
            self.place(chunk, 0, dy, 0, log);
        }

        // Oak gets a taller canopy with its bottom corners cut.
        let layers = match self.tree_type {
            TreeType::Oak => 3,
            TreeType::Birch => 2,
        };
        for dy in 0..layers {
            for dx in -1..=1_i32 {
                for dz in -1..=1_i32 {
                    if dx == 0 && dz == 0 && dy == 0 {
                        continue;
                    }
                    if self.tree_type == TreeType::Oak && dy == 0 && dx.abs() == 1 && dz.abs() == 1
                    {
                        continue;
                    }
                    self.place(chunk, dx, trunk + dy, dz, leaves);
                }
            }
        }
        self.place(chunk, 0, trunk + layers, 0, leaves);
    }

    fn place(&self, chunk: &mut Chunk, dx: i32, dy: i32, dz: i32, voxel: Voxel) {
        let (ox, oz) = chunk.position().origin();
        let lx = self.world_x + dx - ox;
        let lz = self.world_z + dz - oz;
        if !(0..CHUNK_SIZE_X as i32).contains(&lx) || !(0..CHUNK_SIZE_Z as i32).contains(&lz) {
            return;
        }
        let (lx, lz) = (lx as usize, lz as usize);
        let y = self.world_y + dy;
        if chunk.voxel(lx, y, lz).is_some_and(|v| v.is_air()) {
            chunk.set_voxel(lx, y, lz, voxel);
        }
    }
}

/// Grid positions in a chunk that carry a tree, with the type of each.
pub fn generate_tree_positions(
    world_seed: u64,
    chunk_x: i32,
    chunk_z: i32,
    density: f32,
) -> Vec<(usize, usize, TreeType)> {
    let seed = world_seed
        .wrapping_add((chunk_x as u64).wrapping_mul(374761393))
        .wrapping_add((chunk_z as u64).wrapping_mul(668265263));

    let mut positions = Vec::new();
    for x in (0..CHUNK_SIZE_X).step_by(4) {
        for z in (0..CHUNK_SIZE_Z).step_by(4) {
            let pos_seed = seed
                .wrapping_add((x as u64).wrapping_mul(134775813))
                .wrapping_add((z as u64).wrapping_mul(1103515245));
            let roll = (pos_seed % 10000) as f32 / 10000.0;
            if roll < density {
                let tree_type = if (pos_seed / 10000) % 3 == 0 {
                    TreeType::Birch
                } else {
                    TreeType::Oak
                };
                positions.push((x, z, tree_type));
            }
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{ChunkPos, HeightBounds};

    fn chunk() -> Chunk {
        Chunk::new(ChunkPos::new(0, 0), HeightBounds::new(0, 32))
    }

    #[test]
    fn oak_places_trunk_and_canopy() {
        let mut chunk = chunk();
        Tree::new(8, 10, 8, TreeType::Oak).generate_into_chunk(&mut chunk);
        for y in 10..15 {
            assert_eq!(chunk.material(8, y, 8), Some(Material::OakLog));
        }
        assert_eq!(chunk.material(8, 18, 8), Some(Material::OakLeaves));
        assert_eq!(chunk.voxel(8, 10, 8).and_then(|v| v.axis), Some(Axis::Y));
    }

    #[test]
    fn trees_never_replace_existing_blocks() {
        let mut chunk = chunk();
        chunk.set_voxel(8, 12, 8, Voxel::of(Material::Stone));
        Tree::new(8, 10, 8, TreeType::Birch).generate_into_chunk(&mut chunk);
        assert_eq!(chunk.material(8, 12, 8), Some(Material::Stone));
    }

    #[test]
    fn trees_clip_at_chunk_edge() {
        let mut chunk = chunk();
        Tree::new(0, 10, 0, TreeType::Oak).generate_into_chunk(&mut chunk);
        assert_eq!(chunk.material(0, 10, 0), Some(Material::OakLog));
        assert!(chunk.count(Material::OakLeaves) > 0);
    }

    #[test]
    fn tree_positions_are_deterministic() {
        assert_eq!(
            generate_tree_positions(42, 3, -7, 0.2),
            generate_tree_positions(42, 3, -7, 0.2)
        );
        assert!(generate_tree_positions(42, 3, -7, 0.0).is_empty());
    }
}
