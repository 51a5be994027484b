//! Stand-in vanilla terrain.
//!
//! The dimension reuses the host's overworld generator and only rewrites
//! and decorates what it produces. Headless runs have no host, so this
//! module produces vanilla-looking columns to act on: deepslate below zero,
//! stone above it, a dirt band under grass, sand and water below sea level,
//! lava pockets underground, scattered flowers and oak/birch trees.

use rand::Rng;
use tracing::{debug, instrument};
use warped_core::{chunk_hash, scoped_rng};

use crate::chunk::{Chunk, ChunkPos, ChunkStage, HeightBounds, Voxel, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::material::{Material, MaterialFamily};
use crate::noise::{LayeredNoise, NoiseConfig, NoiseGenerator};
use crate::trees::{generate_tree_positions, Tree};

pub const SEA_LEVEL: i32 = 62;

const VEGETATION_SALT: u64 = 0x56_45_47_45; // "VEGE"

const FLOWERS: [Material; 6] = [
    Material::Dandelion,
    Material::Poppy,
    Material::Cornflower,
    Material::Allium,
    Material::OxeyeDaisy,
    Material::AzureBluet,
];

/// Fills chunks with vanilla overworld blocks.
pub struct TerrainGenerator {
    world_seed: u64,
    bounds: HeightBounds,
    height: LayeredNoise,
    pockets: NoiseGenerator,
    tree_density: f32,
}

impl TerrainGenerator {
    pub fn new(world_seed: u64, bounds: HeightBounds) -> Self {
        Self {
            world_seed,
            bounds,
            height: LayeredNoise::new(world_seed),
            pockets: NoiseGenerator::new(NoiseConfig::pockets(world_seed as u32)),
            tree_density: 0.08,
        }
    }

    pub fn bounds(&self) -> HeightBounds {
        self.bounds
    }

    /// Surface height of a world column.
    pub fn surface_height(&self, world_x: i32, world_z: i32) -> i32 {
        let signal = self.height.sample_height(world_x as f64, world_z as f64);
        let y = 68 + (signal * 18.0) as i32;
        y.clamp(self.bounds.min_y + 8, self.bounds.max_y - 24)
    }

    #[instrument(skip(self), fields(world_seed = self.world_seed))]
    pub fn generate_chunk(&self, chunk_pos: ChunkPos) -> Chunk {
        let mut chunk = Chunk::new(chunk_pos, self.bounds);
        let (origin_x, origin_z) = chunk_pos.origin();

        for lz in 0..CHUNK_SIZE_Z {
            for lx in 0..CHUNK_SIZE_X {
                let height = self.surface_height(origin_x + lx as i32, origin_z + lz as i32);
                self.fill_column(&mut chunk, lx, lz, height);
            }
        }

        self.carve_lava_pockets(&mut chunk);
        self.scatter_vegetation(&mut chunk);
        self.plant_trees(&mut chunk);

        chunk.mark_stage(ChunkStage::TERRAIN);
        debug!(chunk = %chunk_pos, "Terrain generation complete");
        chunk
    }

    fn fill_column(&self, chunk: &mut Chunk, lx: usize, lz: usize, height: i32) {
        let underwater = height < SEA_LEVEL;
        for y in self.bounds.min_y..=height {
            let material = if y < 0 {
                Material::Deepslate
            } else if y == 0 {
                Material::Tuff
            } else if y < height - 3 {
                Material::Stone
            } else if underwater {
                if y == height {
                    Material::Sand
                } else {
                    Material::Gravel
                }
            } else if y == height {
                Material::GrassBlock
            } else {
                Material::Dirt
            };
            chunk.set_voxel(lx, y, lz, Voxel::of(material));
        }
        if underwater {
            for y in (height + 1)..=SEA_LEVEL {
                chunk.set_voxel(lx, y, lz, Voxel::of(Material::Water));
            }
        }
    }

    fn carve_lava_pockets(&self, chunk: &mut Chunk) {
        let (origin_x, origin_z) = chunk.position().origin();
        let top = (self.bounds.min_y + 48).min(self.bounds.max_y);
        for y in (self.bounds.min_y + 4)..top {
            for lz in 0..CHUNK_SIZE_Z {
                for lx in 0..CHUNK_SIZE_X {
                    let solid = matches!(
                        chunk.material(lx, y, lz),
                        Some(Material::Stone | Material::Deepslate)
                    );
                    if !solid {
                        continue;
                    }
                    let n = self.pockets.sample_3d(
                        (origin_x + lx as i32) as f64,
                        y as f64,
                        (origin_z + lz as i32) as f64,
                    );
                    if n > 0.55 {
                        chunk.set_voxel(lx, y, lz, Voxel::of(Material::Lava));
                    }
                }
            }
        }
    }

    fn scatter_vegetation(&self, chunk: &mut Chunk) {
        let pos = chunk.position();
        let mut rng = scoped_rng(self.world_seed, chunk_hash(pos.x, pos.z), VEGETATION_SALT);
        for lz in 0..CHUNK_SIZE_Z {
            for lx in 0..CHUNK_SIZE_X {
                let roll: f64 = rng.gen();
                let Some(top) = chunk.highest_block_y(lx, lz) else {
                    continue;
                };
                if chunk.material(lx, top, lz) != Some(Material::GrassBlock) {
                    continue;
                }
                let plant = if roll < 0.02 {
                    FLOWERS[rng.gen_range(0..FLOWERS.len())]
                } else if roll < 0.12 {
                    Material::ShortGrass
                } else if roll < 0.14 {
                    Material::Fern
                } else {
                    continue;
                };
                chunk.set_voxel(lx, top + 1, lz, Voxel::of(plant));
            }
        }
    }

    fn plant_trees(&self, chunk: &mut Chunk) {
        let pos = chunk.position();
        let (origin_x, origin_z) = pos.origin();
        for (lx, lz, tree_type) in
            generate_tree_positions(self.world_seed, pos.x, pos.z, self.tree_density)
        {
            let Some(mut top) = chunk.highest_block_y(lx, lz) else {
                continue;
            };
            // Grow through the flower or grass tuft standing on the ground.
            if chunk
                .material(lx, top, lz)
                .is_some_and(|m| m.family() == MaterialFamily::Vegetation)
            {
                chunk.set_voxel(lx, top, lz, Voxel::AIR);
                top -= 1;
            }
            if chunk.material(lx, top, lz) != Some(Material::GrassBlock) {
                continue;
            }
            chunk.set_voxel(lx, top, lz, Voxel::of(Material::Dirt));
            Tree::new(origin_x + lx as i32, top + 1, origin_z + lz as i32, tree_type)
                .generate_into_chunk(chunk);
        }
    }
}
