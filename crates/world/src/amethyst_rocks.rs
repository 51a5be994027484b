//! Amethyst boulders and shard shrubs for the Amethyst Forest.

use rand::{Rng, RngCore};
use tracing::debug;

use crate::biome::BiomeCategory;
use crate::chunk::ChunkPos;
use crate::material::Material;
use crate::populator::{
    ground_of, has_headroom, random_column, GenerationGate, Populator, Span, WorldInfo,
};
use crate::region::VoxelRegion;

pub struct AmethystRocksPopulator {
    gate: GenerationGate,
    rocks: Span,
    rock_height: Span,
    rock_fill: f64,
    shards: Span,
    shard_height: Span,
}

impl AmethystRocksPopulator {
    pub fn new(gate: GenerationGate) -> Self {
        Self {
            gate,
            rocks: Span::new(3, 6),
            rock_height: Span::new(2, 4),
            rock_fill: 0.7,
            shards: Span::new(8, 15),
            shard_height: Span::new(1, 2),
        }
    }

    /// Site on sculk with one free cell above. Returns the first cell above ground.
    fn site(region: &dyn VoxelRegion, info: &WorldInfo, x: i32, z: i32) -> Option<i32> {
        let y = ground_of(region, info.bounds, x, z, &[Material::Sculk])?;
        has_headroom(region, x, y, z, 1).then_some(y + 1)
    }

    fn rock(&self, region: &mut dyn VoxelRegion, rng: &mut dyn RngCore, x: i32, y: i32, z: i32) {
        let height = self.rock_height.roll(rng);
        for dx in -1..=1 {
            for dz in -1..=1 {
                for dy in 0..height {
                    if !region.material_is(x + dx, y + dy, z + dz, Material::Air) {
                        continue;
                    }
                    if rng.gen::<f64>() < self.rock_fill {
                        region.set_material(x + dx, y + dy, z + dz, Material::AmethystBlock);
                    }
                }
            }
        }
    }

    fn shard(&self, region: &mut dyn VoxelRegion, rng: &mut dyn RngCore, x: i32, y: i32, z: i32) {
        for dy in 0..self.shard_height.roll(rng) {
            if !region.material_is(x, y + dy, z, Material::Air) {
                continue;
            }
            let material = if rng.gen_bool(0.5) {
                Material::AmethystCluster
            } else {
                Material::BuddingAmethyst
            };
            region.set_material(x, y + dy, z, material);
        }
    }
}

impl Populator for AmethystRocksPopulator {
    fn name(&self) -> &'static str {
        "amethyst_rocks"
    }

    fn target_biome(&self) -> BiomeCategory {
        BiomeCategory::Tertiary
    }

    fn gate(&self) -> &GenerationGate {
        &self.gate
    }

    fn decorate(
        &self,
        info: &WorldInfo,
        rng: &mut dyn RngCore,
        chunk: ChunkPos,
        region: &mut dyn VoxelRegion,
    ) {
        let mut rocks = 0;
        for _ in 0..self.rocks.roll(rng) {
            let (x, z) = random_column(rng, chunk);
            if let Some(y) = Self::site(region, info, x, z) {
                self.rock(region, rng, x, y, z);
                rocks += 1;
            }
        }

        let mut shards = 0;
        for _ in 0..self.shards.roll(rng) {
            let (x, z) = random_column(rng, chunk);
            if let Some(y) = Self::site(region, info, x, z) {
                self.shard(region, rng, x, y, z);
                shards += 1;
            }
        }
        debug!(populator = self.name(), %chunk, rocks, shards, "Populated chunk");
    }
}
