//! Surface rewrite and bedrock floor.
//!
//! The rewrite maps every vanilla cell of a freshly generated chunk through
//! a fixed table in one bottom-up sweep. The table is total (unlisted
//! materials pass through) and each cell's result depends only on its own
//! material, its column's biome and a positional hash, so sweep order never
//! changes the outcome.

use rand::{Rng, RngCore};
use tracing::{debug, instrument};

use crate::biome::{BiomeCategory, BiomeNoiseClassifier};
use crate::chunk::{Chunk, ChunkStage, Voxel, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::material::{Axis, Material, MaterialFamily};
use crate::populator::WorldInfo;

/// Deterministic `[0, 1)` value for a block position.
pub fn position_roll(seed: u64, x: i32, y: i32, z: i32) -> f64 {
    let mut h = seed
        ^ (x as i64 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (y as i64 as u64).wrapping_mul(0xD6E8_FEB8_6659_FD93)
        ^ (z as i64 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    // splitmix64 finalizer
    h = (h ^ (h >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^= h >> 31;
    (h >> 11) as f64 / (1u64 << 53) as f64
}

/// Maps vanilla terrain onto the warped palette.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceRewriter {
    classifier: BiomeNoiseClassifier,
}

impl SurfaceRewriter {
    pub fn new(classifier: BiomeNoiseClassifier) -> Self {
        Self { classifier }
    }

    /// Ground cover for a column of the given biome.
    pub fn themed_ground(biome: BiomeCategory, roll: f64) -> Material {
        let sculk_share = match biome {
            BiomeCategory::Primary => 0.0,
            BiomeCategory::Secondary => 0.85,
            BiomeCategory::Tertiary => 0.9,
        };
        if roll < sculk_share {
            Material::Sculk
        } else {
            Material::WarpedNylium
        }
    }

    /// Rewrite one cell. Returns the voxel unchanged when no rule applies.
    pub fn map_voxel(
        &self,
        voxel: Voxel,
        biome: BiomeCategory,
        seed: u64,
        x: i32,
        y: i32,
        z: i32,
    ) -> Voxel {
        match voxel.material.family() {
            MaterialFamily::StoneLike => Voxel::of(Material::AmethystBlock),
            MaterialFamily::Soil => Voxel::of(Material::Sculk),
            MaterialFamily::GroundCover => {
                Voxel::of(Self::themed_ground(biome, position_roll(seed, x, y, z)))
            }
            MaterialFamily::Vegetation => Voxel::of(Material::WarpedRoots),
            MaterialFamily::HazardLiquid => Voxel::AIR,
            MaterialFamily::Leaves => Voxel::of(Material::WarpedWartBlock),
            MaterialFamily::Log => Voxel {
                material: Material::WarpedStem,
                axis: voxel.axis.or(Some(Axis::Y)),
            },
            MaterialFamily::Other => voxel,
        }
    }

    /// Rewrite a whole chunk. Returns the number of cells changed.
    #[instrument(skip(self, info, chunk), fields(chunk = %chunk.position(), seed = info.seed))]
    pub fn rewrite(&self, info: &WorldInfo, chunk: &mut Chunk) -> usize {
        let (origin_x, origin_z) = chunk.position().origin();
        let bounds = chunk.bounds();

        let mut biomes = [[BiomeCategory::Primary; CHUNK_SIZE_Z]; CHUNK_SIZE_X];
        for (lx, row) in biomes.iter_mut().enumerate() {
            for (lz, biome) in row.iter_mut().enumerate() {
                *biome =
                    self.classifier
                        .classify(origin_x + lx as i32, origin_z + lz as i32, info.seed);
            }
        }

        let mut changed = 0;
        for y in bounds.min_y..bounds.max_y {
            for lz in 0..CHUNK_SIZE_Z {
                for lx in 0..CHUNK_SIZE_X {
                    let Some(voxel) = chunk.voxel(lx, y, lz) else {
                        continue;
                    };
                    let mapped = self.map_voxel(
                        voxel,
                        biomes[lx][lz],
                        info.seed,
                        origin_x + lx as i32,
                        y,
                        origin_z + lz as i32,
                    );
                    if mapped != voxel {
                        chunk.set_voxel(lx, y, lz, mapped);
                        changed += 1;
                    }
                }
            }
        }

        chunk.mark_stage(ChunkStage::SURFACE);
        debug!(changed, "Surface rewrite complete");
        changed
    }

    /// Bedrock at `min_y`, and at `min_y + k` (k in 1..=4) with probability 1/k.
    pub fn generate_bedrock(&self, info: &WorldInfo, rng: &mut dyn RngCore, chunk: &mut Chunk) {
        let min_y = info.bounds.min_y;
        for lx in 0..CHUNK_SIZE_X {
            for lz in 0..CHUNK_SIZE_Z {
                chunk.set_voxel(lx, min_y, lz, Voxel::of(Material::Bedrock));
                for k in 1..=4u32 {
                    if rng.gen_range(0..k) == 0 {
                        chunk.set_voxel(lx, min_y + k as i32, lz, Voxel::of(Material::Bedrock));
                    }
                }
            }
        }
        chunk.mark_stage(ChunkStage::BEDROCK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{ChunkPos, HeightBounds};
    use rand::{rngs::StdRng, SeedableRng};

    fn info() -> WorldInfo {
        WorldInfo::new("warped_dimension", 42, HeightBounds::new(0, 16))
    }

    #[test]
    fn table_maps_each_family() {
        let rewriter = SurfaceRewriter::default();
        let cases = [
            (Material::Deepslate, Material::AmethystBlock),
            (Material::RootedDirt, Material::Sculk),
            (Material::Cornflower, Material::WarpedRoots),
            (Material::Lava, Material::Air),
            (Material::OakLeaves, Material::WarpedWartBlock),
            (Material::BirchWood, Material::WarpedStem),
            (Material::Water, Material::Water),
            (Material::Sand, Material::Sand),
        ];
        for (from, to) in cases {
            let mapped =
                rewriter.map_voxel(Voxel::of(from), BiomeCategory::Secondary, 1, 0, 0, 0);
            assert_eq!(mapped.material, to, "{from:?}");
        }
    }

    #[test]
    fn rewrite_is_idempotent() {
        let rewriter = SurfaceRewriter::default();
        let info = info();
        let mut chunk = Chunk::new(ChunkPos::new(2, -1), info.bounds);
        for lx in 0..16 {
            for lz in 0..16 {
                chunk.set_voxel(lx, 1, lz, Voxel::of(Material::Stone));
                chunk.set_voxel(lx, 2, lz, Voxel::of(Material::Dirt));
                chunk.set_voxel(lx, 3, lz, Voxel::of(Material::GrassBlock));
                chunk.set_voxel(lx, 4, lz, Voxel::of(Material::Poppy));
            }
        }
        assert_eq!(rewriter.rewrite(&info, &mut chunk), 4 * 256);
        assert_eq!(rewriter.rewrite(&info, &mut chunk), 0);
        assert!(chunk.stage().contains(ChunkStage::SURFACE));
        assert_eq!(chunk.count(Material::AmethystBlock), 256);
        assert_eq!(
            chunk.count(Material::Sculk) + chunk.count(Material::WarpedNylium),
            512
        );
    }

    #[test]
    fn primary_ground_is_always_nylium() {
        for roll in [0.0, 0.5, 0.99] {
            assert_eq!(
                SurfaceRewriter::themed_ground(BiomeCategory::Primary, roll),
                Material::WarpedNylium
            );
        }
        assert_eq!(
            SurfaceRewriter::themed_ground(BiomeCategory::Tertiary, 0.89),
            Material::Sculk
        );
        assert_eq!(
            SurfaceRewriter::themed_ground(BiomeCategory::Secondary, 0.86),
            Material::WarpedNylium
        );
    }

    #[test]
    fn position_roll_is_pure_and_spread() {
        assert_eq!(position_roll(1, 2, 3, 4), position_roll(1, 2, 3, 4));
        let below_half = (0..1000)
            .filter(|i| position_roll(7, *i, 64, -*i) < 0.5)
            .count();
        assert!((400..=600).contains(&below_half));
    }

    #[test]
    fn bedrock_floor_is_complete() {
        let rewriter = SurfaceRewriter::default();
        let info = info();
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), info.bounds);
        let mut rng = StdRng::seed_from_u64(0);
        rewriter.generate_bedrock(&info, &mut rng, &mut chunk);
        for lx in 0..16 {
            for lz in 0..16 {
                assert_eq!(chunk.material(lx, 0, lz), Some(Material::Bedrock));
                assert_eq!(chunk.material(lx, 1, lz), Some(Material::Bedrock));
                assert_ne!(chunk.material(lx, 5, lz), Some(Material::Bedrock));
            }
        }
        assert!(chunk.stage().contains(ChunkStage::BEDROCK));
    }
}
