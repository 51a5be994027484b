//! Chorus flowers on end stone pads for the Amethyst Forest.

use rand::{Rng, RngCore};
use tracing::debug;

use crate::biome::BiomeCategory;
use crate::chunk::ChunkPos;
use crate::material::Material;
use crate::populator::{
    ground_of, has_headroom, place_if_air, random_column, GenerationGate, Populator, Span,
    WorldInfo,
};
use crate::region::VoxelRegion;

pub struct ChorusPopulator {
    gate: GenerationGate,
    count: Span,
    plant_chance: f64,
    plant_height: Span,
}

impl ChorusPopulator {
    pub fn new(gate: GenerationGate) -> Self {
        Self {
            gate,
            count: Span::new(2, 5),
            plant_chance: 0.3,
            plant_height: Span::new(2, 4),
        }
    }

    /// Plant a flower at `(x, y, z)` on top of the ground cell below it.
    fn plant(&self, region: &mut dyn VoxelRegion, rng: &mut dyn RngCore, x: i32, y: i32, z: i32) {
        region.set_material(x, y - 1, z, Material::EndStone);
        region.set_material(x, y, z, Material::ChorusFlower);

        if rng.gen::<f64>() >= self.plant_chance {
            return;
        }
        let height = self.plant_height.roll(rng);
        for i in 1..=height {
            place_if_air(region, x, y + i, z, Material::ChorusPlant);
        }
        if region.material_is(x, y + height, z, Material::ChorusPlant) {
            region.set_material(x, y + height, z, Material::ChorusFlower);
        }
    }
}

impl Populator for ChorusPopulator {
    fn name(&self) -> &'static str {
        "chorus"
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
        let mut planted = 0;
        for _ in 0..self.count.roll(rng) {
            let (x, z) = random_column(rng, chunk);
            let Some(y) = ground_of(region, info.bounds, x, z, &[Material::Sculk]) else {
                continue;
            };
            if !has_headroom(region, x, y, z, 1) {
                continue;
            }
            self.plant(region, rng, x, y + 1, z);
            planted += 1;
        }
        debug!(populator = self.name(), %chunk, planted, "Populated chunk");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeNoiseClassifier;
    use crate::chunk::{Chunk, HeightBounds};
    use crate::region::ChunkRegion;
    use crate::Voxel;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn flower_replaces_ground_with_end_stone() {
        let populator = ChorusPopulator::new(GenerationGate::new(
            "warped_dimension",
            BiomeNoiseClassifier::default(),
        ));
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), HeightBounds::new(0, 32));
        chunk.set_voxel(7, 9, 7, Voxel::of(Material::Sculk));
        let mut region = ChunkRegion::new(&mut chunk);
        let mut rng = StdRng::seed_from_u64(12);
        populator.plant(&mut region, &mut rng, 7, 10, 7);
        drop(region);

        assert_eq!(chunk.material(7, 9, 7), Some(Material::EndStone));
        assert_eq!(chunk.material(7, 10, 7), Some(Material::ChorusFlower));
        // A plant column, when present, is always capped by a flower.
        let top = chunk.highest_block_y(7, 7).unwrap();
        assert_eq!(chunk.material(7, top, 7), Some(Material::ChorusFlower));
    }
}
