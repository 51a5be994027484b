//! Short dark-oak trees with amethyst canopies for the Amethyst Forest.

use rand::{Rng, RngCore};
use tracing::debug;

use crate::biome::BiomeCategory;
use crate::chunk::ChunkPos;
use crate::material::{Axis, Material};
use crate::populator::{
    ground_of, has_headroom, in_diamond, random_column, GenerationGate, Palette, Populator, Span,
    StructureSpec, WorldInfo,
};
use crate::region::VoxelRegion;
use crate::Voxel;

pub struct AmethystTreePopulator {
    gate: GenerationGate,
    spec: StructureSpec,
    count: Span,
    cluster_tries: u32,
}

impl AmethystTreePopulator {
    const CANOPY_LAYERS: i32 = 3;

    pub fn new(gate: GenerationGate) -> Self {
        Self {
            gate,
            spec: StructureSpec {
                height: Span::new(4, 7),
                radius: Span::new(2, 4),
                palette: Palette {
                    primary: Material::AmethystBlock,
                    secondary: Material::DarkOakLog,
                    accent: Material::OchreFroglight,
                    accent_chance: 0.15,
                },
                keep_chance: 0.7,
            },
            count: Span::new(2, 4),
            cluster_tries: 3,
        }
    }

    fn grow(&self, region: &mut dyn VoxelRegion, rng: &mut dyn RngCore, x: i32, base: i32, z: i32) {
        let height = self.spec.height.roll(rng);
        let log = Voxel::with_axis(self.spec.palette.secondary, Axis::Y);
        for i in 0..height {
            region.set_voxel(x, base + i, z, log);
        }

        let top = base + height;
        let radius = self.spec.radius.roll(rng);
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                for dy in 0..Self::CANOPY_LAYERS {
                    if !in_diamond(dx, dz, radius) {
                        continue;
                    }
                    if dy != 0 && rng.gen::<f64>() >= self.spec.keep_chance {
                        continue;
                    }
                    if region.material_is(x + dx, top + dy, z + dz, Material::Air) {
                        let material = self.spec.palette.pick(rng);
                        region.set_material(x + dx, top + dy, z + dz, material);
                    }
                }
            }
        }

        for _ in 0..self.cluster_tries {
            let cx = x + rng.gen_range(-3..=3);
            let cy = top + rng.gen_range(0..Self::CANOPY_LAYERS);
            let cz = z + rng.gen_range(-3..=3);
            if region.material_is(cx, cy, cz, self.spec.palette.primary) {
                region.set_material(cx, cy, cz, Material::AmethystCluster);
            }
        }
    }
}

impl Populator for AmethystTreePopulator {
    fn name(&self) -> &'static str {
        "amethyst_tree"
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
        let mut grown = 0;
        for _ in 0..self.count.roll(rng) {
            let (x, z) = random_column(rng, chunk);
            let Some(y) = ground_of(region, info.bounds, x, z, &[Material::Sculk]) else {
                continue;
            };
            if !has_headroom(region, x, y, z, 3) {
                continue;
            }
            self.grow(region, rng, x, y + 1, z);
            grown += 1;
        }
        debug!(populator = self.name(), %chunk, grown, "Populated chunk");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeNoiseClassifier;
    use crate::chunk::{Chunk, HeightBounds};
    use crate::region::{ChunkRegion, TracedRegion};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn canopy_sits_on_trunk() {
        let populator = AmethystTreePopulator::new(GenerationGate::new(
            "warped_dimension",
            BiomeNoiseClassifier::default(),
        ));
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), HeightBounds::new(0, 48));
        let mut region = ChunkRegion::new(&mut chunk);
        let mut rng = StdRng::seed_from_u64(21);
        populator.grow(&mut region, &mut rng, 8, 10, 8);
        drop(region);

        let logs = chunk.count(Material::DarkOakLog);
        assert!((4..=7).contains(&logs));
        let top = 10 + logs as i32;
        let cap = chunk.material(8, top, 8);
        assert!(matches!(
            cap,
            Some(Material::AmethystBlock | Material::OchreFroglight | Material::AmethystCluster)
        ));
    }

    #[test]
    fn nylium_is_not_accepted_as_ground() {
        let populator = AmethystTreePopulator::new(GenerationGate::new(
            "warped_dimension",
            BiomeNoiseClassifier::default(),
        ));
        let info = WorldInfo::new("warped_dimension", 0, HeightBounds::new(0, 48));
        let pos = ChunkPos::new(0, 0);
        let mut chunk = Chunk::new(pos, HeightBounds::new(0, 48));
        for x in 0..16 {
            for z in 0..16 {
                chunk.set_voxel(x, 20, z, Voxel::of(Material::WarpedNylium));
            }
        }
        let mut region = TracedRegion::new(ChunkRegion::new(&mut chunk));
        let mut rng = StdRng::seed_from_u64(2);
        populator.decorate(&info, &mut rng, pos, &mut region);
        assert_eq!(region.accepted().count(), 0);
    }
}
