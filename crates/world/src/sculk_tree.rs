//! Sculk trees for the Sculk Forest.

use rand::{Rng, RngCore};
use tracing::debug;

use crate::biome::BiomeCategory;
use crate::chunk::ChunkPos;
use crate::material::{Axis, Material};
use crate::populator::{
    ground_of, has_headroom, in_diamond, place_if_air, random_column, GenerationGate, Palette,
    Populator, Span, StructureSpec, WorldInfo,
};
use crate::region::VoxelRegion;
use crate::Voxel;

const GROUND: [Material; 2] = [Material::WarpedNylium, Material::Sculk];

/// Trunk of stem and end stone under a sculk and dried-kelp canopy.
pub struct SculkTreePopulator {
    gate: GenerationGate,
    spec: StructureSpec,
    count: Span,
}

impl SculkTreePopulator {
    const STEM_CHANCE: f64 = 0.7;
    const SENSOR_CHANCE: f64 = 0.15;
    const VEIN_CHANCE: f64 = 0.4;
    const CATALYST_CHANCE: f64 = 0.05;
    const CANOPY_LAYERS: i32 = 4;

    pub fn new(gate: GenerationGate) -> Self {
        Self {
            gate,
            spec: StructureSpec {
                height: Span::new(6, 12),
                radius: Span::new(3, 5),
                palette: Palette {
                    primary: Material::Sculk,
                    secondary: Material::WarpedStem,
                    accent: Material::DriedKelpBlock,
                    accent_chance: 0.2,
                },
                keep_chance: 0.6,
            },
            count: Span::new(1, 3),
        }
    }

    /// Grow a tree whose trunk starts at `(x, base, z)`.
    fn grow(&self, region: &mut dyn VoxelRegion, rng: &mut dyn RngCore, x: i32, base: i32, z: i32) {
        let height = self.spec.height.roll(rng);
        for i in 0..height {
            let voxel = if rng.gen::<f64>() < Self::STEM_CHANCE {
                Voxel::with_axis(self.spec.palette.secondary, Axis::Y)
            } else {
                Voxel::of(Material::EndStone)
            };
            region.set_voxel(x, base + i, z, voxel);
        }

        self.canopy(region, rng, x, base + height, z);

        for i in 0..height {
            if rng.gen::<f64>() >= Self::VEIN_CHANCE {
                continue;
            }
            let sx = x + if rng.gen_bool(0.5) { 1 } else { -1 };
            let sz = z + if rng.gen_bool(0.5) { 1 } else { -1 };
            place_if_air(region, sx, base + i, sz, Material::SculkVein);
        }

        if rng.gen::<f64>() < Self::CATALYST_CHANCE {
            region.set_material(x, base - 1, z, Material::SculkCatalyst);
        }
    }

    fn canopy(&self, region: &mut dyn VoxelRegion, rng: &mut dyn RngCore, x: i32, y: i32, z: i32) {
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
                    if region.material_is(x + dx, y + dy, z + dz, Material::Air) {
                        let material = self.spec.palette.pick(rng);
                        region.set_material(x + dx, y + dy, z + dz, material);
                    }
                }
            }
        }

        if rng.gen::<f64>() < Self::SENSOR_CHANCE {
            region.set_material(x, y + 2, z, Material::SculkSensor);
        }
    }
}

impl Populator for SculkTreePopulator {
    fn name(&self) -> &'static str {
        "sculk_tree"
    }

    fn target_biome(&self) -> BiomeCategory {
        BiomeCategory::Secondary
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
            let Some(y) = ground_of(region, info.bounds, x, z, &GROUND) else {
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
