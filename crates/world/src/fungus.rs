//! Huge warped fungi and ground vegetation for the Warped Forest.

use rand::{Rng, RngCore};
use tracing::debug;

use crate::biome::BiomeCategory;
use crate::chunk::ChunkPos;
use crate::material::{Axis, Material};
use crate::populator::{
    ground_of, in_diamond, random_column, GenerationGate, Populator, Span, WorldInfo,
};
use crate::region::VoxelRegion;
use crate::Voxel;

const GROUND: [Material; 2] = [Material::WarpedNylium, Material::Sculk];

/// Shape of one huge fungus. The cap is wide for its lower three layers
/// and narrow for the rest.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FungusShape {
    stem_height: Span,
    wide_radius: i32,
    narrow_radius: i32,
    stem: Material,
    cap: Material,
    light: Material,
}

/// Plants 2-4 huge fungi per chunk, then scatters roots and fungi.
pub struct WarpedFungusPopulator {
    gate: GenerationGate,
    shape: FungusShape,
    count: Span,
    scatters: u32,
    shroomlight_tries: u32,
}

impl WarpedFungusPopulator {
    pub fn new(gate: GenerationGate) -> Self {
        Self {
            gate,
            shape: FungusShape {
                stem_height: Span::new(10, 19),
                wide_radius: 2,
                narrow_radius: 1,
                stem: Material::WarpedStem,
                cap: Material::WarpedWartBlock,
                light: Material::Shroomlight,
            },
            count: Span::new(2, 4),
            scatters: 10,
            shroomlight_tries: 3,
        }
    }

    /// Grow one fungus whose stem starts at `(x, base, z)`.
    fn grow(&self, region: &mut dyn VoxelRegion, rng: &mut dyn RngCore, x: i32, base: i32, z: i32) {
        let shape = &self.shape;
        let height = shape.stem_height.roll(rng);
        let stem = Voxel::with_axis(shape.stem, Axis::Y);
        for i in 0..height {
            region.set_voxel(x, base + i, z, stem);
        }

        let canopy_start = base + height - 4;
        for dy in 0..6 {
            let radius = if dy < 3 {
                shape.wide_radius
            } else {
                shape.narrow_radius
            };
            let y = canopy_start + dy;
            for dx in -radius..=radius {
                for dz in -radius..=radius {
                    if !in_diamond(dx, dz, radius) {
                        continue;
                    }
                    let current = region.material(x + dx, y, z + dz);
                    if matches!(current, Some(Material::Air | Material::WarpedRoots)) {
                        region.set_material(x + dx, y, z + dz, shape.cap);
                    }
                }
            }
        }

        for _ in 0..self.shroomlight_tries {
            let sy = canopy_start + rng.gen_range(0..4);
            let sx = x + rng.gen_range(-1..=1);
            let sz = z + rng.gen_range(-1..=1);
            if region.material_is(sx, sy, sz, shape.cap) {
                region.set_material(sx, sy, sz, shape.light);
            }
        }
    }
}

impl Populator for WarpedFungusPopulator {
    fn name(&self) -> &'static str {
        "warped_fungus"
    }

    fn target_biome(&self) -> BiomeCategory {
        BiomeCategory::Primary
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
            if !region.is_in_region(x, y + 1, z) {
                continue;
            }
            region.set_material(x, y + 1, z, Material::WarpedFungus);
            self.grow(region, rng, x, y + 1, z);
            grown += 1;
        }

        let mut scattered = 0;
        for _ in 0..self.scatters {
            let (x, z) = random_column(rng, chunk);
            let Some(y) = ground_of(region, info.bounds, x, z, &GROUND) else {
                continue;
            };
            let plant = if rng.gen_bool(0.5) {
                Material::WarpedRoots
            } else {
                Material::WarpedFungus
            };
            if region.set_material(x, y + 1, z, plant) {
                scattered += 1;
            }
        }

        debug!(populator = self.name(), %chunk, grown, scattered, "Populated chunk");
    }
}
