//! Structure populator framework.
//!
//! A populator runs once per generated chunk. It refuses to touch chunks in
//! other worlds or in other biomes, then draws a candidate count, finds
//! ground for each candidate, and stamps a shape into the bounded region.
//! Every concrete populator shares the gate and site helpers in this module.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::biome::{BiomeCategory, BiomeNoiseClassifier};
use crate::chunk::{ChunkPos, HeightBounds, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::material::Material;
use crate::region::{find_surface, VoxelRegion};

/// Host-provided description of the world being generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldInfo {
    pub name: String,
    pub seed: u64,
    pub bounds: HeightBounds,
}

impl WorldInfo {
    pub fn new(name: impl Into<String>, seed: u64, bounds: HeightBounds) -> Self {
        Self {
            name: name.into(),
            seed,
            bounds,
        }
    }
}

/// Decides whether a populator may act on a chunk at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationGate {
    world_name: String,
    classifier: BiomeNoiseClassifier,
}

impl GenerationGate {
    pub fn new(world_name: impl Into<String>, classifier: BiomeNoiseClassifier) -> Self {
        Self {
            world_name: world_name.into(),
            classifier,
        }
    }

    pub fn world_name(&self) -> &str {
        &self.world_name
    }

    pub fn classifier(&self) -> &BiomeNoiseClassifier {
        &self.classifier
    }

    /// True when `info` names the dimension and the chunk center has biome `target`.
    pub fn admits(&self, info: &WorldInfo, chunk: ChunkPos, target: BiomeCategory) -> bool {
        info.name == self.world_name && self.classifier.classify_chunk(chunk, info.seed) == target
    }
}

/// Inclusive integer range drawn uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub min: i32,
    pub max: i32,
}

impl Span {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn roll(self, rng: &mut dyn RngCore) -> i32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    pub fn contains(self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Materials a structure is built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: Material,
    pub secondary: Material,
    pub accent: Material,
    /// Probability that a placed cell becomes the accent.
    pub accent_chance: f64,
}

impl Palette {
    /// Pick the accent with `accent_chance`, otherwise the primary.
    pub fn pick(&self, rng: &mut dyn RngCore) -> Material {
        if rng.gen::<f64>() < self.accent_chance {
            self.accent
        } else {
            self.primary
        }
    }
}

/// Shape parameters shared by the tree-like populators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureSpec {
    pub height: Span,
    pub radius: Span,
    pub palette: Palette,
    /// Per-cell keep probability above the first canopy layer.
    pub keep_chance: f64,
}

/// A chunk populator.
pub trait Populator: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Biome whose chunks this populator decorates.
    fn target_biome(&self) -> BiomeCategory;

    fn gate(&self) -> &GenerationGate;

    /// Stamp structures into an admitted chunk.
    fn decorate(
        &self,
        info: &WorldInfo,
        rng: &mut dyn RngCore,
        chunk: ChunkPos,
        region: &mut dyn VoxelRegion,
    );

    /// Entry point called by the generator. Writes nothing unless the gate admits the chunk.
    fn populate(
        &self,
        info: &WorldInfo,
        rng: &mut dyn RngCore,
        chunk: ChunkPos,
        region: &mut dyn VoxelRegion,
    ) {
        if !self.gate().admits(info, chunk, self.target_biome()) {
            return;
        }
        self.decorate(info, rng, chunk, region);
    }
}

/// Uniform world column inside the chunk.
pub fn random_column(rng: &mut dyn RngCore, chunk: ChunkPos) -> (i32, i32) {
    let (ox, oz) = chunk.origin();
    (
        ox + rng.gen_range(0..CHUNK_SIZE_X as i32),
        oz + rng.gen_range(0..CHUNK_SIZE_Z as i32),
    )
}

/// Ground cell of a column when it holds one of `ground`.
pub fn ground_of(
    region: &dyn VoxelRegion,
    bounds: HeightBounds,
    x: i32,
    z: i32,
    ground: &[Material],
) -> Option<i32> {
    let y = find_surface(region, bounds, x, z)?;
    let material = region.material(x, y, z)?;
    ground.contains(&material).then_some(y)
}

/// True when the `cells` cells above `ground_y` are in region and air.
pub fn has_headroom(region: &dyn VoxelRegion, x: i32, ground_y: i32, z: i32, cells: i32) -> bool {
    (1..=cells).all(|dy| region.material_is(x, ground_y + dy, z, Material::Air))
}

/// Manhattan-disc membership used by every canopy.
#[inline]
pub fn in_diamond(dx: i32, dz: i32, radius: i32) -> bool {
    dx.abs() + dz.abs() <= radius
}

/// Write `material` only when the target cell is currently air.
pub fn place_if_air(
    region: &mut dyn VoxelRegion,
    x: i32,
    y: i32,
    z: i32,
    material: Material,
) -> bool {
    if region.material_is(x, y, z, Material::Air) {
        region.set_material(x, y, z, material)
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeThresholds;
    use crate::chunk::Chunk;
    use crate::region::ChunkRegion;
    use rand::{rngs::StdRng, SeedableRng};

    fn info(name: &str) -> WorldInfo {
        WorldInfo::new(name, 42, HeightBounds::new(0, 32))
    }

    #[test]
    fn gate_rejects_foreign_worlds() {
        let gate = GenerationGate::new("warped_dimension", BiomeNoiseClassifier::default());
        let chunk = ChunkPos::new(0, 0);
        let biome = gate.classifier().classify_chunk(chunk, 42);
        assert!(gate.admits(&info("warped_dimension"), chunk, biome));
        assert!(!gate.admits(&info("world"), chunk, biome));
    }

    #[test]
    fn gate_rejects_other_biomes() {
        let gate = GenerationGate::new(
            "warped_dimension",
            BiomeNoiseClassifier::new(BiomeThresholds::Classic),
        );
        let chunk = ChunkPos::new(0, 0);
        let biome = gate.classifier().classify_chunk(chunk, 42);
        for other in BiomeCategory::ALL.into_iter().filter(|c| *c != biome) {
            assert!(!gate.admits(&info("warped_dimension"), chunk, other));
        }
    }

    #[test]
    fn span_rolls_stay_inclusive() {
        let mut rng = StdRng::seed_from_u64(1);
        let span = Span::new(2, 4);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let v = span.roll(&mut rng);
            assert!(span.contains(v));
            seen[(v - 2) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert_eq!(Span::new(5, 5).roll(&mut rng), 5);
    }

    #[test]
    fn ground_and_headroom_checks() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), HeightBounds::new(0, 32));
        let mut region = ChunkRegion::new(&mut chunk);
        let bounds = HeightBounds::new(0, 32);
        region.set_material(3, 10, 3, Material::Sculk);
        assert_eq!(
            ground_of(&region, bounds, 3, 3, &[Material::Sculk]),
            Some(10)
        );
        assert_eq!(ground_of(&region, bounds, 3, 3, &[Material::WarpedNylium]), None);
        assert!(has_headroom(&region, 3, 10, 3, 3));
        region.set_material(3, 12, 3, Material::WarpedStem);
        assert!(!has_headroom(&region, 3, 10, 3, 3));
        // The top layer leaves no room above it.
        region.set_material(5, 31, 5, Material::Sculk);
        assert!(!has_headroom(&region, 5, 31, 5, 1));
    }

    #[test]
    fn random_columns_stay_in_chunk() {
        let mut rng = StdRng::seed_from_u64(9);
        let chunk = ChunkPos::new(-2, 7);
        for _ in 0..100 {
            let (x, z) = random_column(&mut rng, chunk);
            assert!(chunk.contains_column(x, z));
        }
    }
}
