//! Rare blackstone ruins in the Warped Forest.
//!
//! Whether a chunk may hold ruins is a pure function of the world seed and
//! the chunk position (`ruin_chunk_roll`), so `/warped locate` can answer
//! without generating anything. The shape itself draws from the chunk's
//! populator stream.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;
use warped_core::{chunk_hash, scoped_rng};

use crate::biome::{BiomeCategory, BiomeNoiseClassifier};
use crate::chunk::ChunkPos;
use crate::material::Material;
use crate::populator::{GenerationGate, Populator, WorldInfo};
use crate::region::VoxelRegion;

const RUIN_SEED_SALT: u64 = 0x52_55_49_4E_u64; // "RUIN"

/// Default per-chunk probability of a ruin.
pub const RUIN_CHANCE: f64 = 0.01;

/// Uniform `[0, 1)` roll for a chunk, fixed by seed and position.
pub fn ruin_chunk_roll(world_seed: u64, chunk: ChunkPos) -> f64 {
    scoped_rng(world_seed, chunk_hash(chunk.x, chunk.z), RUIN_SEED_SALT).gen::<f64>()
}

/// Whether a chunk can hold ruins: the roll passes and its center is Warped Forest.
pub fn is_ruin_chunk(
    world_seed: u64,
    chunk: ChunkPos,
    chance: f64,
    classifier: &BiomeNoiseClassifier,
) -> bool {
    ruin_chunk_roll(world_seed, chunk) < chance
        && classifier.classify_chunk(chunk, world_seed) == BiomeCategory::Primary
}

/// Ruin layouts, picked uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuinArchetype {
    AncientTower,
    BrokenTemple,
    CrystalRuins,
    Fortress,
    SculkMonument,
    FloatingRuins,
    UndergroundRuins,
    CliffsideRuins,
}

impl RuinArchetype {
    pub const ALL: [RuinArchetype; 8] = [
        RuinArchetype::AncientTower,
        RuinArchetype::BrokenTemple,
        RuinArchetype::CrystalRuins,
        RuinArchetype::Fortress,
        RuinArchetype::SculkMonument,
        RuinArchetype::FloatingRuins,
        RuinArchetype::UndergroundRuins,
        RuinArchetype::CliffsideRuins,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuinArchetype::AncientTower => "ancient_tower",
            RuinArchetype::BrokenTemple => "broken_temple",
            RuinArchetype::CrystalRuins => "crystal_ruins",
            RuinArchetype::Fortress => "fortress",
            RuinArchetype::SculkMonument => "sculk_monument",
            RuinArchetype::FloatingRuins => "floating_ruins",
            RuinArchetype::UndergroundRuins => "underground_ruins",
            RuinArchetype::CliffsideRuins => "cliffside_ruins",
        }
    }

    pub fn pick(rng: &mut dyn RngCore) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Places one ruin in roughly one percent of Warped Forest chunks.
pub struct RuinsPopulator {
    gate: GenerationGate,
    chance: f64,
}

impl RuinsPopulator {
    pub fn new(gate: GenerationGate) -> Self {
        Self::with_chance(gate, RUIN_CHANCE)
    }

    pub fn with_chance(gate: GenerationGate, chance: f64) -> Self {
        Self { gate, chance }
    }

    /// Build `archetype` with its origin at `(x, y, z)`.
    pub fn build(
        &self,
        archetype: RuinArchetype,
        region: &mut dyn VoxelRegion,
        rng: &mut dyn RngCore,
        x: i32,
        y: i32,
        z: i32,
    ) {
        match archetype {
            RuinArchetype::AncientTower => ancient_tower(region, rng, x, y, z),
            RuinArchetype::BrokenTemple => broken_temple(region, rng, x, y, z),
            RuinArchetype::CrystalRuins => crystal_ruins(region, rng, x, y, z),
            RuinArchetype::Fortress => fortress(region, rng, x, y, z),
            RuinArchetype::SculkMonument => sculk_monument(region, rng, x, y, z),
            RuinArchetype::FloatingRuins => floating_ruins(region, rng, x, y, z),
            RuinArchetype::UndergroundRuins => underground_ruins(region, rng, x, y, z),
            RuinArchetype::CliffsideRuins => cliffside_ruins(region, rng, x, y, z),
        }
    }
}

impl Populator for RuinsPopulator {
    fn name(&self) -> &'static str {
        "ruins"
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
        if ruin_chunk_roll(info.seed, chunk) >= self.chance {
            return;
        }
        let (x, z) = chunk.center();
        let Some(y) = find_ruin_site(region, info, x, z) else {
            debug!(%chunk, "No ruin site found");
            return;
        };
        let archetype = RuinArchetype::pick(rng);
        self.build(archetype, region, rng, x, y, z);
        debug!(%chunk, archetype = archetype.as_str(), y, "Placed ruin");
    }
}

/// Best-scoring origin height at `(x, z)`, or `None` when nothing scores.
pub fn find_ruin_site(region: &dyn VoxelRegion, info: &WorldInfo, x: i32, z: i32) -> Option<i32> {
    let mut best: Option<(i32, u32)> = None;
    for y in (info.bounds.min_y + 10)..(info.bounds.max_y - 20) {
        if !region.is_in_region(x, y, z) {
            continue;
        }
        let score = score_site(region, x, y, z);
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((y, score));
        }
    }
    best.map(|(y, _)| y)
}

fn score_site(region: &dyn VoxelRegion, x: i32, y: i32, z: i32) -> u32 {
    // The origin must be open with solid, dry ground under it.
    if !region.material_is(x, y, z, Material::Air) {
        return 0;
    }
    match region.material(x, y - 1, z) {
        Some(ground) if !ground.is_air() && !ground.is_liquid() => {}
        _ => return 0,
    }

    let mut score = 0;

    let mut density = 0;
    for dx in -3..=3 {
        for dz in -3..=3 {
            if region.material(x + dx, y, z + dz).is_some_and(|m| !m.is_air()) {
                density += 1;
            }
        }
    }
    if density > 10 {
        score += 20;
    }
    if density < 5 {
        score += 10;
    }

    let near_cliff = ring(5).any(|(dx, dz)| {
        region
            .material(x + dx, y + 3, z + dz)
            .is_some_and(|m| !m.is_air())
    });
    if near_cliff {
        score += 15;
    }

    let near_structure = ring(8).any(|(dx, dz)| {
        matches!(
            region.material(x + dx, y, z + dz),
            Some(Material::WarpedStem | Material::Blackstone)
        )
    });
    if near_structure {
        score += 10;
    }

    score
}

/// Square of offsets within `radius`, excluding the center.
fn ring(radius: i32) -> impl Iterator<Item = (i32, i32)> {
    (-radius..=radius)
        .flat_map(move |dx| (-radius..=radius).map(move |dz| (dx, dz)))
        .filter(|&(dx, dz)| dx != 0 || dz != 0)
}

fn chance(rng: &mut dyn RngCore, p: f64) -> bool {
    rng.gen::<f64>() < p
}

fn scatter(
    region: &mut dyn VoxelRegion,
    rng: &mut dyn RngCore,
    count: u32,
    mut offset: impl FnMut(&mut dyn RngCore) -> (i32, i32, i32),
    material: Material,
) {
    for _ in 0..count {
        let (x, y, z) = offset(&mut *rng);
        region.set_material(x, y, z, material);
    }
}

fn foundation(region: &mut dyn VoxelRegion, x: i32, y: i32, z: i32, radius: i32) {
    for dx in -radius..=radius {
        for dz in -radius..=radius {
            if !region.is_in_region(x + dx, y - 1, z + dz) {
                continue;
            }
            region.set_material(x + dx, y - 1, z + dz, Material::Blackstone);
            region.set_material(x + dx, y - 2, z + dz, Material::Blackstone);
        }
    }
}

fn ancient_tower(region: &mut dyn VoxelRegion, rng: &mut dyn RngCore, x: i32, y: i32, z: i32) {
    let height = rng.gen_range(6..=13);
    let radius = rng.gen_range(2..=3);
    foundation(region, x, y, z, radius + 1);

    for dy in 0..height {
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                if !region.is_in_region(x + dx, y + dy, z + dz) {
                    continue;
                }
                let wall = dx.abs() == radius || dz.abs() == radius;
                if !wall {
                    continue;
                }
                // Higher courses are more damaged.
                let damage = 0.2 + dy as f64 * 0.05;
                if rng.gen::<f64>() > damage {
                    let material = if chance(rng, 0.3) {
                        Material::PolishedBlackstone
                    } else {
                        Material::Blackstone
                    };
                    region.set_material(x + dx, y + dy, z + dz, material);
                }
            }
        }
    }

    let span = radius * 2 + 1;
    scatter(
        region,
        rng,
        3,
        |rng| {
            (
                x + rng.gen_range(0..span) - radius,
                y + height - 1,
                z + rng.gen_range(0..span) - radius,
            )
        },
        Material::WarpedWartBlock,
    );
    scatter(
        region,
        rng,
        4,
        |rng| {
            (
                x + rng.gen_range(-6..6),
                y + rng.gen_range(1..=3),
                z + rng.gen_range(-6..6),
            )
        },
        Material::Blackstone,
    );
    scatter(
        region,
        rng,
        6,
        |rng| {
            (
                x + rng.gen_range(0..span) - radius,
                y + rng.gen_range(0..height),
                z + rng.gen_range(0..span) - radius,
            )
        },
        Material::WarpedRoots,
    );
}

/// Hollow box with a solid floor, damaged walls and a mostly missing roof.
#[allow(clippy::too_many_arguments)]
fn shell(
    region: &mut dyn VoxelRegion,
    rng: &mut dyn RngCore,
    x: i32,
    y: i32,
    z: i32,
    width: i32,
    length: i32,
    height: i32,
    roof_keep: f64,
    wall_keep: f64,
) {
    for dx in 0..width {
        for dz in 0..length {
            for dy in 0..height {
                if !region.is_in_region(x + dx, y + dy, z + dz) {
                    continue;
                }
                let edge = dx == 0 || dx == width - 1 || dz == 0 || dz == length - 1;
                let material = if dy == 0 {
                    Material::Blackstone
                } else if dy == height - 1 {
                    if chance(rng, roof_keep) {
                        Material::Blackstone
                    } else {
                        Material::Air
                    }
                } else if edge {
                    if chance(rng, wall_keep) {
                        Material::Blackstone
                    } else {
                        Material::Air
                    }
                } else {
                    Material::Air
                };
                region.set_material(x + dx, y + dy, z + dz, material);
            }
        }
    }
}

fn broken_temple(region: &mut dyn VoxelRegion, rng: &mut dyn RngCore, x: i32, y: i32, z: i32) {
    let width = rng.gen_range(8..=15);
    let length = rng.gen_range(8..=15);
    let height = rng.gen_range(4..=9);
    shell(region, rng, x, y, z, width, length, height, 0.4, 0.6);

    for corner in 0..4 {
        let cx = x + (corner % 2) * (width - 1);
        let cz = z + (corner / 2) * (length - 1);
        for dy in 0..height {
            region.set_material(cx, y + dy, cz, Material::WarpedStem);
        }
    }

    scatter(
        region,
        rng,
        15,
        |rng| {
            (
                x + rng.gen_range(0..width + 4) - 2,
                y,
                z + rng.gen_range(0..length + 4) - 2,
            )
        },
        Material::Blackstone,
    );
}

fn crystal_ruins(region: &mut dyn VoxelRegion, rng: &mut dyn RngCore, x: i32, y: i32, z: i32) {
    let size = rng.gen_range(6..=11);
    let half = size / 2;
    for dx in -half..=half {
        for dz in -half..=half {
            if region.is_in_region(x + dx, y, z + dz) && chance(rng, 0.3) {
                region.set_material(x + dx, y, z + dz, Material::Blackstone);
            }
        }
    }

    for _ in 0..8 {
        let cx = x + rng.gen_range(0..size) - half;
        let cz = z + rng.gen_range(0..size) - half;
        let crystal_height = rng.gen_range(2..=5);
        for dy in 0..crystal_height {
            let material = if dy == 0 {
                Material::BuddingAmethyst
            } else {
                Material::AmethystBlock
            };
            region.set_material(cx, y + dy, cz, material);
        }
    }

    scatter(
        region,
        rng,
        5,
        |rng| {
            (
                x + rng.gen_range(0..size + 4) - half - 2,
                y + rng.gen_range(2..=7),
                z + rng.gen_range(0..size + 4) - half - 2,
            )
        },
        Material::AmethystBlock,
    );
}

fn fortress(region: &mut dyn VoxelRegion, rng: &mut dyn RngCore, x: i32, y: i32, z: i32) {
    let width = rng.gen_range(10..=19);
    let length = rng.gen_range(10..=19);
    let height = rng.gen_range(6..=13);
    shell(region, rng, x, y, z, width, length, height, 0.5, 0.7);

    scatter(
        region,
        rng,
        10,
        |rng| (x + rng.gen_range(0..width), y + 1, z + rng.gen_range(0..length)),
        Material::WarpedWartBlock,
    );
    scatter(
        region,
        rng,
        12,
        |rng| {
            (
                x + rng.gen_range(0..width + 6) - 3,
                y + rng.gen_range(1..=4),
                z + rng.gen_range(0..length + 6) - 3,
            )
        },
        Material::Blackstone,
    );
}

fn sculk_monument(region: &mut dyn VoxelRegion, rng: &mut dyn RngCore, x: i32, y: i32, z: i32) {
    let size = rng.gen_range(8..=13);
    let half = size / 2;
    for dx in -half..=half {
        for dz in -half..=half {
            if region.is_in_region(x + dx, y, z + dz) && chance(rng, 0.4) {
                region.set_material(x + dx, y, z + dz, Material::Blackstone);
            }
        }
    }

    for _ in 0..15 {
        let sx = x + rng.gen_range(0..size) - half;
        let sz = z + rng.gen_range(0..size) - half;
        let sy = y + rng.gen_range(0..3);
        let roll = rng.gen::<f64>();
        let material = if roll < 0.1 {
            Material::SculkCatalyst
        } else if roll < 0.3 {
            Material::SculkSensor
        } else {
            Material::Sculk
        };
        region.set_material(sx, sy, sz, material);
    }

    scatter(
        region,
        rng,
        8,
        |rng| {
            (
                x + rng.gen_range(0..size) - half,
                y + rng.gen_range(1..=2),
                z + rng.gen_range(0..size) - half,
            )
        },
        Material::WarpedWartBlock,
    );
}

fn floating_ruins(region: &mut dyn VoxelRegion, rng: &mut dyn RngCore, x: i32, y: i32, z: i32) {
    let fragments = rng.gen_range(3..=7);
    for _ in 0..fragments {
        let ox = x + rng.gen_range(-10..10);
        let oz = z + rng.gen_range(-10..10);
        let oy = y + rng.gen_range(2..=9);
        let size = rng.gen_range(2..=5);
        for dx in 0..size {
            for dz in 0..size {
                for dy in 0..size {
                    if !region.is_in_region(ox + dx, oy + dy, oz + dz) {
                        continue;
                    }
                    if chance(rng, 0.7) {
                        let material = if chance(rng, 0.7) {
                            Material::Blackstone
                        } else {
                            Material::WarpedWartBlock
                        };
                        region.set_material(ox + dx, oy + dy, oz + dz, material);
                    }
                }
            }
        }
    }

    for _ in 0..5 {
        let sx = x + rng.gen_range(-10..10);
        let sz = z + rng.gen_range(-10..10);
        let sy = y + rng.gen_range(2..=7);
        for j in 0..3 {
            let cx = sx + rng.gen_range(-1..=1);
            let cz = sz + rng.gen_range(-1..=1);
            region.set_material(cx, sy + j, cz, Material::Blackstone);
        }
    }
}

fn underground_ruins(region: &mut dyn VoxelRegion, rng: &mut dyn RngCore, x: i32, y: i32, z: i32) {
    let depth = rng.gen_range(2..=5);
    let width = rng.gen_range(4..=7);
    let length = rng.gen_range(4..=7);
    for dx in 0..width {
        for dz in 0..length {
            for dy in 0..depth {
                let cy = y - dy;
                if !region.is_in_region(x + dx, cy, z + dz) {
                    continue;
                }
                let edge = dx == 0 || dx == width - 1 || dz == 0 || dz == length - 1;
                if dy == 0 {
                    region.set_material(x + dx, cy, z + dz, Material::Blackstone);
                } else if edge {
                    if chance(rng, 0.7) {
                        region.set_material(x + dx, cy, z + dz, Material::Blackstone);
                    }
                } else {
                    region.set_material(x + dx, cy, z + dz, Material::Air);
                }
            }
        }
    }

    scatter(
        region,
        rng,
        8,
        |rng| (x + rng.gen_range(0..width), y - 1, z + rng.gen_range(0..length)),
        Material::Sculk,
    );
    scatter(
        region,
        rng,
        5,
        |rng| (x + rng.gen_range(0..width), y - 1, z + rng.gen_range(0..length)),
        Material::WarpedWartBlock,
    );
}

fn cliffside_ruins(region: &mut dyn VoxelRegion, rng: &mut dyn RngCore, x: i32, y: i32, z: i32) {
    let height = rng.gen_range(4..=9);
    let width = rng.gen_range(3..=6);
    let depth = rng.gen_range(2..=4);
    for dx in 0..width {
        for dz in 0..depth {
            for dy in 0..height {
                if !region.is_in_region(x + dx, y + dy, z + dz) {
                    continue;
                }
                if dy == 0 {
                    region.set_material(x + dx, y + dy, z + dz, Material::Blackstone);
                } else if dx == 0 || dz == depth - 1 {
                    if chance(rng, 0.6) {
                        region.set_material(x + dx, y + dy, z + dz, Material::Blackstone);
                    }
                } else {
                    region.set_material(x + dx, y + dy, z + dz, Material::Air);
                }
            }
        }
    }

    scatter(
        region,
        rng,
        6,
        |rng| {
            (
                x + rng.gen_range(0..width),
                y + rng.gen_range(0..height),
                z + rng.gen_range(0..depth),
            )
        },
        Material::WarpedRoots,
    );
    scatter(
        region,
        rng,
        3,
        |rng| {
            (
                x + rng.gen_range(-4..4),
                y + rng.gen_range(1..=3),
                z + rng.gen_range(-4..4),
            )
        },
        Material::Blackstone,
    );
}
