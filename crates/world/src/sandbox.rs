//! In-memory host for headless runs and tests.
//!
//! Worlds keep their chunks in a [`ChunkStorage`] and create missing ones
//! on [`HostWorld::load_chunk`] from a [`ChunkSource`]. Reads and writes
//! only reach loaded chunks. Entities are plain records.

use std::collections::BTreeMap;

use tracing::debug;
use warped_core::{BlockPos, Location};

use crate::chunk::{Chunk, ChunkPos, Voxel, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::event::{HostEffect, PlayerId};
use crate::generator::{GenerationReport, WarpedChunkGenerator};
use crate::host::{EntityHost, Host, HostWorld, PlayerView};
use crate::material::Material;
use crate::mob::{CreatureKind, Variant};
use crate::populator::WorldInfo;
use crate::region::VoxelRegion;
use crate::storage::ChunkStorage;
use crate::terrain::TerrainGenerator;

/// Chunks resident per sandbox world before the least recently used is dropped.
pub const DEFAULT_CHUNK_CAPACITY: usize = 1024;

/// How a sandbox world fills chunks it has not seen yet.
pub enum ChunkSource {
    /// All air.
    Void,
    /// Vanilla-like stand-in terrain.
    Terrain(TerrainGenerator),
    /// Stand-in terrain followed by the full dimension pipeline.
    Warped {
        terrain: TerrainGenerator,
        generator: Box<WarpedChunkGenerator>,
    },
}

impl ChunkSource {
    pub fn warped(generator: WarpedChunkGenerator) -> Self {
        let info = generator.info();
        Self::Warped {
            terrain: TerrainGenerator::new(info.seed, info.bounds),
            generator: Box::new(generator),
        }
    }

    fn produce(&self, info: &WorldInfo, pos: ChunkPos) -> (Chunk, Option<GenerationReport>) {
        match self {
            ChunkSource::Void => (Chunk::new(pos, info.bounds), None),
            ChunkSource::Terrain(terrain) => (terrain.generate_chunk(pos), None),
            ChunkSource::Warped { terrain, generator } => {
                let mut chunk = terrain.generate_chunk(pos);
                let report = generator.generate_chunk(&mut chunk);
                (chunk, Some(report))
            }
        }
    }
}

/// One world held entirely in memory.
pub struct InMemoryWorld {
    info: WorldInfo,
    storage: ChunkStorage,
    source: ChunkSource,
    spawn: BlockPos,
    reports: Vec<GenerationReport>,
}

impl InMemoryWorld {
    pub fn new(info: WorldInfo, source: ChunkSource) -> Self {
        Self {
            info,
            storage: ChunkStorage::new(DEFAULT_CHUNK_CAPACITY),
            source,
            spawn: BlockPos::new(0, 64, 0),
            reports: Vec::new(),
        }
    }

    pub fn with_spawn(mut self, spawn: BlockPos) -> Self {
        self.spawn = spawn;
        self
    }

    /// Load every chunk within `radius` chunks of `center`.
    pub fn load_area(&mut self, center: ChunkPos, radius: i32) {
        for x in (center.x - radius)..=(center.x + radius) {
            for z in (center.z - radius)..=(center.z + radius) {
                self.load_chunk(ChunkPos::new(x, z));
            }
        }
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.storage.get(pos)
    }

    /// Drop a chunk as a host would when no player keeps it loaded.
    /// Returns false when it was not loaded.
    pub fn unload_chunk(&mut self, pos: ChunkPos) -> bool {
        self.storage.unload(pos).is_some()
    }

    pub fn loaded_chunks(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.storage.positions()
    }

    /// Pipeline reports of chunks generated so far, in generation order.
    pub fn reports(&self) -> &[GenerationReport] {
        &self.reports
    }

    fn locate(&self, x: i32, z: i32) -> (ChunkPos, usize, usize) {
        let pos = ChunkPos::containing(x, z);
        let (ox, oz) = pos.origin();
        (pos, (x - ox) as usize, (z - oz) as usize)
    }
}

impl VoxelRegion for InMemoryWorld {
    fn is_in_region(&self, x: i32, y: i32, z: i32) -> bool {
        let (pos, _, _) = self.locate(x, z);
        self.storage.contains(pos) && self.info.bounds.contains(y)
    }

    fn voxel(&self, x: i32, y: i32, z: i32) -> Option<Voxel> {
        let (pos, lx, lz) = self.locate(x, z);
        self.storage.get(pos)?.voxel(lx, y, lz)
    }

    fn set_voxel(&mut self, x: i32, y: i32, z: i32, voxel: Voxel) -> bool {
        let (pos, lx, lz) = self.locate(x, z);
        self.storage
            .get_mut(pos)
            .is_some_and(|chunk| chunk.set_voxel(lx, y, lz, voxel))
    }
}

impl HostWorld for InMemoryWorld {
    fn info(&self) -> &WorldInfo {
        &self.info
    }

    fn highest_block_y(&self, x: i32, z: i32) -> Option<i32> {
        let (pos, lx, lz) = self.locate(x, z);
        self.storage.get(pos)?.highest_block_y(lx, lz)
    }

    fn is_chunk_loaded(&self, chunk: ChunkPos) -> bool {
        self.storage.contains(chunk)
    }

    fn load_chunk(&mut self, chunk: ChunkPos) -> bool {
        if self.storage.contains(chunk) {
            return true;
        }
        let (built, report) = self.source.produce(&self.info, chunk);
        debug_assert_eq!(built.position(), chunk);
        if let Some(evicted) = self.storage.insert(built) {
            debug!(world = %self.info.name, chunk = %evicted, "Sandbox chunk unloaded");
        }
        if let Some(report) = report {
            self.reports.push(report);
        }
        debug!(world = %self.info.name, %chunk, "Sandbox chunk loaded");
        true
    }

    fn spawn_point(&self) -> BlockPos {
        self.spawn
    }

    fn as_region(&self) -> &dyn VoxelRegion {
        self
    }

    fn as_region_mut(&mut self) -> &mut dyn VoxelRegion {
        self
    }
}

/// A creature the sandbox spawned.
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxCreature {
    pub world: String,
    pub kind: CreatureKind,
    pub location: Location,
    pub variant: Option<Variant>,
}

/// Host with named in-memory worlds, players and creatures.
#[derive(Default)]
pub struct SandboxHost {
    worlds: BTreeMap<String, InMemoryWorld>,
    players: Vec<PlayerView>,
    creatures: Vec<SandboxCreature>,
    messages: Vec<(PlayerId, String)>,
}

impl SandboxHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_world(&mut self, world: InMemoryWorld) {
        self.worlds.insert(world.info.name.clone(), world);
    }

    pub fn world_state(&self, name: &str) -> Option<&InMemoryWorld> {
        self.worlds.get(name)
    }

    pub fn world_state_mut(&mut self, name: &str) -> Option<&mut InMemoryWorld> {
        self.worlds.get_mut(name)
    }

    pub fn add_player(&mut self, id: PlayerId, world: impl Into<String>, location: Location) {
        self.players.retain(|p| p.id != id);
        self.players.push(PlayerView {
            id,
            world: world.into(),
            location,
        });
    }

    pub fn creatures(&self) -> &[SandboxCreature] {
        &self.creatures
    }

    pub fn messages(&self) -> &[(PlayerId, String)] {
        &self.messages
    }

    /// Apply effects the way a real host would: teleport players and keep
    /// messages. Sounds, compass targets and variants are only observable
    /// through the effect list itself.
    pub fn apply(&mut self, effects: &[HostEffect]) {
        for effect in effects {
            match effect {
                HostEffect::Message { player, text } => {
                    self.messages.push((*player, text.clone()));
                }
                HostEffect::Teleport {
                    player,
                    world,
                    location,
                } => {
                    if let Some(view) = self.players.iter_mut().find(|p| p.id == *player) {
                        view.world = world.clone();
                        view.location = *location;
                    }
                }
                HostEffect::PlaySound { .. }
                | HostEffect::CompassTarget { .. }
                | HostEffect::SetVariant { .. } => {}
            }
        }
    }
}

impl EntityHost for SandboxHost {
    fn players(&self) -> Vec<PlayerView> {
        self.players.clone()
    }

    fn count_creatures_near(
        &self,
        world: &str,
        center: Location,
        radius: f64,
        kinds: &[CreatureKind],
    ) -> usize {
        let radius_sq = radius * radius;
        self.creatures
            .iter()
            .filter(|c| c.world == world && kinds.contains(&c.kind))
            .filter(|c| c.location.distance_squared(center) <= radius_sq)
            .count()
    }

    fn spawn_creature(
        &mut self,
        world: &str,
        kind: CreatureKind,
        at: Location,
        variant: Option<Variant>,
    ) -> bool {
        if !self.worlds.contains_key(world) {
            return false;
        }
        self.creatures.push(SandboxCreature {
            world: world.to_string(),
            kind,
            location: at,
            variant,
        });
        true
    }
}

impl Host for SandboxHost {
    fn world(&self, name: &str) -> Option<&dyn HostWorld> {
        self.worlds.get(name).map(|w| w as &dyn HostWorld)
    }

    fn world_mut(&mut self, name: &str) -> Option<&mut dyn HostWorld> {
        self.worlds.get_mut(name).map(|w| w as &mut dyn HostWorld)
    }

    fn world_names(&self) -> Vec<String> {
        self.worlds.keys().cloned().collect()
    }
}

/// Load the area around `center` and lay `ground` at height `y` across
/// every loaded chunk.
pub fn flatten(world: &mut InMemoryWorld, center: ChunkPos, radius: i32, y: i32, ground: Material) {
    world.load_area(center, radius);
    let positions: Vec<ChunkPos> = world.loaded_chunks().collect();
    for pos in positions {
        let (ox, oz) = pos.origin();
        for x in ox..ox + CHUNK_SIZE_X as i32 {
            for z in oz..oz + CHUNK_SIZE_Z as i32 {
                world.set_material(x, y, z, ground);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::HeightBounds;

    fn void_world(name: &str) -> InMemoryWorld {
        InMemoryWorld::new(
            WorldInfo::new(name, 1, HeightBounds::OVERWORLD),
            ChunkSource::Void,
        )
    }

    #[test]
    fn unloaded_chunks_are_out_of_region() {
        let mut world = void_world("world");
        assert!(!world.set_material(3, 64, 3, Material::Stone));
        assert_eq!(world.material(3, 64, 3), None);

        world.load_chunk(ChunkPos::new(0, 0));
        assert!(world.set_material(3, 64, 3, Material::Stone));
        assert_eq!(world.highest_block_y(3, 3), Some(64));
        assert_eq!(world.material(-1, 64, 3), None);
    }

    #[test]
    fn negative_coordinates_map_to_their_chunk() {
        let mut world = void_world("world");
        world.load_chunk(ChunkPos::new(-1, -1));
        assert!(world.set_material(-1, 10, -16, Material::Sculk));
        let chunk = world.chunk(ChunkPos::new(-1, -1)).unwrap();
        assert_eq!(chunk.material(15, 10, 0), Some(Material::Sculk));
    }

    #[test]
    fn teleport_effect_moves_the_player() {
        let mut host = SandboxHost::new();
        host.add_world(void_world("world"));
        host.add_player(PlayerId(1), "world", Location::new(0.0, 64.0, 0.0));
        host.apply(&[HostEffect::Teleport {
            player: PlayerId(1),
            world: "warped_dimension".into(),
            location: Location::new(5.5, 70.0, 5.5),
        }]);
        let player = host.player(PlayerId(1)).unwrap();
        assert_eq!(player.world, "warped_dimension");
        assert_eq!(player.location.x, 5.5);
    }
}
