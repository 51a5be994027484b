//! Interfaces the host engine provides.
//!
//! The dimension never owns worlds or entities. It reads and writes blocks
//! through [`HostWorld`], asks [`EntityHost`] about players and creatures,
//! and looks worlds up by name through [`Host`].

use warped_core::{BlockPos, Location};

use crate::chunk::ChunkPos;
use crate::event::PlayerId;
use crate::mob::{CreatureKind, Variant};
use crate::populator::WorldInfo;
use crate::region::VoxelRegion;

/// A loaded world as seen through the host.
pub trait HostWorld: VoxelRegion {
    fn info(&self) -> &WorldInfo;

    fn name(&self) -> &str {
        &self.info().name
    }

    /// Highest non-air block of a column, or `None` for an empty column.
    fn highest_block_y(&self, x: i32, z: i32) -> Option<i32>;

    fn is_chunk_loaded(&self, chunk: ChunkPos) -> bool;

    /// Load (generating if needed) a chunk. Returns false if the host refused.
    fn load_chunk(&mut self, chunk: ChunkPos) -> bool;

    fn spawn_point(&self) -> BlockPos;

    fn as_region(&self) -> &dyn VoxelRegion;

    fn as_region_mut(&mut self) -> &mut dyn VoxelRegion;
}

/// Snapshot of an online player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub id: PlayerId,
    pub world: String,
    pub location: Location,
}

/// Entity-side host services.
pub trait EntityHost {
    fn players(&self) -> Vec<PlayerView>;

    fn player(&self, id: PlayerId) -> Option<PlayerView> {
        self.players().into_iter().find(|p| p.id == id)
    }

    fn players_in(&self, world: &str) -> Vec<PlayerView> {
        self.players()
            .into_iter()
            .filter(|p| p.world == world)
            .collect()
    }

    /// Creatures of any of `kinds` within `radius` of `center`.
    fn count_creatures_near(
        &self,
        world: &str,
        center: Location,
        radius: f64,
        kinds: &[CreatureKind],
    ) -> usize;

    /// Spawn a creature. Returns false when the host refused.
    fn spawn_creature(
        &mut self,
        world: &str,
        kind: CreatureKind,
        at: Location,
        variant: Option<Variant>,
    ) -> bool;
}

/// The whole host: entities plus named worlds.
pub trait Host: EntityHost {
    fn world(&self, name: &str) -> Option<&dyn HostWorld>;

    fn world_mut(&mut self, name: &str) -> Option<&mut dyn HostWorld>;

    fn world_names(&self) -> Vec<String>;
}
