//! The dimension as the host sees it: one event handler, one periodic task
//! and one command, all wired from a single [`DimensionConfig`].

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info, instrument};
use warped_core::{BlockPos, Location, SimTick};

use crate::chunk::{ChunkPos, HeightBounds, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::command::{CommandOutcome, WarpedCommand, MSG_WELCOME};
use crate::config::DimensionConfig;
use crate::event::{
    EventOutcome, HeldItem, HostEffect, HostEvent, InteractAction, PlayerId, Sound, TravelCause,
};
use crate::generator::WarpedChunkGenerator;
use crate::host::{Host, HostWorld};
use crate::material::Material;
use crate::mob::{AmbientSpawner, MobGate, SpawnDecision};
use crate::portal::{PortalLinker, PortalRegistry, SharedPortalRegistry};
use crate::populator::WorldInfo;

pub const MSG_PORTAL_ACTIVATED: &str = "Warped Portal activated!";
pub const MSG_RETURNED: &str = "Returned to the Overworld!";

/// What one periodic run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub herds: usize,
    pub creatures: usize,
    pub chunks_preloaded: usize,
    pub anchors_pruned: usize,
}

/// Event, tick and command entry points for one warped dimension.
pub struct WarpedDimension {
    config: DimensionConfig,
    gate: MobGate,
    spawner: AmbientSpawner,
    linker: PortalLinker,
    command: WarpedCommand,
    rng: StdRng,
}

impl WarpedDimension {
    pub fn new(config: DimensionConfig) -> Self {
        let registry = SharedPortalRegistry::new(PortalRegistry::new(
            config.portal.duplicate_radius,
            config.portal.link_radius,
        ));
        Self::with_registry(config, registry)
    }

    /// Share an existing registry, for example with a second handler.
    pub fn with_registry(config: DimensionConfig, registry: SharedPortalRegistry) -> Self {
        let dimension = config.worlds.dimension.clone();
        Self {
            gate: MobGate::new(dimension.clone(), config.mobs.clone()),
            spawner: AmbientSpawner::new(config.ambient.clone(), config.mobs.ambient_variant),
            linker: PortalLinker::new(config.portal.clone(), registry),
            command: WarpedCommand::new(dimension, config.classifier(), config.ruins.clone()),
            rng: StdRng::seed_from_u64(config.schedule.runtime_seed),
            config,
        }
    }

    pub fn config(&self) -> &DimensionConfig {
        &self.config
    }

    pub fn registry(&self) -> &SharedPortalRegistry {
        self.linker.registry()
    }

    pub fn linker(&self) -> &PortalLinker {
        &self.linker
    }

    pub fn dimension_name(&self) -> &str {
        &self.config.worlds.dimension
    }

    /// Chunk generator for the dimension world with the given seed.
    pub fn chunk_generator(&self, seed: u64, bounds: HeightBounds) -> WarpedChunkGenerator {
        WarpedChunkGenerator::new(
            WorldInfo::new(self.dimension_name(), seed, bounds),
            self.config.classifier(),
            self.config.ruins.chance,
        )
    }

    #[instrument(skip(self, host, event), fields(kind = event.kind(), world = event.world()))]
    pub fn handle_event(&mut self, host: &mut dyn Host, event: HostEvent) -> EventOutcome {
        match event {
            HostEvent::CreatureSpawn {
                world, kind, reason, ..
            } => match self.gate.on_spawn(&world, kind, reason, &mut self.rng) {
                SpawnDecision::Allow => EventOutcome::pass(),
                SpawnDecision::AllowWithVariant(variant) => {
                    EventOutcome::pass().with_effect(HostEffect::SetVariant { variant })
                }
                SpawnDecision::Cancel => EventOutcome::cancel(),
            },
            HostEvent::Interact {
                player,
                world,
                action,
                item,
                block,
            } => self.on_interact(host, player, &world, action, item, block),
            HostEvent::PortalTravel {
                player,
                world,
                from,
                cause,
            } => self.on_portal_travel(host, player, &world, from, cause),
            HostEvent::ChunkLoad { world, chunk } => {
                if world == self.config.worlds.dimension {
                    if let Some(target) = host.world_mut(&world) {
                        let cleared = clear_lava(target, chunk);
                        if cleared > 0 {
                            debug!(%chunk, cleared, "Cleared lava on load");
                        }
                    }
                }
                EventOutcome::pass()
            }
            HostEvent::LiquidFlow {
                world,
                source,
                material,
            } => {
                if world != self.config.worlds.dimension || material != Material::Lava {
                    return EventOutcome::pass();
                }
                if let Some(target) = host.world_mut(&world) {
                    target.set_material(source.x, source.y, source.z, Material::Air);
                }
                EventOutcome::cancel()
            }
        }
    }

    fn on_interact(
        &self,
        host: &mut dyn Host,
        player: PlayerId,
        world: &str,
        action: InteractAction,
        item: HeldItem,
        block: Option<BlockPos>,
    ) -> EventOutcome {
        let Some(clicked) = block else {
            return EventOutcome::pass();
        };
        if action != InteractAction::RightClickBlock || !item.is_igniter() {
            return EventOutcome::pass();
        }
        let Some(target) = host.world_mut(world) else {
            return EventOutcome::pass();
        };
        let Some(frame) = self.linker.try_activate(target, clicked) else {
            return EventOutcome::pass();
        };
        EventOutcome::cancel()
            .with_effect(HostEffect::PlaySound {
                world: world.to_string(),
                location: frame.corner.center(),
                sound: Sound::PortalTrigger,
            })
            .with_effect(HostEffect::Message {
                player,
                text: MSG_PORTAL_ACTIVATED.to_string(),
            })
    }

    fn on_portal_travel(
        &self,
        host: &mut dyn Host,
        player: PlayerId,
        world: &str,
        from: Location,
        cause: TravelCause,
    ) -> EventOutcome {
        if cause != TravelCause::NetherPortal {
            return EventOutcome::pass();
        }
        let is_warped = host
            .world(world)
            .is_some_and(|w| self.linker.is_warped_portal(w.as_region(), from.block()));
        if !is_warped {
            return EventOutcome::pass();
        }

        let names = &self.config.worlds;
        let (destination, greeting) = if world == names.dimension {
            (names.overworld.as_str(), MSG_RETURNED)
        } else {
            (names.dimension.as_str(), MSG_WELCOME)
        };
        let Some(target) = host.world_mut(destination) else {
            info!(destination, "Destination world unavailable; portal travel aborted");
            return EventOutcome::cancel();
        };

        let link = self.linker.resolve_destination(target, from);
        info!(
            %player,
            destination,
            source = ?link.source,
            x = link.destination.x,
            y = link.destination.y,
            z = link.destination.z,
            "Portal travel linked"
        );
        EventOutcome::cancel()
            .with_effect(HostEffect::Teleport {
                player,
                world: destination.to_string(),
                location: link.destination,
            })
            .with_effect(HostEffect::Message {
                player,
                text: greeting.to_string(),
            })
    }

    /// Periodic task. Does nothing on ticks where the schedule does not fire.
    pub fn tick(&mut self, host: &mut dyn Host, now: SimTick) -> Option<TickReport> {
        let schedule = &self.config.schedule;
        if !now.fires(schedule.delay_ticks, schedule.interval_ticks) {
            return None;
        }
        let herds = self
            .spawner
            .run_cycle(host, &self.config.worlds.dimension, &mut self.rng);
        let report = TickReport {
            herds: herds.len(),
            creatures: herds.iter().map(|h| h.spawned.len()).sum(),
            chunks_preloaded: self.linker.preload(host),
            anchors_pruned: self.linker.prune(host),
        };
        debug!(tick = now.0, ?report, "Periodic task ran");
        Some(report)
    }

    pub fn run_command(
        &self,
        host: &dyn Host,
        sender: Option<PlayerId>,
        args: &[&str],
    ) -> CommandOutcome {
        self.command.execute(host, sender, args)
    }
}

/// Replace every lava cell of a chunk with air. Returns cells changed.
pub fn clear_lava(world: &mut dyn HostWorld, chunk: ChunkPos) -> usize {
    let bounds = world.info().bounds;
    let (ox, oz) = chunk.origin();
    let mut cleared = 0;
    for x in ox..ox + CHUNK_SIZE_X as i32 {
        for z in oz..oz + CHUNK_SIZE_Z as i32 {
            for y in bounds.min_y..bounds.max_y {
                if world.material(x, y, z) == Some(Material::Lava)
                    && world.set_material(x, y, z, Material::Air)
                {
                    cleared += 1;
                }
            }
        }
    }
    cleared
}
