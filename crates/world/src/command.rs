//! The `/warped` command.
//!
//! `/warped` teleports to a safe spot at the dimension spawn, `/warped ruins`
//! (or `locate`) reports the nearest ruin-bearing chunk and `/warped help`
//! lists the subcommands.

use serde::{Deserialize, Serialize};
use tracing::debug;
use warped_core::{BlockPos, Location};

use crate::biome::BiomeNoiseClassifier;
use crate::chunk::ChunkPos;
use crate::config::RuinConfig;
use crate::event::{HostEffect, PlayerId, Sound};
use crate::host::{Host, HostWorld};
use crate::material::Material;
use crate::ruin::is_ruin_chunk;

pub const MSG_PLAYERS_ONLY: &str = "Only players can use this command!";
pub const MSG_NOT_LOADED: &str = "Warped Dimension world is not loaded!";
pub const MSG_WELCOME: &str = "Welcome to the Warped Dimension!";
pub const MSG_SEARCHING: &str = "Searching for warped ruins...";
pub const MSG_COMPASS: &str = "Your compass now points to the ruins!";
pub const MSG_ON_RUINS: &str = "You are standing on the ruins!";

pub const HELP_LINES: [&str; 5] = [
    "=== Warped Dimension Commands ===",
    "/warped - Teleport to the warped dimension",
    "/warped ruins - Locate nearby warped ruins",
    "/warped locate - Same as ruins command",
    "/warped help - Show this help message",
];

/// Radius searched around the spawn column when it is unsafe.
const SPAWN_SEARCH_RADIUS: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    Teleport,
    Locate,
    Help,
}

impl Subcommand {
    /// Unknown arguments fall back to the teleport, like a bare `/warped`.
    pub fn parse(args: &[&str]) -> Self {
        match args.first() {
            Some(arg) if arg.eq_ignore_ascii_case("ruins") || arg.eq_ignore_ascii_case("locate") => {
                Subcommand::Locate
            }
            Some(arg) if arg.eq_ignore_ascii_case("help") => Subcommand::Help,
            _ => Subcommand::Teleport,
        }
    }
}

/// Lines sent to the sender plus effects for the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub handled: bool,
    pub lines: Vec<String>,
    pub effects: Vec<HostEffect>,
}

impl CommandOutcome {
    fn new() -> Self {
        Self {
            handled: true,
            lines: Vec::new(),
            effects: Vec::new(),
        }
    }

    fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }
}

/// Nearest ruins found by [`locate_ruins`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuinSighting {
    pub chunk: ChunkPos,
    pub target: BlockPos,
    pub distance: f64,
    /// Target minus the searcher's block position.
    pub relative: BlockPos,
}

impl RuinSighting {
    pub fn direction(&self) -> String {
        direction_hint(self.relative.x, self.relative.z)
    }
}

/// Nearest ruin-bearing chunk whose center (at `ruins.report_y`) lies within
/// `ruins.locate_radius` blocks of `from`.
pub fn locate_ruins(
    seed: u64,
    classifier: &BiomeNoiseClassifier,
    ruins: &RuinConfig,
    from: Location,
) -> Option<RuinSighting> {
    let origin = from.block();
    let (home_x, home_z) = origin.chunk();
    let chunk_radius = ruins.locate_radius / 16;
    let max_distance = ruins.locate_radius as f64;

    let mut best: Option<RuinSighting> = None;
    for dx in -chunk_radius..=chunk_radius {
        for dz in -chunk_radius..=chunk_radius {
            let chunk = ChunkPos::new(home_x + dx, home_z + dz);
            if !is_ruin_chunk(seed, chunk, ruins.chance, classifier) {
                continue;
            }
            let (cx, cz) = chunk.center();
            let target = BlockPos::new(cx, ruins.report_y, cz);
            let distance = from.distance(Location::new(
                target.x as f64,
                target.y as f64,
                target.z as f64,
            ));
            if distance > max_distance || best.is_some_and(|b| distance >= b.distance) {
                continue;
            }
            best = Some(RuinSighting {
                chunk,
                target,
                distance,
                relative: BlockPos::new(
                    target.x - origin.x,
                    target.y - origin.y,
                    target.z - origin.z,
                ),
            });
        }
    }
    best
}

/// Compass direction plus a rough distance, for example `North-East (close)`.
pub fn direction_hint(rel_x: i32, rel_z: i32) -> String {
    if rel_x == 0 && rel_z == 0 {
        return MSG_ON_RUINS.to_string();
    }
    let mut parts = Vec::with_capacity(2);
    match rel_z.signum() {
        -1 => parts.push("North"),
        1 => parts.push("South"),
        _ => {}
    }
    match rel_x.signum() {
        1 => parts.push("East"),
        -1 => parts.push("West"),
        _ => {}
    }

    let distance = ((rel_x as f64).powi(2) + (rel_z as f64).powi(2)).sqrt();
    let bucket = if distance < 50.0 {
        "very close"
    } else if distance < 200.0 {
        "close"
    } else if distance < 500.0 {
        "moderate distance"
    } else {
        "far"
    };
    format!("{} ({bucket})", parts.join("-"))
}

/// Spot above the highest block at the world spawn. When that block is air
/// or liquid, the first solid dry column within ten blocks is used instead.
pub fn safe_spawn(world: &dyn HostWorld) -> Location {
    let spawn = world.spawn_point();
    let (x, z) = (spawn.x, spawn.z);
    let ground_y = world.highest_block_y(x, z);
    let ground = ground_y.and_then(|y| world.material(x, y, z));

    let unsafe_ground = !matches!(
        ground,
        Some(m) if !m.is_air() && m != Material::Water && m != Material::Lava
    );
    if unsafe_ground {
        for radius in 1..=SPAWN_SEARCH_RADIUS {
            for dx in -radius..=radius {
                for dz in -radius..=radius {
                    let Some(y) = world.highest_block_y(x + dx, z + dz) else {
                        continue;
                    };
                    let dry = world
                        .material(x + dx, y, z + dz)
                        .is_some_and(|m| m.is_solid() && !m.is_liquid());
                    if dry {
                        return BlockPos::new(x + dx, y + 1, z + dz).center();
                    }
                }
            }
        }
    }

    let y = ground_y.unwrap_or(spawn.y - 1);
    BlockPos::new(x, y + 1, z).center()
}

/// Handles `/warped` for one dimension.
#[derive(Debug, Clone)]
pub struct WarpedCommand {
    dimension: String,
    classifier: BiomeNoiseClassifier,
    ruins: RuinConfig,
}

impl WarpedCommand {
    pub fn new(
        dimension: impl Into<String>,
        classifier: BiomeNoiseClassifier,
        ruins: RuinConfig,
    ) -> Self {
        Self {
            dimension: dimension.into(),
            classifier,
            ruins,
        }
    }

    pub fn execute(
        &self,
        host: &dyn Host,
        sender: Option<PlayerId>,
        args: &[&str],
    ) -> CommandOutcome {
        let Some(player) = sender.and_then(|id| host.player(id)) else {
            return CommandOutcome::new().line(MSG_PLAYERS_ONLY);
        };
        let Some(world) = host.world(&self.dimension) else {
            return CommandOutcome::new().line(MSG_NOT_LOADED);
        };

        let subcommand = Subcommand::parse(args);
        debug!(player = %player.id, ?subcommand, "warped command");
        match subcommand {
            Subcommand::Help => HELP_LINES
                .iter()
                .fold(CommandOutcome::new(), |out, line| out.line(*line)),
            Subcommand::Locate => self.locate(world, player.id, player.location),
            Subcommand::Teleport => {
                let destination = safe_spawn(world);
                let mut out = CommandOutcome::new().line(MSG_WELCOME);
                out.effects.extend([
                    HostEffect::PlaySound {
                        world: player.world.clone(),
                        location: player.location,
                        sound: Sound::PortalTravel,
                    },
                    HostEffect::Teleport {
                        player: player.id,
                        world: self.dimension.clone(),
                        location: destination,
                    },
                    HostEffect::PlaySound {
                        world: self.dimension.clone(),
                        location: destination,
                        sound: Sound::PortalTravel,
                    },
                ]);
                out
            }
        }
    }

    fn locate(&self, world: &dyn HostWorld, player: PlayerId, from: Location) -> CommandOutcome {
        let out = CommandOutcome::new().line(MSG_SEARCHING);
        let seed = world.info().seed;
        let Some(found) = locate_ruins(seed, &self.classifier, &self.ruins, from) else {
            return out
                .line(format!(
                    "No warped ruins found within {} blocks.",
                    self.ruins.locate_radius
                ))
                .line("Try exploring further or use /warped to teleport to a new area.");
        };

        let rel = found.relative;
        let mut out = out
            .line(format!(
                "Found warped ruins at: {} (distance: {:.1} blocks)",
                found.target, found.distance
            ))
            .line(format!("Relative coordinates: {}, {}, {}", rel.x, rel.y, rel.z))
            .line(format!("Direction: {}", found.direction()))
            .line(MSG_COMPASS);
        out.effects.push(HostEffect::CompassTarget {
            player,
            location: Location::new(
                found.target.x as f64,
                found.target.y as f64,
                found.target.z as f64,
            ),
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subcommands_are_case_insensitive() {
        assert_eq!(Subcommand::parse(&["RUINS"]), Subcommand::Locate);
        assert_eq!(Subcommand::parse(&["Locate"]), Subcommand::Locate);
        assert_eq!(Subcommand::parse(&["help"]), Subcommand::Help);
        assert_eq!(Subcommand::parse(&[]), Subcommand::Teleport);
        assert_eq!(Subcommand::parse(&["dance"]), Subcommand::Teleport);
    }

    #[test]
    fn direction_combines_axes_and_buckets() {
        assert_eq!(direction_hint(0, 0), MSG_ON_RUINS);
        assert_eq!(direction_hint(10, -10), "North-East (very close)");
        assert_eq!(direction_hint(-100, 0), "West (close)");
        assert_eq!(direction_hint(0, 300), "South (moderate distance)");
        assert_eq!(direction_hint(-400, 400), "South-West (far)");
    }

    #[test]
    fn locate_finds_the_nearest_ruin_chunk() {
        let classifier = BiomeNoiseClassifier::default();
        let ruins = RuinConfig {
            chance: 1.0,
            ..RuinConfig::default()
        };
        // With every primary chunk carrying ruins, the nearest sighting is
        // always a primary chunk and never farther than a closer candidate.
        let from = Location::new(0.5, 64.0, 0.5);
        if let Some(found) = locate_ruins(7, &classifier, &ruins, from) {
            assert!(found.distance <= 500.0);
            assert_eq!(found.target.y, 64);
            assert_eq!(
                classifier.classify_chunk(found.chunk, 7),
                crate::biome::BiomeCategory::Primary
            );
        }
    }

    #[test]
    fn locate_with_zero_chance_finds_nothing() {
        let ruins = RuinConfig {
            chance: 0.0,
            ..RuinConfig::default()
        };
        let found = locate_ruins(
            7,
            &BiomeNoiseClassifier::default(),
            &ruins,
            Location::new(0.0, 64.0, 0.0),
        );
        assert!(found.is_none());
    }
}
