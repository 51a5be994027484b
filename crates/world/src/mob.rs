//! Creature policy for the warped dimension.
//!
//! [`MobGate`] decides every spawn the host attempts inside the dimension:
//! endermen pass, wardens pass rarely, cows and chickens pass as their cold
//! variant, and everything else is cancelled. [`AmbientSpawner`] tops the
//! cows and chickens up near players, since the host's own passive spawning
//! rarely finds valid ground here.

use std::collections::BTreeSet;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;
use warped_core::{BlockPos, Location};

use crate::host::{Host, HostWorld};
use crate::material::Material;
use crate::populator::Span;

/// Creature types the gate distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatureKind {
    Cow,
    Chicken,
    Enderman,
    Warden,
    Zombie,
    Skeleton,
    Creeper,
    Spider,
    Pig,
    Sheep,
    Other,
}

impl CreatureKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            CreatureKind::Cow => "cow",
            CreatureKind::Chicken => "chicken",
            CreatureKind::Enderman => "enderman",
            CreatureKind::Warden => "warden",
            CreatureKind::Zombie => "zombie",
            CreatureKind::Skeleton => "skeleton",
            CreatureKind::Creeper => "creeper",
            CreatureKind::Spider => "spider",
            CreatureKind::Pig => "pig",
            CreatureKind::Sheep => "sheep",
            CreatureKind::Other => "other",
        }
    }

    /// Parse a creature key (case-insensitive, optional `minecraft:` prefix).
    pub fn parse(input: &str) -> Option<Self> {
        let key = input.trim().to_ascii_lowercase();
        let key = key.strip_prefix("minecraft:").unwrap_or(&key);
        match key {
            "cow" => Some(CreatureKind::Cow),
            "chicken" => Some(CreatureKind::Chicken),
            "enderman" => Some(CreatureKind::Enderman),
            "warden" => Some(CreatureKind::Warden),
            "zombie" => Some(CreatureKind::Zombie),
            "skeleton" => Some(CreatureKind::Skeleton),
            "creeper" => Some(CreatureKind::Creeper),
            "spider" => Some(CreatureKind::Spider),
            "pig" => Some(CreatureKind::Pig),
            "sheep" => Some(CreatureKind::Sheep),
            "other" => Some(CreatureKind::Other),
            _ => None,
        }
    }

    /// Cows and chickens, the creatures that live here.
    pub fn is_ambient(self) -> bool {
        matches!(self, CreatureKind::Cow | CreatureKind::Chicken)
    }

    /// The other ambient kind, used to mix herds.
    pub fn ambient_partner(self) -> Self {
        match self {
            CreatureKind::Cow => CreatureKind::Chicken,
            _ => CreatureKind::Cow,
        }
    }
}

/// Why the host is spawning a creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnReason {
    Natural,
    Spawner,
    Breeding,
    Egg,
    Command,
    Custom,
    Other,
}

impl SpawnReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            SpawnReason::Natural => "natural",
            SpawnReason::Spawner => "spawner",
            SpawnReason::Breeding => "breeding",
            SpawnReason::Egg => "egg",
            SpawnReason::Command => "command",
            SpawnReason::Custom => "custom",
            SpawnReason::Other => "other",
        }
    }
}

/// Skin variant of an ambient creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Temperate,
    Warm,
    Cold,
}

/// Result of gating one spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnDecision {
    Allow,
    AllowWithVariant(Variant),
    Cancel,
}

impl SpawnDecision {
    pub fn is_cancelled(self) -> bool {
        self == SpawnDecision::Cancel
    }
}

/// Spawn reasons under which the rare-creature roll applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RareScope {
    #[default]
    AnyReason,
    NaturalAndSpawner,
}

impl RareScope {
    pub fn covers(self, reason: SpawnReason) -> bool {
        match self {
            RareScope::AnyReason => true,
            RareScope::NaturalAndSpawner => {
                matches!(reason, SpawnReason::Natural | SpawnReason::Spawner)
            }
        }
    }
}

/// Tunables for [`MobGate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MobPolicy {
    pub sentinel: CreatureKind,
    pub rare: CreatureKind,
    /// Probability that a rare spawn is allowed.
    pub rare_chance: f64,
    pub rare_scope: RareScope,
    /// Let natural spawns of unlisted creatures through untouched.
    pub pass_natural: bool,
    pub ambient_variant: Variant,
}

impl Default for MobPolicy {
    fn default() -> Self {
        Self {
            sentinel: CreatureKind::Enderman,
            rare: CreatureKind::Warden,
            rare_chance: 1.0 / 5000.0,
            rare_scope: RareScope::AnyReason,
            pass_natural: false,
            ambient_variant: Variant::Cold,
        }
    }
}

/// Decides creature spawns inside the dimension.
#[derive(Debug, Clone)]
pub struct MobGate {
    world_name: String,
    policy: MobPolicy,
}

impl MobGate {
    pub fn new(world_name: impl Into<String>, policy: MobPolicy) -> Self {
        Self {
            world_name: world_name.into(),
            policy,
        }
    }

    pub fn policy(&self) -> &MobPolicy {
        &self.policy
    }

    pub fn on_spawn(
        &self,
        world: &str,
        kind: CreatureKind,
        reason: SpawnReason,
        rng: &mut dyn RngCore,
    ) -> SpawnDecision {
        if world != self.world_name {
            return SpawnDecision::Allow;
        }
        let policy = &self.policy;

        if kind == policy.sentinel {
            return SpawnDecision::Allow;
        }
        if kind == policy.rare && policy.rare_scope.covers(reason) {
            return if rng.gen::<f64>() <= policy.rare_chance {
                SpawnDecision::Allow
            } else {
                SpawnDecision::Cancel
            };
        }
        if kind.is_ambient() {
            return SpawnDecision::AllowWithVariant(policy.ambient_variant);
        }
        if policy.pass_natural && reason == SpawnReason::Natural {
            return SpawnDecision::Allow;
        }
        SpawnDecision::Cancel
    }
}

/// Tunables for [`AmbientSpawner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientSpawnConfig {
    /// Radius for the per-player creature cap.
    pub cap_radius: f64,
    pub cap: usize,
    pub min_distance: i32,
    pub max_distance: i32,
    pub attempts: u32,
    /// Chance per player area per cycle.
    pub chance: f64,
    pub herd_size: Span,
    /// Herd members land within `±herd_spread / 2` of the herd center.
    pub herd_spread: f64,
    /// Probability that a herd is led by cows rather than chickens.
    pub cow_lead_chance: f64,
    /// Probability that a member matches the herd's lead kind.
    pub lead_kind_chance: f64,
    /// Area grouping in chunks. Players in the same area share one roll.
    pub area_chunks: i32,
}

impl Default for AmbientSpawnConfig {
    fn default() -> Self {
        Self {
            cap_radius: 48.0,
            cap: 12,
            min_distance: 24,
            max_distance: 64,
            attempts: 20,
            chance: 0.6,
            herd_size: Span::new(2, 5),
            herd_spread: 8.0,
            cow_lead_chance: 0.7,
            lead_kind_chance: 0.8,
            area_chunks: 3,
        }
    }
}

/// One herd placed by the spawner.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedHerd {
    pub center: Location,
    pub spawned: Vec<(CreatureKind, Location)>,
}

/// Periodic cow and chicken spawner.
#[derive(Debug, Clone)]
pub struct AmbientSpawner {
    config: AmbientSpawnConfig,
    variant: Variant,
}

impl Default for AmbientSpawner {
    fn default() -> Self {
        Self::new(AmbientSpawnConfig::default(), MobPolicy::default().ambient_variant)
    }
}

impl AmbientSpawner {
    /// Spawner whose herds carry `variant`, the same one the spawn gate applies.
    pub fn new(config: AmbientSpawnConfig, variant: Variant) -> Self {
        Self { config, variant }
    }

    pub fn config(&self) -> &AmbientSpawnConfig {
        &self.config
    }

    /// Area key for a location. Integer division truncates toward zero.
    pub fn area_key(&self, location: Location) -> (i32, i32) {
        let (chunk_x, chunk_z) = location.block().chunk();
        let size = self.config.area_chunks.max(1);
        (chunk_x / size, chunk_z / size)
    }

    /// Ground is nylium or sculk, feet are air or roots, head is air.
    pub fn is_valid_site(world: &dyn HostWorld, feet: BlockPos) -> bool {
        let ground = world.material(feet.x, feet.y - 1, feet.z);
        let feet_cell = world.material(feet.x, feet.y, feet.z);
        let head = world.material(feet.x, feet.y + 1, feet.z);
        ground.is_some_and(Material::is_warped_ground)
            && matches!(feet_cell, Some(Material::Air | Material::WarpedRoots))
            && head == Some(Material::Air)
    }

    /// One spawner cycle over every player in `world_name`.
    pub fn run_cycle(
        &self,
        host: &mut dyn Host,
        world_name: &str,
        rng: &mut dyn RngCore,
    ) -> Vec<SpawnedHerd> {
        if host.world(world_name).is_none() {
            return Vec::new();
        }
        let players = host.players_in(world_name);
        let mut processed = BTreeSet::new();
        let mut herds = Vec::new();

        for player in players {
            if !processed.insert(self.area_key(player.location)) {
                continue;
            }
            if rng.gen::<f64>() >= self.config.chance {
                continue;
            }
            if let Some(herd) = self.spawn_near(host, world_name, player.location, rng) {
                herds.push(herd);
            }
        }
        herds
    }

    fn spawn_near(
        &self,
        host: &mut dyn Host,
        world_name: &str,
        around: Location,
        rng: &mut dyn RngCore,
    ) -> Option<SpawnedHerd> {
        let nearby = host.count_creatures_near(
            world_name,
            around,
            self.config.cap_radius,
            &[CreatureKind::Cow, CreatureKind::Chicken],
        );
        if nearby >= self.config.cap {
            debug!(nearby, cap = self.config.cap, "Ambient cap reached");
            return None;
        }

        let center = {
            let world = host.world(world_name)?;
            (0..self.config.attempts).find_map(|_| self.pick_site(world, around, &mut *rng))?
        };
        Some(self.spawn_herd(host, world_name, center, rng))
    }

    fn pick_site(
        &self,
        world: &dyn HostWorld,
        around: Location,
        rng: &mut dyn RngCore,
    ) -> Option<Location> {
        let span = (self.config.max_distance - self.config.min_distance).max(1);
        let distance = (self.config.min_distance + rng.gen_range(0..span)) as f64;
        let angle = rng.gen::<f64>() * std::f64::consts::TAU;
        let origin = around.block();
        let x = origin.x + (angle.cos() * distance) as i32;
        let z = origin.z + (angle.sin() * distance) as i32;
        let y = world.highest_block_y(x, z)?;

        let feet = BlockPos::new(x, y + 1, z);
        Self::is_valid_site(world, feet).then(|| feet.center())
    }

    fn spawn_herd(
        &self,
        host: &mut dyn Host,
        world_name: &str,
        center: Location,
        rng: &mut dyn RngCore,
    ) -> SpawnedHerd {
        let size = self.config.herd_size.roll(rng);
        let lead = if rng.gen::<f64>() < self.config.cow_lead_chance {
            CreatureKind::Cow
        } else {
            CreatureKind::Chicken
        };

        let mut spawned = Vec::new();
        for _ in 0..size {
            let dx = (rng.gen::<f64>() - 0.5) * self.config.herd_spread;
            let dz = (rng.gen::<f64>() - 0.5) * self.config.herd_spread;
            let at = center.offset(dx, 0.0, dz);

            let valid = host
                .world(world_name)
                .is_some_and(|world| Self::is_valid_site(world, at.block()));
            if !valid {
                continue;
            }
            let kind = if rng.gen::<f64>() < self.config.lead_kind_chance {
                lead
            } else {
                lead.ambient_partner()
            };
            if host.spawn_creature(world_name, kind, at, Some(self.variant)) {
                spawned.push((kind, at));
            }
        }
        debug!(
            x = center.x,
            z = center.z,
            lead = lead.as_str(),
            spawned = spawned.len(),
            "Spawned ambient herd"
        );
        SpawnedHerd { center, spawned }
    }
}
