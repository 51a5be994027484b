//! Host events and the effects the dimension asks the host to apply.
//!
//! Every event the host forwards is one variant of [`HostEvent`]. The
//! dimension answers with an [`EventOutcome`]: whether the host should
//! cancel its own handling, plus a list of [`HostEffect`]s to apply.

use std::fmt;

use serde::{Deserialize, Serialize};
use warped_core::{BlockPos, Location};

use crate::chunk::ChunkPos;
use crate::material::Material;
use crate::mob::{CreatureKind, SpawnReason, Variant};

/// Opaque player handle issued by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractAction {
    RightClickBlock,
    RightClickAir,
    LeftClickBlock,
    LeftClickAir,
    Physical,
}

/// Item in the interacting player's main hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeldItem {
    FlintAndSteel,
    FireCharge,
    Compass,
    Empty,
    Other,
}

impl HeldItem {
    /// Items that light a portal frame.
    pub fn is_igniter(self) -> bool {
        matches!(self, HeldItem::FlintAndSteel | HeldItem::FireCharge)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelCause {
    NetherPortal,
    EndPortal,
    Other,
}

/// Every event the host forwards to the dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    CreatureSpawn {
        world: String,
        kind: CreatureKind,
        reason: SpawnReason,
        location: Location,
    },
    Interact {
        player: PlayerId,
        world: String,
        action: InteractAction,
        item: HeldItem,
        block: Option<BlockPos>,
    },
    PortalTravel {
        player: PlayerId,
        world: String,
        from: Location,
        cause: TravelCause,
    },
    ChunkLoad {
        world: String,
        chunk: ChunkPos,
    },
    LiquidFlow {
        world: String,
        source: BlockPos,
        material: Material,
    },
}

impl HostEvent {
    pub fn world(&self) -> &str {
        match self {
            HostEvent::CreatureSpawn { world, .. }
            | HostEvent::Interact { world, .. }
            | HostEvent::PortalTravel { world, .. }
            | HostEvent::ChunkLoad { world, .. }
            | HostEvent::LiquidFlow { world, .. } => world,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HostEvent::CreatureSpawn { .. } => "creature_spawn",
            HostEvent::Interact { .. } => "interact",
            HostEvent::PortalTravel { .. } => "portal_travel",
            HostEvent::ChunkLoad { .. } => "chunk_load",
            HostEvent::LiquidFlow { .. } => "liquid_flow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sound {
    PortalTrigger,
    PortalTravel,
}

/// Side effects the host applies after an event or command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEffect {
    Message {
        player: PlayerId,
        text: String,
    },
    Teleport {
        player: PlayerId,
        world: String,
        location: Location,
    },
    PlaySound {
        world: String,
        location: Location,
        sound: Sound,
    },
    CompassTarget {
        player: PlayerId,
        location: Location,
    },
    /// Applies to the creature whose spawn is being handled.
    SetVariant {
        variant: Variant,
    },
}

/// The dimension's answer to one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventOutcome {
    pub cancelled: bool,
    pub effects: Vec<HostEffect>,
}

impl EventOutcome {
    /// Leave the host's default handling alone.
    pub fn pass() -> Self {
        Self::default()
    }

    pub fn cancel() -> Self {
        Self {
            cancelled: true,
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, effect: HostEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Messages addressed to `player`, in order.
    pub fn messages_for(&self, player: PlayerId) -> impl Iterator<Item = &str> {
        self.effects.iter().filter_map(move |effect| match effect {
            HostEffect::Message { player: to, text } if *to == player => Some(text.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_a_type_tag() {
        let event = HostEvent::ChunkLoad {
            world: "warped_dimension".into(),
            chunk: ChunkPos::new(1, -2),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "chunk_load");
        assert_eq!(event.world(), "warped_dimension");
        let back: HostEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn outcome_filters_messages_by_player() {
        let outcome = EventOutcome::cancel()
            .with_effect(HostEffect::Message {
                player: PlayerId(1),
                text: "a".into(),
            })
            .with_effect(HostEffect::Message {
                player: PlayerId(2),
                text: "b".into(),
            });
        assert!(outcome.cancelled);
        assert_eq!(outcome.messages_for(PlayerId(1)).collect::<Vec<_>>(), ["a"]);
    }

    #[test]
    fn only_fire_items_ignite() {
        assert!(HeldItem::FlintAndSteel.is_igniter());
        assert!(HeldItem::FireCharge.is_igniter());
        assert!(!HeldItem::Compass.is_igniter());
    }
}
