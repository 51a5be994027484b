//! Block materials understood by the generator and the portal/mob logic.
//!
//! The host engine knows many more materials than this. Only the ones the
//! surface table, the populators and the stand-in terrain read or write are
//! modelled; everything else is the host's business.

use serde::{Deserialize, Serialize};

/// Material of a single voxel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    #[default]
    Air,

    // Vanilla terrain
    Stone,
    Deepslate,
    Granite,
    Diorite,
    Andesite,
    Tuff,
    Dirt,
    CoarseDirt,
    RootedDirt,
    Podzol,
    GrassBlock,
    Sand,
    Gravel,
    Bedrock,
    Water,
    Lava,

    // Vanilla vegetation
    ShortGrass,
    TallGrass,
    Fern,
    LargeFern,
    DeadBush,
    Dandelion,
    Poppy,
    BlueOrchid,
    Allium,
    AzureBluet,
    RedTulip,
    OrangeTulip,
    WhiteTulip,
    PinkTulip,
    OxeyeDaisy,
    Cornflower,
    LilyOfTheValley,
    Sunflower,
    Lilac,
    RoseBush,
    Peony,
    Vine,

    // Vanilla trees
    OakLog,
    OakWood,
    BirchLog,
    BirchWood,
    OakLeaves,
    BirchLeaves,

    // Warped palette
    AmethystBlock,
    BuddingAmethyst,
    AmethystCluster,
    Sculk,
    SculkVein,
    SculkCatalyst,
    SculkSensor,
    WarpedNylium,
    WarpedRoots,
    WarpedFungus,
    WarpedStem,
    WarpedWartBlock,
    Shroomlight,
    EndStone,
    DriedKelpBlock,
    DarkOakLog,
    OchreFroglight,
    ChorusFlower,
    ChorusPlant,
    Blackstone,
    PolishedBlackstone,

    // Portal
    ReinforcedDeepslate,
    NetherPortal,
}

/// Coarse grouping used by the surface rewrite table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialFamily {
    /// Stone, deepslate, granite, diorite, andesite, tuff.
    StoneLike,
    /// Dirt, coarse dirt, rooted dirt, podzol.
    Soil,
    /// Grass block.
    GroundCover,
    /// Grasses, ferns, dead bushes and flowers.
    Vegetation,
    /// Lava.
    HazardLiquid,
    /// Any leaves.
    Leaves,
    /// Any log or wood.
    Log,
    /// Untouched by the surface rewrite.
    Other,
}

impl Material {
    /// Every material, in declaration order.
    pub const ALL: &'static [Material] = &[
        Material::Air,
        Material::Stone,
        Material::Deepslate,
        Material::Granite,
        Material::Diorite,
        Material::Andesite,
        Material::Tuff,
        Material::Dirt,
        Material::CoarseDirt,
        Material::RootedDirt,
        Material::Podzol,
        Material::GrassBlock,
        Material::Sand,
        Material::Gravel,
        Material::Bedrock,
        Material::Water,
        Material::Lava,
        Material::ShortGrass,
        Material::TallGrass,
        Material::Fern,
        Material::LargeFern,
        Material::DeadBush,
        Material::Dandelion,
        Material::Poppy,
        Material::BlueOrchid,
        Material::Allium,
        Material::AzureBluet,
        Material::RedTulip,
        Material::OrangeTulip,
        Material::WhiteTulip,
        Material::PinkTulip,
        Material::OxeyeDaisy,
        Material::Cornflower,
        Material::LilyOfTheValley,
        Material::Sunflower,
        Material::Lilac,
        Material::RoseBush,
        Material::Peony,
        Material::Vine,
        Material::OakLog,
        Material::OakWood,
        Material::BirchLog,
        Material::BirchWood,
        Material::OakLeaves,
        Material::BirchLeaves,
        Material::AmethystBlock,
        Material::BuddingAmethyst,
        Material::AmethystCluster,
        Material::Sculk,
        Material::SculkVein,
        Material::SculkCatalyst,
        Material::SculkSensor,
        Material::WarpedNylium,
        Material::WarpedRoots,
        Material::WarpedFungus,
        Material::WarpedStem,
        Material::WarpedWartBlock,
        Material::Shroomlight,
        Material::EndStone,
        Material::DriedKelpBlock,
        Material::DarkOakLog,
        Material::OchreFroglight,
        Material::ChorusFlower,
        Material::ChorusPlant,
        Material::Blackstone,
        Material::PolishedBlackstone,
        Material::ReinforcedDeepslate,
        Material::NetherPortal,
    ];

    /// Stable snake_case name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Material::Air => "air",
            Material::Stone => "stone",
            Material::Deepslate => "deepslate",
            Material::Granite => "granite",
            Material::Diorite => "diorite",
            Material::Andesite => "andesite",
            Material::Tuff => "tuff",
            Material::Dirt => "dirt",
            Material::CoarseDirt => "coarse_dirt",
            Material::RootedDirt => "rooted_dirt",
            Material::Podzol => "podzol",
            Material::GrassBlock => "grass_block",
            Material::Sand => "sand",
            Material::Gravel => "gravel",
            Material::Bedrock => "bedrock",
            Material::Water => "water",
            Material::Lava => "lava",
            Material::ShortGrass => "short_grass",
            Material::TallGrass => "tall_grass",
            Material::Fern => "fern",
            Material::LargeFern => "large_fern",
            Material::DeadBush => "dead_bush",
            Material::Dandelion => "dandelion",
            Material::Poppy => "poppy",
            Material::BlueOrchid => "blue_orchid",
            Material::Allium => "allium",
            Material::AzureBluet => "azure_bluet",
            Material::RedTulip => "red_tulip",
            Material::OrangeTulip => "orange_tulip",
            Material::WhiteTulip => "white_tulip",
            Material::PinkTulip => "pink_tulip",
            Material::OxeyeDaisy => "oxeye_daisy",
            Material::Cornflower => "cornflower",
            Material::LilyOfTheValley => "lily_of_the_valley",
            Material::Sunflower => "sunflower",
            Material::Lilac => "lilac",
            Material::RoseBush => "rose_bush",
            Material::Peony => "peony",
            Material::Vine => "vine",
            Material::OakLog => "oak_log",
            Material::OakWood => "oak_wood",
            Material::BirchLog => "birch_log",
            Material::BirchWood => "birch_wood",
            Material::OakLeaves => "oak_leaves",
            Material::BirchLeaves => "birch_leaves",
            Material::AmethystBlock => "amethyst_block",
            Material::BuddingAmethyst => "budding_amethyst",
            Material::AmethystCluster => "amethyst_cluster",
            Material::Sculk => "sculk",
            Material::SculkVein => "sculk_vein",
            Material::SculkCatalyst => "sculk_catalyst",
            Material::SculkSensor => "sculk_sensor",
            Material::WarpedNylium => "warped_nylium",
            Material::WarpedRoots => "warped_roots",
            Material::WarpedFungus => "warped_fungus",
            Material::WarpedStem => "warped_stem",
            Material::WarpedWartBlock => "warped_wart_block",
            Material::Shroomlight => "shroomlight",
            Material::EndStone => "end_stone",
            Material::DriedKelpBlock => "dried_kelp_block",
            Material::DarkOakLog => "dark_oak_log",
            Material::OchreFroglight => "ochre_froglight",
            Material::ChorusFlower => "chorus_flower",
            Material::ChorusPlant => "chorus_plant",
            Material::Blackstone => "blackstone",
            Material::PolishedBlackstone => "polished_blackstone",
            Material::ReinforcedDeepslate => "reinforced_deepslate",
            Material::NetherPortal => "nether_portal",
        }
    }

    /// Parse a material from its snake_case name (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        let name = name.strip_prefix("minecraft:").unwrap_or(&name);
        Self::ALL.iter().copied().find(|m| m.as_str() == name)
    }

    /// Surface rewrite family.
    pub fn family(self) -> MaterialFamily {
        use Material::*;
        match self {
            Stone | Deepslate | Granite | Diorite | Andesite | Tuff => MaterialFamily::StoneLike,
            Dirt | CoarseDirt | RootedDirt | Podzol => MaterialFamily::Soil,
            GrassBlock => MaterialFamily::GroundCover,
            ShortGrass | TallGrass | Fern | LargeFern | DeadBush | Dandelion | Poppy
            | BlueOrchid | Allium | AzureBluet | RedTulip | OrangeTulip | WhiteTulip
            | PinkTulip | OxeyeDaisy | Cornflower | LilyOfTheValley | Sunflower | Lilac
            | RoseBush | Peony => MaterialFamily::Vegetation,
            Lava => MaterialFamily::HazardLiquid,
            OakLeaves | BirchLeaves => MaterialFamily::Leaves,
            OakLog | OakWood | BirchLog | BirchWood | DarkOakLog => MaterialFamily::Log,
            _ => MaterialFamily::Other,
        }
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self == Material::Air
    }

    #[inline]
    pub fn is_liquid(self) -> bool {
        matches!(self, Material::Water | Material::Lava)
    }

    /// Materials a creature or portal must never be placed on.
    #[inline]
    pub fn is_hazard(self) -> bool {
        self == Material::Lava
    }

    /// Whether the material has a full collision box.
    pub fn is_solid(self) -> bool {
        use Material::*;
        if self.is_air() || self.is_liquid() {
            return false;
        }
        !matches!(
            self.family(),
            MaterialFamily::Vegetation | MaterialFamily::HazardLiquid
        ) && !matches!(
            self,
            Vine | WarpedRoots | WarpedFungus | SculkVein | AmethystCluster | NetherPortal
        )
    }

    /// Cells a synthesized portal frame may overwrite.
    pub fn is_portal_replaceable(self) -> bool {
        use Material::*;
        self.is_air()
            || self.is_liquid()
            || matches!(self, GrassBlock | ShortGrass | TallGrass | WarpedRoots | Vine)
    }

    /// Themed ground that passive creatures spawn on and trees grow from.
    #[inline]
    pub fn is_warped_ground(self) -> bool {
        matches!(self, Material::WarpedNylium | Material::Sculk)
    }
}

/// Orientation of an axis-aligned block such as a portal pane or a stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}
