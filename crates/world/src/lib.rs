//! Generation core of the warped dimension: biome classification, surface
//! rewrite and structure populators, portal linking and spawn gating, all
//! driven through host traits.

mod chunk;
mod material;
mod region;
mod storage;

pub mod amethyst_rocks;
pub mod amethyst_tree;
pub mod biome;
pub mod chorus;
pub mod command;
pub mod config;
pub mod dimension;
pub mod error;
pub mod event;
pub mod fungus;
pub mod generator;
pub mod host;
pub mod mob;
pub mod noise;
pub mod populator;
pub mod portal;
pub mod ruin;
pub mod sandbox;
pub mod sculk_tree;
pub mod surface;
pub mod terrain;
pub mod trees;

pub use chunk::*;
pub use material::*;
pub use region::*;
pub use storage::*;

pub use biome::{BiomeCategory, BiomeNoiseClassifier, BiomeThresholds};
pub use config::DimensionConfig;
pub use dimension::WarpedDimension;
pub use error::WarpedError;
pub use event::{EventOutcome, HostEffect, HostEvent, PlayerId};
pub use generator::{GenerationReport, WarpedChunkGenerator};
pub use host::{EntityHost, Host, HostWorld, PlayerView};
pub use populator::{Populator, WorldInfo};
pub use portal::{PortalAnchor, PortalLinker, PortalRegistry, SharedPortalRegistry};
