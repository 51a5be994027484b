//! Dimension configuration loaded from TOML.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::warn;
use warped_core::DimensionId;

use crate::biome::{BiomeNoiseClassifier, BiomeThresholds};
use crate::error::{Result, WarpedError};
use crate::mob::{AmbientSpawnConfig, MobPolicy};
use crate::portal::PortalSearchConfig;
use crate::ruin::RUIN_CHANCE;

pub const DEFAULT_CONFIG_PATH: &str = "config/warped.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorldNames {
    /// World that portals lead back to.
    pub overworld: String,
    pub dimension: String,
}

impl Default for WorldNames {
    fn default() -> Self {
        Self {
            overworld: DimensionId::Overworld.default_world_name().to_string(),
            dimension: DimensionId::Warped.default_world_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuinConfig {
    /// Chance that a primary-biome chunk carries ruins.
    pub chance: f64,
    /// Radius of the locate command, in blocks.
    pub locate_radius: i32,
    /// Height reported for located ruins.
    pub report_y: i32,
}

impl Default for RuinConfig {
    fn default() -> Self {
        Self {
            chance: RUIN_CHANCE,
            locate_radius: 500,
            report_y: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Ticks before the periodic task first runs.
    pub delay_ticks: u64,
    pub interval_ticks: u64,
    /// Seed of the runtime stream used for spawn rolls.
    pub runtime_seed: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            delay_ticks: 100,
            interval_ticks: 100,
            runtime_seed: 0x57_41_52_50, // "WARP"
        }
    }
}

/// Everything the dimension reads at startup.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DimensionConfig {
    pub worlds: WorldNames,
    pub biome_profile: BiomeThresholds,
    pub mobs: MobPolicy,
    pub ambient: AmbientSpawnConfig,
    pub portal: PortalSearchConfig,
    pub ruins: RuinConfig,
    pub schedule: ScheduleConfig,
}

impl DimensionConfig {
    pub fn classifier(&self) -> BiomeNoiseClassifier {
        BiomeNoiseClassifier::new(self.biome_profile)
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match Self::try_load_from_path(path) {
            Ok(cfg) => cfg,
            Err(WarpedError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                warn!(
                    "Dimension config not found at {}. Using defaults",
                    path.display()
                );
                Self::default()
            }
            Err(err) => {
                warn!("Failed to load {}: {err}. Using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Load configuration, returning errors to the caller.
    pub fn try_load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| WarpedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = toml::from_str(&contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        let io_err = |source| WarpedError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, toml).map_err(io_err)
    }

    pub fn validate(&self) -> Result<()> {
        if self.worlds.overworld == self.worlds.dimension {
            return Err(WarpedError::Invalid(format!(
                "overworld and dimension share the name {:?}",
                self.worlds.dimension
            )));
        }
        if !(0.0..=1.0).contains(&self.ruins.chance) {
            return Err(WarpedError::Invalid(format!(
                "ruin chance {} is not a probability",
                self.ruins.chance
            )));
        }
        if self.portal.scan_radii.is_empty() {
            return Err(WarpedError::Invalid("portal scan radii are empty".into()));
        }
        Ok(())
    }
}
