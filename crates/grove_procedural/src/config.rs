//! # Generation Configuration
//!
//! Everything a [`crate::TerrainGenerator`] is built from. Loaded from TOML:
//!
//! ```toml
//! seed = 1337
//! world_type = "frozen"
//!
//! [caps]
//! max_trees = 32
//! ```
//!
//! Missing keys fall back to [`GenerationConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::biome::WorldType;
use crate::error::{GroveError, GroveResult};

/// Hard per-chunk caps on placement passes.
///
/// Caps bound the cost of a single chunk generation. Truncation is silent.
/// Root hollows are always capped at one and are not configurable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementCaps {
    /// Cavern flora candidates.
    pub max_flora: usize,
    /// Trees.
    pub max_trees: usize,
    /// Sticks around trees.
    pub max_sticks: usize,
    /// Small rocks.
    pub max_rocks: usize,
    /// Large rocks.
    pub max_large_rocks: usize,
    /// Firefly swarms.
    pub max_firefly_swarms: usize,
    /// Motes per swarm.
    pub max_motes_per_swarm: usize,
}

impl PlacementCaps {
    /// No single cap may exceed this.
    pub const CEILING: usize = 4096;

    fn largest(&self) -> usize {
        [
            self.max_flora,
            self.max_trees,
            self.max_sticks,
            self.max_rocks,
            self.max_large_rocks,
            self.max_firefly_swarms,
            self.max_motes_per_swarm,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

impl Default for PlacementCaps {
    fn default() -> Self {
        Self {
            max_flora: 48,
            max_trees: 64,
            max_sticks: 96,
            max_rocks: 64,
            max_large_rocks: 4,
            max_firefly_swarms: 6,
            max_motes_per_swarm: 12,
        }
    }
}

/// Generation context configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// World seed.
    pub seed: u64,
    /// World flavour. Fixed for the lifetime of the generator.
    pub world_type: WorldType,
    /// Placement caps.
    pub caps: PlacementCaps,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            world_type: WorldType::Default,
            caps: PlacementCaps::default(),
        }
    }
}

impl GenerationConfig {
    /// Default configuration with another seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`GroveError::ConfigParse`] for malformed TOML and
    /// [`GroveError::InvalidConfig`] for out-of-range caps.
    pub fn from_toml_str(text: &str) -> GroveResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`GroveError::Io`] if the file cannot be read, otherwise as
    /// [`GenerationConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> GroveResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GroveError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`GroveError::InvalidConfig`] if any cap exceeds
    /// [`PlacementCaps::CEILING`].
    pub fn validate(&self) -> GroveResult<()> {
        let largest = self.caps.largest();
        if largest > PlacementCaps::CEILING {
            return Err(GroveError::InvalidConfig(format!(
                "placement cap {largest} exceeds ceiling {}",
                PlacementCaps::CEILING
            )));
        }
        Ok(())
    }
}
