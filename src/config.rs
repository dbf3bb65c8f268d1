// src/config.rs
//! Generator configuration, loadable from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the partition phase picks cells to split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionMode {
    /// One global loop over randomly drawn sibling-leaf pairs, stopping as
    /// soon as the pair just processed is at or below the area threshold.
    /// Branches end up subdivided to uneven depths, and leaves well above
    /// the threshold can remain.
    #[default]
    Sampled,
    /// Random pairs are drawn only among leaf pairs still above the
    /// threshold, until none remain. This is the only mode in which every
    /// leaf is guaranteed to end at or below the threshold.
    Exhaustive,
}

/// Constraints on the room placed inside each leaf cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Minimum room area as a fraction of its cell's area.
    pub min_area_fraction: f64,
    /// Minimum gap between the room and each wall of its cell.
    pub wall_clearance: f64,
    pub min_width: f64,
    pub min_height: f64,
    /// Samples drawn per room before giving up on the current pass.
    pub max_attempts: u32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        RoomConfig {
            min_area_fraction: 0.20,
            wall_clearance: 3.0,
            min_width: 6.0,
            min_height: 6.0,
            max_attempts: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorConfig {
    /// Corridor thickness.
    pub size: f64,
    /// Pairs tried per internal node before the pass is abandoned.
    pub max_attempts: u32,
}

impl Default for CorridorConfig {
    fn default() -> Self {
        CorridorConfig {
            size: 4.0,
            max_attempts: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Partitioning stops around cells of this fraction of the whole map area.
    pub min_partition_fraction: f64,
    /// Cells at or below this area are never split.
    pub min_node_area: f64,
    pub partition_mode: PartitionMode,
    pub room: RoomConfig,
    pub corridor: CorridorConfig,
    /// Room placement + connection passes per partition.
    pub max_connection_passes: u32,
    /// Fresh partitions tried after the first one runs out of passes.
    pub max_restarts: u32,
    /// Seed for the generator's RNG; drawn at random when absent.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            min_partition_fraction: 1.0 / 32.0,
            min_node_area: 10.0,
            partition_mode: PartitionMode::default(),
            room: RoomConfig::default(),
            corridor: CorridorConfig::default(),
            max_connection_passes: 50,
            max_restarts: 2,
            seed: None,
        }
    }
}

fn check(ok: bool, field: &'static str, expected: &'static str, value: f64) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected,
            value,
        })
    }
}

impl GeneratorConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = self.min_partition_fraction;
        check(f > 0.0 && f <= 1.0, "min_partition_fraction", "in (0, 1]", f)?;
        check(self.min_node_area >= 0.0, "min_node_area", "non-negative", self.min_node_area)?;

        let room = &self.room;
        let f = room.min_area_fraction;
        check((0.0..=1.0).contains(&f), "room.min_area_fraction", "in [0, 1]", f)?;
        check(room.wall_clearance >= 0.0, "room.wall_clearance", "non-negative", room.wall_clearance)?;
        check(room.min_width >= 0.0, "room.min_width", "non-negative", room.min_width)?;
        check(room.min_height >= 0.0, "room.min_height", "non-negative", room.min_height)?;
        check(room.max_attempts > 0, "room.max_attempts", "positive", room.max_attempts as f64)?;

        let corridor = &self.corridor;
        check(corridor.size > 0.0, "corridor.size", "positive", corridor.size)?;
        check(corridor.max_attempts > 0, "corridor.max_attempts", "positive", corridor.max_attempts as f64)?;

        check(
            self.max_connection_passes > 0,
            "max_connection_passes",
            "positive",
            self.max_connection_passes as f64,
        )
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
