// src/error.rs
//! Error types for every stage of map generation.

use std::path::PathBuf;

use thiserror::Error;

use crate::bsp::{NodeId, Rect2D};

/// Structural request against a handle the tree does not own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("no node with handle {0} in this tree")]
    UnknownNode(NodeId),
}

/// Failure to place a room inside a leaf cell.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoomError {
    /// No lattice rectangle inside the cell can ever meet the room constraints.
    #[error("cell {cell:?} is too small to hold a room")]
    CellTooSmall { cell: Rect2D },
    #[error("no valid room sampled in cell {cell:?} after {attempts} attempts")]
    AttemptsExhausted { cell: Rect2D, attempts: u32 },
}

/// Failure of a single corridor search between two candidate sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("one of the candidate shape sets is empty")]
    EmptyCandidates,
    #[error("no straight corridor found after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// A connection pass stopped at `node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("could not connect the children of node {node}")]
pub struct ConnectError {
    pub node: NodeId,
    #[source]
    pub source: SearchError,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`{field}` must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
    #[error("invalid generator config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why the last room/connection pass of a partition failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PassFailure {
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error(transparent)]
    Connect(#[from] ConnectError),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("map dimensions must be positive and finite, got {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error("no fully connected layout after {passes} room/connection passes: {last}")]
    PassesExhausted {
        passes: u32,
        #[source]
        last: PassFailure,
    },
    #[error("generation failed after {restarts} partition restarts: {last}")]
    RestartsExhausted {
        restarts: u32,
        #[source]
        last: Box<GenerationError>,
    },
}
