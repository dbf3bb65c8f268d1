// src/lib.rs
//! # bsp_mapgen
//!
//! Procedural dungeon maps by binary space partitioning. The map area is
//! split into a tree of cells, every leaf cell gets a randomized room, and
//! sibling subtrees are joined by straight corridors until the whole tree
//! is connected.
//!
//! ```no_run
//! use bsp_mapgen::{generate, GeneratorConfig, MapDocument};
//!
//! let tree = generate(256.0, 256.0, &GeneratorConfig::default().with_seed(7))?;
//! let doc = MapDocument::from_tree(&tree);
//! assert!(doc.is_connected());
//! # Ok::<(), bsp_mapgen::GenerationError>(())
//! ```

pub mod bsp;
pub mod config;
pub mod document;
pub mod error;

pub use bsp::{generate, GenerationStats, MapGenerator, NodeId, PartitionTree, Rect2D};
pub use config::{CorridorConfig, GeneratorConfig, PartitionMode, RoomConfig};
pub use document::MapDocument;
pub use error::{
    ConfigError, ConnectError, GenerationError, PassFailure, RoomError, SearchError, TreeError,
};
