// src/bsp/mod.rs
pub mod bsp_corridor;
pub mod bsp_node;
pub mod bsp_procedural;
pub mod bsp_tree;
mod bsp_util;

pub use bsp_corridor::{closest_pair, find_corridor, Overlap};
pub use bsp_node::{AreaNode, NodeId};
pub use bsp_procedural::{generate, GenerationStats, MapGenerator};
pub use bsp_tree::{PartitionOutcome, PartitionTree};
pub use bsp_util::{Point2D, Rect2D, SplitAxis}; // Re-export geometry types

// Rectangles more than this many times wider than tall (or taller than wide)
// are always cut across their long side.
pub const ASPECT_LIMIT: f64 = 3.0;
pub const EPSILON: f64 = 1e-6; // For floating-point comparisons

/// Name of the root node of every partition tree.
pub const ROOT_NAME: &str = "root";
