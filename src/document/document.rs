// src/document/document.rs

use serde::{Deserialize, Serialize};
use union_find::{QuickUnionUf, UnionBySize, UnionFind};

use crate::bsp::{PartitionTree, Rect2D};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjType {
    Cells,
    Rooms,
    Corridors,
}

/// A rectangle tagged with the name of the tree node that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRect {
    pub name: String,
    pub rect: Rect2D,
}

/// A read-only snapshot of a generated map, ready for renderers and
/// persistence. Rooms come from leaves, corridors from internal nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    pub bounds: Rect2D,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub cells: Vec<NamedRect>,
    pub rooms: Vec<NamedRect>,
    pub corridors: Vec<NamedRect>,
}

impl MapDocument {
    pub fn from_tree(tree: &PartitionTree) -> Self {
        let cells = tree
            .leaves()
            .filter_map(|id| tree.node(id).ok())
            .map(|node| NamedRect {
                name: node.name().to_string(),
                rect: node.cell(),
            })
            .collect();
        let rooms = tree
            .rooms()
            .map(|(node, rect)| NamedRect {
                name: node.name().to_string(),
                rect,
            })
            .collect();
        let corridors = tree
            .corridors()
            .map(|(node, rect)| NamedRect {
                name: node.name().to_string(),
                rect,
            })
            .collect();
        MapDocument {
            bounds: tree.bounds(),
            seed: None,
            cells,
            rooms,
            corridors,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn num_objects(&self, obj_type: ObjType) -> usize {
        match obj_type {
            ObjType::Cells => self.cells.len(),
            ObjType::Rooms => self.rooms.len(),
            ObjType::Corridors => self.corridors.len(),
        }
    }

    /// Every room, then every corridor.
    pub fn walkable(&self) -> impl Iterator<Item = Rect2D> + '_ {
        self.rooms
            .iter()
            .chain(self.corridors.iter())
            .map(|named| named.rect)
    }

    /// Number of separate regions formed by rooms and corridors, where two
    /// rectangles belong to the same region when they touch.
    pub fn region_count(&self) -> usize {
        let shapes: Vec<Rect2D> = self.walkable().collect();
        let mut regions = QuickUnionUf::<UnionBySize>::new(shapes.len());
        for i in 0..shapes.len() {
            for j in i + 1..shapes.len() {
                if shapes[i].touches(&shapes[j]) {
                    regions.union(i, j);
                }
            }
        }
        let mut roots: Vec<usize> = (0..shapes.len()).map(|i| regions.find(i)).collect();
        roots.sort_unstable();
        roots.dedup();
        roots.len()
    }

    pub fn is_connected(&self) -> bool {
        self.region_count() <= 1
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
