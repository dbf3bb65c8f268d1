//! src/bsp/bsp_node.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bsp::Rect2D;

/// Handle of a node inside a [`PartitionTree`](crate::bsp::PartitionTree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the partition tree. Each node has:
/// - A path-derived `name`, unique within its tree ("A" splits into "A_0" and "A_1").
/// - The `cell` it owns.
/// - Either no children (a leaf, which gets a `room`) or exactly two
///   (an internal node, which gets a `connection` once its children are joined).
#[derive(Debug, Clone)]
pub struct AreaNode {
    pub(crate) name: String,
    pub(crate) cell: Rect2D,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Option<[NodeId; 2]>,
    pub(crate) room: Option<Rect2D>,
    pub(crate) connection: Option<Rect2D>,
}

impl AreaNode {
    pub(crate) fn new(name: String, cell: Rect2D, parent: Option<NodeId>) -> Self {
        AreaNode {
            name,
            cell,
            parent,
            children: None,
            room: None,
            connection: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cell(&self) -> Rect2D {
        self.cell
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> Option<[NodeId; 2]> {
        self.children
    }

    /// The placed room. Only leaves ever carry one.
    pub fn room(&self) -> Option<Rect2D> {
        self.room
    }

    /// The corridor joining this node's two subtrees, once connected.
    pub fn connection(&self) -> Option<Rect2D> {
        self.connection
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub(crate) fn clear_layout(&mut self) {
        self.room = None;
        self.connection = None;
    }
}
