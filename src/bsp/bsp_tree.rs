// src/bsp/bsp_tree.rs

use std::fmt;

use log::debug;
use rand::Rng;

use crate::bsp::bsp_corridor::find_corridor;
use crate::bsp::{AreaNode, NodeId, Rect2D, ROOT_NAME};
use crate::config::{CorridorConfig, RoomConfig};
use crate::error::{ConnectError, RoomError, TreeError};

/// Result of asking a node to split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionOutcome {
    Split([NodeId; 2]),
    AlreadyPartitioned,
    BelowThreshold,
}

/// A binary space partition of a rectangular map.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]. The root
/// owns the whole map; every split adds exactly two children, so a node has
/// either zero or two children.
#[derive(Debug, Clone)]
pub struct PartitionTree {
    nodes: Vec<AreaNode>,
    root: NodeId,
}

impl PartitionTree {
    pub fn new(bounds: Rect2D) -> Self {
        PartitionTree {
            nodes: vec![AreaNode::new(ROOT_NAME.to_string(), bounds, None)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn bounds(&self) -> Rect2D {
        self.nodes[self.root.0].cell
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Result<&AreaNode, TreeError> {
        self.nodes.get(id.0).ok_or(TreeError::UnknownNode(id))
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &AreaNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Resolve a path-derived node name ("root", "A", "B_1_0", ...).
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes().find(|(_, node)| node.name == name).map(|(id, _)| id)
    }

    pub fn area(&self, id: NodeId) -> Result<f64, TreeError> {
        Ok(self.node(id)?.cell.area())
    }

    /// Number of edges between `id` and the root.
    pub fn depth(&self, id: NodeId) -> Result<usize, TreeError> {
        let mut depth = 0;
        let mut current = self.node(id)?;
        while let Some(parent) = current.parent {
            depth += 1;
            current = &self.nodes[parent.0];
        }
        Ok(depth)
    }

    pub fn max_depth(&self) -> usize {
        self.leaves()
            .filter_map(|id| self.depth(id).ok())
            .max()
            .unwrap_or(0)
    }

    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes().filter(|(_, node)| node.is_leaf()).map(|(id, _)| id)
    }

    pub fn internal_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes().filter(|(_, node)| !node.is_leaf()).map(|(id, _)| id)
    }

    fn child_names(&self, id: NodeId) -> [String; 2] {
        if id == self.root {
            ["A".to_string(), "B".to_string()]
        } else {
            let name = &self.nodes[id.0].name;
            [format!("{name}_0"), format!("{name}_1")]
        }
    }

    /// Split the cell of a leaf whose area exceeds `min_node_area` into two
    /// new leaf children.
    pub fn partition<R: Rng + ?Sized>(
        &mut self,
        id: NodeId,
        rng: &mut R,
        min_node_area: f64,
    ) -> Result<PartitionOutcome, TreeError> {
        let node = self.node(id)?;
        if !node.is_leaf() {
            return Ok(PartitionOutcome::AlreadyPartitioned);
        }
        if node.cell.area() <= min_node_area {
            return Ok(PartitionOutcome::BelowThreshold);
        }

        let (first, second) = node.cell.split(rng);
        let [first_name, second_name] = self.child_names(id);
        let children = [NodeId(self.nodes.len()), NodeId(self.nodes.len() + 1)];
        debug!(
            "partitioned {} into {} and {}",
            self.nodes[id.0].name, first_name, second_name
        );
        self.nodes.push(AreaNode::new(first_name, first, Some(id)));
        self.nodes.push(AreaNode::new(second_name, second, Some(id)));
        self.nodes[id.0].children = Some(children);
        Ok(PartitionOutcome::Split(children))
    }

    /// Every pair of siblings that are both leaves, in creation order.
    pub fn leaf_pairs(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes
            .iter()
            .filter_map(|node| node.children)
            .filter(|[a, b]| self.nodes[a.0].is_leaf() && self.nodes[b.0].is_leaf())
            .map(|[a, b]| (a, b))
            .collect()
    }

    /// Children before parents, first child before second.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, false)];
        while let Some((id, expanded)) = stack.pop() {
            match self.nodes[id.0].children {
                Some([a, b]) if !expanded => {
                    stack.push((id, true));
                    stack.push((b, false));
                    stack.push((a, false));
                }
                _ => order.push(id),
            }
        }
        order
    }

    /// Sample a room inside every leaf cell.
    pub fn place_rooms<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        rules: &RoomConfig,
    ) -> Result<(), RoomError> {
        for id in self.post_order() {
            let node = &mut self.nodes[id.0];
            if node.is_leaf() {
                node.room = Some(node.cell.random_sub_area(rng, rules)?);
            }
        }
        Ok(())
    }

    /// Drop every room and corridor, keeping the partition itself.
    pub fn reset_rooms(&mut self) {
        for node in &mut self.nodes {
            node.clear_layout();
        }
    }

    /// Join the two subtrees of every internal node, bottom-up.
    ///
    /// The first node whose subtrees cannot be joined stops the pass; its
    /// ancestors are left unconnected.
    pub fn connect<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        rules: &CorridorConfig,
    ) -> Result<(), ConnectError> {
        self.connect_node(self.root, rng, rules)
    }

    fn connect_node<R: Rng + ?Sized>(
        &mut self,
        id: NodeId,
        rng: &mut R,
        rules: &CorridorConfig,
    ) -> Result<(), ConnectError> {
        let Some([first, second]) = self.nodes[id.0].children else {
            return Ok(());
        };
        self.connect_node(first, rng, rules)?;
        self.connect_node(second, rng, rules)?;
        if self.nodes[id.0].connection.is_some() {
            return Ok(());
        }

        let mut first_shapes = Vec::new();
        let mut second_shapes = Vec::new();
        self.collect_shapes(first, &mut first_shapes);
        self.collect_shapes(second, &mut second_shapes);

        let corridor = find_corridor(rng, &first_shapes, &second_shapes, rules)
            .map_err(|source| ConnectError { node: id, source })?;
        debug!("connected children of {} with {:?}", self.nodes[id.0].name, corridor);
        self.nodes[id.0].connection = Some(corridor);
        Ok(())
    }

    fn collect_shapes(&self, id: NodeId, out: &mut Vec<Rect2D>) {
        let node = &self.nodes[id.0];
        if let Some(children) = node.children {
            for child in children {
                self.collect_shapes(child, out);
            }
        }
        out.extend(node.room);
        out.extend(node.connection);
    }

    /// Rooms and corridors already placed in the subtree rooted at `id`.
    pub fn shapes_under(&self, id: NodeId) -> Result<Vec<Rect2D>, TreeError> {
        self.node(id)?;
        let mut shapes = Vec::new();
        self.collect_shapes(id, &mut shapes);
        Ok(shapes)
    }

    /// Leaves that carry a room, with that room.
    pub fn rooms(&self) -> impl Iterator<Item = (&AreaNode, Rect2D)> {
        self.nodes.iter().filter_map(|node| node.room.map(|room| (node, room)))
    }

    /// Internal nodes that carry a corridor, with that corridor.
    pub fn corridors(&self) -> impl Iterator<Item = (&AreaNode, Rect2D)> {
        self.nodes
            .iter()
            .filter_map(|node| node.connection.map(|corridor| (node, corridor)))
    }

    /// Every leaf has a room and every internal node is connected.
    pub fn is_complete(&self) -> bool {
        self.nodes.iter().all(|node| {
            if node.is_leaf() {
                node.room.is_some()
            } else {
                node.connection.is_some()
            }
        })
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, level: usize) -> fmt::Result {
        let node = &self.nodes[id.0];
        writeln!(f, "{}{}", "\t".repeat(level), node.name)?;
        if let Some(children) = node.children {
            for child in children {
                self.fmt_node(f, child, level + 1)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for PartitionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root, 0)
    }
}
