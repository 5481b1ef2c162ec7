//! Referrer tree data structures
//!
//! The tree is stored as an arena: nodes live in one vector and point at each
//! other by index. The root side of the tree is the target entity; `parents`
//! point away from it (towards entities that reference the node) and `child`
//! points back towards the target.

use crate::models::{EntityKey, EntityRecord};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Index of a node in a `UsageGraph`
pub type NodeId = usize;

/// Why a node was not expanded further
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CutReason {
    /// The node's entity already appears on its own path to the target
    Cycle,
    /// The node sits at the configured maximum depth
    DepthLimit,
    /// The graph reached its node budget
    NodeLimit,
    /// The traversal ran out of time
    Deadline,
}

impl CutReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CutReason::Cycle => "cycle",
            CutReason::DepthLimit => "depth limit",
            CutReason::NodeLimit => "node limit",
            CutReason::Deadline => "deadline",
        }
    }
}

impl fmt::Display for CutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record of a traversal stopped by a budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Truncation {
    pub reason: CutReason,
    /// Nodes in the graph when the first budget was hit
    pub nodes: usize,
}

/// A node in the referrer tree
#[derive(Debug, Clone)]
pub struct UsageNode {
    pub entity: Arc<EntityRecord>,
    /// Entities referencing this one, in sibling order
    pub parents: Vec<NodeId>,
    /// The node this entity references (None for roots, which reference the target)
    pub child: Option<NodeId>,
    /// Distance from the target; roots have depth 1
    pub depth: usize,
    pub cut: Option<CutReason>,
}

impl UsageNode {
    pub fn key(&self) -> EntityKey {
        self.entity.key()
    }
}

/// Referrer tree of one target entity
#[derive(Debug, Clone)]
pub struct UsageGraph {
    target: EntityKey,
    nodes: Vec<UsageNode>,
    roots: Vec<NodeId>,
    truncation: Option<Truncation>,
}

impl UsageGraph {
    /// Create an empty graph for `target`
    pub fn new(target: EntityKey) -> Self {
        Self {
            target,
            nodes: Vec::new(),
            roots: Vec::new(),
            truncation: None,
        }
    }

    pub fn target(&self) -> &EntityKey {
        &self.target
    }

    /// Direct referrers of the target
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &UsageNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[UsageNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn truncation(&self) -> Option<Truncation> {
        self.truncation
    }

    /// Add a node referencing `child` (or the target when `child` is None)
    pub fn add_node(&mut self, entity: Arc<EntityRecord>, child: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        let depth = child.map(|c| self.nodes[c].depth + 1).unwrap_or(1);
        self.nodes.push(UsageNode {
            entity,
            parents: Vec::new(),
            child,
            depth,
            cut: None,
        });
        match child {
            Some(c) => self.nodes[c].parents.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn cut(&mut self, id: NodeId, reason: CutReason) {
        self.nodes[id].cut = Some(reason);
    }

    /// Record a budget stop; only the first one is kept
    pub fn truncate(&mut self, reason: CutReason) {
        if self.truncation.is_none() {
            self.truncation = Some(Truncation {
                reason,
                nodes: self.nodes.len(),
            });
        }
    }

    /// Nodes from `id` down to its root, `id` first
    pub fn path_to_root(&self, id: NodeId) -> PathToRoot<'_> {
        PathToRoot {
            graph: self,
            next: Some(id),
        }
    }

    /// Whether `id`'s entity already occurs between it and the target
    ///
    /// The target itself counts as part of every path.
    pub fn repeats_on_path(&self, id: NodeId) -> bool {
        let key = self.nodes[id].key();
        if key == self.target {
            return true;
        }
        self.path_to_root(id).skip(1).any(|n| self.nodes[n].key() == key)
    }
}

/// Iterator over a node's `child` chain
pub struct PathToRoot<'a> {
    graph: &'a UsageGraph,
    next: Option<NodeId>,
}

impl Iterator for PathToRoot<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.graph.nodes[current].child;
        Some(current)
    }
}
