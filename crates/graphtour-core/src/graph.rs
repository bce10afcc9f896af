//! # Attributed Graph
//!
//! The undirected attributed graph the planner walks.
//!
//! All adjacency is stored in `BTreeMap` so neighbor enumeration is always
//! ascending by `NodeId`. Every tie-break downstream (walk engine, DFS
//! ordering) inherits this order, which is what makes the planner
//! deterministic for a fixed partition.
//!
//! Invariants:
//! - one node per distinct `EntityKey`
//! - at most one edge per unordered node pair, no self-loops
//! - nodes and edges are immutable once the build phase is over

use crate::types::{EdgeId, Entity, EntityKey, NodeId, Relationship};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// NODES & EDGES
// =============================================================================

/// A vertex of the graph: one entity, with every description seen for it.
///
/// `descriptions` is insertion-ordered and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub entity_type: String,
    pub descriptions: Vec<String>,
}

impl Node {
    /// The identity key of this node.
    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey {
            entity_type: self.entity_type.clone(),
            name: self.name.clone(),
        }
    }
}

/// An undirected edge between two distinct nodes.
///
/// Endpoints are normalized so that `a < b`. `strength` is the maximum over
/// all merged relationships, `descriptions` their deduplicated union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub a: NodeId,
    pub b: NodeId,
    pub descriptions: Vec<String>,
    pub strength: i64,
}

impl Edge {
    /// The endpoint opposite to `node`, if `node` is an endpoint at all.
    #[must_use]
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Append `value` unless the list already contains it.
fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

// =============================================================================
// NODE MAPPING
// =============================================================================

/// Bijection between the node ids of an induced subgraph (child) and the
/// node ids of the graph it was cut from (parent).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMapping {
    /// Child index -> parent id. Dense over the child graph.
    pub child_to_parent: Vec<NodeId>,
    /// Parent id -> child id.
    pub parent_to_child: BTreeMap<NodeId, NodeId>,
}

impl NodeMapping {
    /// Parent id of a child node.
    #[must_use]
    pub fn to_parent(&self, child: NodeId) -> Option<NodeId> {
        self.child_to_parent.get(child.index()).copied()
    }

    /// Child id of a parent node.
    #[must_use]
    pub fn to_child(&self, parent: NodeId) -> Option<NodeId> {
        self.parent_to_child.get(&parent).copied()
    }

    /// Translate parent ids to child ids, preserving order.
    ///
    /// Ids outside the subgraph are dropped.
    #[must_use]
    pub fn localize(&self, parents: &[NodeId]) -> Vec<NodeId> {
        parents
            .iter()
            .filter_map(|parent| self.to_child(*parent))
            .collect()
    }

    /// Translate child ids to parent ids, preserving order.
    #[must_use]
    pub fn globalize(&self, children: &[NodeId]) -> Vec<NodeId> {
        children
            .iter()
            .filter_map(|child| self.to_parent(*child))
            .collect()
    }

    /// Number of mapped nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.child_to_parent.len()
    }

    /// Whether the mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.child_to_parent.is_empty()
    }
}

// =============================================================================
// GRAPH
// =============================================================================

/// The undirected attributed graph.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Per-node adjacency: neighbor -> connecting edge. Ascending iteration.
    adjacency: Vec<BTreeMap<NodeId, EdgeId>>,
    /// Reverse lookup: identity key -> node id.
    key_index: BTreeMap<EntityKey, NodeId>,
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node for the entity, or merge into the existing node with
    /// the same `(type, name)` key.
    ///
    /// On merge, the entity's description is appended to the node's
    /// description list unless already present; nothing else changes.
    pub fn upsert_node(&mut self, entity: &Entity) -> NodeId {
        let key = entity.key();
        if let Some(&id) = self.key_index.get(&key) {
            if let Some(node) = self.nodes.get_mut(id.index()) {
                push_unique(&mut node.descriptions, &entity.description);
            }
            return id;
        }

        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node {
            id,
            name: entity.name.clone(),
            entity_type: entity.entity_type.clone(),
            descriptions: vec![entity.description.clone()],
        });
        self.adjacency.push(BTreeMap::new());
        self.key_index.insert(key, id);
        id
    }

    /// Insert an edge between two existing nodes, or merge into the edge
    /// already connecting them.
    ///
    /// On merge, the relationship description is appended unless already
    /// present and the strength becomes the maximum of old and new.
    /// Self-loops and unknown endpoints are rejected with `None`.
    pub fn upsert_edge(&mut self, a: NodeId, b: NodeId, relationship: &Relationship) -> Option<EdgeId> {
        if a == b || a.index() >= self.nodes.len() || b.index() >= self.nodes.len() {
            return None;
        }

        if let Some(id) = self.edge_between(a, b) {
            if let Some(edge) = self.edges.get_mut(id.index()) {
                push_unique(&mut edge.descriptions, &relationship.description);
                edge.strength = edge.strength.max(relationship.strength);
            }
            return Some(id);
        }

        let id = EdgeId::from_index(self.edges.len());
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.edges.push(Edge {
            id,
            a: lo,
            b: hi,
            descriptions: vec![relationship.description.clone()],
            strength: relationship.strength,
        });
        self.adjacency[a.index()].insert(b, id);
        self.adjacency[b.index()].insert(a, id);
        Some(id)
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Look up an edge by id.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// All edges in id order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// All node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::from_index)
    }

    /// Neighbors of a node with the connecting edge, ascending by neighbor id.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, EdgeId)> + '_ {
        self.adjacency
            .get(node.index())
            .into_iter()
            .flat_map(|targets| targets.iter().map(|(&n, &e)| (n, e)))
    }

    /// Number of neighbors of a node.
    #[must_use]
    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency.get(node.index()).map_or(0, BTreeMap::len)
    }

    /// The edge connecting two nodes, if any.
    #[must_use]
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.adjacency.get(a.index())?.get(&b).copied()
    }

    /// Look up a node id by identity key.
    #[must_use]
    pub fn node_by_key(&self, key: &EntityKey) -> Option<NodeId> {
        self.key_index.get(key).copied()
    }

    /// Total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Roll a node's description list up into one string.
    pub fn node_description(
        &self,
        id: NodeId,
        summarizer: &dyn crate::extract::DescriptionSummarizer,
    ) -> Result<String, crate::types::PlanError> {
        match self.node(id) {
            Some(node) => summarizer.summarize(&node.descriptions),
            None => Ok(String::new()),
        }
    }

    /// Roll an edge's description list up into one string.
    pub fn edge_description(
        &self,
        id: EdgeId,
        summarizer: &dyn crate::extract::DescriptionSummarizer,
    ) -> Result<String, crate::types::PlanError> {
        match self.edge(id) {
            Some(edge) => summarizer.summarize(&edge.descriptions),
            None => Ok(String::new()),
        }
    }

    /// Cut the induced subgraph over `members` (assumed distinct).
    ///
    /// Child nodes are renumbered densely in the order of `members`; the
    /// returned mapping links child and parent id spaces. Node and edge
    /// attributes are carried over.
    #[must_use]
    pub fn induced_subgraph(&self, members: &[NodeId]) -> (Graph, NodeMapping) {
        let mut child = Graph::new();
        let mut mapping = NodeMapping::default();

        for &parent_id in members {
            let Some(node) = self.node(parent_id) else {
                continue;
            };
            let child_id = NodeId::from_index(child.nodes.len());
            child.nodes.push(Node {
                id: child_id,
                name: node.name.clone(),
                entity_type: node.entity_type.clone(),
                descriptions: node.descriptions.clone(),
            });
            child.adjacency.push(BTreeMap::new());
            child.key_index.insert(node.key(), child_id);
            mapping.child_to_parent.push(parent_id);
            mapping.parent_to_child.insert(parent_id, child_id);
        }

        for edge in &self.edges {
            let (Some(a), Some(b)) = (mapping.to_child(edge.a), mapping.to_child(edge.b)) else {
                continue;
            };
            let id = EdgeId::from_index(child.edges.len());
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            child.edges.push(Edge {
                id,
                a: lo,
                b: hi,
                descriptions: edge.descriptions.clone(),
                strength: edge.strength,
            });
            child.adjacency[a.index()].insert(b, id);
            child.adjacency[b.index()].insert(a, id);
        }

        (child, mapping)
    }
}

// =============================================================================
// SERIALIZATION SUPPORT
// =============================================================================

/// Serializable representation of the graph for persistence.
///
/// Adjacency and the key index are derived data and rebuilt on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerializableGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl From<&Graph> for SerializableGraph {
    fn from(graph: &Graph) -> Self {
        Self {
            nodes: graph.nodes.clone(),
            edges: graph.edges.clone(),
        }
    }
}

impl From<SerializableGraph> for Graph {
    fn from(sg: SerializableGraph) -> Self {
        let mut graph = Graph {
            adjacency: vec![BTreeMap::new(); sg.nodes.len()],
            ..Graph::default()
        };
        for node in sg.nodes {
            graph.key_index.insert(node.key(), node.id);
            graph.nodes.push(node);
        }
        for edge in sg.edges {
            if edge.a.index() < graph.nodes.len() && edge.b.index() < graph.nodes.len() {
                graph.adjacency[edge.a.index()].insert(edge.b, edge.id);
                graph.adjacency[edge.b.index()].insert(edge.a, edge.id);
                graph.edges.push(edge);
            }
        }
        graph
    }
}

// =============================================================================
// TESTS
// =============================================================================
