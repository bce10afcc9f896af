//! # Core Type Definitions
//!
//! This module contains the shared types of the graphtour planner:
//! - Input schema (`Entity`, `Relationship`, `Triplet`)
//! - Graph identifiers (`NodeId`, `EdgeId`, `CommunityId`, `EntityKey`)
//! - Error types (`PlanError`)
//!
//! ## Determinism Guarantees
//!
//! Identifier types are dense integers assigned at insertion time and
//! implement `Ord`, so they can key `BTreeMap`/`BTreeSet` with stable
//! iteration order throughout the planner.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// GRAPH IDENTIFIERS
// =============================================================================

/// Index of a node in a graph. Dense: the n-th inserted node has index n.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a node id from a dense vector index.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// The id as a vector index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of an undirected edge in a graph. Dense, assigned at insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Create an edge id from a dense vector index.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// The id as a vector index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifier of a community produced by the partitioner. Dense `0..K`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommunityId(pub u32);

impl CommunityId {
    /// Create a community id from a dense vector index.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// The id as a vector index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CommunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// INPUT SCHEMA
// =============================================================================

/// A domain object extracted from a document.
///
/// Entities are identified by `(entity_type, name)`; the description is
/// free text accumulated on the graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub description: String,
}

impl Entity {
    /// Create a new entity.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        entity_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            description: description.into(),
        }
    }

    /// The identity key of this entity within the graph.
    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey {
            entity_type: self.entity_type.clone(),
            name: self.name.clone(),
        }
    }
}

/// A labeled connection between two entities.
///
/// `strength` is expected in `1..=10`; out-of-range values are clamped at
/// ingest time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub description: String,
    pub strength: i64,
}

impl Relationship {
    /// Create a new relationship.
    #[must_use]
    pub fn new(description: impl Into<String>, strength: i64) -> Self {
        Self {
            description: description.into(),
            strength,
        }
    }
}

/// A subject-relation-object fact, the input unit of the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triplet {
    pub subject: Entity,
    pub relationship: Relationship,
    pub object: Entity,
}

impl Triplet {
    /// Create a new triplet.
    #[must_use]
    pub fn new(subject: Entity, relationship: Relationship, object: Entity) -> Self {
        Self {
            subject,
            relationship,
            object,
        }
    }
}

/// Identity key of a node: entity type plus entity name.
///
/// Invariant: no two nodes of a graph share the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub entity_type: String,
    pub name: String,
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entity_type, self.name)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the planner.
///
/// Input-shape problems (`InvalidTriplet`) are recoverable and reported as
/// warnings by the ingestor; everything else aborts the plan.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A triplet was malformed (self-loop, empty or overlong fields).
    #[error("invalid triplet: {0}")]
    InvalidTriplet(String),

    /// The walk engine exhausted every branch from every entry node.
    #[error(
        "no feasible walk through community {community}: \
         {entries} entry nodes, {mid_borders} mid borders, last border of {last_border}"
    )]
    NoFeasibleWalk {
        community: CommunityId,
        entries: usize,
        mid_borders: usize,
        last_border: usize,
    },

    /// A meta-graph child had no usable border toward its parent.
    #[error("community {community} has no border connection from its parent {parent}")]
    DisconnectedBorder {
        community: CommunityId,
        parent: CommunityId,
    },

    /// An internal invariant of the planner was violated.
    #[error("planner invariant violated: {0}")]
    InvariantViolation(String),

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred (app layer only; the core performs no I/O).
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// TESTS
// =============================================================================
