//! # graphtour-core
//!
//! The deterministic traversal planner for graphtour - THE LOGIC.
//!
//! This crate turns an unstructured knowledge graph, built from (subject,
//! relation, object) triplets extracted from documents, into a single walk that
//! visits every node, ordered so that topically close nodes stay close.
//! A downstream generator turns that walk into a dialogue or narrative
//! touring the document's knowledge; this crate only plans the tour.
//!
//! ## Pipeline
//!
//! 1. Build an undirected attributed graph, merging duplicate nodes/edges
//! 2. Partition it into communities (seeded Louvain) and build the
//!    meta-graph of communities
//! 3. Index border connections between neighboring communities
//! 4. Per community group (meta-graph component): order communities by a
//!    DFS from the least-central member and solve each community's
//!    constrained walk: enter on the recorded border, hit the exit
//!    borders toward successor communities in order, cover every node
//! 5. Stitch the per-community walks into one global traversal
//!
//! ## Architectural Constraints
//!
//! - The core performs no I/O and calls no models; collaborators deliver
//!   triplets as a complete in-process list
//! - Single-threaded, synchronous, deterministic for a fixed seed
//! - No async, no network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod borders;
pub mod community;
pub mod extract;
pub mod formats;
pub mod graph;
pub mod group;
pub mod ingestor;
pub mod ordering;
pub mod partition;
pub mod planner;
pub mod primitives;
pub mod rng;
pub mod types;
pub mod walker;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{
    CommunityId, EdgeId, Entity, EntityKey, NodeId, PlanError, Relationship, Triplet,
};

// =============================================================================
// RE-EXPORTS: Pipeline
// =============================================================================

pub use borders::BorderConnection;
pub use community::{Community, CommunityPlan};
pub use graph::{Edge, Graph, Node, NodeMapping, SerializableGraph};
pub use group::CommunityGroup;
pub use ingestor::{IngestReport, SkippedTriplet, TripletIngestor};
pub use partition::{MetaGraph, Partition, detect_communities};
pub use planner::{PlannerConfig, TraversalPlan, TraversalPlanner};
pub use walker::{Walk, WalkConstraints, find_constrained_walk};

// =============================================================================
// RE-EXPORTS: Collaborator Seams & Formats
// =============================================================================

pub use extract::{
    Chunk, ConcatSummarizer, DescriptionSummarizer, DocumentPreprocessor, ExtractorKind,
    TripletExtractor,
};
pub use formats::{PersistenceHeader, SavedState, state_from_bytes, state_to_bytes};
