//! # Triplet Ingestor
//!
//! Validation and graph-build protocol.
//!
//! - Validate triplets before touching the graph
//! - Skip malformed input (self-loops, empty or overlong fields) and record
//!   why; the planner never fails on input shape
//! - Merge duplicate nodes and edges per the graph's merge policy
//!
//! The core stays logging-free; skipped triplets come back in the
//! [`IngestReport`] and the app layer decides what to log.

use crate::graph::Graph;
use crate::primitives::{MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, MAX_STRENGTH, MIN_STRENGTH};
use crate::types::{Entity, PlanError, Relationship, Triplet};

// =============================================================================
// INGEST REPORT
// =============================================================================

/// A triplet the ingestor refused, with its input position and the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTriplet {
    pub index: usize,
    pub reason: String,
}

/// Outcome of a build: how much input survived validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub accepted: usize,
    pub skipped: Vec<SkippedTriplet>,
}

impl IngestReport {
    /// Total number of triplets seen.
    #[must_use]
    pub fn total(&self) -> usize {
        self.accepted + self.skipped.len()
    }
}

// =============================================================================
// INGESTOR
// =============================================================================

/// Builds the attributed graph out of raw triplets.
pub struct TripletIngestor;

impl TripletIngestor {
    /// Validate a single triplet.
    ///
    /// A triplet is valid if subject and object have distinct identity keys
    /// and every textual field is non-empty (names/types) and within length
    /// limits. Returns `PlanError::InvalidTriplet` otherwise.
    pub fn validate(triplet: &Triplet) -> Result<(), PlanError> {
        Self::validate_entity(&triplet.subject)?;
        Self::validate_entity(&triplet.object)?;

        if triplet.subject.key() == triplet.object.key() {
            return Err(PlanError::InvalidTriplet(format!(
                "self-loop on entity '{}'",
                triplet.subject.key()
            )));
        }

        if triplet.relationship.description.len() > MAX_DESCRIPTION_LENGTH {
            return Err(PlanError::InvalidTriplet(
                "relationship description exceeds length limit".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_entity(entity: &Entity) -> Result<(), PlanError> {
        if entity.name.is_empty() {
            return Err(PlanError::InvalidTriplet("empty entity name".to_string()));
        }
        if entity.entity_type.is_empty() {
            return Err(PlanError::InvalidTriplet("empty entity type".to_string()));
        }
        if entity.name.len() > MAX_NAME_LENGTH || entity.entity_type.len() > MAX_NAME_LENGTH {
            return Err(PlanError::InvalidTriplet(format!(
                "entity name or type exceeds {MAX_NAME_LENGTH} bytes"
            )));
        }
        if entity.description.len() > MAX_DESCRIPTION_LENGTH {
            return Err(PlanError::InvalidTriplet(
                "entity description exceeds length limit".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the graph from a finite list of triplets.
    ///
    /// Invalid triplets are skipped and reported; the build itself cannot
    /// fail. Relationship strengths are clamped into the accepted range.
    #[must_use]
    pub fn build(triplets: &[Triplet]) -> (Graph, IngestReport) {
        let mut graph = Graph::new();
        let mut report = IngestReport::default();

        for (index, triplet) in triplets.iter().enumerate() {
            if let Err(error) = Self::validate(triplet) {
                report.skipped.push(SkippedTriplet {
                    index,
                    reason: error.to_string(),
                });
                continue;
            }

            let subject = graph.upsert_node(&triplet.subject);
            let object = graph.upsert_node(&triplet.object);
            let relationship = Relationship {
                description: triplet.relationship.description.clone(),
                strength: triplet.relationship.strength.clamp(MIN_STRENGTH, MAX_STRENGTH),
            };
            graph.upsert_edge(subject, object, &relationship);
            report.accepted += 1;
        }

        (graph, report)
    }
}

// =============================================================================
// TESTS
// =============================================================================
