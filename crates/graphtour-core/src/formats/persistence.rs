//! # Persistence Format
//!
//! Binary serialization for planner state.
//!
//! Format: Header (5 bytes) + postcard-serialized payload.
//! - 4 bytes: Magic ("GTUR")
//! - 1 byte: Version
//!
//! The payload carries the raw triplets, the built graph, and the plan:
//! everything a downstream generator or a re-check needs. Both size bounds
//! and the header are validated before any payload parsing.

use crate::graph::SerializableGraph;
use crate::planner::TraversalPlan;
use crate::primitives::{FORMAT_VERSION, MAGIC_BYTES};
use crate::types::{PlanError, Triplet};
use serde::{Deserialize, Serialize};

/// Maximum allowed payload size (500 MB); bounds allocation before
/// deserialization is attempted.
pub const MAX_PERSISTENCE_PAYLOAD_SIZE: usize = 500 * 1024 * 1024;

/// Minimum valid byte-stream size (header only).
const MIN_STATE_SIZE: usize = 5;

// =============================================================================
// SAVED STATE
// =============================================================================

/// Everything the planner persists: inputs, the seed the plan was made
/// with, the graph, and the plan itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavedState {
    pub seed: u64,
    pub triplets: Vec<Triplet>,
    pub graph: SerializableGraph,
    pub plan: TraversalPlan,
}

// =============================================================================
// FILE HEADER
// =============================================================================

/// The persistence header preceding the payload.
#[derive(Debug, Clone, Copy)]
pub struct PersistenceHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl PersistenceHeader {
    /// Create a header with the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
        }
    }

    /// Validate magic bytes and version.
    pub fn validate(&self) -> Result<(), PlanError> {
        if &self.magic != MAGIC_BYTES {
            return Err(PlanError::Serialization("invalid magic bytes".to_string()));
        }
        if self.version != FORMAT_VERSION {
            return Err(PlanError::Serialization(format!(
                "unsupported version: {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write the header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 5] {
        let mut bytes = [0u8; 5];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Read a header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PlanError> {
        if bytes.len() < MIN_STATE_SIZE {
            return Err(PlanError::Serialization("header too short".to_string()));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            magic,
            version: bytes[4],
        })
    }
}

impl Default for PersistenceHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize planner state to bytes (header + payload). Pure transformation.
pub fn state_to_bytes(state: &SavedState) -> Result<Vec<u8>, PlanError> {
    let header = PersistenceHeader::new();
    let payload =
        postcard::to_stdvec(state).map_err(|e| PlanError::Serialization(e.to_string()))?;

    let mut result = Vec::with_capacity(MIN_STATE_SIZE + payload.len());
    result.extend_from_slice(&header.to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Deserialize planner state from bytes.
///
/// Validates minimum size, maximum size, and the header before touching
/// the payload.
pub fn state_from_bytes(bytes: &[u8]) -> Result<SavedState, PlanError> {
    if bytes.len() < MIN_STATE_SIZE {
        return Err(PlanError::Serialization(
            "data too short: minimum 5 bytes required".to_string(),
        ));
    }
    if bytes.len() > MAX_PERSISTENCE_PAYLOAD_SIZE {
        return Err(PlanError::Serialization(format!(
            "data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_PERSISTENCE_PAYLOAD_SIZE
        )));
    }

    let header = PersistenceHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = &bytes[MIN_STATE_SIZE..];
    postcard::from_bytes(payload)
        .map_err(|e| PlanError::Serialization(format!("failed to deserialize state: {e}")))
}

// =============================================================================
// TESTS
// =============================================================================
