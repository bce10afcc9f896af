//! # Planner Constants
//!
//! Hardcoded runtime constants for the graphtour planner. These are
//! compiled into the binary and immutable at runtime.

/// Attenuation factor for Katz centrality on the meta-graph.
pub const KATZ_ALPHA: f64 = 0.1;

/// Base score for Katz centrality.
pub const KATZ_BETA: f64 = 1.0;

/// Iteration cap for the Katz power iteration.
pub const KATZ_MAX_ITERATIONS: usize = 1000;

/// Convergence threshold (L1 distance between iterates) for Katz centrality.
pub const KATZ_TOLERANCE: f64 = 1e-10;

/// Default seed for the community detector.
///
/// The partitioner is randomized (shuffled visit order); fixing the seed
/// makes the whole plan reproducible. Callers may override it.
pub const DEFAULT_SEED: u64 = 42;

/// Maximum local-moving sweeps per Louvain level.
pub const LOUVAIN_MAX_SWEEPS: usize = 100;

/// Maximum aggregation levels for Louvain.
pub const LOUVAIN_MAX_LEVELS: usize = 32;

/// Smallest accepted relationship strength.
pub const MIN_STRENGTH: i64 = 1;

/// Largest accepted relationship strength.
pub const MAX_STRENGTH: i64 = 10;

/// Magic bytes of the graphtour binary state format.
pub const MAGIC_BYTES: &[u8; 4] = b"GTUR";

/// Current serialization format version.
///
/// Increment on breaking changes to the state format.
pub const FORMAT_VERSION: u8 = 1;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for entity names and types.
///
/// Longer fields mark the triplet invalid; it is skipped with a warning.
pub const MAX_NAME_LENGTH: usize = 256;

/// Maximum length for entity and relationship descriptions (64 KB).
pub const MAX_DESCRIPTION_LENGTH: usize = 65536;
