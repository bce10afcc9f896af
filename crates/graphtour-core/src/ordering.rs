//! # Ordering Heuristics
//!
//! Three primitives the group planner composes:
//! - Katz centrality on the meta-graph, ascending (least-central first),
//!   which picks where a community group starts
//! - the from-ends permutation `0, L-1, 1, L-2, ...`, which spreads large
//!   and small groups across the global plan
//! - deterministic DFS with parents over a restricted vertex set, which
//!   linearizes the communities of one group

use crate::partition::MetaGraph;
use crate::primitives::{KATZ_ALPHA, KATZ_BETA, KATZ_MAX_ITERATIONS, KATZ_TOLERANCE};
use crate::types::CommunityId;
use std::collections::BTreeSet;

// =============================================================================
// KATZ CENTRALITY
// =============================================================================

/// Katz centrality scores for every meta-graph vertex.
///
/// Power iteration of `x <- alpha * A * x + beta` over the unweighted
/// adjacency, stopped on an L1 tolerance or the iteration cap, then
/// L2-normalized.
#[must_use]
pub fn katz_centrality(meta: &MetaGraph) -> Vec<f64> {
    let n = meta.community_count();
    if n == 0 {
        return Vec::new();
    }

    let mut scores = vec![0.0_f64; n];
    for _ in 0..KATZ_MAX_ITERATIONS {
        let mut next = vec![KATZ_BETA; n];
        for (i, value) in next.iter_mut().enumerate() {
            for (neighbor, _) in meta.neighbors(CommunityId::from_index(i)) {
                *value += KATZ_ALPHA * scores[neighbor.index()];
            }
        }
        let diff: f64 = scores
            .iter()
            .zip(&next)
            .map(|(old, new)| (old - new).abs())
            .sum();
        scores = next;
        if diff < KATZ_TOLERANCE {
            break;
        }
    }

    let norm = scores.iter().map(|s| s * s).sum::<f64>().sqrt();
    if norm > 0.0 {
        for score in &mut scores {
            *score /= norm;
        }
    }
    scores
}

/// Communities ordered by ascending Katz centrality, id as tie-break.
#[must_use]
pub fn order_by_centrality(meta: &MetaGraph) -> Vec<CommunityId> {
    let scores = katz_centrality(meta);
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]).then(a.cmp(&b)));
    order.into_iter().map(CommunityId::from_index).collect()
}

// =============================================================================
// FROM-ENDS PERMUTATION
// =============================================================================

/// The index sequence `0, L-1, 1, L-2, 2, …`, with the middle index
/// appended once when `len` is odd.
#[must_use]
pub fn from_ends_permutation(len: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(len);
    if len == 0 {
        return order;
    }
    let mut lo = 0;
    let mut hi = len - 1;
    while lo < hi {
        order.push(lo);
        order.push(hi);
        lo += 1;
        hi -= 1;
    }
    if lo == hi {
        order.push(lo);
    }
    order
}

// =============================================================================
// RESTRICTED DFS
// =============================================================================

/// Depth-first order over the meta-graph restricted to `allowed`, starting
/// at `seed`.
///
/// Returns visit order and, per visited vertex, the vertex it was reached
/// from (`None` for the seed). Neighbors are expanded smallest id first.
#[must_use]
pub fn dfs_order(
    meta: &MetaGraph,
    seed: CommunityId,
    allowed: &BTreeSet<CommunityId>,
) -> (Vec<CommunityId>, Vec<Option<CommunityId>>) {
    let mut order = Vec::new();
    let mut parents = Vec::new();
    if !allowed.contains(&seed) {
        return (order, parents);
    }

    let mut seen = BTreeSet::new();
    let mut stack: Vec<(CommunityId, Option<CommunityId>)> = vec![(seed, None)];

    while let Some((current, parent)) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        order.push(current);
        parents.push(parent);

        // Push descending so the smallest neighbor is expanded first.
        let mut next: Vec<CommunityId> = meta
            .neighbors(current)
            .map(|(neighbor, _)| neighbor)
            .filter(|neighbor| allowed.contains(neighbor) && !seen.contains(neighbor))
            .collect();
        next.reverse();
        for neighbor in next {
            stack.push((neighbor, Some(current)));
        }
    }

    (order, parents)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::partition::Partition;
    use crate::types::{Entity, NodeId, Relationship};

    /// Path meta-graph over `count` communities: 0-1-2-…
    fn path_meta(count: usize) -> MetaGraph {
        let mut graph = Graph::new();
        let ids: Vec<NodeId> = (0..count)
            .map(|i| graph.upsert_node(&Entity::new(format!("n{i}"), "t", "")))
            .collect();
        for window in ids.windows(2) {
            graph.upsert_edge(window[0], window[1], &Relationship::new("r", 5));
        }
        let membership: Vec<usize> = (0..count).collect();
        let partition = Partition::from_membership(&membership);
        MetaGraph::from_partition(&graph, &partition)
    }

    #[test]
    fn path_endpoints_are_least_central() {
        let meta = path_meta(5);
        let order = order_by_centrality(&meta);
        // On a path the endpoints have the smallest Katz score.
        assert!(order[0] == CommunityId(0) || order[0] == CommunityId(4));
        assert_eq!(order.last().copied(), Some(CommunityId(2)));
    }

    #[test]
    fn centrality_order_breaks_ties_by_id() {
        // Two isolated vertices: equal scores, ordered by id.
        let meta = {
            let mut graph = Graph::new();
            graph.upsert_node(&Entity::new("a", "t", ""));
            graph.upsert_node(&Entity::new("b", "t", ""));
            let partition = Partition::from_membership(&[0, 1]);
            MetaGraph::from_partition(&graph, &partition)
        };
        assert_eq!(
            order_by_centrality(&meta),
            vec![CommunityId(0), CommunityId(1)]
        );
    }

    #[test]
    fn from_ends_even() {
        assert_eq!(from_ends_permutation(6), vec![0, 5, 1, 4, 2, 3]);
    }

    #[test]
    fn from_ends_odd_appends_middle() {
        assert_eq!(from_ends_permutation(5), vec![0, 4, 1, 3, 2]);
    }

    #[test]
    fn from_ends_trivial_lengths() {
        assert!(from_ends_permutation(0).is_empty());
        assert_eq!(from_ends_permutation(1), vec![0]);
        assert_eq!(from_ends_permutation(2), vec![0, 1]);
    }

    #[test]
    fn dfs_covers_restricted_set_with_parents() {
        let meta = path_meta(4);
        let allowed: BTreeSet<CommunityId> = (0..4).map(CommunityId::from_index).collect();
        let (order, parents) = dfs_order(&meta, CommunityId(1), &allowed);

        assert_eq!(order.len(), 4);
        assert_eq!(order[0], CommunityId(1));
        assert_eq!(parents[0], None);
        // Smallest neighbor first: 0 before the 2-3 tail.
        assert_eq!(order[1], CommunityId(0));
        assert_eq!(parents[1], Some(CommunityId(1)));
        assert_eq!(order[2], CommunityId(2));
        assert_eq!(order[3], CommunityId(3));
        assert_eq!(parents[3], Some(CommunityId(2)));
    }

    #[test]
    fn dfs_ignores_vertices_outside_allowed() {
        let meta = path_meta(4);
        let allowed: BTreeSet<CommunityId> =
            [CommunityId(0), CommunityId(1)].into_iter().collect();
        let (order, _) = dfs_order(&meta, CommunityId(0), &allowed);
        assert_eq!(order, vec![CommunityId(0), CommunityId(1)]);
    }
}
