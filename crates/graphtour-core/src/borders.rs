//! # Border Index
//!
//! For every community, the connections that leave it: which local node can
//! exit, over which global edge, into which global node of which neighbor
//! community.
//!
//! Invariant: for any community pair with at least one cross-edge, the
//! connections recorded under `A -> B` and `B -> A` agree in count and in
//! endpoint pairing; both sides are derived from the same edges.

use crate::graph::{Graph, NodeMapping};
use crate::partition::Partition;
use crate::types::{CommunityId, EdgeId, NodeId};
use std::collections::BTreeMap;

/// One way out of a community: the local exit node, the crossing edge, and
/// the entry node inside the neighbor community (parent-graph id).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderConnection {
    pub exit_local: NodeId,
    pub edge: EdgeId,
    pub entry_global: NodeId,
}

/// Enumerate a community's border connections, keyed by neighbor community.
///
/// Connections are ordered by local exit node, then ascending neighbor id
/// (the graph's neighbor enumeration order), so the index is deterministic.
#[must_use]
pub fn border_connections_for(
    graph: &Graph,
    partition: &Partition,
    community: CommunityId,
    mapping: &NodeMapping,
) -> BTreeMap<CommunityId, Vec<BorderConnection>> {
    let mut connections: BTreeMap<CommunityId, Vec<BorderConnection>> = BTreeMap::new();

    for (local_index, &global) in mapping.child_to_parent.iter().enumerate() {
        let exit_local = NodeId::from_index(local_index);
        for (neighbor, edge) in graph.neighbors(global) {
            let Some(neighbor_community) = partition.community_of(neighbor) else {
                continue;
            };
            if neighbor_community == community {
                continue;
            }
            connections
                .entry(neighbor_community)
                .or_default()
                .push(BorderConnection {
                    exit_local,
                    edge,
                    entry_global: neighbor,
                });
        }
    }

    connections
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Entity, Relationship};

    /// Two squares joined by two cross edges:
    /// 0-1-2-3-0 and 4-5-6-7-4, bridges 2-4 and 3-5.
    fn two_squares() -> (Graph, Partition) {
        let mut graph = Graph::new();
        for i in 0..8 {
            graph.upsert_node(&Entity::new(format!("n{i}"), "t", ""));
        }
        let edges = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4),
            (2, 4),
            (3, 5),
        ];
        for (a, b) in edges {
            graph.upsert_edge(NodeId(a), NodeId(b), &Relationship::new("r", 5));
        }
        let partition = Partition::from_membership(&[0, 0, 0, 0, 1, 1, 1, 1]);
        (graph, partition)
    }

    #[test]
    fn border_connections_cross_communities_only() {
        let (graph, partition) = two_squares();
        let members = partition.members(CommunityId(0));
        let (_, mapping) = graph.induced_subgraph(&members);

        let borders = border_connections_for(&graph, &partition, CommunityId(0), &mapping);
        assert_eq!(borders.len(), 1);
        let toward = borders.get(&CommunityId(1)).expect("neighbor entry");
        assert_eq!(toward.len(), 2);
        // Local ids equal global ids here (members are 0..4 in order).
        assert_eq!(toward[0].exit_local, NodeId(2));
        assert_eq!(toward[0].entry_global, NodeId(4));
        assert_eq!(toward[1].exit_local, NodeId(3));
        assert_eq!(toward[1].entry_global, NodeId(5));
    }

    #[test]
    fn border_index_is_symmetric() {
        let (graph, partition) = two_squares();

        let members_a = partition.members(CommunityId(0));
        let (_, mapping_a) = graph.induced_subgraph(&members_a);
        let a_to_b = border_connections_for(&graph, &partition, CommunityId(0), &mapping_a);

        let members_b = partition.members(CommunityId(1));
        let (_, mapping_b) = graph.induced_subgraph(&members_b);
        let b_to_a = border_connections_for(&graph, &partition, CommunityId(1), &mapping_b);

        let forward = a_to_b.get(&CommunityId(1)).expect("a->b");
        let backward = b_to_a.get(&CommunityId(0)).expect("b->a");
        assert_eq!(forward.len(), backward.len());

        // Same crossing edges on both sides, endpoints swapped.
        let mut forward_edges: Vec<EdgeId> = forward.iter().map(|c| c.edge).collect();
        let mut backward_edges: Vec<EdgeId> = backward.iter().map(|c| c.edge).collect();
        forward_edges.sort_unstable();
        backward_edges.sort_unstable();
        assert_eq!(forward_edges, backward_edges);

        for connection in forward {
            let global_exit = mapping_a.to_parent(connection.exit_local).expect("mapped");
            assert!(
                backward
                    .iter()
                    .any(|back| back.entry_global == global_exit
                        && mapping_b.to_parent(back.exit_local) == Some(connection.entry_global))
            );
        }
    }

    #[test]
    fn community_without_cross_edges_has_no_borders() {
        let mut graph = Graph::new();
        graph.upsert_node(&Entity::new("a", "t", ""));
        graph.upsert_node(&Entity::new("b", "t", ""));
        graph.upsert_edge(NodeId(0), NodeId(1), &Relationship::new("r", 5));
        let partition = Partition::from_membership(&[0, 0]);
        let (_, mapping) = graph.induced_subgraph(&partition.members(CommunityId(0)));

        let borders = border_connections_for(&graph, &partition, CommunityId(0), &mapping);
        assert!(borders.is_empty());
    }
}
