//! # Community Group Planner
//!
//! Plans one connected component of the meta-graph: orders its communities
//! with a DFS from the least-central member, threads border choices from
//! each community to its successors, and stitches the per-community
//! traversals into one group walk.
//!
//! The DFS over a connected meta-graph component yields a tree, so every
//! non-root community has exactly one recorded entrance; a missing entrance
//! is an invariant violation (`DisconnectedBorder`).

use crate::community::Community;
use crate::ordering::dfs_order;
use crate::partition::MetaGraph;
use crate::types::{CommunityId, NodeId, PlanError};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// COMMUNITY GROUP
// =============================================================================

/// A planned community group: the community order, the exits chosen between
/// communities, and the stitched group traversal.
#[derive(Debug, Clone)]
pub struct CommunityGroup {
    pub id: u32,
    /// Member communities, ascending.
    pub members: Vec<CommunityId>,
    /// DFS order the communities were planned in.
    pub community_order: Vec<CommunityId>,
    /// DFS parent per entry of `community_order` (`None` for the root).
    pub community_parents: Vec<Option<CommunityId>>,
    /// Per community: `(position in its traversal order, next community)`
    /// for every exit taken, in exit order.
    pub ordered_exits: BTreeMap<CommunityId, Vec<(usize, CommunityId)>>,
    /// Concatenated node walk over the whole group, parent-graph ids.
    pub traversal: Vec<NodeId>,
    /// Parallel parent list; `None` only for the group's first node.
    pub traversal_parents: Vec<Option<NodeId>>,
}

/// Plan every community of one meta-graph component and stitch the result.
///
/// `centrality_order` is the global ascending-centrality ordering; the
/// first of its entries inside this group seeds the DFS.
pub fn plan_group(
    id: u32,
    members: &[CommunityId],
    meta: &MetaGraph,
    centrality_order: &[CommunityId],
    communities: &mut BTreeMap<CommunityId, Community>,
) -> Result<CommunityGroup, PlanError> {
    let member_set: BTreeSet<CommunityId> = members.iter().copied().collect();
    let Some(seed) = centrality_order
        .iter()
        .copied()
        .find(|community| member_set.contains(community))
    else {
        // Empty member list: nothing to plan.
        return Ok(CommunityGroup {
            id,
            members: Vec::new(),
            community_order: Vec::new(),
            community_parents: Vec::new(),
            ordered_exits: BTreeMap::new(),
            traversal: Vec::new(),
            traversal_parents: Vec::new(),
        });
    };

    let (order, parents) = dfs_order(meta, seed, &member_set);

    // Recorded entrances: (from community, to community) -> allowed entry
    // nodes of the target, parent-graph ids.
    let mut entrances: BTreeMap<(CommunityId, CommunityId), Vec<NodeId>> = BTreeMap::new();
    let mut ordered_exits: BTreeMap<CommunityId, Vec<(usize, CommunityId)>> = BTreeMap::new();

    for (index, &community) in order.iter().enumerate() {
        let parent = parents[index];

        // DFS children of this community, in visit order. The walk must
        // reach their borders in exactly this order.
        let children: Vec<CommunityId> = order
            .iter()
            .zip(&parents)
            .filter(|&(_, &p)| p == Some(community))
            .map(|(&child, _)| child)
            .collect();

        let borders: Vec<Vec<NodeId>> = {
            let current = communities.get(&community).ok_or_else(|| {
                PlanError::InvariantViolation(format!("unknown community {community}"))
            })?;
            let mut borders = Vec::with_capacity(children.len());
            for &child in &children {
                let exits = current.exit_nodes_toward(child);
                if exits.is_empty() {
                    return Err(PlanError::DisconnectedBorder {
                        community: child,
                        parent: community,
                    });
                }
                borders.push(exits);
            }
            borders
        };

        let entry_nodes = match parent {
            Some(p) => Some(entrances.remove(&(p, community)).ok_or(
                PlanError::DisconnectedBorder {
                    community,
                    parent: p,
                },
            )?),
            None => None,
        };

        let (chosen, exits) = {
            let current = communities.get_mut(&community).ok_or_else(|| {
                PlanError::InvariantViolation(format!("unknown community {community}"))
            })?;
            let plan = current.plan_traversal(entry_nodes.as_deref(), &borders)?;
            (plan.chosen_borders.clone(), plan.exits.clone())
        };

        // Announce to every child which nodes it may be entered on.
        {
            let current = communities.get(&community).ok_or_else(|| {
                PlanError::InvariantViolation(format!("unknown community {community}"))
            })?;
            for (child_index, &child) in children.iter().enumerate() {
                let exit = chosen.get(child_index).copied().ok_or_else(|| {
                    PlanError::InvariantViolation(format!(
                        "community {community} chose fewer borders than successors"
                    ))
                })?;
                let entries = current.entries_into_neighbor(child, exit);
                if entries.is_empty() {
                    return Err(PlanError::DisconnectedBorder {
                        community: child,
                        parent: community,
                    });
                }
                entrances.insert((community, child), entries);
            }
        }

        ordered_exits.insert(
            community,
            exits.iter().copied().zip(children.iter().copied()).collect(),
        );
    }

    // Stitch: concatenate community traversals; each community after the
    // first hangs off the last node emitted before it.
    let mut traversal: Vec<NodeId> = Vec::new();
    let mut traversal_parents: Vec<Option<NodeId>> = Vec::new();
    for &community in &order {
        let Some(plan) = communities.get(&community).and_then(|c| c.plan.as_ref()) else {
            return Err(PlanError::InvariantViolation(format!(
                "community {community} was ordered but never planned"
            )));
        };
        let mut parents_contribution = plan.parents.clone();
        if let (Some(first), Some(&previous)) = (parents_contribution.first_mut(), traversal.last())
        {
            *first = Some(previous);
        }
        traversal.extend(plan.traversal_order.iter().copied());
        traversal_parents.extend(parents_contribution);
    }

    Ok(CommunityGroup {
        id,
        members: members.to_vec(),
        community_order: order,
        community_parents: parents,
        ordered_exits,
        traversal,
        traversal_parents,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::borders::border_connections_for;
    use crate::graph::Graph;
    use crate::ordering::order_by_centrality;
    use crate::partition::Partition;
    use crate::types::{Entity, Relationship};

    /// Build communities + meta for a fixed partition of `graph`.
    fn setup(
        graph: &Graph,
        partition: &Partition,
    ) -> (MetaGraph, BTreeMap<CommunityId, Community>, Vec<CommunityId>) {
        let meta = MetaGraph::from_partition(graph, partition);
        let mut communities = BTreeMap::new();
        for community in partition.communities() {
            let members = partition.members(community);
            let (subgraph, mapping) = graph.induced_subgraph(&members);
            let borders = border_connections_for(graph, partition, community, &mapping);
            communities.insert(
                community,
                Community::new(community, subgraph, mapping, borders),
            );
        }
        let centrality = order_by_centrality(&meta);
        (meta, communities, centrality)
    }

    /// Two squares joined by two cross edges (same shape as the border
    /// index tests).
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
        (graph, Partition::from_membership(&[0, 0, 0, 0, 1, 1, 1, 1]))
    }

    #[test]
    fn group_walk_covers_both_communities_and_stitches_parents() {
        let (graph, partition) = two_squares();
        let (meta, mut communities, centrality) = setup(&graph, &partition);
        let members: Vec<CommunityId> = partition.communities().collect();

        let group = plan_group(0, &members, &meta, &centrality, &mut communities).expect("group");

        assert_eq!(group.traversal.len(), 8);
        let mut sorted = group.traversal.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 8);

        // Exactly one root.
        let roots = group
            .traversal_parents
            .iter()
            .filter(|parent| parent.is_none())
            .count();
        assert_eq!(roots, 1);
        assert_eq!(group.traversal_parents[0], None);

        // The second community hangs off the last node of the first, and
        // the hop crosses a real graph edge.
        let boundary = group.traversal_parents[4].expect("stitched parent");
        assert_eq!(boundary, group.traversal[3]);
        assert!(graph.edge_between(boundary, group.traversal[4]).is_some());
    }

    #[test]
    fn entrance_matches_chosen_exit() {
        let (graph, partition) = two_squares();
        let (meta, mut communities, centrality) = setup(&graph, &partition);
        let members: Vec<CommunityId> = partition.communities().collect();

        let group = plan_group(0, &members, &meta, &centrality, &mut communities).expect("group");
        let first = group.community_order[0];
        let second = group.community_order[1];

        // The first community's terminal is its exit toward the second.
        let first_plan = communities[&first].plan.as_ref().expect("plan");
        let exit = *first_plan.chosen_borders.last().expect("chosen exit");
        assert_eq!(first_plan.traversal_order.last().copied(), Some(exit));

        // The second community starts on a node adjacent to that exit.
        let second_plan = communities[&second].plan.as_ref().expect("plan");
        let entry = second_plan.traversal_order[0];
        assert!(graph.edge_between(exit, entry).is_some());

        // Ordered exits point from the first community to the second.
        let exits = group.ordered_exits.get(&first).expect("exits");
        assert_eq!(exits.len(), 1);
        assert_eq!(exits[0].1, second);
        assert_eq!(exits[0].0, first_plan.traversal_order.len() - 1);
    }

    #[test]
    fn singleton_group_plans_without_borders() {
        let mut graph = Graph::new();
        for name in ["a", "b", "c"] {
            graph.upsert_node(&Entity::new(name, "t", ""));
        }
        graph.upsert_edge(NodeId(0), NodeId(1), &Relationship::new("r", 5));
        graph.upsert_edge(NodeId(1), NodeId(2), &Relationship::new("r", 5));
        let partition = Partition::from_membership(&[0, 0, 0]);
        let (meta, mut communities, centrality) = setup(&graph, &partition);

        let group =
            plan_group(0, &[CommunityId(0)], &meta, &centrality, &mut communities).expect("group");
        assert_eq!(group.traversal.len(), 3);
        assert_eq!(group.community_order, vec![CommunityId(0)]);
        assert_eq!(group.traversal_parents[0], None);
    }
}
