//! # Community
//!
//! One community of the partition: its induced subgraph, the mapping back
//! into the parent graph's id space, its border connections, and (once the
//! group planner has run) its finished traversal.
//!
//! Communities exchange only node ids with the rest of the planner; the
//! subgraph is an owned copy and nothing here aliases the parent graph.

use crate::borders::BorderConnection;
use crate::graph::{Graph, NodeMapping};
use crate::types::{CommunityId, NodeId, PlanError};
use crate::walker::{Walk, WalkConstraints, find_constrained_walk};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// COMMUNITY PLAN
// =============================================================================

/// The finished traversal of one community, in parent-graph node ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityPlan {
    /// First-visit order through the community; the terminal node is always
    /// retained, even when it repeats an earlier visit.
    pub traversal_order: Vec<NodeId>,
    /// Per entry of `traversal_order`, the node it was first reached from;
    /// `None` for the walk's start.
    pub parents: Vec<Option<NodeId>>,
    /// Positions in `traversal_order` of the matched mid-border nodes, in
    /// matched order, plus the final position as the last exit.
    pub exits: Vec<usize>,
    /// The chosen exit node per ordered border: the matched mid nodes, then
    /// the walk's terminal node.
    pub chosen_borders: Vec<NodeId>,
}

// =============================================================================
// COMMUNITY
// =============================================================================

/// A community subgraph with its border connections and traversal state.
#[derive(Debug, Clone)]
pub struct Community {
    pub id: CommunityId,
    pub subgraph: Graph,
    pub mapping: NodeMapping,
    /// Neighbor community -> border connections toward it.
    pub border_connections: BTreeMap<CommunityId, Vec<BorderConnection>>,
    /// Filled exactly once by the group planner.
    pub plan: Option<CommunityPlan>,
}

impl Community {
    /// Create a community from its subgraph cut.
    #[must_use]
    pub fn new(
        id: CommunityId,
        subgraph: Graph,
        mapping: NodeMapping,
        border_connections: BTreeMap<CommunityId, Vec<BorderConnection>>,
    ) -> Self {
        Self {
            id,
            subgraph,
            mapping,
            border_connections,
            plan: None,
        }
    }

    /// Number of nodes in this community.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subgraph.node_count()
    }

    /// Whether the community is empty (never true for partition output).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subgraph.is_empty()
    }

    /// This community's exit nodes toward a neighbor community, in parent
    /// ids, deduplicated in connection order.
    #[must_use]
    pub fn exit_nodes_toward(&self, neighbor: CommunityId) -> Vec<NodeId> {
        let mut seen = BTreeSet::new();
        let mut exits = Vec::new();
        for connection in self.border_connections.get(&neighbor).into_iter().flatten() {
            if let Some(global) = self.mapping.to_parent(connection.exit_local) {
                if seen.insert(global) {
                    exits.push(global);
                }
            }
        }
        exits
    }

    /// Entry nodes of a neighbor community reachable from `exit` (a parent
    /// id of one of this community's border nodes).
    #[must_use]
    pub fn entries_into_neighbor(&self, neighbor: CommunityId, exit: NodeId) -> Vec<NodeId> {
        let Some(exit_local) = self.mapping.to_child(exit) else {
            return Vec::new();
        };
        self.border_connections
            .get(&neighbor)
            .into_iter()
            .flatten()
            .filter(|connection| connection.exit_local == exit_local)
            .map(|connection| connection.entry_global)
            .collect()
    }

    /// Solve this community's constrained walk.
    ///
    /// `entry_nodes` are parent ids recorded while planning the meta-graph
    /// parent (`None` for a group root). `ordered_borders` are the exit
    /// borders toward the DFS children, in child visit order, parent ids;
    /// the final border is the terminal one. Returns the stored plan.
    pub fn plan_traversal(
        &mut self,
        entry_nodes: Option<&[NodeId]>,
        ordered_borders: &[Vec<NodeId>],
    ) -> Result<&CommunityPlan, PlanError> {
        let borders_local: Vec<Vec<NodeId>> = ordered_borders
            .iter()
            .map(|border| self.mapping.localize(border))
            .collect();
        let (mid_borders, last_border) = split_borders(&borders_local);

        let entries = match entry_nodes {
            Some(nodes) => self.mapping.localize(nodes),
            None => default_entries(&self.subgraph, &mid_borders, &last_border),
        };

        let constraints = WalkConstraints {
            entries,
            mid_borders,
            last_border,
        };
        let walk = find_constrained_walk(&self.subgraph, &constraints).ok_or_else(|| {
            PlanError::NoFeasibleWalk {
                community: self.id,
                entries: constraints.entries.len(),
                mid_borders: constraints.mid_borders.len(),
                last_border: constraints.last_border.len(),
            }
        })?;

        let plan = self.assemble_plan(&walk);
        Ok(self.plan.insert(plan))
    }

    /// Derive the first-visit traversal and exit bookkeeping from the raw
    /// walk, translated into parent ids.
    fn assemble_plan(&self, walk: &Walk) -> CommunityPlan {
        let mut order_local: Vec<NodeId> = Vec::new();
        let mut parents_local: Vec<Option<NodeId>> = Vec::new();
        let mut seen = BTreeSet::new();

        let last_index = walk.path.len().saturating_sub(1);
        for (index, &node) in walk.path.iter().enumerate() {
            if index == 0 {
                seen.insert(node);
                order_local.push(node);
                parents_local.push(None);
            } else if index == last_index {
                // The terminal is always retained, duplicate or not.
                order_local.push(node);
                parents_local.push(Some(walk.path[index - 1]));
            } else if seen.insert(node) {
                order_local.push(node);
                parents_local.push(Some(walk.path[index - 1]));
            }
        }

        // Exit positions: one per matched mid (first appearance), then the
        // terminal position.
        let mut exits = Vec::with_capacity(walk.matched_mids.len() + 1);
        for mid in &walk.matched_mids {
            if let Some(position) = order_local.iter().position(|node| node == mid) {
                exits.push(position);
            }
        }
        exits.push(order_local.len().saturating_sub(1));

        let mut chosen_borders = self.mapping.globalize(&walk.matched_mids);
        if let Some(&terminal) = walk.path.last() {
            if let Some(global) = self.mapping.to_parent(terminal) {
                chosen_borders.push(global);
            }
        }

        CommunityPlan {
            traversal_order: self.mapping.globalize(&order_local),
            parents: parents_local
                .iter()
                .map(|parent| parent.and_then(|p| self.mapping.to_parent(p)))
                .collect(),
            exits,
            chosen_borders,
        }
    }
}

/// All but the last border become mid borders; the last becomes the
/// terminal border (empty when there are no borders at all).
fn split_borders(borders: &[Vec<NodeId>]) -> (Vec<BTreeSet<NodeId>>, BTreeSet<NodeId>) {
    let Some((last, mids)) = borders.split_last() else {
        return (Vec::new(), BTreeSet::new());
    };
    (
        mids.iter()
            .map(|border| border.iter().copied().collect())
            .collect(),
        last.iter().copied().collect(),
    )
}

/// Default entry set when no entrance was recorded (group root): every
/// node that is on no border; if that leaves nothing, the last border;
/// if there is no last border either, every node.
fn default_entries(
    subgraph: &Graph,
    mid_borders: &[BTreeSet<NodeId>],
    last_border: &BTreeSet<NodeId>,
) -> Vec<NodeId> {
    let mut on_border: BTreeSet<NodeId> = last_border.iter().copied().collect();
    for border in mid_borders {
        on_border.extend(border.iter().copied());
    }

    let free: Vec<NodeId> = subgraph
        .node_ids()
        .filter(|node| !on_border.contains(node))
        .collect();
    if !free.is_empty() {
        return free;
    }
    if !last_border.is_empty() {
        return last_border.iter().copied().collect();
    }
    subgraph.node_ids().collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Entity, Relationship};

    /// Community over a path graph 0-1-2-…, identity mapping.
    fn path_community(len: usize) -> Community {
        let mut graph = Graph::new();
        let ids: Vec<NodeId> = (0..len)
            .map(|i| graph.upsert_node(&Entity::new(format!("n{i}"), "t", "")))
            .collect();
        for window in ids.windows(2) {
            graph.upsert_edge(window[0], window[1], &Relationship::new("r", 5));
        }
        let members: Vec<NodeId> = graph.node_ids().collect();
        let (subgraph, mapping) = graph.induced_subgraph(&members);
        Community::new(CommunityId(0), subgraph, mapping, BTreeMap::new())
    }

    #[test]
    fn default_entries_exclude_borders() {
        let community = path_community(4);
        let mids = vec![[NodeId(1)].into_iter().collect()];
        let last = [NodeId(3)].into_iter().collect();
        assert_eq!(
            default_entries(&community.subgraph, &mids, &last),
            vec![NodeId(0), NodeId(2)]
        );
    }

    #[test]
    fn default_entries_fall_back_to_last_border() {
        // Two nodes, both on borders: entry set falls back to the last border.
        let community = path_community(2);
        let mids = vec![[NodeId(0)].into_iter().collect()];
        let last: BTreeSet<NodeId> = [NodeId(1)].into_iter().collect();
        assert_eq!(
            default_entries(&community.subgraph, &mids, &last),
            vec![NodeId(1)]
        );
    }

    #[test]
    fn plan_records_checkpoints_and_exits() {
        // 0-1-2-3-4, entry {0}, borders: mid toward one neighbor {2},
        // terminal toward another {4}.
        let mut community = path_community(5);
        let plan = community
            .plan_traversal(Some(&[NodeId(0)]), &[vec![NodeId(2)], vec![NodeId(4)]])
            .expect("plan");

        assert_eq!(
            plan.traversal_order,
            vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3), NodeId(4)]
        );
        assert_eq!(plan.parents[0], None);
        assert_eq!(plan.exits, vec![2, 4]);
        assert_eq!(plan.chosen_borders, vec![NodeId(2), NodeId(4)]);
    }

    #[test]
    fn retraced_walk_keeps_terminal_duplicate() {
        // mid {4}, last {2}: walk 0,1,2,3,4,3,2 -> order keeps terminal 2.
        let mut community = path_community(5);
        let plan = community
            .plan_traversal(Some(&[NodeId(0)]), &[vec![NodeId(4)], vec![NodeId(2)]])
            .expect("plan");

        assert_eq!(
            plan.traversal_order,
            vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3), NodeId(4), NodeId(2)]
        );
        // Parent of the duplicated terminal is its walk predecessor.
        assert_eq!(plan.parents.last().copied().flatten(), Some(NodeId(3)));
        // Mid 4 first appears at position 4; terminal exit is the last slot.
        assert_eq!(plan.exits, vec![4, 5]);
        assert_eq!(plan.chosen_borders, vec![NodeId(4), NodeId(2)]);
    }

    #[test]
    fn no_borders_walk_is_unconstrained() {
        let mut community = path_community(3);
        let plan = community.plan_traversal(None, &[]).expect("plan");
        assert_eq!(plan.traversal_order.len(), 3);
        assert_eq!(plan.exits, vec![2]);
        assert_eq!(plan.chosen_borders.len(), 1);
    }

    #[test]
    fn infeasible_community_reports_constraints() {
        // Disconnected pair cannot be covered.
        let mut graph = Graph::new();
        graph.upsert_node(&Entity::new("a", "t", ""));
        graph.upsert_node(&Entity::new("b", "t", ""));
        let members: Vec<NodeId> = graph.node_ids().collect();
        let (subgraph, mapping) = graph.induced_subgraph(&members);
        let mut community = Community::new(CommunityId(3), subgraph, mapping, BTreeMap::new());

        let error = community.plan_traversal(None, &[]).expect_err("infeasible");
        assert!(matches!(
            error,
            PlanError::NoFeasibleWalk {
                community: CommunityId(3),
                ..
            }
        ));
    }
}
