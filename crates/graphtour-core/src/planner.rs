//! # Top-level Planner
//!
//! Orchestrates the whole pipeline: triplets -> graph -> partition ->
//! meta-graph -> border index -> per-group planning -> one global walk.
//!
//! The planner is single-threaded and synchronous; it owns every
//! intermediate structure and exposes them read-only for downstream
//! consumers (dialogue generation, visualization).

use crate::borders::border_connections_for;
use crate::community::Community;
use crate::graph::Graph;
use crate::group::{CommunityGroup, plan_group};
use crate::ingestor::{IngestReport, TripletIngestor};
use crate::ordering::{from_ends_permutation, order_by_centrality};
use crate::partition::{MetaGraph, Partition, detect_communities};
use crate::primitives::DEFAULT_SEED;
use crate::types::{CommunityId, NodeId, PlanError, Triplet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// CONFIG & OUTPUT
// =============================================================================

/// Planner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Seed for the community detector.
    pub seed: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { seed: DEFAULT_SEED }
    }
}

/// The global traversal: every node exactly once (plus retained community
/// terminals), with the node each entry was first reached from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalPlan {
    pub order: Vec<NodeId>,
    /// `None` marks the root of a community group.
    pub parents: Vec<Option<NodeId>>,
}

impl TraversalPlan {
    /// Number of steps in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the plan is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// =============================================================================
// PLANNER
// =============================================================================

/// The planned pipeline state: graph, partition, communities, groups, and
/// the stitched global traversal.
#[derive(Debug)]
pub struct TraversalPlanner {
    graph: Graph,
    report: IngestReport,
    partition: Partition,
    communities: BTreeMap<CommunityId, Community>,
    groups: Vec<CommunityGroup>,
    plan: TraversalPlan,
}

impl TraversalPlanner {
    /// Run the full pipeline over a finite list of triplets.
    ///
    /// Empty input (or input where every triplet was invalid) produces an
    /// empty plan, not an error.
    pub fn plan(triplets: &[Triplet], config: &PlannerConfig) -> Result<Self, PlanError> {
        let (graph, report) = TripletIngestor::build(triplets);
        if graph.is_empty() {
            return Ok(Self {
                graph,
                report,
                partition: Partition::default(),
                communities: BTreeMap::new(),
                groups: Vec::new(),
                plan: TraversalPlan::default(),
            });
        }

        let partition = detect_communities(&graph, config.seed);
        let meta = MetaGraph::from_partition(&graph, &partition);

        let mut communities = BTreeMap::new();
        for community in partition.communities() {
            let members = partition.members(community);
            let (subgraph, mapping) = graph.induced_subgraph(&members);
            let border_connections =
                border_connections_for(&graph, &partition, community, &mapping);
            communities.insert(
                community,
                Community::new(community, subgraph, mapping, border_connections),
            );
        }

        let centrality_order = order_by_centrality(&meta);
        let ordered_groups = order_groups(meta.connected_components());

        let mut groups = Vec::with_capacity(ordered_groups.len());
        let mut plan = TraversalPlan::default();
        for (index, members) in ordered_groups.iter().enumerate() {
            let group = plan_group(
                index as u32,
                members,
                &meta,
                &centrality_order,
                &mut communities,
            )?;
            plan.order.extend(group.traversal.iter().copied());
            plan.parents.extend(group.traversal_parents.iter().copied());
            groups.push(group);
        }

        let planner = Self {
            graph,
            report,
            partition,
            communities,
            groups,
            plan,
        };
        planner.check_output_invariant()?;
        Ok(planner)
    }

    /// Every node appears in the plan, and the plan introduces no node
    /// twice except as a retained community terminal.
    fn check_output_invariant(&self) -> Result<(), PlanError> {
        let mut seen = vec![false; self.graph.node_count()];
        for &node in &self.plan.order {
            if node.index() < seen.len() {
                seen[node.index()] = true;
            } else {
                return Err(PlanError::InvariantViolation(format!(
                    "plan references unknown node {node}"
                )));
            }
        }
        if let Some(missing) = seen.iter().position(|covered| !covered) {
            return Err(PlanError::InvariantViolation(format!(
                "plan never visits node {missing}"
            )));
        }
        Ok(())
    }

    /// The built graph.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// What the ingestor accepted and skipped.
    #[must_use]
    pub fn report(&self) -> &IngestReport {
        &self.report
    }

    /// The community partition.
    #[must_use]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// All communities with their finished per-community traversals.
    #[must_use]
    pub fn communities(&self) -> &BTreeMap<CommunityId, Community> {
        &self.communities
    }

    /// The planned community groups, in planned order.
    #[must_use]
    pub fn groups(&self) -> &[CommunityGroup] {
        &self.groups
    }

    /// The stitched global traversal.
    #[must_use]
    pub fn traversal(&self) -> &TraversalPlan {
        &self.plan
    }
}

/// Order the community groups for the global walk: sort by community count
/// descending, then scatter along the from-ends positions so the largest
/// groups sit at both ends of the plan and the smallest in the middle.
fn order_groups(mut components: Vec<Vec<CommunityId>>) -> Vec<Vec<CommunityId>> {
    components.sort_by_key(|group| std::cmp::Reverse(group.len()));
    let positions = from_ends_permutation(components.len());
    let mut slots: Vec<Vec<CommunityId>> = vec![Vec::new(); components.len()];
    for (rank, group) in components.into_iter().enumerate() {
        slots[positions[rank]] = group;
    }
    slots
}

// =============================================================================
// TESTS
// =============================================================================
