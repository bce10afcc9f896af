//! # Community Detection
//!
//! Modularity-maximizing partition of the graph (Louvain: local moving +
//! aggregation passes) and the meta-graph built on top of it.
//!
//! The only randomness in the planner lives here: the order nodes are
//! visited during local moving is shuffled with a seeded xorshift. A fixed
//! seed makes the partition, and everything derived from it, fully
//! reproducible.

use crate::graph::Graph;
use crate::primitives::{LOUVAIN_MAX_LEVELS, LOUVAIN_MAX_SWEEPS};
use crate::rng::XorShift64Star;
use crate::types::{CommunityId, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

// =============================================================================
// PARTITION
// =============================================================================

/// Surjective mapping from node indices to community ids `0..K`.
///
/// Community ids are dense and renumbered by first appearance in node
/// order, so the partition representation itself is canonical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    membership: Vec<CommunityId>,
    community_count: usize,
}

impl Partition {
    /// Build a partition from raw membership values, renumbering them
    /// densely by first appearance.
    #[must_use]
    pub fn from_membership(raw: &[usize]) -> Self {
        let mut remap: BTreeMap<usize, CommunityId> = BTreeMap::new();
        let mut membership = Vec::with_capacity(raw.len());
        for &value in raw {
            let next = CommunityId::from_index(remap.len());
            let id = *remap.entry(value).or_insert(next);
            membership.push(id);
        }
        Self {
            membership,
            community_count: remap.len(),
        }
    }

    /// Community of a node.
    #[must_use]
    pub fn community_of(&self, node: NodeId) -> Option<CommunityId> {
        self.membership.get(node.index()).copied()
    }

    /// The raw membership array, indexed by node.
    #[must_use]
    pub fn membership(&self) -> &[CommunityId] {
        &self.membership
    }

    /// Number of communities.
    #[must_use]
    pub fn community_count(&self) -> usize {
        self.community_count
    }

    /// All community ids in ascending order.
    pub fn communities(&self) -> impl Iterator<Item = CommunityId> + use<> {
        (0..self.community_count).map(CommunityId::from_index)
    }

    /// Member nodes of a community, ascending by node id.
    #[must_use]
    pub fn members(&self, community: CommunityId) -> Vec<NodeId> {
        self.membership
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == community)
            .map(|(index, _)| NodeId::from_index(index))
            .collect()
    }
}

// =============================================================================
// LOUVAIN
// =============================================================================

/// Detect communities with seeded Louvain.
///
/// Edges are treated as unweighted (weight 1.0); aggregated levels carry
/// the summed weights of their merged edges.
#[must_use]
pub fn detect_communities(graph: &Graph, seed: u64) -> Partition {
    let n = graph.node_count();
    if n == 0 {
        return Partition::default();
    }

    // Level-0 adjacency: both directions per edge, no self-loops.
    let mut adjacency: Vec<Vec<(usize, f64)>> = (0..n)
        .map(|i| {
            graph
                .neighbors(NodeId::from_index(i))
                .map(|(neighbor, _)| (neighbor.index(), 1.0))
                .collect()
        })
        .collect();

    let mut membership: Vec<usize> = (0..n).collect();
    let mut rng = XorShift64Star::new(seed);

    for _level in 0..LOUVAIN_MAX_LEVELS {
        let (local, moved) = local_moving(&adjacency, &mut rng);
        if !moved {
            break;
        }
        for value in &mut membership {
            *value = local[*value];
        }
        let level_count = local.iter().max().map_or(0, |&c| c + 1);
        if level_count == adjacency.len() {
            break;
        }
        adjacency = aggregate(&adjacency, &local, level_count);
    }

    refine_connectivity(graph, &mut membership);
    Partition::from_membership(&membership)
}

/// Split internally disconnected communities into their connected
/// components (the Leiden well-connectedness guarantee). Every community
/// the detector hands out induces a connected subgraph, which is what
/// makes its covering walk solvable.
fn refine_connectivity(graph: &Graph, membership: &mut [usize]) {
    let n = membership.len();
    let original = membership.to_vec();
    let mut next_label = original.iter().max().map_or(0, |&label| label + 1);
    let mut used: BTreeSet<usize> = BTreeSet::new();
    let mut seen = vec![false; n];

    for start in 0..n {
        if seen[start] {
            continue;
        }
        let label = original[start];

        // BFS restricted to this community's members.
        let mut component = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        seen[start] = true;
        while let Some(current) = queue.pop_front() {
            component.push(current);
            for (neighbor, _) in graph.neighbors(NodeId::from_index(current)) {
                let index = neighbor.index();
                if !seen[index] && original[index] == label {
                    seen[index] = true;
                    queue.push_back(index);
                }
            }
        }

        // The first component keeps the label; stragglers get fresh ones.
        if used.insert(label) {
            continue;
        }
        for node in component {
            membership[node] = next_label;
        }
        next_label += 1;
    }
}

/// One Louvain level: move nodes between communities while modularity
/// improves. Returns the dense per-node community assignment and whether
/// any node moved at all.
fn local_moving(adjacency: &[Vec<(usize, f64)>], rng: &mut XorShift64Star) -> (Vec<usize>, bool) {
    let n = adjacency.len();

    // Degrees; a self-loop of weight w contributes 2w.
    let mut degree = vec![0.0_f64; n];
    for (i, links) in adjacency.iter().enumerate() {
        for &(j, w) in links {
            degree[i] += if j == i { 2.0 * w } else { w };
        }
    }
    let two_m: f64 = degree.iter().sum();
    if two_m <= 0.0 {
        return ((0..n).collect(), false);
    }

    let mut community: Vec<usize> = (0..n).collect();
    let mut sigma_tot = degree.clone();

    let mut order: Vec<usize> = (0..n).collect();
    rng.shuffle(&mut order);

    let mut any_move = false;
    for _sweep in 0..LOUVAIN_MAX_SWEEPS {
        let mut moved_this_sweep = false;
        for &i in &order {
            let current = community[i];

            // Weight from i toward each neighbor community (self-loops excluded).
            let mut links: BTreeMap<usize, f64> = BTreeMap::new();
            for &(j, w) in &adjacency[i] {
                if j != i {
                    *links.entry(community[j]).or_insert(0.0) += w;
                }
            }

            // Take i out of its community, then pick the best target.
            sigma_tot[current] -= degree[i];
            let mut best_comm = current;
            let mut best_gain =
                links.get(&current).copied().unwrap_or(0.0) - sigma_tot[current] * degree[i] / two_m;
            for (&comm, &w_in) in &links {
                if comm == current {
                    continue;
                }
                let gain = w_in - sigma_tot[comm] * degree[i] / two_m;
                if gain > best_gain {
                    best_gain = gain;
                    best_comm = comm;
                }
            }
            sigma_tot[best_comm] += degree[i];
            community[i] = best_comm;

            if best_comm != current {
                moved_this_sweep = true;
                any_move = true;
            }
        }
        if !moved_this_sweep {
            break;
        }
    }

    // Renumber densely by first appearance in node order.
    let mut remap: BTreeMap<usize, usize> = BTreeMap::new();
    let dense: Vec<usize> = community
        .iter()
        .map(|&c| {
            let next = remap.len();
            *remap.entry(c).or_insert(next)
        })
        .collect();

    (dense, any_move)
}

/// Collapse each community into one node; parallel edges merge by summed
/// weight, intra-community edges become self-loops.
fn aggregate(
    adjacency: &[Vec<(usize, f64)>],
    community: &[usize],
    community_count: usize,
) -> Vec<Vec<(usize, f64)>> {
    let mut merged: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); community_count];

    for (i, links) in adjacency.iter().enumerate() {
        let ci = community[i];
        for &(j, w) in links {
            if j == i {
                // Self-loops are stored once.
                *merged[ci].entry(ci).or_insert(0.0) += w;
            } else if j > i {
                // Each undirected edge visited once.
                let cj = community[j];
                if ci == cj {
                    *merged[ci].entry(ci).or_insert(0.0) += w;
                } else {
                    *merged[ci].entry(cj).or_insert(0.0) += w;
                    *merged[cj].entry(ci).or_insert(0.0) += w;
                }
            }
        }
    }

    merged
        .into_iter()
        .map(|links| links.into_iter().collect())
        .collect()
}

// =============================================================================
// META-GRAPH
// =============================================================================

/// Undirected graph whose vertices are communities; each edge carries the
/// number of cross-community edges between its endpoints.
///
/// Connected components of the meta-graph are the community groups.
#[derive(Debug, Clone, Default)]
pub struct MetaGraph {
    adjacency: Vec<BTreeMap<CommunityId, u64>>,
}

impl MetaGraph {
    /// Build the meta-graph by counting every cross-community edge.
    #[must_use]
    pub fn from_partition(graph: &Graph, partition: &Partition) -> Self {
        let mut adjacency = vec![BTreeMap::new(); partition.community_count()];
        for edge in graph.edges() {
            let (Some(ca), Some(cb)) = (
                partition.community_of(edge.a),
                partition.community_of(edge.b),
            ) else {
                continue;
            };
            if ca != cb {
                *adjacency[ca.index()].entry(cb).or_insert(0) += 1;
                *adjacency[cb.index()].entry(ca).or_insert(0) += 1;
            }
        }
        Self { adjacency }
    }

    /// Number of communities (vertices).
    #[must_use]
    pub fn community_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Neighboring communities with cross-edge counts, ascending by id.
    pub fn neighbors(&self, community: CommunityId) -> impl Iterator<Item = (CommunityId, u64)> + '_ {
        self.adjacency
            .get(community.index())
            .into_iter()
            .flat_map(|targets| targets.iter().map(|(&c, &w)| (c, w)))
    }

    /// Connected components ("community groups"), each sorted ascending,
    /// ordered by their smallest member.
    #[must_use]
    pub fn connected_components(&self) -> Vec<Vec<CommunityId>> {
        let count = self.adjacency.len();
        let mut seen = vec![false; count];
        let mut components = Vec::new();

        for start in 0..count {
            if seen[start] {
                continue;
            }
            let mut component = Vec::new();
            let mut queue = VecDeque::new();
            queue.push_back(CommunityId::from_index(start));
            seen[start] = true;
            while let Some(current) = queue.pop_front() {
                component.push(current);
                for (neighbor, _) in self.neighbors(current) {
                    if !seen[neighbor.index()] {
                        seen[neighbor.index()] = true;
                        queue.push_back(neighbor);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }

        components
    }
}

// =============================================================================
// TESTS
// =============================================================================
