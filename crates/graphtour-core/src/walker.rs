//! # Constrained Walk Engine
//!
//! Finds a walk through one community subgraph that starts on an allowed
//! entry node, touches an ordered sequence of mid borders, ends on the last
//! border (when one is given), and visits every vertex at least once.
//! Revisits are permitted only while retracing the already-walked prefix.
//!
//! The search is a backtracking DFS with an explicit stack: community
//! subgraphs can run to thousands of nodes and the walk regularly exceeds
//! any comfortable recursion depth. Each frame carries its priority-ordered
//! forward candidates, a cursor into them, and the `go_back_idx` prefix
//! cursor for retracing; all state changes are undone when a frame pops, so
//! sibling candidates always see the state they were enumerated under.
//!
//! Neighbor priority at every vertex:
//! 1. unvisited members of the currently required mid border (not on the
//!    last border), advancing the checkpoint sequence
//! 2. unvisited interior nodes (neither last border nor current mid)
//! 3. unvisited last-border nodes, approaching the exit
//! 4. the predecessor on the stored path (retrace, last resort); once
//!    retracing has begun it continues strictly along the prefix

use crate::graph::Graph;
use crate::types::NodeId;
use std::collections::BTreeSet;

// =============================================================================
// CONSTRAINTS & RESULT
// =============================================================================

/// The walk problem for one community, in local (subgraph) node ids.
#[derive(Debug, Clone, Default)]
pub struct WalkConstraints {
    /// Allowed start nodes, tried in order.
    pub entries: Vec<NodeId>,
    /// Ordered checkpoint sets; each must be touched, in order.
    pub mid_borders: Vec<BTreeSet<NodeId>>,
    /// Terminal set; empty waives the terminal constraint.
    pub last_border: BTreeSet<NodeId>,
}

/// A successful walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walk {
    /// The full vertex sequence, including retraced prefix vertices.
    pub path: Vec<NodeId>,
    /// The vertex chosen for each mid border, in matched order.
    pub matched_mids: Vec<NodeId>,
}

// =============================================================================
// SEARCH
// =============================================================================

/// One node on the search path.
struct Frame {
    node: NodeId,
    /// Forward moves in priority order, fixed when the frame is pushed.
    candidates: Vec<NodeId>,
    next_candidate: usize,
    backtrack_done: bool,
    /// Undo bookkeeping.
    first_visit: bool,
    matched_mid: bool,
    /// Position in `path` the next retrace step continues from.
    go_back_idx: usize,
}

/// Mutable search state shared across frames.
struct Search<'a> {
    graph: &'a Graph,
    constraints: &'a WalkConstraints,
    visited: Vec<bool>,
    visit_count: usize,
    path: Vec<NodeId>,
    matched: Vec<NodeId>,
    stack: Vec<Frame>,
}

impl<'a> Search<'a> {
    fn new(graph: &'a Graph, constraints: &'a WalkConstraints) -> Self {
        Self {
            graph,
            constraints,
            visited: vec![false; graph.node_count()],
            visit_count: 0,
            path: Vec::new(),
            matched: Vec::new(),
            stack: Vec::new(),
        }
    }

    /// Arrive at `node`: extend the path, mark the visit, match the current
    /// mid border if `node` belongs to it, and push the frame. Returns true
    /// when this arrival completes the walk.
    fn arrive(&mut self, node: NodeId, go_back_idx: usize) -> bool {
        self.path.push(node);

        let first_visit = !self.visited[node.index()];
        if first_visit {
            self.visited[node.index()] = true;
            self.visit_count += 1;
        }

        let matched_mid = self
            .constraints
            .mid_borders
            .get(self.matched.len())
            .is_some_and(|border| border.contains(&node));
        if matched_mid {
            self.matched.push(node);
        }

        let complete = self.visit_count == self.graph.node_count()
            && self.matched.len() == self.constraints.mid_borders.len()
            && (self.constraints.last_border.is_empty()
                || self.constraints.last_border.contains(&node));

        let current_mid = self.constraints.mid_borders.get(self.matched.len());
        let mut advance = Vec::new();
        let mut interior = Vec::new();
        let mut exit = Vec::new();
        for (neighbor, _) in self.graph.neighbors(node) {
            if self.visited[neighbor.index()] {
                continue;
            }
            let on_last = self.constraints.last_border.contains(&neighbor);
            let on_mid = current_mid.is_some_and(|border| border.contains(&neighbor));
            if on_mid && !on_last {
                advance.push(neighbor);
            } else if !on_last {
                interior.push(neighbor);
            } else {
                exit.push(neighbor);
            }
        }
        advance.extend(interior);
        advance.extend(exit);

        self.stack.push(Frame {
            node,
            candidates: advance,
            next_candidate: 0,
            backtrack_done: false,
            first_visit,
            matched_mid,
            go_back_idx,
        });

        complete
    }

    /// Drop the top frame and undo its state changes.
    fn retreat(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.path.pop();
            if frame.matched_mid {
                self.matched.pop();
            }
            if frame.first_visit {
                self.visited[frame.node.index()] = false;
                self.visit_count -= 1;
            }
        }
    }

    /// Exhaustive search from one start node.
    fn run(&mut self, start: NodeId) -> Option<Walk> {
        if self.arrive(start, 0) {
            return Some(self.to_walk());
        }

        loop {
            let Some(top) = self.stack.last_mut() else {
                return None;
            };

            if top.next_candidate < top.candidates.len() {
                let next = top.candidates[top.next_candidate];
                top.next_candidate += 1;
                // A forward move retraces from its own position.
                let position = self.path.len();
                if self.arrive(next, position) {
                    return Some(self.to_walk());
                }
            } else if !top.backtrack_done && top.go_back_idx > 0 {
                top.backtrack_done = true;
                let go_back = top.go_back_idx;
                let target = self.path[go_back - 1];
                if self.arrive(target, go_back - 1) {
                    return Some(self.to_walk());
                }
            } else {
                self.retreat();
            }
        }
    }

    fn to_walk(&self) -> Walk {
        Walk {
            path: self.path.clone(),
            matched_mids: self.matched.clone(),
        }
    }
}

/// Solve the constrained walk problem, trying entry nodes in order.
///
/// `None` means every branch from every entry node was exhausted; the
/// caller maps this to `PlanError::NoFeasibleWalk`.
#[must_use]
pub fn find_constrained_walk(graph: &Graph, constraints: &WalkConstraints) -> Option<Walk> {
    if graph.node_count() == 0 {
        return None;
    }
    for &start in &constraints.entries {
        if start.index() >= graph.node_count() {
            continue;
        }
        let mut search = Search::new(graph, constraints);
        if let Some(walk) = search.run(start) {
            return Some(walk);
        }
    }
    None
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Entity, Relationship};

    fn path_graph(len: usize) -> Graph {
        let mut graph = Graph::new();
        let ids: Vec<NodeId> = (0..len)
            .map(|i| graph.upsert_node(&Entity::new(format!("n{i}"), "t", "")))
            .collect();
        for window in ids.windows(2) {
            graph.upsert_edge(window[0], window[1], &Relationship::new("r", 5));
        }
        graph
    }

    fn set(ids: &[u32]) -> BTreeSet<NodeId> {
        ids.iter().map(|&i| NodeId(i)).collect()
    }

    #[test]
    fn straight_run_through_ordered_checkpoints() {
        // 0-1-2-3-4 with mid {2}, last {4}: no retracing needed.
        let graph = path_graph(5);
        let constraints = WalkConstraints {
            entries: vec![NodeId(0)],
            mid_borders: vec![set(&[2])],
            last_border: set(&[4]),
        };
        let walk = find_constrained_walk(&graph, &constraints).expect("walk");
        assert_eq!(walk.path, vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3), NodeId(4)]);
        assert_eq!(walk.matched_mids, vec![NodeId(2)]);
    }

    #[test]
    fn checkpoint_order_forces_retrace() {
        // mid {4}, last {2}: must walk to the far end, then retrace to 2.
        let graph = path_graph(5);
        let constraints = WalkConstraints {
            entries: vec![NodeId(0)],
            mid_borders: vec![set(&[4])],
            last_border: set(&[2]),
        };
        let walk = find_constrained_walk(&graph, &constraints).expect("walk");
        assert_eq!(
            walk.path,
            vec![
                NodeId(0),
                NodeId(1),
                NodeId(2),
                NodeId(3),
                NodeId(4),
                NodeId(3),
                NodeId(2)
            ]
        );
        assert_eq!(walk.matched_mids, vec![NodeId(4)]);
    }

    #[test]
    fn unconstrained_walk_covers_triangle() {
        let mut graph = path_graph(3);
        graph.upsert_edge(NodeId(0), NodeId(2), &Relationship::new("r", 5));
        let constraints = WalkConstraints {
            entries: vec![NodeId(0)],
            ..WalkConstraints::default()
        };
        let walk = find_constrained_walk(&graph, &constraints).expect("walk");
        assert_eq!(walk.path, vec![NodeId(0), NodeId(1), NodeId(2)]);
    }

    #[test]
    fn single_node_trivial_walk() {
        let graph = path_graph(1);
        let constraints = WalkConstraints {
            entries: vec![NodeId(0)],
            ..WalkConstraints::default()
        };
        let walk = find_constrained_walk(&graph, &constraints).expect("walk");
        assert_eq!(walk.path, vec![NodeId(0)]);
    }

    #[test]
    fn unreachable_terminal_is_infeasible() {
        // Two disconnected edges; terminal lives in the far component.
        let mut graph = Graph::new();
        for name in ["a", "b", "c", "d"] {
            graph.upsert_node(&Entity::new(name, "t", ""));
        }
        graph.upsert_edge(NodeId(0), NodeId(1), &Relationship::new("r", 5));
        graph.upsert_edge(NodeId(2), NodeId(3), &Relationship::new("r", 5));

        let constraints = WalkConstraints {
            entries: vec![NodeId(0)],
            mid_borders: Vec::new(),
            last_border: set(&[3]),
        };
        assert!(find_constrained_walk(&graph, &constraints).is_none());
    }

    #[test]
    fn later_entry_node_can_rescue_the_walk() {
        // last border {0}: starting at 0 cannot end there without full
        // coverage first; starting at 4 walks straight back.
        let graph = path_graph(5);
        let constraints = WalkConstraints {
            entries: vec![NodeId(4)],
            mid_borders: Vec::new(),
            last_border: set(&[0]),
        };
        let walk = find_constrained_walk(&graph, &constraints).expect("walk");
        assert_eq!(
            walk.path,
            vec![NodeId(4), NodeId(3), NodeId(2), NodeId(1), NodeId(0)]
        );
    }

    #[test]
    fn star_interior_requires_retracing_spokes() {
        // Star: hub 0, spokes 1..=3. Cover all, end on spoke 3.
        let mut graph = Graph::new();
        for name in ["hub", "s1", "s2", "s3"] {
            graph.upsert_node(&Entity::new(name, "t", ""));
        }
        for spoke in 1..=3 {
            graph.upsert_edge(NodeId(0), NodeId(spoke), &Relationship::new("r", 5));
        }
        let constraints = WalkConstraints {
            entries: vec![NodeId(1)],
            mid_borders: Vec::new(),
            last_border: set(&[3]),
        };
        let walk = find_constrained_walk(&graph, &constraints).expect("walk");
        assert_eq!(walk.path.first(), Some(&NodeId(1)));
        assert_eq!(walk.path.last(), Some(&NodeId(3)));
        let mut seen: Vec<NodeId> = walk.path.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn two_mid_borders_matched_in_order() {
        // 0-1-2-3-4-5 with mids {1}, {3}, last {5}.
        let graph = path_graph(6);
        let constraints = WalkConstraints {
            entries: vec![NodeId(0)],
            mid_borders: vec![set(&[1]), set(&[3])],
            last_border: set(&[5]),
        };
        let walk = find_constrained_walk(&graph, &constraints).expect("walk");
        assert_eq!(walk.matched_mids, vec![NodeId(1), NodeId(3)]);
        assert_eq!(walk.path.last(), Some(&NodeId(5)));
    }
}
