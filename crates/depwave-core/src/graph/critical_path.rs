//! Longest weighted chain estimate for the dependency graph.
//!
//! # Definitions
//!
//! | Term       | Definition |
//! |------------|------------|
//! | `weight`   | The item's point estimate (1 when absent, 1 for phantoms). |
//! | `distance` | Weighted length of the longest chain of predecessors ending at the item. |
//! | `finish`   | `distance + weight`: the chain including the item itself. |
//!
//! # Algorithm
//!
//! Standard DAG longest-path relaxation: walk the nodes in topological
//! order and, for every successor, raise its distance to
//! `distance(node) + weight(node)` if that is larger.
//!
//! [`DependencyGraph::critical_path`] only reports per-node distances. It
//! does not reconstruct the chain; [`trace_longest_chain`] does that from
//! the outside when a caller wants the member sequence.

#![allow(clippy::module_name_repetitions)]

use serde::Serialize;
use tracing::{debug, instrument};

use super::build::DependencyGraph;
use crate::error::PlanError;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Distance estimate for a single node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainEstimate {
    pub id: String,
    pub weight: u32,
    pub distance: u64,
    pub finish: u64,
}

/// Per-node longest-chain estimates, in topological order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CriticalPath {
    pub estimates: Vec<ChainEstimate>,
}

impl CriticalPath {
    /// Estimate for `id`, if it is a node of the graph.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ChainEstimate> {
        self.estimates.iter().find(|e| e.id == id)
    }

    /// Longest chain distance ending at `id` (excluding `id`'s own weight).
    #[must_use]
    pub fn distance(&self, id: &str) -> Option<u64> {
        self.get(id).map(|e| e.distance)
    }

    /// Node with the greatest `finish`; the earliest in topological order
    /// wins a tie.
    #[must_use]
    pub fn longest(&self) -> Option<&ChainEstimate> {
        self.estimates
            .iter()
            .reduce(|best, e| if e.finish > best.finish { e } else { best })
    }

    /// Weighted length of the longest chain in the graph (0 when empty).
    #[must_use]
    pub fn total_length(&self) -> u64 {
        self.longest().map_or(0, |e| e.finish)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

impl DependencyGraph {
    /// Compute longest-chain distances for every node.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::CycleDetected`] when no full topological order
    /// exists.
    #[instrument(skip(self), fields(nodes = self.node_count()))]
    pub fn critical_path(&self) -> Result<CriticalPath, PlanError> {
        let topo = self.topological_indices()?;
        let mut distance = vec![0u64; self.node_count()];

        for &node in &topo {
            let reach = distance[node.index()] + u64::from(self.graph[node].weight);
            for &succ in &self.successors[node.index()] {
                let slot = &mut distance[succ.index()];
                *slot = (*slot).max(reach);
            }
        }

        let estimates: Vec<ChainEstimate> = topo
            .iter()
            .map(|&idx| {
                let node = &self.graph[idx];
                let d = distance[idx.index()];
                ChainEstimate {
                    id: node.id.clone(),
                    weight: node.weight,
                    distance: d,
                    finish: d + u64::from(node.weight),
                }
            })
            .collect();

        let path = CriticalPath { estimates };
        debug!(total = path.total_length(), "critical path estimate complete");
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Chain reconstruction helper
// ---------------------------------------------------------------------------

/// Walk back from the node with the greatest `finish` and return one
/// longest chain, sources first.
///
/// At each step the first predecessor (declaration order) whose
/// `distance + weight` equals the current node's distance is chosen.
/// Returns an empty chain when `path` is empty.
#[must_use]
pub fn trace_longest_chain(graph: &DependencyGraph, path: &CriticalPath) -> Vec<String> {
    let Some(end) = path.longest() else {
        return Vec::new();
    };

    let mut chain = vec![end.id.clone()];
    let mut current = end;

    loop {
        let prev = graph
            .predecessors(&current.id)
            .into_iter()
            .filter_map(|id| path.get(id))
            .find(|p| p.finish == current.distance);

        match prev {
            Some(p) => {
                chain.push(p.id.clone());
                current = p;
            }
            None => break,
        }
    }

    chain.reverse();
    chain
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WorkItem;

    fn weighted(rows: &[(&str, u32, &[&str])]) -> DependencyGraph {
        let items: Vec<WorkItem> = rows
            .iter()
            .map(|(id, points, deps)| WorkItem::new(*id, deps.iter().copied()).with_points(*points))
            .collect();
        DependencyGraph::from_items(&items).expect("build graph")
    }

    #[test]
    fn empty_graph() {
        let g = DependencyGraph::from_items(&[]).expect("build graph");
        let cp = g.critical_path().expect("critical path");
        assert!(cp.is_empty());
        assert_eq!(cp.total_length(), 0);
        assert!(trace_longest_chain(&g, &cp).is_empty());
    }

    #[test]
    fn unweighted_chain_counts_steps() {
        let items = [
            WorkItem::new("A", Vec::<String>::new()),
            WorkItem::new("B", ["A"]),
            WorkItem::new("C", ["B"]),
        ];
        let g = DependencyGraph::from_items(&items).expect("build graph");
        let cp = g.critical_path().expect("critical path");

        assert_eq!(cp.distance("A"), Some(0));
        assert_eq!(cp.distance("B"), Some(1));
        assert_eq!(cp.distance("C"), Some(2));
        assert_eq!(cp.total_length(), 3);
    }

    #[test]
    fn heavier_branch_wins() {
        // A(2) -> B(5) -> D(1)
        // A(2) -> C(1) -> D(1)
        let g = weighted(&[
            ("A", 2, &[]),
            ("B", 5, &["A"]),
            ("C", 1, &["A"]),
            ("D", 1, &["B", "C"]),
        ]);
        let cp = g.critical_path().expect("critical path");

        assert_eq!(cp.distance("B"), Some(2));
        assert_eq!(cp.distance("C"), Some(2));
        assert_eq!(cp.distance("D"), Some(7));
        assert_eq!(cp.get("D").map(|e| e.finish), Some(8));
        assert_eq!(cp.total_length(), 8);
        assert_eq!(trace_longest_chain(&g, &cp), vec!["A", "B", "D"]);
    }

    #[test]
    fn phantom_contributes_default_weight() {
        let g = weighted(&[("Z", 3, &["GHOST"])]);
        let cp = g.critical_path().expect("critical path");
        assert_eq!(cp.distance("GHOST"), Some(0));
        assert_eq!(cp.distance("Z"), Some(1));
        assert_eq!(trace_longest_chain(&g, &cp), vec!["GHOST", "Z"]);
    }

    #[test]
    fn estimates_follow_topological_order() {
        let g = weighted(&[("B", 1, &["A"]), ("A", 1, &[])]);
        let cp = g.critical_path().expect("critical path");
        let ids: Vec<&str> = cp.estimates.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn zero_weight_items_still_trace() {
        let g = weighted(&[("A", 0, &[]), ("B", 0, &["A"]), ("C", 4, &["B"])]);
        let cp = g.critical_path().expect("critical path");
        assert_eq!(cp.total_length(), 4);
        assert_eq!(trace_longest_chain(&g, &cp), vec!["A", "B", "C"]);
    }

    #[test]
    fn cycle_fails() {
        let g = weighted(&[("X", 1, &["Y"]), ("Y", 1, &["X"])]);
        assert!(matches!(
            g.critical_path(),
            Err(PlanError::CycleDetected { .. })
        ));
    }

    #[test]
    fn independent_tie_keeps_first() {
        let g = weighted(&[("A", 2, &[]), ("B", 2, &[])]);
        let cp = g.critical_path().expect("critical path");
        assert_eq!(cp.longest().map(|e| e.id.as_str()), Some("A"));
    }
}
