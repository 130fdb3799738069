//! Cycle reporting for the dependency graph.
//!
//! Kahn's algorithm only tells us *that* some nodes were never released. To
//! name the loop in the fatal message, the stalled traversal is paired with
//! Tarjan's SCC pass: every component with more than one member, or a single
//! member with a self-loop, is a cycle.

#![allow(clippy::module_name_repetitions)]

use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;

use super::build::DependencyGraph;
use crate::error::PlanError;

impl DependencyGraph {
    /// Find all cycles currently present in the graph.
    ///
    /// Each entry is a sorted list of ids in one strongly connected
    /// component. Self-loops are reported as a one-element cycle. The outer
    /// list is sorted as well, so the result is stable across runs.
    #[must_use]
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|node| self.has_self_loop(*node))
            })
            .map(|component| {
                let mut ids = self.owned_ids(&component);
                ids.sort_unstable();
                ids
            })
            .collect();

        cycles.sort_unstable();
        cycles
    }

    fn has_self_loop(&self, node: NodeIndex) -> bool {
        self.graph.find_edge(node, node).is_some()
    }

    /// Build the error for a traversal that stalled with `in_degree` left over.
    pub(super) fn cycle_error(&self, in_degree: &[usize]) -> PlanError {
        let unresolved: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|idx| in_degree[idx.index()] > 0)
            .collect();

        PlanError::CycleDetected {
            unresolved: self.owned_ids(&unresolved),
            cycles: self.find_cycles(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::DependencyGraph;
    use crate::model::WorkItem;

    fn graph(rows: &[(&str, &[&str])]) -> DependencyGraph {
        let items: Vec<WorkItem> = rows
            .iter()
            .map(|(id, deps)| WorkItem::new(*id, deps.iter().copied()))
            .collect();
        DependencyGraph::from_items(&items).expect("build graph")
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let g = graph(&[("A", &[]), ("B", &["A"]), ("C", &["B"])]);
        assert!(g.find_cycles().is_empty());
    }

    #[test]
    fn self_loop_is_a_one_element_cycle() {
        let g = graph(&[("A", &["A"])]);
        assert_eq!(g.find_cycles(), vec![vec!["A".to_string()]]);
    }

    #[test]
    fn separate_cycles_are_reported_sorted() {
        let g = graph(&[
            ("Q", &["P"]),
            ("P", &["Q"]),
            ("C", &["B"]),
            ("B", &["A"]),
            ("A", &["C"]),
            ("OK", &[]),
        ]);
        assert_eq!(
            g.find_cycles(),
            vec![
                vec!["A".to_string(), "B".to_string(), "C".to_string()],
                vec!["P".to_string(), "Q".to_string()],
            ]
        );
    }

    #[test]
    fn nodes_blocked_by_a_cycle_are_unresolved_but_not_cycle_members() {
        let g = graph(&[("X", &["Y"]), ("Y", &["X"]), ("TAIL", &["Y"])]);
        let err = g.layers().expect_err("cycle");
        match err {
            crate::error::PlanError::CycleDetected { unresolved, cycles } => {
                assert_eq!(unresolved, vec!["X", "Y", "TAIL"]);
                assert_eq!(cycles, vec![vec!["X".to_string(), "Y".to_string()]]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
