//! Graph construction from a list of work items.
//!
//! # Edge Direction
//!
//! An edge `A → B` means "A must finish before B starts": for every item `B`
//! listing `A` among its dependencies we insert `A → B` and bump `B`'s
//! in-degree.
//!
//! ## Node Order
//!
//! Nodes are registered on first appearance while walking the items in
//! input order: the item's own id first, then each predecessor id in the
//! order it is listed. petgraph hands out `NodeIndex` values sequentially, so
//! index order *is* discovery order, and every tie-break in the sequencing
//! operations falls back to it.
//!
//! ## Phantom Nodes
//!
//! A predecessor id that is never declared as an item still becomes a node
//! (weight 1, no predecessors of its own). Dangling references are not an
//! error.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, instrument};

use crate::error::PlanError;
use crate::model::{DEFAULT_WEIGHT, PlanDocument, Status, WorkItem};

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// Per-node payload stored in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    /// Point estimate; [`DEFAULT_WEIGHT`] when absent or phantom.
    pub weight: u32,
    pub status: Option<Status>,
    pub summary: Option<String>,
    /// `false` for phantom nodes (referenced only as a predecessor).
    pub declared: bool,
}

impl Node {
    fn phantom(id: &str) -> Self {
        Self {
            id: id.to_string(),
            weight: DEFAULT_WEIGHT,
            status: None,
            summary: None,
            declared: false,
        }
    }

    #[must_use]
    pub const fn is_phantom(&self) -> bool {
        !self.declared
    }
}

// ---------------------------------------------------------------------------
// DependencyGraph
// ---------------------------------------------------------------------------

/// Directed dependency graph built once per request.
///
/// Immutable after construction. The stored in-degree table is only ever
/// read; every traversal works on its own copy, so operations can be called
/// repeatedly with identical results.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    pub(super) graph: DiGraph<Node, ()>,
    pub(super) node_map: HashMap<String, NodeIndex>,
    /// Successors of each node in edge-insertion order, indexed by `NodeIndex`.
    pub(super) successors: Vec<Vec<NodeIndex>>,
    /// Predecessors of each node in declaration order, indexed by `NodeIndex`.
    pub(super) predecessors: Vec<Vec<NodeIndex>>,
    pub(super) in_degree: Vec<usize>,
}

impl DependencyGraph {
    /// Build a graph from `items`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::MalformedInput`] when an item id is empty, an
    /// item is declared twice, or a dependency id is empty. No partial graph
    /// is produced.
    #[instrument(skip(items), fields(items = items.len()))]
    pub fn from_items(items: &[WorkItem]) -> Result<Self, PlanError> {
        let mut builder = Builder::default();

        for item in items {
            builder.declare(item)?;
        }

        let graph = builder.finish();
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            phantoms = graph.phantom_ids().len(),
            "built dependency graph"
        );
        Ok(graph)
    }

    /// Build a graph from a parsed plan document.
    ///
    /// # Errors
    ///
    /// Same as [`DependencyGraph::from_items`].
    pub fn from_document(doc: &PlanDocument) -> Result<Self, PlanError> {
        Self::from_items(&doc.items)
    }

    /// Number of nodes, phantoms included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct dependency edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_map.get(id).map(|&idx| &self.graph[idx])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Number of distinct predecessors of `id`.
    #[must_use]
    pub fn in_degree(&self, id: &str) -> Option<usize> {
        self.node_map.get(id).map(|idx| self.in_degree[idx.index()])
    }

    /// Ids of nodes referenced only as predecessors, in discovery order.
    #[must_use]
    pub fn phantom_ids(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .map(|idx| &self.graph[idx])
            .filter(|node| node.is_phantom())
            .map(|node| node.id.as_str())
            .collect()
    }

    /// Successor ids of `id` (its dependents), in edge-insertion order.
    #[must_use]
    pub fn successors(&self, id: &str) -> Vec<&str> {
        self.node_map
            .get(id)
            .map(|idx| self.ids(&self.successors[idx.index()]))
            .unwrap_or_default()
    }

    /// Predecessor ids of `id` (its dependencies), in declaration order.
    #[must_use]
    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        self.node_map
            .get(id)
            .map(|idx| self.ids(&self.predecessors[idx.index()]))
            .unwrap_or_default()
    }

    /// Iterate `(dependency, dependent)` edges: dependents in discovery
    /// order, each dependent's predecessors in declaration order.
    pub fn edges(&self) -> impl Iterator<Item = (&Node, &Node)> + '_ {
        self.graph.node_indices().flat_map(move |to| {
            self.predecessors[to.index()]
                .iter()
                .map(move |&from| (&self.graph[from], &self.graph[to]))
        })
    }

    pub(super) fn ids(&self, nodes: &[NodeIndex]) -> Vec<&str> {
        nodes.iter().map(|&idx| self.graph[idx].id.as_str()).collect()
    }

    pub(super) fn owned_ids(&self, nodes: &[NodeIndex]) -> Vec<String> {
        nodes.iter().map(|&idx| self.graph[idx].id.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Builder {
    graph: DiGraph<Node, ()>,
    node_map: HashMap<String, NodeIndex>,
    successors: Vec<Vec<NodeIndex>>,
    predecessors: Vec<Vec<NodeIndex>>,
    in_degree: Vec<usize>,
}

impl Builder {
    fn declare(&mut self, item: &WorkItem) -> Result<(), PlanError> {
        if item.id.trim().is_empty() {
            return Err(PlanError::MalformedInput(
                "item id must not be empty".to_string(),
            ));
        }

        let idx = self.intern(&item.id);
        let node = &mut self.graph[idx];
        if node.declared {
            return Err(PlanError::MalformedInput(format!(
                "duplicate item id '{}'",
                item.id
            )));
        }
        node.declared = true;
        node.weight = item.weight();
        node.status = item.status;
        node.summary.clone_from(&item.summary);

        for dep in &item.dependencies {
            if dep.trim().is_empty() {
                return Err(PlanError::MalformedInput(format!(
                    "item '{}' lists an empty dependency id",
                    item.id
                )));
            }
            let dep_idx = self.intern(dep);
            // Repeating a dependency on the same item is one edge.
            if self.graph.contains_edge(dep_idx, idx) {
                continue;
            }
            self.graph.add_edge(dep_idx, idx, ());
            self.successors[dep_idx.index()].push(idx);
            self.predecessors[idx.index()].push(dep_idx);
            self.in_degree[idx.index()] += 1;
        }

        Ok(())
    }

    /// Return the node for `id`, registering a phantom on first appearance.
    fn intern(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(Node::phantom(id));
        self.node_map.insert(id.to_string(), idx);
        self.successors.push(Vec::new());
        self.predecessors.push(Vec::new());
        self.in_degree.push(0);
        idx
    }

    fn finish(self) -> DependencyGraph {
        DependencyGraph {
            graph: self.graph,
            node_map: self.node_map,
            successors: self.successors,
            predecessors: self.predecessors,
            in_degree: self.in_degree,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, deps: &[&str]) -> WorkItem {
        WorkItem::new(id, deps.iter().copied())
    }

    #[test]
    fn empty_input_produces_empty_graph() {
        let graph = DependencyGraph::from_items(&[]).expect("build graph");
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.phantom_ids().is_empty());
    }

    #[test]
    fn items_without_deps_are_nodes_only() {
        let graph =
            DependencyGraph::from_items(&[item("A", &[]), item("B", &[])]).expect("build graph");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.in_degree("A"), Some(0));
        assert_eq!(graph.in_degree("B"), Some(0));
    }

    #[test]
    fn edge_runs_from_dependency_to_dependent() {
        let graph =
            DependencyGraph::from_items(&[item("A", &[]), item("B", &["A"])]).expect("build graph");
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.successors("A"), vec!["B"]);
        assert_eq!(graph.predecessors("B"), vec!["A"]);
        assert!(graph.successors("B").is_empty());
        assert_eq!(graph.in_degree("B"), Some(1));
    }

    #[test]
    fn dangling_reference_becomes_phantom() {
        let graph = DependencyGraph::from_items(&[item("Z", &["GHOST"])]).expect("build graph");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.in_degree("GHOST"), Some(0));
        assert_eq!(graph.phantom_ids(), vec!["GHOST"]);

        let ghost = graph.node("GHOST").expect("ghost node");
        assert!(ghost.is_phantom());
        assert_eq!(ghost.weight, DEFAULT_WEIGHT);
    }

    #[test]
    fn later_declaration_upgrades_phantom() {
        let items = [item("B", &["A"]), item("A", &[]).with_points(5)];
        let graph = DependencyGraph::from_items(&items).expect("build graph");

        assert!(graph.phantom_ids().is_empty());
        let a = graph.node("A").expect("A node");
        assert!(a.declared);
        assert_eq!(a.weight, 5);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn repeated_dependency_is_one_edge() {
        let graph = DependencyGraph::from_items(&[item("A", &[]), item("B", &["A", "A"])])
            .expect("build graph");
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.in_degree("B"), Some(1));
    }

    #[test]
    fn duplicate_item_is_malformed() {
        let err = DependencyGraph::from_items(&[item("A", &[]), item("A", &[])])
            .expect_err("duplicate must fail");
        assert!(matches!(err, PlanError::MalformedInput(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn empty_ids_are_malformed() {
        assert!(matches!(
            DependencyGraph::from_items(&[item("  ", &[])]),
            Err(PlanError::MalformedInput(_))
        ));
        assert!(matches!(
            DependencyGraph::from_items(&[item("A", &[""])]),
            Err(PlanError::MalformedInput(_))
        ));
    }

    #[test]
    fn edges_follow_declaration_order() {
        let graph = DependencyGraph::from_items(&[
            item("A", &[]),
            item("B", &["A"]),
            item("C", &["B", "A"]),
        ])
        .expect("build graph");

        let edges: Vec<(&str, &str)> = graph
            .edges()
            .map(|(from, to)| (from.id.as_str(), to.id.as_str()))
            .collect();
        assert_eq!(edges, vec![("A", "B"), ("B", "C"), ("A", "C")]);
    }

    #[test]
    fn item_metadata_is_carried() {
        let mut a = item("A", &[]).with_status(Status::Done).with_points(8);
        a.summary = Some("API: Add status field".to_string());
        let graph = DependencyGraph::from_items(&[a]).expect("build graph");

        let node = graph.node("A").expect("A node");
        assert_eq!(node.status, Some(Status::Done));
        assert_eq!(node.weight, 8);
        assert_eq!(node.summary.as_deref(), Some("API: Add status field"));
    }
}
