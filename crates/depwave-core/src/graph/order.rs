//! Flat and phased build orders.
//!
//! Both traversals are Kahn's algorithm over a private copy of the in-degree
//! table:
//!
//! - [`DependencyGraph::topological_sort`] emits one node at a time from a
//!   FIFO queue.
//! - [`DependencyGraph::layers`] drains every unblocked node before computing
//!   the next wave, so each phase can run in parallel.
//!
//! [`DependencyGraph::topological_sort`] breaks ties by discovery order for
//! the initial queue and by release order after that. Every phase of
//! [`DependencyGraph::layers`] lists its members in discovery order. If a
//! traversal cannot
//! place every node the graph has a cycle and the operation fails with
//! [`PlanError::CycleDetected`]; partial output is never returned.

use std::collections::VecDeque;

use petgraph::graph::NodeIndex;
use tracing::{debug, instrument};

use super::build::DependencyGraph;
use crate::error::PlanError;

impl DependencyGraph {
    /// Zero in-degree nodes of `in_degree`, in discovery order.
    fn sources(&self, in_degree: &[usize]) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|idx| in_degree[idx.index()] == 0)
            .collect()
    }

    /// Decrement the in-degree of every successor of `node`, returning the
    /// successors that became unblocked (edge-insertion order).
    fn release(&self, node: NodeIndex, in_degree: &mut [usize]) -> Vec<NodeIndex> {
        let mut released = Vec::new();
        for &succ in &self.successors[node.index()] {
            let remaining = &mut in_degree[succ.index()];
            *remaining -= 1;
            if *remaining == 0 {
                released.push(succ);
            }
        }
        released
    }

    pub(super) fn topological_indices(&self) -> Result<Vec<NodeIndex>, PlanError> {
        let mut in_degree = self.in_degree.clone();
        let mut queue: VecDeque<NodeIndex> = self.sources(&in_degree).into();
        let mut order = Vec::with_capacity(self.node_count());

        while let Some(node) = queue.pop_front() {
            order.push(node);
            queue.extend(self.release(node, &mut in_degree));
        }

        if order.len() < self.node_count() {
            return Err(self.cycle_error(&in_degree));
        }
        Ok(order)
    }

    /// Full dependency order of every node, phantoms included.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::CycleDetected`] when some nodes can never be
    /// released.
    #[instrument(skip(self), fields(nodes = self.node_count()))]
    pub fn topological_sort(&self) -> Result<Vec<String>, PlanError> {
        let order = self.topological_indices()?;
        debug!(emitted = order.len(), "topological sort complete");
        Ok(self.owned_ids(&order))
    }

    /// Partition every node into sequential phases.
    ///
    /// Phase 1 holds all nodes with no predecessors. Phase *k* holds the
    /// nodes whose last predecessor sits in phase *k−1*.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::CycleDetected`] when the wavefront stops before
    /// every node is placed.
    #[instrument(skip(self), fields(nodes = self.node_count()))]
    pub fn layers(&self) -> Result<Vec<Vec<String>>, PlanError> {
        let mut in_degree = self.in_degree.clone();
        let mut wave = self.sources(&in_degree);
        let mut layers: Vec<Vec<String>> = Vec::new();
        let mut placed = 0usize;

        while !wave.is_empty() {
            let mut next = Vec::new();
            for &node in &wave {
                next.extend(self.release(node, &mut in_degree));
            }
            placed += wave.len();
            layers.push(self.owned_ids(&wave));
            // Index order is discovery order.
            next.sort_unstable();
            wave = next;
        }

        if placed < self.node_count() {
            debug!(placed, total = self.node_count(), "layering stalled");
            return Err(self.cycle_error(&in_degree));
        }

        debug!(phases = layers.len(), "layering complete");
        Ok(layers)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
