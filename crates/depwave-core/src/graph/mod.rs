//! Dependency graph module for sequencing computation.
//!
//! # Overview
//!
//! This module turns an ordered list of [`WorkItem`](crate::model::WorkItem)s
//! into a petgraph-backed directed graph and runs the sequencing operations
//! over it. A fresh graph is built per request; nothing is mutated after
//! construction.
//!
//! ## Pipeline
//!
//! ```text
//! PlanDocument.items
//!        ↓  build::DependencyGraph::from_items()
//! DependencyGraph (edges dependency → dependent, phantoms included)
//!        ├─ order::topological_sort()   flat Kahn order
//!        ├─ order::layers()             phased wavefront
//!        └─ critical_path::critical_path()  longest weighted chain per node
//! ```
//!
//! Any operation that cannot place every node fails with
//! [`PlanError::CycleDetected`](crate::error::PlanError::CycleDetected).
//!
//! ## Typical Usage
//!
//! ```rust
//! use depwave_core::graph::DependencyGraph;
//! use depwave_core::model::WorkItem;
//!
//! let items = vec![
//!     WorkItem::new("A", Vec::<String>::new()),
//!     WorkItem::new("B", ["A"]),
//!     WorkItem::new("C", ["A"]),
//!     WorkItem::new("D", ["B", "C"]),
//! ];
//! let graph = DependencyGraph::from_items(&items)?;
//! assert_eq!(graph.layers()?, vec![vec!["A"], vec!["B", "C"], vec!["D"]]);
//! # Ok::<(), depwave_core::error::PlanError>(())
//! ```

pub mod build;
pub mod critical_path;
pub mod cycles;
pub mod order;

// Re-export primary types at module level for convenience.
pub use build::{DependencyGraph, Node};
pub use critical_path::{ChainEstimate, CriticalPath, trace_longest_chain};
