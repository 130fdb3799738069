#![forbid(unsafe_code)]
//! depwave-core library.
//!
//! Builds a dependency graph from a plan document, sequences it into phases,
//! estimates weighted chain lengths, discovers dependency phrases in free
//! text, and grades the health of each dependency edge.
//!
//! # Conventions
//!
//! - **Errors**: [`error::PlanError`] for domain failures, `anyhow::Result`
//!   for I/O-facing helpers such as config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod analyze;
pub mod config;
pub mod error;
pub mod graph;
pub mod health;
pub mod model;

pub use analyze::{Confidence, Finding, Relationship, TextAnalyzer};
pub use error::{ErrorCode, PlanError};
pub use graph::{CriticalPath, DependencyGraph};
pub use health::{HealthReport, Readiness};
pub use model::{PlanDocument, Status, WorkItem};
