//! Dependency health and sprint readiness.
//!
//! Every edge `dependency → item` is graded:
//!
//! | dependency state              | severity   |
//! |-------------------------------|------------|
//! | `done`                        | Healthy    |
//! | `blocked`                     | Conflict   |
//! | phantom (not in the plan)     | Risk       |
//! | anything else                 | Risk       |
//!
//! Items that are themselves `done` are skipped. When the graph contains a
//! cycle, every node that can never be ordered also gets a Conflict.
//!
//! The readiness verdict follows from the report: any conflict is a no-go,
//! risks alone are a conditional go, otherwise go.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::PlanError;
use crate::graph::DependencyGraph;
use crate::model::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Conflict,
    Risk,
    Healthy,
}

/// One graded dependency (or cycle membership).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthFinding {
    pub item: String,
    /// The dependency being graded; `None` for cycle findings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency: Option<String>,
    pub severity: Severity,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub conflicts: Vec<HealthFinding>,
    pub risks: Vec<HealthFinding>,
    pub healthy: Vec<HealthFinding>,
}

impl HealthReport {
    /// Grade every dependency edge of `graph`.
    #[must_use]
    #[instrument(skip(graph), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
    pub fn from_graph(graph: &DependencyGraph) -> Self {
        let mut report = Self::default();

        for (dep, item) in graph.edges() {
            if item.status == Some(Status::Done) {
                continue;
            }

            let (severity, reason) = if dep.is_phantom() {
                (Severity::Risk, "external dependency, status unknown")
            } else {
                match dep.status {
                    Some(Status::Done) => (Severity::Healthy, "dependency is done"),
                    Some(Status::Blocked) => (Severity::Conflict, "dependency is blocked"),
                    _ => (Severity::Risk, "dependency is still open in the same plan"),
                }
            };

            report.push(HealthFinding {
                item: item.id.clone(),
                dependency: Some(dep.id.clone()),
                severity,
                reason: reason.to_string(),
            });
        }

        if let Err(PlanError::CycleDetected { unresolved, .. }) = graph.topological_sort() {
            for id in unresolved {
                report.push(HealthFinding {
                    item: id,
                    dependency: None,
                    severity: Severity::Conflict,
                    reason: "part of or blocked by a dependency cycle".to_string(),
                });
            }
        }

        debug!(
            conflicts = report.conflicts.len(),
            risks = report.risks.len(),
            healthy = report.healthy.len(),
            "health check complete"
        );
        report
    }

    fn push(&mut self, finding: HealthFinding) {
        match finding.severity {
            Severity::Conflict => self.conflicts.push(finding),
            Severity::Risk => self.risks.push(finding),
            Severity::Healthy => self.healthy.push(finding),
        }
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.risks.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Readiness
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Go,
    ConditionalGo,
    NoGo,
}

impl Verdict {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Go => "GO",
            Self::ConditionalGo => "CONDITIONAL GO",
            Self::NoGo => "NO-GO",
        }
    }
}

/// Go / no-go assessment derived from a [`HealthReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub verdict: Verdict,
    /// What must be resolved (no-go) or confirmed (conditional go).
    pub conditions: Vec<String>,
}

impl Readiness {
    #[must_use]
    pub fn assess(report: &HealthReport) -> Self {
        if report.is_clean() {
            return Self {
                verdict: Verdict::Go,
                conditions: Vec::new(),
            };
        }
        if report.conflicts.is_empty() {
            return Self {
                verdict: Verdict::ConditionalGo,
                conditions: report.risks.iter().map(describe).collect(),
            };
        }
        Self {
            verdict: Verdict::NoGo,
            conditions: report.conflicts.iter().map(describe).collect(),
        }
    }
}

fn describe(finding: &HealthFinding) -> String {
    match (&finding.dependency, finding.severity) {
        (Some(dep), Severity::Conflict) => {
            format!("Unblock {dep} before starting {}", finding.item)
        }
        (Some(dep), _) => format!("Confirm {dep} lands before {} starts", finding.item),
        (None, _) => format!("Break the dependency cycle involving {}", finding.item),
    }
}
