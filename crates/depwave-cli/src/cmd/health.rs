//! `depwave health`: grade every dependency edge.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use depwave_core::health::{HealthFinding, HealthReport, Severity};
use tracing::info;

use crate::input::load_graph;
use crate::output::{OutputMode, pretty_section, render_mode};

/// Arguments for `depwave health`.
#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Plan document (JSON), or `-` for stdin.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Execute `depwave health`.
///
/// Cycles are reported as conflicts rather than failing the command.
pub fn run_health(args: &HealthArgs, output: OutputMode) -> anyhow::Result<()> {
    let (_, graph) = load_graph(&args.file, output)?;
    let report = HealthReport::from_graph(&graph);
    info!(
        conflicts = report.conflicts.len(),
        risks = report.risks.len(),
        healthy = report.healthy.len(),
        "health report ready"
    );

    render_mode(
        output,
        &report,
        |r, w| render_health_text(r, w),
        |r, w| render_health_human(r, w),
    )
}

const fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Conflict => "conflict",
        Severity::Risk => "risk",
        Severity::Healthy => "healthy",
    }
}

/// `ITEM <- DEP` for edge findings, `ITEM` for cycle findings.
fn edge_label(finding: &HealthFinding) -> String {
    match finding.dependency {
        Some(ref dep) => format!("{} <- {dep}", finding.item),
        None => finding.item.clone(),
    }
}

fn all_findings(report: &HealthReport) -> impl Iterator<Item = &HealthFinding> {
    report
        .conflicts
        .iter()
        .chain(&report.risks)
        .chain(&report.healthy)
}

fn render_health_text(report: &HealthReport, w: &mut dyn Write) -> std::io::Result<()> {
    for f in all_findings(report) {
        writeln!(
            w,
            "{} {}: {}",
            severity_label(f.severity),
            edge_label(f),
            f.reason
        )?;
    }
    Ok(())
}

fn render_health_human(report: &HealthReport, w: &mut dyn Write) -> std::io::Result<()> {
    let groups = [
        ("Conflicts", &report.conflicts),
        ("Risks", &report.risks),
        ("Healthy", &report.healthy),
    ];

    for (idx, (heading, findings)) in groups.iter().enumerate() {
        if idx > 0 {
            writeln!(w)?;
        }
        pretty_section(w, &format!("{heading} ({})", findings.len()))?;
        if findings.is_empty() {
            writeln!(w, "(none)")?;
        }
        for f in findings.iter() {
            writeln!(w, "  {}  {}", edge_label(f), f.reason)?;
        }
    }
    Ok(())
}
