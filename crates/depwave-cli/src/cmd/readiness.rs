//! `depwave readiness`: go / conditional go / no-go for starting the plan.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use depwave_core::health::{HealthReport, Readiness, Verdict};
use serde::Serialize;
use tracing::info;

use crate::input::load_graph;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `depwave readiness`.
#[derive(Args, Debug)]
pub struct ReadinessArgs {
    /// Plan document (JSON), or `-` for stdin.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct ReadinessOutput {
    #[serde(flatten)]
    readiness: Readiness,
    conflicts: usize,
    risks: usize,
    healthy: usize,
}

impl ReadinessOutput {
    fn from_report(report: &HealthReport) -> Self {
        Self {
            readiness: Readiness::assess(report),
            conflicts: report.conflicts.len(),
            risks: report.risks.len(),
            healthy: report.healthy.len(),
        }
    }
}

/// Execute `depwave readiness`.
pub fn run_readiness(args: &ReadinessArgs, output: OutputMode) -> anyhow::Result<()> {
    let (_, graph) = load_graph(&args.file, output)?;
    let payload = ReadinessOutput::from_report(&HealthReport::from_graph(&graph));
    info!(verdict = payload.readiness.verdict.label(), "readiness assessed");

    render_mode(
        output,
        &payload,
        |p, w| render_readiness_text(p, w),
        |p, w| render_readiness_human(p, w),
    )
}

fn render_readiness_text(payload: &ReadinessOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}", payload.readiness.verdict.label())?;
    for condition in &payload.readiness.conditions {
        writeln!(w, "- {condition}")?;
    }
    Ok(())
}

fn render_readiness_human(payload: &ReadinessOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Sprint readiness")?;
    pretty_kv(w, "verdict", payload.readiness.verdict.label())?;
    pretty_kv(
        w,
        "findings",
        format!(
            "{} conflict(s), {} risk(s), {} healthy",
            payload.conflicts, payload.risks, payload.healthy
        ),
    )?;

    if payload.readiness.conditions.is_empty() {
        return Ok(());
    }

    let heading = match payload.readiness.verdict {
        Verdict::NoGo => "Must resolve",
        Verdict::ConditionalGo | Verdict::Go => "Conditions",
    };
    writeln!(w)?;
    pretty_section(w, heading)?;
    for condition in &payload.readiness.conditions {
        writeln!(w, "  - {condition}")?;
    }
    Ok(())
}
