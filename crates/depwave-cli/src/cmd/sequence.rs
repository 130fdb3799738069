//! `depwave sequence`: phased build order.
//!
//! Every item in a phase depends only on items from earlier phases, so a
//! phase can be worked in parallel once the previous one lands.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use depwave_core::config::Config;
use depwave_core::graph::DependencyGraph;
use serde::Serialize;
use tracing::info;

use crate::cmd::critical_path::ChainSummary;
use crate::input::{fail, load_graph};
use crate::output::{OutputMode, pretty_rule, pretty_section, render_mode};

/// Arguments for `depwave sequence`.
#[derive(Args, Debug)]
pub struct SequenceArgs {
    /// Plan document (JSON), or `-` for stdin.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Append the longest weighted dependency chain.
    #[arg(long)]
    pub critical_path: bool,
}

#[derive(Debug, Serialize)]
struct SequenceOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<String>,
    phases: Vec<Vec<String>>,
    /// Ids referenced as dependencies but never declared.
    phantoms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    critical_path: Option<ChainSummary>,
}

/// Execute `depwave sequence`.
pub fn run_sequence(
    args: &SequenceArgs,
    output: OutputMode,
    config: &Config,
) -> anyhow::Result<()> {
    let (doc, graph) = load_graph(&args.file, output)?;
    let phases = graph.layers().map_err(|e| fail(output, &e))?;

    let critical_path = if args.critical_path || config.sequence.show_critical_path {
        let path = graph.critical_path().map_err(|e| fail(output, &e))?;
        Some(ChainSummary::trace(&graph, &path))
    } else {
        None
    };

    info!(
        phases = phases.len(),
        items = graph.node_count(),
        "plan sequenced"
    );

    let payload = SequenceOutput {
        plan: doc.name,
        phases,
        phantoms: graph.phantom_ids().into_iter().map(str::to_string).collect(),
        critical_path,
    };

    render_mode(
        output,
        &payload,
        |p, w| render_sequence_text(p, w),
        |p, w| render_sequence_human(p, &graph, w),
    )
}

fn render_sequence_text(payload: &SequenceOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for (idx, phase) in payload.phases.iter().enumerate() {
        writeln!(w, "Phase {}: {}", idx + 1, phase.join(" "))?;
    }
    if let Some(ref chain) = payload.critical_path {
        writeln!(w, "Critical path: {}", chain.describe())?;
    }
    Ok(())
}

fn render_sequence_human(
    payload: &SequenceOutput,
    graph: &DependencyGraph,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    match payload.plan {
        Some(ref name) => pretty_section(w, &format!("Build sequence: {name}"))?,
        None => pretty_section(w, "Build sequence")?,
    }

    if payload.phases.is_empty() {
        writeln!(w, "(no items)")?;
        return Ok(());
    }

    for (idx, phase) in payload.phases.iter().enumerate() {
        if idx > 0 {
            writeln!(w)?;
        }
        writeln!(w, "Phase {}:", idx + 1)?;
        for id in phase {
            match graph.node(id) {
                Some(node) if node.is_phantom() => writeln!(w, "  {id}  (external)")?,
                Some(node) => match node.summary {
                    Some(ref summary) => writeln!(w, "  {id}  {summary}")?,
                    None => writeln!(w, "  {id}")?,
                },
                None => writeln!(w, "  {id}")?,
            }
        }
    }

    if let Some(ref chain) = payload.critical_path {
        writeln!(w)?;
        pretty_rule(w)?;
        writeln!(w, "Critical path: {}", chain.describe())?;
    }
    Ok(())
}
