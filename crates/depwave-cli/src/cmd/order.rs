//! `depwave order`: flat build order.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::input::{fail, load_graph};
use crate::output::{OutputMode, pretty_section, render_mode};

/// Arguments for `depwave order`.
#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Plan document (JSON), or `-` for stdin.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct OrderOutput {
    order: Vec<String>,
}

/// Execute `depwave order`.
pub fn run_order(args: &OrderArgs, output: OutputMode) -> anyhow::Result<()> {
    let (_, graph) = load_graph(&args.file, output)?;
    let order = graph.topological_sort().map_err(|e| fail(output, &e))?;
    info!(items = order.len(), "build order computed");

    render_mode(
        output,
        &OrderOutput { order },
        |p, w| render_order_text(p, w),
        |p, w| render_order_human(p, w),
    )
}

fn render_order_text(payload: &OrderOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for id in &payload.order {
        writeln!(w, "{id}")?;
    }
    Ok(())
}

fn render_order_human(payload: &OrderOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Build order ({} items)", payload.order.len()))?;
    let width = payload.order.len().to_string().len();
    for (idx, id) in payload.order.iter().enumerate() {
        writeln!(w, "{:>width$}. {id}", idx + 1)?;
    }
    Ok(())
}
