//! `depwave critical-path`: weighted longest chain ending at every item.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use depwave_core::graph::{ChainEstimate, CriticalPath, DependencyGraph, trace_longest_chain};
use serde::Serialize;
use tracing::info;

use crate::input::{fail, load_graph};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `depwave critical-path`.
#[derive(Args, Debug)]
pub struct CriticalPathArgs {
    /// Plan document (JSON), or `-` for stdin.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// The traced longest chain and its weighted length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSummary {
    pub chain: Vec<String>,
    pub length: u64,
}

impl ChainSummary {
    pub fn trace(graph: &DependencyGraph, path: &CriticalPath) -> Self {
        Self {
            chain: trace_longest_chain(graph, path),
            length: path.total_length(),
        }
    }

    /// `A -> B -> C (length 7)`, or `(empty plan)`.
    pub fn describe(&self) -> String {
        if self.chain.is_empty() {
            return "(empty plan)".to_string();
        }
        format!("{} (length {})", self.chain.join(" -> "), self.length)
    }
}

#[derive(Debug, Serialize)]
struct CriticalPathOutput {
    estimates: Vec<ChainEstimate>,
    #[serde(flatten)]
    longest: ChainSummary,
}

/// Execute `depwave critical-path`.
pub fn run_critical_path(args: &CriticalPathArgs, output: OutputMode) -> anyhow::Result<()> {
    let (_, graph) = load_graph(&args.file, output)?;
    let path = graph.critical_path().map_err(|e| fail(output, &e))?;
    let longest = ChainSummary::trace(&graph, &path);
    info!(length = longest.length, "critical path computed");

    let payload = CriticalPathOutput {
        estimates: path.estimates,
        longest,
    };

    render_mode(
        output,
        &payload,
        |p, w| render_critical_path_text(p, w),
        |p, w| render_critical_path_human(p, w),
    )
}

fn render_critical_path_text(
    payload: &CriticalPathOutput,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    writeln!(w, "id  weight  distance  finish")?;
    for e in &payload.estimates {
        writeln!(w, "{}  {}  {}  {}", e.id, e.weight, e.distance, e.finish)?;
    }
    writeln!(w, "chain: {}", payload.longest.describe())
}

fn render_critical_path_human(
    payload: &CriticalPathOutput,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    pretty_section(w, "Chain estimates")?;
    if payload.estimates.is_empty() {
        writeln!(w, "(no items)")?;
        return Ok(());
    }

    let width = payload
        .estimates
        .iter()
        .map(|e| e.id.len())
        .max()
        .unwrap_or(0)
        .max(2);
    writeln!(w, "{:<width$}  {:>6}  {:>8}  {:>6}", "id", "weight", "distance", "finish")?;
    for e in &payload.estimates {
        writeln!(
            w,
            "{:<width$}  {:>6}  {:>8}  {:>6}",
            e.id, e.weight, e.distance, e.finish
        )?;
    }

    writeln!(w)?;
    pretty_kv(w, "longest", payload.longest.chain.join(" -> "))?;
    pretty_kv(w, "length", payload.longest.length.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use depwave_core::model::WorkItem;

    fn payload() -> CriticalPathOutput {
        let items = [
            WorkItem::new("A", Vec::<String>::new()).with_points(2),
            WorkItem::new("B", ["A"]).with_points(3),
            WorkItem::new("C", ["A"]),
        ];
        let graph = DependencyGraph::from_items(&items).expect("graph");
        let path = graph.critical_path().expect("critical path");
        let longest = ChainSummary::trace(&graph, &path);
        CriticalPathOutput {
            estimates: path.estimates,
            longest,
        }
    }

    #[test]
    fn critical_path_args_parse_file() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: CriticalPathArgs,
        }

        let parsed = Wrapper::parse_from(["test", "plan.json"]);
        assert_eq!(parsed.args.file, PathBuf::from("plan.json"));
    }

    #[test]
    fn chain_summary_traces_heaviest_chain() {
        let payload = payload();
        assert_eq!(payload.longest.chain, vec!["A", "B"]);
        assert_eq!(payload.longest.length, 5);
        assert_eq!(payload.longest.describe(), "A -> B (length 5)");
    }

    #[test]
    fn empty_chain_is_described() {
        let summary = ChainSummary {
            chain: Vec::new(),
            length: 0,
        };
        assert_eq!(summary.describe(), "(empty plan)");
    }

    #[test]
    fn render_text_lists_each_estimate() {
        let mut out = Vec::new();
        render_critical_path_text(&payload(), &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines,
            vec![
                "id  weight  distance  finish",
                "A  2  0  2",
                "B  3  2  5",
                "C  1  2  3",
                "chain: A -> B (length 5)",
            ]
        );
    }

    #[test]
    fn render_human_shows_longest_chain() {
        let mut out = Vec::new();
        render_critical_path_human(&payload(), &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.starts_with("Chain estimates\n"));
        assert!(rendered.contains("longest:     A -> B"));
        assert!(rendered.contains("length:      5"));
    }

    #[test]
    fn json_payload_flattens_chain() {
        let value = serde_json::to_value(payload()).expect("json");
        assert_eq!(value["length"], 5);
        assert_eq!(value["chain"][1], "B");
        assert_eq!(value["estimates"][2]["distance"], 2);
    }
}
