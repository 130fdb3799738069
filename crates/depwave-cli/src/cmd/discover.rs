//! `depwave discover`: find dependency mentions in free text.
//!
//! `INPUT` is read as a file when such a path exists, from stdin when it is
//! `-`, and is otherwise analyzed as literal text.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::Context;
use clap::Args;
use depwave_core::analyze::{Finding, TextAnalyzer};
use depwave_core::config::DiscoverConfig;
use depwave_core::error::ErrorCode;
use serde::Serialize;
use tracing::{debug, info};

use crate::input::STDIN_MARKER;
use crate::output::{CliError, OutputMode, pretty_section, render_error, render_mode};

/// Arguments for `depwave discover`.
#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Text to scan, a path to a text file, or `-` for stdin.
    #[arg(value_name = "INPUT")]
    pub input: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Source {
    File,
    Stdin,
    Text,
}

#[derive(Debug, Serialize)]
struct DiscoverOutput {
    source: Source,
    findings: Vec<Finding>,
}

/// Execute `depwave discover`.
pub fn run_discover(
    args: &DiscoverArgs,
    output: OutputMode,
    config: &DiscoverConfig,
) -> anyhow::Result<()> {
    let analyzer = match TextAnalyzer::from_config(config) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            let msg = format!("invalid [discover.couplings] keyword: {e}");
            render_error(
                output,
                &CliError::with_details(
                    &msg,
                    ErrorCode::ConfigParseError.hint().unwrap_or_default(),
                    ErrorCode::ConfigParseError.code(),
                ),
            )?;
            anyhow::bail!("{msg}");
        }
    };

    let (source, text) = read_input(&args.input)?;
    debug!(?source, len = text.len(), "scanning input");

    let findings = analyzer.find_dependencies(&text);
    info!(findings = findings.len(), "discovery complete");

    render_mode(
        output,
        &DiscoverOutput { source, findings },
        |p, w| render_discover_human(p, OutputMode::Text, w),
        |p, w| render_discover_human(p, OutputMode::Pretty, w),
    )
}

fn read_input(input: &str) -> anyhow::Result<(Source, String)> {
    if input == STDIN_MARKER {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok((Source::Stdin, text));
    }

    let path = Path::new(input);
    if path.is_file() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok((Source::File, text));
    }

    Ok((Source::Text, input.to_string()))
}

fn render_discover_human(
    payload: &DiscoverOutput,
    mode: OutputMode,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    if mode == OutputMode::Pretty {
        pretty_section(w, &format!("Discovered dependencies ({})", payload.findings.len()))?;
        if payload.findings.is_empty() {
            writeln!(w, "(none found)")?;
        }
    }

    for f in &payload.findings {
        writeln!(w, "[{}] {}: {}", f.confidence, f.relationship, f.target)?;
        if mode == OutputMode::Pretty {
            writeln!(w, "    evidence: {}", f.evidence)?;
        }
    }
    Ok(())
}
