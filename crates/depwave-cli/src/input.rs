//! Plan input: a path on disk or `-` for stdin.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use depwave_core::error::{ErrorCode, PlanError};
use depwave_core::graph::DependencyGraph;
use depwave_core::model::PlanDocument;
use tracing::debug;

use crate::output::{CliError, OutputMode, render_error};

/// Path argument meaning "read from stdin".
pub const STDIN_MARKER: &str = "-";

/// Read and parse the plan document at `source`.
///
/// Failures are rendered through [`render_error`] before being returned, so
/// callers only need to propagate.
pub fn read_plan(source: &Path, output: OutputMode) -> anyhow::Result<PlanDocument> {
    let parsed = if source.as_os_str() == STDIN_MARKER {
        debug!("reading plan from stdin");
        PlanDocument::from_reader(io::stdin().lock())
    } else {
        let file = match File::open(source) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let code = ErrorCode::InputNotFound;
                render_error(
                    output,
                    &CliError::with_details(
                        format!("plan file not found: {}", source.display()),
                        code.hint().unwrap_or_default(),
                        code.code(),
                    ),
                )?;
                anyhow::bail!("plan file not found: {}", source.display());
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to open {}", source.display())));
            }
        };
        debug!(path = %source.display(), "reading plan file");
        PlanDocument::from_reader(BufReader::new(file))
    };

    parsed.map_err(|e| fail(output, &e))
}

/// Read the plan at `source` and build its dependency graph.
pub fn load_graph(
    source: &Path,
    output: OutputMode,
) -> anyhow::Result<(PlanDocument, DependencyGraph)> {
    let doc = read_plan(source, output)?;
    let graph = DependencyGraph::from_document(&doc).map_err(|e| fail(output, &e))?;
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        phantoms = graph.phantom_ids().len(),
        "plan loaded"
    );
    Ok((doc, graph))
}

/// Render `err` to stderr and turn it into the error returned from `main`.
pub fn fail(output: OutputMode, err: &PlanError) -> anyhow::Error {
    if let Err(render_err) = render_error(output, &CliError::from(err)) {
        return render_err;
    }
    anyhow::Error::new(err.clone())
}
