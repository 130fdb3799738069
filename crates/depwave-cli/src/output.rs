//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact text for agents and pipes,
//! or stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / hidden `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use depwave_core::error::PlanError;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 60;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, one entry per line).
    Pretty,
    /// Token-efficient plain text for agents and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    pub fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Returns `true` if pretty output was requested.
    #[cfg(test)]
    pub fn is_pretty(self) -> bool {
        matches!(self, Self::Pretty)
    }

    /// Returns `true` if text output was requested.
    #[cfg(test)]
    pub fn is_text(self) -> bool {
        matches!(self, Self::Text)
    }
}

/// Core resolution logic, separated from I/O for testability.
///
/// `format_flag`: explicit `--format` value if provided.
/// `json_flag`: hidden `--json` alias.
/// `format_env`: the value of `FORMAT` if set.
/// `is_tty`: true if stdout is a TTY.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if json_flag {
        return OutputMode::Json;
    }

    if let Some(val) = format_env {
        match val.to_lowercase().as_str() {
            "json" => return OutputMode::Json,
            "text" => return OutputMode::Text,
            "pretty" => return OutputMode::Pretty,
            _ => {} // unknown value, fall through to TTY detection
        }
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from CLI flags, environment, and TTY defaults.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(format_flag, json_flag, env_val.as_deref(), is_tty)
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E2003").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Offending node ids, e.g. the members of each dependency cycle.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Vec<String>>,
}

impl CliError {
    /// Create a simple error with just a message.
    #[cfg(test)]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
            details: Vec::new(),
        }
    }

    /// Create an error with a suggestion and error code.
    pub fn with_details(
        message: impl Into<String>,
        suggestion: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            suggestion: Some(suggestion.into()),
            error_code: Some(error_code.into()),
            details: Vec::new(),
        }
    }
}

/// Convert a [`PlanError`] into a [`CliError`].
///
/// A cycle becomes a `FATAL:` message naming every loop found.
impl From<&PlanError> for CliError {
    fn from(err: &PlanError) -> Self {
        let code = err.code();
        let (message, details) = match err {
            PlanError::CycleDetected { unresolved, cycles } => {
                let loops = if cycles.is_empty() {
                    unresolved.join(", ")
                } else {
                    cycles
                        .iter()
                        .map(|cycle| cycle.join(" <-> "))
                        .collect::<Vec<_>>()
                        .join("; ")
                };
                (
                    format!(
                        "FATAL: dependency cycle detected among {loops} ({} item(s) could not be ordered)",
                        unresolved.len()
                    ),
                    cycles.clone(),
                )
            }
            PlanError::MalformedInput(_) => (err.to_string(), Vec::new()),
        };
        Self {
            message,
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
            details,
        }
    }
}

fn write_value<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, out)?,
        OutputMode::Pretty => pretty_fn(value, out)?,
    }
    Ok(())
}

/// Render a command payload to stdout: JSON is serialized directly, text and
/// pretty each get their own renderer.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_value(mode, value, text_fn, pretty_fn, &mut out)
}

/// Write an error in the requested format.
///
/// In JSON mode, outputs `{"error": {"message": "...", "suggestion": "...", "error_code": "..."}}`.
/// In human mode, outputs `error: <message>\n  suggestion: <suggestion>`.
fn write_error(mode: OutputMode, error: &CliError, out: &mut dyn Write) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(mode, error, &mut out)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── OutputMode ──────────────────────────────────────────────────────────

    #[test]
    fn output_mode_is_json() {
        assert!(OutputMode::Json.is_json());
        assert!(!OutputMode::Pretty.is_json());
        assert!(!OutputMode::Text.is_json());
    }

    #[test]
    fn output_mode_pretty_and_text() {
        assert!(OutputMode::Pretty.is_pretty());
        assert!(OutputMode::Text.is_text());
        assert!(!OutputMode::Json.is_text());
    }

    // ── resolve_output_mode_inner ───────────────────────────────────────────

    #[test]
    fn resolve_format_flag_wins_over_json_and_env() {
        let mode = resolve_output_mode_inner(Some(OutputMode::Text), true, Some("pretty"), true);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn resolve_json_flag_wins_over_env() {
        let mode = resolve_output_mode_inner(None, true, Some("text"), false);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn resolve_format_env_values() {
        assert_eq!(
            resolve_output_mode_inner(None, false, Some("json"), true),
            OutputMode::Json
        );
        assert_eq!(
            resolve_output_mode_inner(None, false, Some("text"), true),
            OutputMode::Text
        );
        assert_eq!(
            resolve_output_mode_inner(None, false, Some("pretty"), false),
            OutputMode::Pretty
        );
    }

    #[test]
    fn resolve_format_env_case_insensitive() {
        let mode = resolve_output_mode_inner(None, false, Some("JSON"), true);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn resolve_format_env_unknown_falls_through_to_tty() {
        let mode = resolve_output_mode_inner(None, false, Some("yaml"), true);
        assert_eq!(mode, OutputMode::Pretty);
        let mode = resolve_output_mode_inner(None, false, Some("yaml"), false);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn resolve_default_depends_on_tty() {
        assert_eq!(
            resolve_output_mode_inner(None, false, None, true),
            OutputMode::Pretty
        );
        assert_eq!(
            resolve_output_mode_inner(None, false, None, false),
            OutputMode::Text
        );
    }

    // ── Pretty helpers ──────────────────────────────────────────────────────

    #[test]
    fn pretty_section_underlines_heading() {
        let mut out = Vec::new();
        pretty_section(&mut out, "Phase 1").expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("Phase 1"));
        assert_eq!(lines.next().map(str::len), Some(PRETTY_RULE_WIDTH));
    }

    #[test]
    fn pretty_kv_aligns_values() {
        let mut out = Vec::new();
        pretty_kv(&mut out, "verdict", "GO").expect("render");
        assert_eq!(String::from_utf8(out).expect("utf8"), "verdict:     GO\n");
    }

    // ── CliError ────────────────────────────────────────────────────────────

    #[test]
    fn cli_error_simple() {
        let err = CliError::new("something went wrong");
        assert_eq!(err.message, "something went wrong");
        assert!(err.suggestion.is_none());
        assert!(err.error_code.is_none());
    }

    #[test]
    fn cli_error_with_details() {
        let err = CliError::with_details("plan not found", "pass `-` for stdin", "E1001");
        assert_eq!(err.message, "plan not found");
        assert_eq!(err.suggestion.as_deref(), Some("pass `-` for stdin"));
        assert_eq!(err.error_code.as_deref(), Some("E1001"));
    }

    #[test]
    fn cli_error_from_cycle_names_the_loop() {
        let err = PlanError::CycleDetected {
            unresolved: vec!["X".into(), "Y".into(), "Z".into()],
            cycles: vec![vec!["X".into(), "Y".into()]],
        };
        let cli_err = CliError::from(&err);
        assert!(cli_err.message.starts_with("FATAL: dependency cycle detected"));
        assert!(cli_err.message.contains("X <-> Y"));
        assert!(cli_err.message.contains("3 item(s)"));
        assert_eq!(cli_err.error_code.as_deref(), Some("E2003"));
        assert_eq!(cli_err.details, vec![vec!["X".to_string(), "Y".to_string()]]);
    }

    #[test]
    fn cli_error_from_malformed_input() {
        let err = PlanError::MalformedInput("item #2: missing field `id`".into());
        let cli_err = CliError::from(&err);
        assert_eq!(cli_err.message, "malformed input: item #2: missing field `id`");
        assert_eq!(cli_err.error_code.as_deref(), Some("E2001"));
        assert!(cli_err.suggestion.is_some());
        assert!(cli_err.details.is_empty());
    }

    // ── render_mode / render_error ──────────────────────────────────────────

    #[derive(Serialize)]
    struct Sample {
        val: u32,
    }

    fn write_sample(mode: OutputMode) -> String {
        let mut out = Vec::new();
        write_value(
            mode,
            &Sample { val: 99 },
            |d, w| writeln!(w, "val={}", d.val),
            |d, w| writeln!(w, "Value: {}", d.val),
            &mut out,
        )
        .expect("render");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn write_value_picks_renderer_per_mode() {
        assert_eq!(write_sample(OutputMode::Text), "val=99\n");
        assert_eq!(write_sample(OutputMode::Pretty), "Value: 99\n");
    }

    #[test]
    fn write_value_json_ignores_renderers() {
        let value: serde_json::Value =
            serde_json::from_str(&write_sample(OutputMode::Json)).expect("json");
        assert_eq!(value, serde_json::json!({"val": 99}));
    }

    #[test]
    fn write_error_json_wraps_payload() {
        let err = CliError::with_details("bad input", "try again", "E2001");
        let mut out = Vec::new();
        write_error(OutputMode::Json, &err, &mut out).expect("render");
        let value: serde_json::Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(value["error"]["message"], "bad input");
        assert_eq!(value["error"]["error_code"], "E2001");
        assert!(value["error"].get("details").is_none());
    }

    #[test]
    fn write_error_human_includes_suggestion() {
        let err = CliError::with_details("bad input", "try again", "E2001");
        let mut out = Vec::new();
        write_error(OutputMode::Pretty, &err, &mut out).expect("render");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "error: bad input\n  suggestion: try again\n"
        );
    }
}
