#![forbid(unsafe_code)]

mod cmd;
mod input;
mod output;

use clap::{Parser, Subcommand};
use depwave_core::config::{Config, resolve_config};
use depwave_core::error::ErrorCode;
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "depwave: dependency sequencing for delivery plans",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    format: Option<OutputMode>,

    /// Emit JSON output (alias for `--format json`).
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file (default: ./depwave.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags and the environment.
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Sequencing",
        about = "Group items into parallel build phases",
        long_about = "Group items into build phases. Every item depends only on items from earlier phases.",
        after_help = "EXAMPLES:\n    # Phase a plan\n    depwave sequence plan.json\n\n    # Include the longest weighted chain\n    depwave sequence plan.json --critical-path\n\n    # Read the plan from stdin and emit JSON\n    cat plan.json | depwave sequence - --format json"
    )]
    Sequence(cmd::sequence::SequenceArgs),

    #[command(
        next_help_heading = "Sequencing",
        about = "Print a flat build order",
        long_about = "Print every item, phantom dependencies included, in an order that respects all dependencies.",
        after_help = "EXAMPLES:\n    # Flat order, one id per line\n    depwave order plan.json --format text"
    )]
    Order(cmd::order::OrderArgs),

    #[command(
        next_help_heading = "Sequencing",
        about = "Estimate the weighted longest chain per item",
        long_about = "Report, for every item, the weighted length of the longest chain of dependencies ending at it.",
        after_help = "EXAMPLES:\n    # Per-item estimates and the longest chain\n    depwave critical-path plan.json"
    )]
    CriticalPath(cmd::critical_path::CriticalPathArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Find dependency mentions in text",
        long_about = "Scan a story description for dependency phrases and architectural keywords.",
        after_help = "EXAMPLES:\n    # Analyze literal text\n    depwave discover \"This feature depends on CORE-456 and requires DB-2\"\n\n    # Analyze a file\n    depwave discover story.txt --format json"
    )]
    Discover(cmd::discover::DiscoverArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Grade every dependency as conflict, risk or healthy",
        after_help = "EXAMPLES:\n    # Dependency health for a sprint plan\n    depwave health sprint.json"
    )]
    Health(cmd::health::HealthArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Go / no-go verdict for starting the plan",
        after_help = "EXAMPLES:\n    # Readiness verdict with conditions\n    depwave readiness sprint.json"
    )]
    Readiness(cmd::readiness::ReadinessArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DEPWAVE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "depwave=debug,info"
        } else {
            "depwave=info,warn"
        })
    });

    let format = env::var("DEPWAVE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_config(cli: &Cli, output: OutputMode) -> anyhow::Result<Config> {
    let cwd = env::current_dir()?;
    match resolve_config(&cwd, cli.config.as_deref()) {
        Ok(config) => Ok(config),
        Err(e) => {
            let code = ErrorCode::ConfigParseError;
            render_error(
                output,
                &CliError::with_details(
                    format!("{e:#}"),
                    code.hint().unwrap_or_default(),
                    code.code(),
                ),
            )?;
            Err(e)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    debug!(?output, json = output.is_json(), "output mode resolved");
    let config = load_config(&cli, output)?;

    match cli.command {
        Commands::Sequence(ref args) => cmd::sequence::run_sequence(args, output, &config),
        Commands::Order(ref args) => cmd::order::run_order(args, output),
        Commands::CriticalPath(ref args) => cmd::critical_path::run_critical_path(args, output),
        Commands::Discover(ref args) => {
            cmd::discover::run_discover(args, output, &config.discover)
        }
        Commands::Health(ref args) => cmd::health::run_health(args, output),
        Commands::Readiness(ref args) => cmd::readiness::run_readiness(args, output),
    }
}
