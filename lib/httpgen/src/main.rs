//! `httpgen` command-line entry point.

use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use httpgen::{PlanConfig, TargetRegistry, generate, tokenize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Generate HTTP client code from a curl command line.
#[derive(Debug, Parser)]
#[command(name = "httpgen", version, about)]
struct Cli {
    /// Output target (`json`, `curl`).
    #[arg(short, long, default_value = "json")]
    target: String,

    /// Read the whole curl command from one string instead of arguments.
    #[arg(short, long, conflicts_with = "curl")]
    command: Option<String>,

    /// Log debug information to stderr.
    #[arg(long)]
    debug: bool,

    /// The curl arguments, with or without the leading `curl`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    curl: Vec<String>,
}

fn init_tracing(debug: bool) {
    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let args = match &cli.command {
        Some(command) => tokenize(command)?,
        None => cli.curl,
    };
    anyhow::ensure!(!args.is_empty(), "no curl command given");

    let registry = TargetRegistry::default();
    let output = generate(args, &cli.target, &registry, &PlanConfig::default())?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}").context("cannot write output")?;
    Ok(())
}
