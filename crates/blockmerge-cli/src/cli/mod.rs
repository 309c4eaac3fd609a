//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::{Context as _, Result};
use args::{Cli, Commands};
use blockmerge_engine::Config;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    debug!(config = %cli.config.display(), output_dir = %config.output_dir.display(), "configuration loaded");

    let ctx = commands::Context {
        config,
        output_format: cli.format,
    };

    match cli.command {
        Commands::Run(args) => commands::run::execute(ctx, args).await,
        Commands::Resolve(args) => commands::resolve::execute(ctx, args).await,
    }
}

/// Log to stderr so command output on stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
