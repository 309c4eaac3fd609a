//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Consolidate DNS blocklists and allowlists and resolve their conflicts.
///
/// Reads the processed-file records written by the processing stage,
/// merges them per scope (general, size groups, categories) and decides
/// every entry listed on both sides by source counts and manual overrides.
#[derive(Parser, Debug)]
#[command(name = "blockmerge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (missing file means defaults)
    #[arg(
        short,
        long,
        env = "BLOCKMERGE_CONFIG",
        default_value = "blockmerge.toml",
        global = true
    )]
    pub config: PathBuf,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Consolidate every scope and resolve conflicts
    Run(RunArgs),

    /// Resolve conflicts only and print the audit trail
    Resolve(ResolveArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Processed-file records (JSON array)
    #[arg(short, long)]
    pub processed: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Checksum every written list
    #[arg(long)]
    pub checksum: bool,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Processed-file records (JSON array)
    #[arg(short, long)]
    pub processed: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "blockmerge",
            "-v",
            "run",
            "--processed",
            "p.json",
            "--checksum",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.processed, Some(PathBuf::from("p.json")));
                assert!(args.output.is_none());
                assert!(args.checksum);
            }
            Commands::Resolve(_) => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_format() {
        let cli = Cli::try_parse_from(["blockmerge", "resolve", "--format", "json"]).unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(Cli::try_parse_from(["blockmerge", "--format", "yaml", "resolve"]).is_err());
    }
}
