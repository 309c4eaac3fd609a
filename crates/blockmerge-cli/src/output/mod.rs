//! Output formatting for command results.

use clap::ValueEnum;

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tables with colors
    #[default]
    Pretty,
    /// JSON output
    Json,
}
