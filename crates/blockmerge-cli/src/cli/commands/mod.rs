//! Command implementations.

pub mod resolve;
pub mod run;

use anyhow::{Context as _, Result};
use blockmerge_core::ProcessedFile;
use blockmerge_engine::{input, Config};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration
    pub config: Config,

    /// Output format, if one was requested
    pub output_format: Option<OutputFormat>,
}

impl Context {
    /// Load processed-file records, preferring an explicit path over config.
    pub fn processed_files(&self, path: Option<PathBuf>) -> Result<Vec<ProcessedFile>> {
        let path = path.unwrap_or_else(|| self.config.processed_files.clone());
        input::load_processed_files(&path)
            .with_context(|| format!("loading processed files from {}", path.display()))
    }
}
