//! # blockmerge-engine
//!
//! Consolidates per-source DNS blocklists and allowlists into deduplicated
//! lists per scope, then resolves block/allow conflicts across all sources.
//!
//! ```text
//! processed_files.json
//!   -> input::load_processed_files()
//!   -> pipeline::run()
//!        per scope (general, groups, categories), one blocking worker:
//!          Orchestrator: allowlists first, blocklists minus allow entries
//!          -> consolidated*/{id}_{type}_{list}.txt + summaries
//!        alongside, one blocking worker:
//!          resolve(): source maps -> counts -> manual overrides -> audit
//!          -> resolved/{type}_{list}.txt, overrides.json, conflicts.json
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use blockmerge_engine::{input, pipeline, Config};
//!
//! let config = Config::load("blockmerge.toml".as_ref())?;
//! let files = input::load_processed_files(&config.processed_files)?;
//! let report = pipeline::run(&config, files, Default::default()).await?;
//! println!("{} entries blocked", report.blocked);
//! ```

pub mod checksum;
pub mod config;
pub mod consolidator;
pub mod input;
pub mod orchestrator;
pub mod pipeline;
pub mod reader;
pub mod resolve;
pub mod transform;

pub use checksum::ChecksumAlgorithm;
pub use config::{ChecksumConfig, Config, OverridePaths};
pub use consolidator::{Consolidator, ConsolidatorRegistry, EntryOrder, StandardConsolidator};
pub use orchestrator::{Orchestrator, UnitOutput};
pub use pipeline::{OutputLayout, RunOptions, RunReport};
pub use reader::LineReader;
pub use resolve::{resolve, ManualOverrides, Resolution};

pub use blockmerge_core::*;
