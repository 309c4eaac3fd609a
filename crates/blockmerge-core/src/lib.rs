//! Core types for blocklist/allowlist consolidation.
//!
//! This crate holds the data model shared by the consolidation engine and
//! its front ends:
//!
//! - **Inputs**: [`ProcessedFile`] records produced by source processing
//! - **Entries**: [`EntrySet`], the set primitive everything merges into
//! - **Outputs**: [`ConsolidatedSummary`], [`ResolutionResult`] and the
//!   [`OverrideRecord`] audit trail
//! - **Errors**: [`MergeError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use blockmerge_core::{ProcessedFile, Scope};
//!
//! fn visible(files: &[ProcessedFile]) -> usize {
//!     Scope::Group("mini".into()).select(files).len()
//! }
//! ```

mod error;
pub mod types;

pub use error::{MergeError, Result};
pub use types::*;
