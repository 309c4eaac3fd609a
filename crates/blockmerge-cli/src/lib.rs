//! # blockmerge-cli
//!
//! Command-line front end for the blockmerge engine.
//!
//! ## Commands
//!
//! - **run**: consolidate every scope, resolve conflicts, write lists and reports
//! - **resolve**: resolve conflicts only and print the audit trail

pub mod cli;
pub mod output;

pub use cli::run;
