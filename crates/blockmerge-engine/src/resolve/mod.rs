//! Global conflict resolution across every processed file.
//!
//! ```text
//! ProcessedFile records
//!   -> build_source_maps()   entry -> sources, entry -> types
//!   -> resolve_by_counts()   block / allow / conflict per entry
//!   -> apply_overrides()     forced block, then forced allow
//!   -> build_audit()         one row per contested or overridden entry
//! ```

pub mod audit;
pub mod counts;
pub mod overrides;
pub mod source_map;

pub use audit::{build_audit, write_audit};
pub use counts::{decide, resolve_by_counts};
pub use overrides::{apply_overrides, ManualOverrides};
pub use source_map::{build_source_maps, SourceMaps};

use blockmerge_core::{OverrideRecord, ProcessedFile, ResolutionResult};

use crate::reader::LineReader;

/// Final per-type sets plus the audit trail that explains them.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Per-type allow/block sets, conflicts and override bookkeeping
    pub result: ResolutionResult,
    /// Audit rows
    pub audit: Vec<OverrideRecord>,
}

/// Run the full resolution chain over all processed files.
#[must_use]
pub fn resolve(
    files: &[ProcessedFile],
    reader: &LineReader,
    overrides: &ManualOverrides,
) -> Resolution {
    let maps = build_source_maps(files, reader);
    let mut result = resolve_by_counts(&maps);
    if !overrides.is_empty() {
        apply_overrides(&mut result, &maps, overrides);
    }
    let audit = build_audit(&result, &maps);
    Resolution { result, audit }
}
