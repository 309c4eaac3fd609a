//! Pluggable merging of per-source files into one entry set.
//!
//! One [`Consolidator`] is registered per (generic type, list type) pair.
//! The orchestrator only ever talks to this trait, so new entry kinds plug
//! in by registering another implementation.

pub mod registry;
pub mod standard;

use std::path::Path;

use blockmerge_core::{EntrySet, FileInfo, GenericSourceType, ListType, ProcessedFile, Result};

pub use registry::ConsolidatorRegistry;
pub use standard::{EntryOrder, StandardConsolidator};

/// Merges, filters and persists entries for one (type, list type) pair.
pub trait Consolidator: Send + Sync {
    /// The generic type this consolidator handles
    fn generic_source_type(&self) -> &GenericSourceType;

    /// The list type this consolidator handles
    fn list_type(&self) -> ListType;

    /// Merge the entries of every eligible file into one set.
    ///
    /// Ineligible or unreadable files are skipped and get no [`FileInfo`].
    fn consolidate(&self, files: &[&ProcessedFile]) -> (EntrySet, Vec<FileInfo>);

    /// Split `entries` into (kept, ignored) against an ignore set.
    fn filter_entries(&self, entries: EntrySet, ignore: &EntrySet) -> (EntrySet, EntrySet) {
        if ignore.is_empty() {
            return (entries, EntrySet::new());
        }
        let mut kept = EntrySet::with_capacity(entries.len());
        let mut ignored = EntrySet::new();
        for entry in entries {
            if ignore.contains(&entry) {
                ignored.insert(entry);
            } else {
                kept.insert(entry);
            }
        }
        (kept, ignored)
    }

    /// Write entries to `path`, one per line.
    fn save_entries(&self, entries: &EntrySet, path: &Path) -> Result<()>;

    /// Returns true if the file may be merged by this consolidator.
    fn is_valid(&self, file: &ProcessedFile) -> bool {
        file.is_usable()
            && file.generic_source_type == *self.generic_source_type()
            && file.list_type == self.list_type()
    }
}
