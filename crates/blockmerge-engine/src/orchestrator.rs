//! Per-scope two-phase consolidation.
//!
//! ```text
//! Phase 1: allowlists
//!   for each generic type: merge the scope's allowlist files, save,
//!   keep the merged set as that type's ignore set
//!
//! Phase 2: blocklists
//!   for each generic type: merge the scope's blocklist files, drop
//!   entries in the ignore set (written to *_ignored.txt), save
//! ```
//!
//! Every failure inside a unit is logged and leaves an invalid summary
//! behind; nothing here aborts the run.

use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use blockmerge_core::{
    ConsolidatedSummary, EntrySet, GenericSourceType, ListType, ProcessedFile, Scope,
};

use crate::checksum::{self, ChecksumAlgorithm};
use crate::consolidator::ConsolidatorRegistry;

/// Output file name for one unit: `{identifier}_{type}_{list_type}.txt`.
#[must_use]
pub fn output_file_name(
    identifier: &str,
    generic_type: &GenericSourceType,
    list_type: ListType,
) -> String {
    format!("{identifier}_{generic_type}_{list_type}.txt")
}

/// Sibling file holding blocklist entries suppressed by the allowlist.
#[must_use]
pub fn ignored_file_name(
    identifier: &str,
    generic_type: &GenericSourceType,
    list_type: ListType,
) -> String {
    format!("{identifier}_{generic_type}_{list_type}_ignored.txt")
}

/// Delete a list left by an earlier run. A missing file is fine.
pub fn remove_stale(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed stale output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove stale output"),
    }
}

/// Consolidated entries and bookkeeping for one unit of work.
#[derive(Debug, Clone)]
pub struct UnitOutput {
    /// Entries kept after filtering
    pub entries: EntrySet,
    /// Summary describing them
    pub summary: ConsolidatedSummary,
}

/// Runs consolidation for one scope at a time.
#[derive(Debug, Clone, Copy)]
pub struct Orchestrator<'a> {
    registry: &'a ConsolidatorRegistry,
    generic_types: &'a [GenericSourceType],
    checksum: Option<ChecksumAlgorithm>,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator over the given types.
    ///
    /// `checksum` is `None` when checksums are disabled.
    #[must_use]
    pub const fn new(
        registry: &'a ConsolidatorRegistry,
        generic_types: &'a [GenericSourceType],
        checksum: Option<ChecksumAlgorithm>,
    ) -> Self {
        Self {
            registry,
            generic_types,
            checksum,
        }
    }

    /// Consolidate every (type, list type) pair for one scope.
    ///
    /// Returns no summaries when the scope sees no processed files.
    pub fn consolidate_scope(
        &self,
        scope: &Scope,
        files: &[ProcessedFile],
        output_dir: &Path,
    ) -> Vec<ConsolidatedSummary> {
        let visible = scope.select(files);
        if visible.is_empty() {
            debug!(identifier = scope.identifier(), "no processed files for scope");
            for generic_type in self.generic_types {
                for list_type in ListType::ALL {
                    let id = scope.identifier();
                    remove_stale(&output_dir.join(output_file_name(id, generic_type, list_type)));
                    remove_stale(&output_dir.join(ignored_file_name(id, generic_type, list_type)));
                }
            }
            return Vec::new();
        }

        let mut summaries = Vec::with_capacity(self.generic_types.len() * 2);
        let mut ignore_sets: HashMap<&GenericSourceType, EntrySet> = HashMap::new();

        for generic_type in self.generic_types {
            let Some(unit) = self.consolidate_unit(
                scope,
                generic_type,
                ListType::Allowlist,
                &visible,
                None,
                output_dir,
            ) else {
                continue;
            };
            ignore_sets.insert(generic_type, unit.entries);
            summaries.push(unit.summary);
        }

        for generic_type in self.generic_types {
            let ignore = ignore_sets.get(generic_type);
            if let Some(unit) = self.consolidate_unit(
                scope,
                generic_type,
                ListType::Blocklist,
                &visible,
                ignore,
                output_dir,
            ) {
                summaries.push(unit.summary);
            }
        }

        info!(
            identifier = scope.identifier(),
            files = visible.len(),
            summaries = summaries.len(),
            valid = summaries.iter().filter(|s| s.valid).count(),
            "consolidated scope"
        );

        summaries
    }

    /// Consolidate one (type, list type) pair within a scope.
    ///
    /// Returns `None` only when no consolidator is registered for the pair.
    pub fn consolidate_unit(
        &self,
        scope: &Scope,
        generic_type: &GenericSourceType,
        list_type: ListType,
        files: &[&ProcessedFile],
        ignore: Option<&EntrySet>,
        output_dir: &Path,
    ) -> Option<UnitOutput> {
        let identifier = scope.identifier();
        let Some(consolidator) = self.registry.get(generic_type, list_type) else {
            warn!(
                identifier,
                generic_type = %generic_type,
                list_type = %list_type,
                "no consolidator registered"
            );
            return None;
        };

        let unit_files: Vec<&ProcessedFile> = files
            .iter()
            .copied()
            .filter(|f| f.generic_source_type == *generic_type && f.list_type == list_type)
            .collect();

        let mut summary = ConsolidatedSummary::new(scope, generic_type.clone(), list_type);
        let (merged, infos) = consolidator.consolidate(&unit_files);
        summary.files_count = infos.len();
        summary.files = infos;

        let (entries, ignored) = match ignore {
            Some(set) => consolidator.filter_entries(merged, set),
            None => (merged, EntrySet::new()),
        };

        let ignored_path = output_dir.join(ignored_file_name(identifier, generic_type, list_type));
        if ignored.is_empty() {
            remove_stale(&ignored_path);
        } else {
            summary.ignored_entries_count = ignored.len();
            match consolidator.save_entries(&ignored, &ignored_path) {
                Ok(()) => summary.ignored_filepath = ignored_path.display().to_string(),
                Err(e) => {
                    warn!(identifier, error = %e, "failed to save ignored entries");
                    remove_stale(&ignored_path);
                }
            }
        }

        let path = output_dir.join(output_file_name(identifier, generic_type, list_type));
        summary.set_count(entries.len());
        if entries.is_empty() {
            remove_stale(&path);
            debug!(
                identifier,
                generic_type = %generic_type,
                list_type = %list_type,
                "no entries after filtering, nothing written"
            );
            return Some(UnitOutput { entries, summary });
        }

        match consolidator.save_entries(&entries, &path) {
            Ok(()) => {
                summary.filepath = path.display().to_string();
                if let Some(algorithm) = self.checksum {
                    match checksum::file_digest(&path, algorithm) {
                        Ok(digest) => summary.checksum = digest,
                        Err(e) => warn!(identifier, error = %e, "failed to checksum output"),
                    }
                }
            }
            Err(e) => {
                warn!(identifier, error = %e, "failed to save consolidated entries");
                summary.clear_output();
                remove_stale(&path);
            }
        }

        debug!(
            identifier,
            generic_type = %generic_type,
            list_type = %list_type,
            count = summary.count,
            ignored = summary.ignored_entries_count,
            "consolidated unit"
        );

        Some(UnitOutput { entries, summary })
    }
}
