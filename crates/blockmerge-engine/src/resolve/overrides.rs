//! Operator forced-block / forced-allow lists layered over count resolution.
//!
//! Forced-block is applied first and forced-allow second, so an entry named
//! in both lists for the same type ends up allowed. A directive only acts on
//! entries actually observed under its own generic type.

use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use blockmerge_core::{EntrySet, GenericSourceType, ResolutionResult};

use super::source_map::SourceMaps;
use crate::config::OverridePaths;
use crate::reader::LineReader;

/// Forced decisions per generic type.
#[derive(Debug, Clone, Default)]
pub struct ManualOverrides {
    /// Entries always blocked, per type
    pub forced_block: BTreeMap<GenericSourceType, EntrySet>,
    /// Entries always allowed, per type
    pub forced_allow: BTreeMap<GenericSourceType, EntrySet>,
}

impl ManualOverrides {
    /// Read override files for every configured type.
    ///
    /// A missing or unreadable file means no overrides of that kind.
    pub fn load(paths: &BTreeMap<GenericSourceType, OverridePaths>, reader: &LineReader) -> Self {
        let mut overrides = Self::default();
        for (generic_type, files) in paths {
            if let Some(path) = &files.block {
                if let Some(set) = read_override_file(path, reader) {
                    overrides.forced_block.insert(generic_type.clone(), set);
                }
            }
            if let Some(path) = &files.allow {
                if let Some(set) = read_override_file(path, reader) {
                    overrides.forced_allow.insert(generic_type.clone(), set);
                }
            }
        }
        overrides
    }

    /// Returns true if no directive of either kind is loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forced_block.values().all(EntrySet::is_empty)
            && self.forced_allow.values().all(EntrySet::is_empty)
    }
}

fn read_override_file(path: &Path, reader: &LineReader) -> Option<EntrySet> {
    match reader.read_entries(path) {
        Ok(entries) => Some(entries.into_iter().collect()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no override file");
            None
        }
    }
}

/// Apply forced-block then forced-allow directives to a count resolution.
pub fn apply_overrides(
    result: &mut ResolutionResult,
    maps: &SourceMaps,
    overrides: &ManualOverrides,
) {
    let mut forced_block = 0usize;
    let mut forced_allow = 0usize;

    for (generic_type, entries) in &overrides.forced_block {
        for entry in entries.sorted() {
            if !maps.observed_as(entry, generic_type) {
                continue;
            }
            remove_from(&mut result.allow_by_type, generic_type, entry);
            result
                .block_by_type
                .entry(generic_type.clone())
                .or_default()
                .insert(entry);
            result
                .allow_to_block
                .entry(generic_type.clone())
                .or_default()
                .insert(entry.to_string());
            forced_block += 1;
        }
    }

    for (generic_type, entries) in &overrides.forced_allow {
        for entry in entries.sorted() {
            if !maps.observed_as(entry, generic_type) {
                continue;
            }
            remove_from(&mut result.block_by_type, generic_type, entry);
            result
                .allow_by_type
                .entry(generic_type.clone())
                .or_default()
                .insert(entry);
            result
                .block_to_allow
                .entry(generic_type.clone())
                .or_default()
                .insert(entry.to_string());
            if let Some(moved) = result.allow_to_block.get_mut(generic_type) {
                if moved.remove(entry) {
                    debug!(entry, generic_type = %generic_type, "forced allow overrides forced block");
                }
            }
            forced_allow += 1;
        }
    }

    result.allow_to_block.retain(|_, set| !set.is_empty());
    info!(forced_block, forced_allow, "applied manual overrides");
}

fn remove_from(
    sets: &mut BTreeMap<GenericSourceType, EntrySet>,
    generic_type: &GenericSourceType,
    entry: &str,
) {
    if let Some(set) = sets.get_mut(generic_type) {
        set.remove(entry);
    }
}
