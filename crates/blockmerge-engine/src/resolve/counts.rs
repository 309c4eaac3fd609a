//! Count-based block/allow decision per entry.

use std::collections::BTreeMap;
use tracing::info;

use blockmerge_core::{ConflictDetail, Decision, EntrySet, GenericSourceType, ResolutionResult};

use super::source_map::SourceMaps;

/// Decide from distinct source counts.
///
/// Returns `None` when neither side lists the entry.
#[must_use]
pub const fn decide(block_count: usize, allow_count: usize) -> Option<Decision> {
    if block_count > allow_count {
        Some(Decision::Block)
    } else if allow_count > block_count {
        Some(Decision::Allow)
    } else if block_count > 0 {
        Some(Decision::Conflict)
    } else {
        None
    }
}

/// Resolve every entry in the maps by source counts.
///
/// Winning entries land in the set of every generic type they were seen
/// under (`domain` if none was recorded). Ties are recorded as conflicts and
/// kept out of both sets.
#[must_use]
pub fn resolve_by_counts(maps: &SourceMaps) -> ResolutionResult {
    let mut result = ResolutionResult::default();

    for entry in maps.entries() {
        let block_sources = maps.block_sources(entry);
        let allow_sources = maps.allow_sources(entry);
        let detail = ConflictDetail {
            entry: entry.to_string(),
            block_count: block_sources.len(),
            allow_count: allow_sources.len(),
            block_sources,
            allow_sources,
            generic_types: decision_types(maps, entry),
        };

        match decide(detail.block_count, detail.allow_count) {
            Some(Decision::Block) => add_for_types(&mut result.block_by_type, &detail),
            Some(Decision::Allow) => add_for_types(&mut result.allow_by_type, &detail),
            Some(Decision::Conflict) => result.conflicts.push(entry.to_string()),
            None => continue,
        }

        result.conflict_details.insert(entry.to_string(), detail);
    }

    info!(
        blocked = result.total_blocked(),
        allowed = result.total_allowed(),
        conflicts = result.conflicts.len(),
        "resolved entries by source counts"
    );

    result
}

/// Types an entry was observed under, `domain` if none was recorded.
fn decision_types(maps: &SourceMaps, entry: &str) -> Vec<GenericSourceType> {
    match maps.types_of(entry) {
        Some(types) if !types.is_empty() => types.iter().cloned().collect(),
        _ => vec![GenericSourceType::DOMAIN],
    }
}

fn add_for_types(sets: &mut BTreeMap<GenericSourceType, EntrySet>, detail: &ConflictDetail) {
    for generic_type in &detail.generic_types {
        sets.entry(generic_type.clone())
            .or_default()
            .insert(detail.entry.as_str());
    }
}
