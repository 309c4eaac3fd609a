//! Override audit trail.
//!
//! Manual overrides always produce a row. Count-based rows are emitted only
//! for entries with sources on both sides, and only for the types no manual
//! override claimed.

use std::path::Path;

use blockmerge_core::{
    ConflictDetail, Decision, GenericSourceType, MergeError, OverrideReason, OverrideRecord,
    ResolutionResult, Result,
};

use super::counts::decide;
use super::source_map::SourceMaps;

/// Build audit rows for a resolved (and possibly overridden) result.
///
/// Rows are sorted by entry; manual rows precede count rows for the same entry.
#[must_use]
pub fn build_audit(result: &ResolutionResult, maps: &SourceMaps) -> Vec<OverrideRecord> {
    let mut records = Vec::new();

    for (generic_type, entries) in &result.allow_to_block {
        for entry in entries {
            records.push(manual_record(
                entry,
                generic_type,
                Decision::Block,
                OverrideReason::ManualForcedBlock,
                result,
                maps,
            ));
        }
    }
    for (generic_type, entries) in &result.block_to_allow {
        for entry in entries {
            records.push(manual_record(
                entry,
                generic_type,
                Decision::Allow,
                OverrideReason::ManualForcedAllow,
                result,
                maps,
            ));
        }
    }

    let mut contested: Vec<&ConflictDetail> = result
        .conflict_details
        .values()
        .filter(|d| d.is_contested())
        .collect();
    contested.sort_by(|a, b| a.entry.cmp(&b.entry));

    for detail in contested {
        let open = result.unsettled_types(detail);
        if open.is_empty() {
            continue;
        }
        let Some(decision) = decide(detail.block_count, detail.allow_count) else {
            continue;
        };
        let reason = if decision == Decision::Conflict {
            OverrideReason::EqualCounts
        } else {
            OverrideReason::Counts
        };
        records.push(OverrideRecord {
            entry: detail.entry.clone(),
            generic_types: open,
            decision,
            reason,
            block_sources: detail.block_sources.clone(),
            allow_sources: detail.allow_sources.clone(),
            block_count: detail.block_count,
            allow_count: detail.allow_count,
        });
    }

    records.sort_by(|a, b| a.entry.cmp(&b.entry));
    records
}

fn manual_record(
    entry: &str,
    generic_type: &GenericSourceType,
    decision: Decision,
    reason: OverrideReason,
    result: &ResolutionResult,
    maps: &SourceMaps,
) -> OverrideRecord {
    let (block_sources, allow_sources) = result.conflict_details.get(entry).map_or_else(
        || (maps.block_sources(entry), maps.allow_sources(entry)),
        |d| (d.block_sources.clone(), d.allow_sources.clone()),
    );
    OverrideRecord {
        entry: entry.to_string(),
        generic_types: vec![generic_type.clone()],
        decision,
        reason,
        block_count: block_sources.len(),
        allow_count: allow_sources.len(),
        block_sources,
        allow_sources,
    }
}

/// Write audit rows as pretty JSON.
pub fn write_audit(records: &[OverrideRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(records)?;
    std::fs::write(path, json).map_err(|e| MergeError::io(path, e))
}
