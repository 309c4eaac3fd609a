//! Outcome of cross-source conflict resolution.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::entry::EntrySet;
use super::processed::GenericSourceType;

/// Final decision for an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Blocked in every type it was seen under
    Block,
    /// Allowed in every type it was seen under
    Allow,
    /// Equal support on both sides; left out of both final sets
    Conflict,
}

/// Why an entry ended up with its decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideReason {
    /// More sources on the winning side
    Counts,
    /// Operator forced-block list
    ManualForcedBlock,
    /// Operator forced-allow list
    ManualForcedAllow,
    /// Same number of sources on both sides
    EqualCounts,
}

impl Decision {
    /// Lowercase name, as serialized
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Allow => "allow",
            Self::Conflict => "conflict",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl OverrideReason {
    /// Snake-case name, as serialized
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Counts => "counts",
            Self::ManualForcedBlock => "manual_forced_block",
            Self::ManualForcedAllow => "manual_forced_allow",
            Self::EqualCounts => "equal_counts",
        }
    }
}

impl std::fmt::Display for OverrideReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which sources block and allow an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictDetail {
    /// The entry
    pub entry: String,
    /// Sources listing the entry in a blocklist, sorted
    pub block_sources: Vec<String>,
    /// Sources listing the entry in an allowlist, sorted
    pub allow_sources: Vec<String>,
    /// Distinct blocking sources
    pub block_count: usize,
    /// Distinct allowing sources
    pub allow_count: usize,
    /// Generic types the decision applies to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_types: Vec<GenericSourceType>,
}

impl ConflictDetail {
    /// Returns true if at least one source sits on each side
    #[must_use]
    pub const fn is_contested(&self) -> bool {
        self.block_count > 0 && self.allow_count > 0
    }
}

/// One row of the override audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRecord {
    /// The entry
    pub entry: String,
    /// Generic types the decision applies to
    pub generic_types: Vec<GenericSourceType>,
    /// Decision taken
    pub decision: Decision,
    /// Why it was taken
    pub reason: OverrideReason,
    /// Sources blocking the entry
    pub block_sources: Vec<String>,
    /// Sources allowing the entry
    pub allow_sources: Vec<String>,
    /// Distinct blocking sources
    pub block_count: usize,
    /// Distinct allowing sources
    pub allow_count: usize,
}

/// Per-type allow/block sets after count resolution and manual overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// Allowed entries per generic type
    pub allow_by_type: BTreeMap<GenericSourceType, EntrySet>,
    /// Blocked entries per generic type
    pub block_by_type: BTreeMap<GenericSourceType, EntrySet>,
    /// Entries with equal block and allow support, sorted
    pub conflicts: Vec<String>,
    /// Source breakdown for every resolved entry
    pub conflict_details: HashMap<String, ConflictDetail>,
    /// Entries a forced-block list moved into the block set, per type
    pub allow_to_block: BTreeMap<GenericSourceType, BTreeSet<String>>,
    /// Entries a forced-allow list moved into the allow set, per type
    pub block_to_allow: BTreeMap<GenericSourceType, BTreeSet<String>>,
}

impl ResolutionResult {
    /// Blocked entries for one type
    #[must_use]
    pub fn blocked(&self, generic_type: &GenericSourceType) -> Option<&EntrySet> {
        self.block_by_type.get(generic_type)
    }

    /// Allowed entries for one type
    #[must_use]
    pub fn allowed(&self, generic_type: &GenericSourceType) -> Option<&EntrySet> {
        self.allow_by_type.get(generic_type)
    }

    /// Returns true if a manual override settled the entry for `generic_type`
    #[must_use]
    pub fn is_overridden(&self, entry: &str, generic_type: &GenericSourceType) -> bool {
        [&self.allow_to_block, &self.block_to_allow]
            .into_iter()
            .filter_map(|moved| moved.get(generic_type))
            .any(|set| set.contains(entry))
    }

    /// Types of `detail` that no manual override settled
    #[must_use]
    pub fn unsettled_types(&self, detail: &ConflictDetail) -> Vec<GenericSourceType> {
        detail
            .generic_types
            .iter()
            .filter(|t| !self.is_overridden(&detail.entry, t))
            .cloned()
            .collect()
    }

    /// Conflicts still open in at least one type.
    ///
    /// Each detail lists only the types left unresolved.
    #[must_use]
    pub fn unresolved_conflicts(&self) -> Vec<ConflictDetail> {
        self.conflicts
            .iter()
            .filter_map(|entry| self.conflict_details.get(entry))
            .filter_map(|detail| {
                let open = self.unsettled_types(detail);
                (!open.is_empty()).then(|| ConflictDetail {
                    generic_types: open,
                    ..detail.clone()
                })
            })
            .collect()
    }

    /// Total blocked entries across all types
    #[must_use]
    pub fn total_blocked(&self) -> usize {
        self.block_by_type.values().map(EntrySet::len).sum()
    }

    /// Total allowed entries across all types
    #[must_use]
    pub fn total_allowed(&self) -> usize {
        self.allow_by_type.values().map(EntrySet::len).sum()
    }
}
