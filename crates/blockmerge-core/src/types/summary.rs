use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::processed::{GenericSourceType, ListType};
use super::scope::Scope;

/// One input file that contributed to a consolidated list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Source name
    pub name: String,

    /// Path the entries were read from
    pub filepath: String,

    /// Entries read from this file
    pub count: usize,

    /// Source flagged as authoritative upstream
    #[serde(default)]
    pub must_consider: bool,
}

/// Result of consolidating one (identifier, generic type, list type) unit.
///
/// A summary is valid exactly when it holds at least one entry; invalid
/// summaries never point at an output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedSummary {
    /// Generic source type
    #[serde(rename = "type")]
    pub generic_source_type: GenericSourceType,

    /// Blocklist or allowlist
    pub list_type: ListType,

    /// Size group this summary belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Category this summary belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Entries written to the output file
    pub count: usize,

    /// Input files merged
    pub files_count: usize,

    /// Per-file breakdown
    #[serde(default)]
    pub files: Vec<FileInfo>,

    /// Blocklist entries dropped because the scope allows them
    #[serde(default)]
    pub ignored_entries_count: usize,

    /// Where the dropped entries were written
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ignored_filepath: String,

    /// Consolidated output file
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub filepath: String,

    /// Hex digest of the output file
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub checksum: String,

    /// True when the summary holds at least one entry
    pub valid: bool,

    /// When this unit was consolidated
    pub last_consolidated: DateTime<Utc>,
}

impl ConsolidatedSummary {
    /// Start an empty, invalid summary for one unit of work
    #[must_use]
    pub fn new(scope: &Scope, generic_source_type: GenericSourceType, list_type: ListType) -> Self {
        Self {
            generic_source_type,
            list_type,
            group: scope.group().map(ToString::to_string),
            category: scope.category().map(ToString::to_string),
            count: 0,
            files_count: 0,
            files: Vec::new(),
            ignored_entries_count: 0,
            ignored_filepath: String::new(),
            filepath: String::new(),
            checksum: String::new(),
            valid: false,
            last_consolidated: Utc::now(),
        }
    }

    /// Set the entry count and derive validity from it
    pub fn set_count(&mut self, count: usize) {
        self.count = count;
        self.valid = count > 0;
    }

    /// Drop file references after a failed write
    pub fn clear_output(&mut self) {
        self.filepath.clear();
        self.checksum.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_summary_is_invalid() {
        let s = ConsolidatedSummary::new(
            &Scope::Group("mini".into()),
            GenericSourceType::DOMAIN,
            ListType::Blocklist,
        );
        assert!(!s.valid);
        assert_eq!(s.group.as_deref(), Some("mini"));
        assert!(s.category.is_none());
        assert!(s.filepath.is_empty());
    }

    #[test]
    fn validity_follows_count() {
        let mut s =
            ConsolidatedSummary::new(&Scope::General, GenericSourceType::IPV4, ListType::Allowlist);
        s.set_count(3);
        assert!(s.valid);
        s.set_count(0);
        assert!(!s.valid);
    }

    #[test]
    fn general_summary_json_has_no_scope_fields() {
        let s =
            ConsolidatedSummary::new(&Scope::General, GenericSourceType::DOMAIN, ListType::Blocklist);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["type"], "domain");
        assert_eq!(json["list_type"], "blocklist");
        assert!(json.get("group").is_none());
        assert!(json.get("category").is_none());
        assert!(json.get("filepath").is_none());
    }
}
