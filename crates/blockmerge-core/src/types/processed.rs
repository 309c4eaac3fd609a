use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Normalized entry kind a source file was converted into.
///
/// The set of kinds is open: upstream processing may emit types this crate
/// has no constant for, and consolidation simply finds no consolidator for
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenericSourceType(Cow<'static, str>);

impl GenericSourceType {
    /// Fully qualified domain names
    pub const DOMAIN: Self = Self(Cow::Borrowed("domain"));
    /// Single IPv4 addresses
    pub const IPV4: Self = Self(Cow::Borrowed("ipv4"));
    /// Single IPv6 addresses
    pub const IPV6: Self = Self(Cow::Borrowed("ipv6"));
    /// IPv4 networks in CIDR notation
    pub const CIDR_IPV4: Self = Self(Cow::Borrowed("cidr_ipv4"));
    /// IPv6 networks in CIDR notation
    pub const CIDR_IPV6: Self = Self(Cow::Borrowed("cidr_ipv6"));
    /// AdGuard filter rules
    pub const ADGUARD: Self = Self(Cow::Borrowed("adguard"));

    /// Create a type from an arbitrary name
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// The type name as used in file names and reports
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the empty placeholder type
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Types consolidated when nothing else is configured
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::DOMAIN,
            Self::IPV4,
            Self::IPV6,
            Self::CIDR_IPV4,
            Self::ADGUARD,
        ]
    }
}

impl From<&str> for GenericSourceType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl std::fmt::Display for GenericSourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a list blocks or allows its entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    /// Entries should be blocked
    Blocklist,
    /// Entries should be allowed
    Allowlist,
}

impl ListType {
    /// Both list types, allowlists first (the order consolidation runs in)
    pub const ALL: [Self; 2] = [Self::Allowlist, Self::Blocklist];

    /// The list type name as used in file names and reports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocklist => "blocklist",
            Self::Allowlist => "allowlist",
        }
    }
}

impl std::fmt::Display for ListType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One source's normalized output for a (generic type, list type) pair.
///
/// Produced by the download/processing stage and read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedFile {
    /// Source name
    pub name: String,

    /// Path to the line-delimited entry file
    #[serde(default)]
    pub filepath: String,

    /// Normalized entry kind
    pub generic_source_type: GenericSourceType,

    /// Blocklist or allowlist
    pub list_type: ListType,

    /// Whether processing succeeded
    #[serde(default)]
    pub valid: bool,

    /// Size groups this source belongs to (mini, lite, normal, big)
    #[serde(default)]
    pub groups: Vec<String>,

    /// Categories this source belongs to (malware, ads, ...)
    #[serde(default)]
    pub categories: Vec<String>,

    /// Exclude from the general consolidation
    #[serde(default)]
    pub skip_general_consolidation: bool,

    /// Exclude from every group consolidation
    #[serde(default)]
    pub skip_groups_consolidation: bool,

    /// Exclude from every category consolidation
    #[serde(default)]
    pub skip_categories_consolidation: bool,

    /// Source is authoritative and must be considered by downstream reports
    #[serde(default)]
    pub must_consider: bool,

    /// Entry count reported by processing
    #[serde(default)]
    pub num_entries: usize,
}

impl ProcessedFile {
    /// Create a valid processed file record with no scope membership
    pub fn new(
        name: impl Into<String>,
        filepath: impl Into<String>,
        generic_source_type: GenericSourceType,
        list_type: ListType,
    ) -> Self {
        Self {
            name: name.into(),
            filepath: filepath.into(),
            generic_source_type,
            list_type,
            valid: true,
            groups: Vec::new(),
            categories: Vec::new(),
            skip_general_consolidation: false,
            skip_groups_consolidation: false,
            skip_categories_consolidation: false,
            must_consider: false,
            num_entries: 0,
        }
    }

    /// Returns true if the file is valid and points somewhere on disk
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.valid && !self.filepath.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_type_constants_match_owned() {
        assert_eq!(GenericSourceType::DOMAIN, GenericSourceType::new("domain"));
        assert_eq!(GenericSourceType::CIDR_IPV4.as_str(), "cidr_ipv4");
        assert!(GenericSourceType::new("").is_empty());
    }

    #[test]
    fn list_type_serde() {
        assert_eq!(
            serde_json::to_string(&ListType::Allowlist).unwrap(),
            r#""allowlist""#
        );
        let parsed: ListType = serde_json::from_str(r#""blocklist""#).unwrap();
        assert_eq!(parsed, ListType::Blocklist);
    }

    #[test]
    fn processed_file_minimal_json() {
        let json = r#"{
            "name": "stevenblack",
            "filepath": "data/processed/stevenblack_domain_blocklist.txt",
            "generic_source_type": "domain",
            "list_type": "blocklist",
            "valid": true,
            "groups": ["mini", "lite"]
        }"#;
        let file: ProcessedFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.generic_source_type, GenericSourceType::DOMAIN);
        assert_eq!(file.groups, vec!["mini", "lite"]);
        assert!(file.categories.is_empty());
        assert!(!file.skip_general_consolidation);
        assert!(!file.must_consider);
        assert!(file.is_usable());
    }

    #[test]
    fn unusable_without_path() {
        let mut file = ProcessedFile::new("s1", "", GenericSourceType::IPV4, ListType::Blocklist);
        assert!(!file.is_usable());
        file.filepath = "x.txt".into();
        file.valid = false;
        assert!(!file.is_usable());
    }
}
