//! Run configuration for consolidation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use blockmerge_core::{GenericSourceType, MergeError, Result};

use crate::checksum::ChecksumAlgorithm;
use crate::reader::{LineReader, DEFAULT_COMMENT_PREFIXES};

/// Configuration for one consolidation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory for consolidated lists and reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// JSON array of processed file records.
    #[serde(default = "default_processed_files")]
    pub processed_files: PathBuf,

    /// Generic types to consolidate, in order.
    #[serde(default = "GenericSourceType::defaults")]
    pub generic_source_types: Vec<GenericSourceType>,

    /// Size groups to consolidate.
    #[serde(default = "default_groups")]
    pub groups: Vec<String>,

    /// Categories to consolidate (derived from processed files when empty).
    #[serde(default)]
    pub categories: Vec<String>,

    /// Line prefixes the reader treats as comments.
    #[serde(default = "default_comment_prefixes")]
    pub comment_prefixes: Vec<String>,

    /// Output checksum settings.
    #[serde(default)]
    pub checksum: ChecksumConfig,

    /// Manual override files per generic type.
    #[serde(default)]
    pub overrides: BTreeMap<GenericSourceType, OverridePaths>,
}

/// Whether and how output files are checksummed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksumConfig {
    /// Compute a checksum for every written list.
    #[serde(default)]
    pub enabled: bool,

    /// Digest algorithm name (sha1, sha256, sha384, sha512).
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

/// Forced-block and forced-allow files for one generic type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverridePaths {
    /// Entries always blocked for this type.
    #[serde(default)]
    pub block: Option<PathBuf>,

    /// Entries always allowed for this type (wins over `block`).
    #[serde(default)]
    pub allow: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            processed_files: default_processed_files(),
            generic_source_types: GenericSourceType::defaults(),
            groups: default_groups(),
            categories: Vec::new(),
            comment_prefixes: default_comment_prefixes(),
            checksum: ChecksumConfig::default(),
            overrides: BTreeMap::new(),
        }
    }
}

impl Default for ChecksumConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            algorithm: default_algorithm(),
        }
    }
}

impl Config {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| MergeError::io(path, e))?;
            toml::from_str(&content).map_err(|e| MergeError::Config(e.to_string()))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail later in the run.
    pub fn validate(&self) -> Result<()> {
        self.checksum.algorithm.parse::<ChecksumAlgorithm>()?;
        if self.generic_source_types.iter().any(GenericSourceType::is_empty) {
            return Err(MergeError::Config(
                "generic_source_types contains an empty name".into(),
            ));
        }
        Ok(())
    }

    /// The algorithm to checksum with, if checksums are on.
    ///
    /// `force` turns checksums on regardless of `checksum.enabled`.
    pub fn checksum_algorithm(&self, force: bool) -> Result<Option<ChecksumAlgorithm>> {
        if force || self.checksum.enabled {
            self.checksum.algorithm.parse().map(Some)
        } else {
            Ok(None)
        }
    }

    /// A line reader using the configured comment prefixes.
    #[must_use]
    pub fn line_reader(&self) -> LineReader {
        LineReader::new(self.comment_prefixes.iter().cloned())
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/output")
}

fn default_processed_files() -> PathBuf {
    PathBuf::from("data/processed/processed_files.json")
}

fn default_groups() -> Vec<String> {
    ["mini", "lite", "normal", "big"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_comment_prefixes() -> Vec<String> {
    DEFAULT_COMMENT_PREFIXES
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_algorithm() -> String {
    String::from("sha256")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.groups, vec!["mini", "lite", "normal", "big"]);
        assert_eq!(config.generic_source_types[0], GenericSourceType::DOMAIN);
        assert!(!config.checksum.enabled);
        assert!(config.overrides.is_empty());
        assert_eq!(config.checksum_algorithm(false).unwrap(), None);
        assert_eq!(
            config.checksum_algorithm(true).unwrap(),
            Some(ChecksumAlgorithm::Sha256)
        );
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load(Path::new("/tmp/nonexistent_blockmerge_config.toml")).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("data/output"));
    }

    #[test]
    fn test_load_toml() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmpfile,
            r#"
output_dir = "/srv/lists"
generic_source_types = ["domain", "ipv4"]
categories = ["ads", "malware"]

[checksum]
enabled = true
algorithm = "sha512"

[overrides.domain]
block = "overrides/domain_block.txt"
allow = "overrides/domain_allow.txt"

[overrides.ipv4]
allow = "overrides/ipv4_allow.txt"
"#
        )
        .unwrap();

        let config = Config::load(tmpfile.path()).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/srv/lists"));
        assert_eq!(
            config.generic_source_types,
            vec![GenericSourceType::DOMAIN, GenericSourceType::IPV4]
        );
        assert_eq!(config.categories, vec!["ads", "malware"]);
        assert_eq!(
            config.checksum_algorithm(false).unwrap(),
            Some(ChecksumAlgorithm::Sha512)
        );

        let domain = &config.overrides[&GenericSourceType::DOMAIN];
        assert!(domain.block.is_some());
        assert!(domain.allow.is_some());
        assert!(config.overrides[&GenericSourceType::IPV4].block.is_none());
        // Unset sections keep their defaults.
        assert_eq!(config.groups.len(), 4);
    }

    #[test]
    fn test_unsupported_algorithm_rejected() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "[checksum]\nalgorithm = \"md5\"\n").unwrap();

        let err = Config::load(tmpfile.path()).unwrap_err();
        assert!(matches!(err, MergeError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "groups = 5").unwrap();
        assert!(matches!(
            Config::load(tmpfile.path()),
            Err(MergeError::Config(_))
        ));
    }
}
