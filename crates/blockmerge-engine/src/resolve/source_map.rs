//! Entry -> source bookkeeping across every processed file.
//!
//! Entry and source strings are interned once and shared between the three
//! maps, since large corpora repeat the same entry across many sources.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use blockmerge_core::{GenericSourceType, ListType, ProcessedFile};

use crate::reader::LineReader;

/// Which sources list each entry, and under which generic types.
#[derive(Debug, Default)]
pub struct SourceMaps {
    block: HashMap<Arc<str>, BTreeSet<Arc<str>>>,
    allow: HashMap<Arc<str>, BTreeSet<Arc<str>>>,
    entry_types: HashMap<Arc<str>, BTreeSet<GenericSourceType>>,
    interned: HashSet<Arc<str>>,
}

impl SourceMaps {
    /// Create empty maps
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, value: &str) -> Arc<str> {
        if let Some(existing) = self.interned.get(value) {
            return Arc::clone(existing);
        }
        let arc: Arc<str> = Arc::from(value);
        self.interned.insert(Arc::clone(&arc));
        arc
    }

    /// Record that `source` lists `entry` as `list_type` under `generic_type`.
    pub fn record(
        &mut self,
        entry: &str,
        source: &str,
        generic_type: &GenericSourceType,
        list_type: ListType,
    ) {
        let entry = self.intern(entry);
        let source = self.intern(source);
        let side = match list_type {
            ListType::Blocklist => &mut self.block,
            ListType::Allowlist => &mut self.allow,
        };
        side.entry(Arc::clone(&entry)).or_default().insert(source);
        self.entry_types
            .entry(entry)
            .or_default()
            .insert(generic_type.clone());
    }

    /// Every entry seen on either side, sorted
    #[must_use]
    pub fn entries(&self) -> BTreeSet<&str> {
        self.block
            .keys()
            .chain(self.allow.keys())
            .map(|k| &**k)
            .collect()
    }

    /// Sources blocking the entry, sorted
    #[must_use]
    pub fn block_sources(&self, entry: &str) -> Vec<String> {
        sources(&self.block, entry)
    }

    /// Sources allowing the entry, sorted
    #[must_use]
    pub fn allow_sources(&self, entry: &str) -> Vec<String> {
        sources(&self.allow, entry)
    }

    /// Generic types the entry was observed under
    #[must_use]
    pub fn types_of(&self, entry: &str) -> Option<&BTreeSet<GenericSourceType>> {
        self.entry_types.get(entry)
    }

    /// Returns true if the entry was observed under `generic_type`
    #[must_use]
    pub fn observed_as(&self, entry: &str, generic_type: &GenericSourceType) -> bool {
        self.types_of(entry)
            .is_some_and(|types| types.contains(generic_type))
    }

    /// Number of distinct entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entry_types.len()
    }

    /// Returns true if nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entry_types.is_empty()
    }
}

fn sources(map: &HashMap<Arc<str>, BTreeSet<Arc<str>>>, entry: &str) -> Vec<String> {
    map.get(entry)
        .map(|set| set.iter().map(ToString::to_string).collect())
        .unwrap_or_default()
}

/// Scan every usable processed file once and build the source maps.
///
/// Invalid or path-less records are skipped; unreadable files are logged
/// and skipped.
pub fn build_source_maps(files: &[ProcessedFile], reader: &LineReader) -> SourceMaps {
    let mut maps = SourceMaps::new();
    let mut scanned = 0usize;

    for file in files {
        if !file.is_usable() {
            debug!(source = %file.name, "skipping unusable processed file");
            continue;
        }

        let entries = match reader.read_entries(Path::new(&file.filepath)) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(source = %file.name, error = %e, "skipping unreadable file");
                continue;
            }
        };

        for entry in &entries {
            maps.record(entry, &file.name, &file.generic_source_type, file.list_type);
        }
        scanned += 1;
    }

    info!(files = scanned, entries = maps.len(), "built source maps");
    maps
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn record_tracks_sides_and_types() {
        let mut maps = SourceMaps::new();
        maps.record("bad.com", "s2", &GenericSourceType::DOMAIN, ListType::Blocklist);
        maps.record("bad.com", "s1", &GenericSourceType::DOMAIN, ListType::Blocklist);
        maps.record("bad.com", "s1", &GenericSourceType::DOMAIN, ListType::Blocklist);
        maps.record("bad.com", "s3", &GenericSourceType::ADGUARD, ListType::Allowlist);

        assert_eq!(maps.block_sources("bad.com"), vec!["s1", "s2"]);
        assert_eq!(maps.allow_sources("bad.com"), vec!["s3"]);
        assert!(maps.observed_as("bad.com", &GenericSourceType::ADGUARD));
        assert!(!maps.observed_as("bad.com", &GenericSourceType::IPV4));
        assert_eq!(maps.len(), 1);
    }

    #[test]
    fn interning_shares_strings() {
        let mut maps = SourceMaps::new();
        let a = maps.intern("x.com");
        let b = maps.intern("x.com");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn build_skips_invalid_and_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s1.txt");
        std::fs::write(&path, "a.com\n# comment\nb.com\n").unwrap();

        let good = ProcessedFile::new(
            "s1",
            path.display().to_string(),
            GenericSourceType::DOMAIN,
            ListType::Blocklist,
        );
        let mut invalid = good.clone();
        invalid.name = "s2".into();
        invalid.valid = false;
        let missing = ProcessedFile::new(
            "s3",
            dir.path().join("gone.txt").display().to_string(),
            GenericSourceType::DOMAIN,
            ListType::Allowlist,
        );

        let maps = build_source_maps(&[good, invalid, missing], &LineReader::default());
        assert_eq!(maps.entries().into_iter().collect::<Vec<_>>(), vec!["a.com", "b.com"]);
        assert_eq!(maps.block_sources("a.com"), vec!["s1"]);
        assert!(maps.allow_sources("a.com").is_empty());
    }
}
