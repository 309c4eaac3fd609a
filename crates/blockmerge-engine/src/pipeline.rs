//! Full consolidation run across every scope.
//!
//! Each scope (general, every group, every category) is an independent unit
//! with its own inputs and output files, so each gets one blocking worker.
//! The registry is shared read-only; finished summaries go into a
//! mutex-protected map. Global resolution runs on its own worker alongside.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{info, warn};

use blockmerge_core::{
    ConsolidatedSummary, EntrySet, GenericSourceType, ListType, MergeError, ProcessedFile,
    Result, Scope,
};

use crate::config::Config;
use crate::consolidator::{Consolidator, ConsolidatorRegistry, StandardConsolidator};
use crate::input::derive_categories;
use crate::orchestrator::{remove_stale, Orchestrator};
use crate::reader::LineReader;
use crate::resolve::{self, write_audit, ManualOverrides, Resolution};
use crate::transform::summaries_by_type;

/// Directory for general-scope lists.
pub const CONSOLIDATED_DIR: &str = "consolidated";
/// Directory for size-group lists.
pub const GROUPS_DIR: &str = "consolidated_groups";
/// Directory for category lists.
pub const CATEGORIES_DIR: &str = "consolidated_categories";
/// Directory for globally resolved per-type lists.
pub const RESOLVED_DIR: &str = "resolved";
/// Directory for JSON reports.
pub const SUMMARIES_DIR: &str = "summaries";

/// Where a run writes its files.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Layout rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the lists for a scope
    #[must_use]
    pub fn dir_for(&self, scope: &Scope) -> PathBuf {
        match scope {
            Scope::General => self.root.join(CONSOLIDATED_DIR),
            Scope::Group(_) => self.root.join(GROUPS_DIR),
            Scope::Category(_) => self.root.join(CATEGORIES_DIR),
        }
    }

    /// Directory for resolved lists
    #[must_use]
    pub fn resolved(&self) -> PathBuf {
        self.root.join(RESOLVED_DIR)
    }

    /// Directory for JSON reports
    #[must_use]
    pub fn summaries(&self) -> PathBuf {
        self.root.join(SUMMARIES_DIR)
    }

    /// Create every output directory. Failure here aborts the run.
    pub fn create_all(&self) -> Result<()> {
        for dir in [
            self.root.join(CONSOLIDATED_DIR),
            self.root.join(GROUPS_DIR),
            self.root.join(CATEGORIES_DIR),
            self.resolved(),
            self.summaries(),
        ] {
            std::fs::create_dir_all(&dir)
                .map_err(|source| MergeError::OutputDir { path: dir, source })?;
        }
        Ok(())
    }
}

/// Knobs a caller can set per run on top of the config.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Checksum outputs even if the config leaves checksums off
    pub force_checksum: bool,
}

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Scopes consolidated
    pub scopes: usize,
    /// Summaries produced across all scopes
    pub summaries: usize,
    /// Summaries with at least one entry
    pub valid_summaries: usize,
    /// Entries blocked after resolution, across types
    pub blocked: usize,
    /// Entries allowed after resolution, across types
    pub allowed: usize,
    /// Conflicts left for an operator
    pub unresolved_conflicts: usize,
    /// Rows in the override audit
    pub audit_records: usize,
}

/// The scopes a run consolidates: general, configured groups, categories.
///
/// Categories come from the config, or from the processed files when the
/// config names none. Each scope appears once, in configured order.
#[must_use]
pub fn scopes_for(config: &Config, files: &[ProcessedFile]) -> Vec<Scope> {
    let categories = if config.categories.is_empty() {
        derive_categories(files)
    } else {
        config.categories.clone()
    };

    // Duplicate names would put two workers on the same files.
    let mut seen = BTreeSet::new();
    std::iter::once(Scope::General)
        .chain(config.groups.iter().cloned().map(Scope::Group))
        .chain(categories.into_iter().map(Scope::Category))
        .filter(|scope| !scope.identifier().is_empty() && seen.insert(scope.clone()))
        .collect()
}

/// Run consolidation for every scope plus global resolution.
pub async fn run(config: &Config, files: Vec<ProcessedFile>, options: RunOptions) -> Result<RunReport> {
    let layout = OutputLayout::new(&config.output_dir);
    layout.create_all()?;

    let checksum = config.checksum_algorithm(options.force_checksum)?;
    let reader = Arc::new(config.line_reader());
    let registry = Arc::new(ConsolidatorRegistry::with_defaults(
        &config.generic_source_types,
        Arc::clone(&reader),
    ));
    let types: Arc<[GenericSourceType]> = config.generic_source_types.clone().into();
    let files: Arc<[ProcessedFile]> = files.into();
    let scopes = scopes_for(config, &files);
    let scope_count = scopes.len();

    info!(
        files = files.len(),
        scopes = scope_count,
        checksum = ?checksum,
        "starting consolidation run"
    );

    let collected: Arc<Mutex<BTreeMap<Scope, Vec<ConsolidatedSummary>>>> = Arc::default();
    let mut workers = JoinSet::new();
    for scope in scopes {
        let registry = Arc::clone(&registry);
        let types = Arc::clone(&types);
        let files = Arc::clone(&files);
        let collected = Arc::clone(&collected);
        let dir = layout.dir_for(&scope);
        workers.spawn_blocking(move || {
            let orchestrator = Orchestrator::new(&registry, &types, checksum);
            let summaries = orchestrator.consolidate_scope(&scope, &files, &dir);
            collected.blocking_lock().insert(scope, summaries);
        });
    }

    let overrides = ManualOverrides::load(&config.overrides, &reader);
    let resolver = {
        let files = Arc::clone(&files);
        let reader = Arc::clone(&reader);
        tokio::task::spawn_blocking(move || resolve::resolve(&files, &reader, &overrides))
    };

    while let Some(joined) = workers.join_next().await {
        joined.map_err(|e| MergeError::Task(e.to_string()))?;
    }
    let resolution = resolver
        .await
        .map_err(|e| MergeError::Task(e.to_string()))?;

    let by_scope = std::mem::take(&mut *collected.lock().await);
    let mut report = RunReport {
        scopes: scope_count,
        ..RunReport::default()
    };
    for summaries in by_scope.values() {
        report.summaries += summaries.len();
        report.valid_summaries += summaries.iter().filter(|s| s.valid).count();
    }

    write_summaries(&layout.summaries(), by_scope)?;
    write_resolution(&layout, &registry, &reader, &types, &resolution, &mut report)?;

    info!(
        scopes = report.scopes,
        summaries = report.summaries,
        valid = report.valid_summaries,
        blocked = report.blocked,
        allowed = report.allowed,
        conflicts = report.unresolved_conflicts,
        "consolidation run complete"
    );

    Ok(report)
}

/// Write one type-keyed summary report per scope kind.
fn write_summaries(dir: &Path, by_scope: BTreeMap<Scope, Vec<ConsolidatedSummary>>) -> Result<()> {
    let mut general = BTreeMap::new();
    let mut groups = BTreeMap::new();
    let mut categories = BTreeMap::new();

    for (scope, summaries) in by_scope {
        let identifier = scope.identifier().to_string();
        let target = match scope {
            Scope::General => &mut general,
            Scope::Group(_) => &mut groups,
            Scope::Category(_) => &mut categories,
        };
        target.insert(identifier, summaries);
    }

    for (name, summaries) in [
        ("consolidated_summary.json", general),
        ("consolidated_groups_summary.json", groups),
        ("consolidated_categories_summary.json", categories),
    ] {
        write_json(&dir.join(name), &summaries_by_type(summaries))?;
    }
    Ok(())
}

fn write_resolution(
    layout: &OutputLayout,
    registry: &ConsolidatorRegistry,
    reader: &Arc<LineReader>,
    generic_types: &[GenericSourceType],
    resolution: &Resolution,
    report: &mut RunReport,
) -> Result<()> {
    let result = &resolution.result;
    let resolved_dir = layout.resolved();
    let empty = EntrySet::new();

    // Configured types plus any observed only in the inputs, so emptied
    // sets lose their list from an earlier run.
    let all_types: BTreeSet<&GenericSourceType> = generic_types
        .iter()
        .chain(result.block_by_type.keys())
        .chain(result.allow_by_type.keys())
        .collect();

    for (list_type, sets) in [
        (ListType::Blocklist, &result.block_by_type),
        (ListType::Allowlist, &result.allow_by_type),
    ] {
        for generic_type in &all_types {
            let entries = sets.get(*generic_type).unwrap_or(&empty);
            save_resolved(registry, reader, &resolved_dir, generic_type, list_type, entries);
        }
    }

    let unresolved = result.unresolved_conflicts();
    report.blocked = result.total_blocked();
    report.allowed = result.total_allowed();
    report.unresolved_conflicts = unresolved.len();
    report.audit_records = resolution.audit.len();

    let summaries = layout.summaries();
    write_audit(&resolution.audit, &summaries.join("overrides.json"))?;
    write_json(&summaries.join("conflicts.json"), &unresolved)
}

fn save_resolved(
    registry: &ConsolidatorRegistry,
    reader: &Arc<LineReader>,
    dir: &Path,
    generic_type: &GenericSourceType,
    list_type: ListType,
    entries: &EntrySet,
) {
    let path = dir.join(format!("{generic_type}_{list_type}.txt"));
    if entries.is_empty() {
        remove_stale(&path);
        return;
    }
    let saved = registry.get(generic_type, list_type).map_or_else(
        || {
            StandardConsolidator::new(generic_type.clone(), list_type, Arc::clone(reader))
                .save_entries(entries, &path)
        },
        |c| c.save_entries(entries, &path),
    );
    if let Err(e) = saved {
        warn!(generic_type = %generic_type, list_type = %list_type, error = %e, "failed to save resolved list");
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, json).map_err(|e| MergeError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        Config {
            output_dir: dir.path().join("out"),
            generic_source_types: vec![GenericSourceType::DOMAIN],
            groups: vec!["mini".into()],
            ..Config::default()
        }
    }

    fn list(dir: &TempDir, name: &str, lt: ListType, body: &str) -> ProcessedFile {
        let path = dir.path().join(format!("{name}.txt"));
        std::fs::write(&path, body).unwrap();
        let mut f = ProcessedFile::new(name, path.display().to_string(), GenericSourceType::DOMAIN, lt);
        f.groups = vec!["mini".into()];
        f.categories = vec!["ads".into()];
        f
    }

    #[test]
    fn scopes_include_derived_categories() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let files = vec![list(&dir, "s1", ListType::Blocklist, "a.com\n")];
        assert_eq!(
            scopes_for(&config, &files),
            vec![
                Scope::General,
                Scope::Group("mini".into()),
                Scope::Category("ads".into())
            ]
        );
    }

    #[test]
    fn scopes_are_deduplicated() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.groups = vec!["mini".into(), "lite".into(), "mini".into(), String::new()];
        config.categories = vec!["ads".into(), "ads".into(), "mini".into()];
        assert_eq!(
            scopes_for(&config, &[]),
            vec![
                Scope::General,
                Scope::Group("mini".into()),
                Scope::Group("lite".into()),
                Scope::Category("ads".into()),
                Scope::Category("mini".into()),
            ]
        );
    }

    #[test]
    fn layout_dirs() {
        let layout = OutputLayout::new("/out");
        assert_eq!(layout.dir_for(&Scope::General), PathBuf::from("/out/consolidated"));
        assert_eq!(
            layout.dir_for(&Scope::Category("ads".into())),
            PathBuf::from("/out/consolidated_categories")
        );
    }

    #[test]
    fn output_dir_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let err = OutputLayout::new(blocker.join("out")).create_all().unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn run_writes_lists_and_reports() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let files = vec![
            list(&dir, "s1", ListType::Blocklist, "a.com\nb.com\n"),
            list(&dir, "s2", ListType::Blocklist, "b.com\n"),
            list(&dir, "s3", ListType::Allowlist, "a.com\n"),
        ];

        let report = run(&config, files, RunOptions { force_checksum: true })
            .await
            .unwrap();
        assert_eq!(report.scopes, 3);
        // Each scope: 1 type x 2 list types.
        assert_eq!(report.summaries, 6);
        assert_eq!(report.valid_summaries, 6);
        // a.com is a 1:1 tie, b.com blocked 2:0.
        assert_eq!(report.blocked, 1);
        assert_eq!(report.unresolved_conflicts, 1);
        assert_eq!(report.audit_records, 1);

        let out = dir.path().join("out");
        assert_eq!(
            std::fs::read_to_string(out.join("consolidated/general_domain_blocklist.txt")).unwrap(),
            "b.com\n"
        );
        assert!(out.join("consolidated_groups/mini_domain_allowlist.txt").exists());
        assert!(out.join("consolidated_categories/ads_domain_blocklist_ignored.txt").exists());
        assert_eq!(
            std::fs::read_to_string(out.join("resolved/domain_blocklist.txt")).unwrap(),
            "b.com\n"
        );
        assert!(!out.join("resolved/domain_allowlist.txt").exists());

        let summary: serde_json::Value = serde_json::from_slice(
            &std::fs::read(out.join("summaries/consolidated_groups_summary.json")).unwrap(),
        )
        .unwrap();
        let domain = summary["domain"].as_array().unwrap();
        assert_eq!(domain.len(), 2);
        assert!(domain.iter().all(|s| s["group"] == "mini"));
        assert!(domain.iter().all(|s| s["checksum"].as_str().unwrap().len() == 64));

        let conflicts: serde_json::Value =
            serde_json::from_slice(&std::fs::read(out.join("summaries/conflicts.json")).unwrap())
                .unwrap();
        assert_eq!(conflicts[0]["entry"], "a.com");
    }
}
