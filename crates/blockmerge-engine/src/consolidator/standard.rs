//! Default consolidator: union of lines, ordered per entry kind on save.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use blockmerge_core::{
    EntrySet, FileInfo, GenericSourceType, ListType, MergeError, ProcessedFile, Result,
};

use super::Consolidator;
use crate::reader::LineReader;

/// Order entries are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOrder {
    /// Plain string order (domains, adblock rules)
    Lexical,
    /// Numeric address order, IPv4 before IPv6
    Address,
    /// Network address, then prefix length
    Network,
}

impl EntryOrder {
    /// Pick the order matching a generic type's entry syntax.
    #[must_use]
    pub fn for_type(generic_type: &GenericSourceType) -> Self {
        match generic_type.as_str() {
            "ipv4" | "ipv6" => Self::Address,
            t if t.starts_with("cidr") => Self::Network,
            _ => Self::Lexical,
        }
    }

    /// Sort a set's entries. Entries that don't parse go last, lexically.
    #[must_use]
    pub fn sort(self, entries: &EntrySet) -> Vec<&str> {
        let mut out: Vec<&str> = entries.iter().collect();
        match self {
            Self::Lexical => out.sort_unstable(),
            Self::Address => out.sort_by_cached_key(|e| {
                let ip = e.parse::<IpAddr>().ok();
                (ip.is_none(), ip, *e)
            }),
            Self::Network => out.sort_by_cached_key(|e| {
                let net = parse_cidr(e);
                (net.is_none(), net, *e)
            }),
        }
        out
    }
}

fn parse_cidr(entry: &str) -> Option<(IpAddr, u8)> {
    let (addr, prefix) = entry.split_once('/')?;
    Some((addr.parse().ok()?, prefix.parse().ok()?))
}

/// Consolidator for one (type, list type) pair backed by plain text files.
#[derive(Debug, Clone)]
pub struct StandardConsolidator {
    generic_source_type: GenericSourceType,
    list_type: ListType,
    order: EntryOrder,
    reader: Arc<LineReader>,
}

impl StandardConsolidator {
    /// Create a consolidator whose output order follows the generic type.
    #[must_use]
    pub fn new(
        generic_source_type: GenericSourceType,
        list_type: ListType,
        reader: Arc<LineReader>,
    ) -> Self {
        let order = EntryOrder::for_type(&generic_source_type);
        Self {
            generic_source_type,
            list_type,
            order,
            reader,
        }
    }

    /// Output order used by [`Consolidator::save_entries`]
    #[must_use]
    pub const fn order(&self) -> EntryOrder {
        self.order
    }
}

impl Consolidator for StandardConsolidator {
    fn generic_source_type(&self) -> &GenericSourceType {
        &self.generic_source_type
    }

    fn list_type(&self) -> ListType {
        self.list_type
    }

    fn consolidate(&self, files: &[&ProcessedFile]) -> (EntrySet, Vec<FileInfo>) {
        let mut entries = EntrySet::new();
        let mut infos = Vec::with_capacity(files.len());

        for file in files {
            if !self.is_valid(file) {
                debug!(
                    source = %file.name,
                    generic_type = %self.generic_source_type,
                    list_type = %self.list_type,
                    "skipping ineligible file"
                );
                continue;
            }

            let path = Path::new(&file.filepath);
            let lines = match self.reader.read_entries(path) {
                Ok(lines) => lines,
                Err(e) => {
                    warn!(source = %file.name, error = %e, "skipping unreadable file");
                    continue;
                }
            };

            infos.push(FileInfo {
                name: file.name.clone(),
                filepath: file.filepath.clone(),
                count: lines.len(),
                must_consider: file.must_consider,
            });
            entries.extend(lines);
        }

        (entries, infos)
    }

    fn save_entries(&self, entries: &EntrySet, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| MergeError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        for entry in self.order.sort(entries) {
            writeln!(writer, "{entry}").map_err(|e| MergeError::io(path, e))?;
        }
        writer.flush().map_err(|e| MergeError::io(path, e))
    }
}
