//! Loading processed-file records written by the processing stage.

use std::collections::BTreeSet;
use std::path::Path;

use blockmerge_core::{MergeError, ProcessedFile, Result};

/// Load the JSON array of processed file records.
///
/// Unlike individual list files, a missing record file is an error: without
/// it there is nothing to consolidate.
pub fn load_processed_files(path: &Path) -> Result<Vec<ProcessedFile>> {
    let content = std::fs::read_to_string(path).map_err(|e| MergeError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Every category named by any processed file, sorted and deduplicated.
#[must_use]
pub fn derive_categories(files: &[ProcessedFile]) -> Vec<String> {
    files
        .iter()
        .flat_map(|f| f.categories.iter())
        .filter(|c| !c.is_empty())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
