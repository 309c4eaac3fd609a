use serde::{Deserialize, Serialize};

use super::processed::ProcessedFile;

/// Identifier used for the scope that ignores grouping entirely.
pub const GENERAL: &str = "general";

/// A consolidation scope: everything, one size group, or one category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Scope {
    /// All sources not opted out of general consolidation
    General,
    /// A size group (mini, lite, normal, big)
    Group(String),
    /// A category (malware, ads, ...)
    Category(String),
}

impl Scope {
    /// Identifier used as the output file prefix
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::General => GENERAL,
            Self::Group(name) | Self::Category(name) => name,
        }
    }

    /// Group name, if this is a group scope
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        match self {
            Self::Group(name) => Some(name),
            _ => None,
        }
    }

    /// Category name, if this is a category scope
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::Category(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true if the processed file takes part in this scope.
    ///
    /// Validity is not checked here; consolidators do that.
    #[must_use]
    pub fn includes(&self, file: &ProcessedFile) -> bool {
        match self {
            Self::General => !file.skip_general_consolidation,
            Self::Group(name) => {
                !file.skip_groups_consolidation && file.groups.iter().any(|g| g == name)
            }
            Self::Category(name) => {
                !file.skip_categories_consolidation && file.categories.iter().any(|c| c == name)
            }
        }
    }

    /// The processed files visible to this scope
    #[must_use]
    pub fn select<'a>(&self, files: &'a [ProcessedFile]) -> Vec<&'a ProcessedFile> {
        files.iter().filter(|f| self.includes(f)).collect()
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::General => f.write_str(GENERAL),
            Self::Group(name) => write!(f, "group:{name}"),
            Self::Category(name) => write!(f, "category:{name}"),
        }
    }
}
