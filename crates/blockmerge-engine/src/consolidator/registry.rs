//! Lookup table from (generic type, list type) to a consolidator.
//!
//! Built once per run and shared read-only between scope workers.

use std::collections::HashMap;
use std::sync::Arc;

use blockmerge_core::{GenericSourceType, ListType};

use super::{Consolidator, StandardConsolidator};
use crate::reader::LineReader;

type Key = (GenericSourceType, ListType);

/// Registered consolidators, keyed by the pair they handle.
#[derive(Default)]
pub struct ConsolidatorRegistry {
    consolidators: HashMap<Key, Box<dyn Consolidator>>,
}

impl ConsolidatorRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a [`StandardConsolidator`] for both list types of every type.
    #[must_use]
    pub fn with_defaults(generic_types: &[GenericSourceType], reader: Arc<LineReader>) -> Self {
        let mut registry = Self::new();
        for generic_type in generic_types {
            for list_type in ListType::ALL {
                registry.register(Box::new(StandardConsolidator::new(
                    generic_type.clone(),
                    list_type,
                    Arc::clone(&reader),
                )));
            }
        }
        registry
    }

    /// Register a consolidator, replacing any previous one for its pair.
    pub fn register(&mut self, consolidator: Box<dyn Consolidator>) {
        let key = (
            consolidator.generic_source_type().clone(),
            consolidator.list_type(),
        );
        self.consolidators.insert(key, consolidator);
    }

    /// Look up the consolidator for a pair
    #[must_use]
    pub fn get(
        &self,
        generic_type: &GenericSourceType,
        list_type: ListType,
    ) -> Option<&dyn Consolidator> {
        self.consolidators
            .get(&(generic_type.clone(), list_type))
            .map(|c| &**c)
    }

    /// Number of registered pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.consolidators.len()
    }

    /// Returns true if nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.consolidators.is_empty()
    }
}

impl std::fmt::Debug for ConsolidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.consolidators.keys().collect();
        keys.sort();
        f.debug_struct("ConsolidatorRegistry")
            .field("pairs", &keys)
            .finish()
    }
}
