pub mod backend;
pub mod collector;
pub mod in_memory;
pub mod rest;

pub use backend::{
    ArchiveBackend, DeleteAllResponse, ListArchivedResponse, PageRequest, Pagination,
    PermanentDeleteResponse, RestoreResponse,
};
pub use collector::{BackendCollector, SourceCollector, SourcePage};
pub use in_memory::InMemoryArchiveBackend;
pub use rest::RestArchiveBackend;

use crate::core::{ArchiveError, EntityType, Result};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Routing table from entity type to its collector.
///
/// Iteration follows `EntityType::ALL`, which fixes both fan-out order and
/// the tie-break order of the merge.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    collectors: BTreeMap<EntityType, Arc<dyn SourceCollector>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One [`BackendCollector`] per entity type over a shared backend.
    pub fn from_backend(
        backend: Arc<dyn ArchiveBackend>,
        without_bulk_wipe: &HashSet<EntityType>,
    ) -> Self {
        let mut registry = Self::new();
        for entity_type in EntityType::ALL {
            let collector = BackendCollector::new(entity_type, Arc::clone(&backend));
            let collector = if without_bulk_wipe.contains(&entity_type) {
                collector.without_bulk_wipe()
            } else {
                collector
            };
            registry.register(Arc::new(collector));
        }
        registry
    }

    /// Registers `collector` under its own entity type, replacing any previous one.
    pub fn register(&mut self, collector: Arc<dyn SourceCollector>) {
        self.collectors.insert(collector.entity_type(), collector);
    }

    pub fn get(&self, entity_type: EntityType) -> Result<&Arc<dyn SourceCollector>> {
        self.collectors.get(&entity_type).ok_or_else(|| {
            ArchiveError::Config(format!(
                "no source collector registered for '{}'",
                entity_type
            ))
        })
    }

    pub fn collectors(&self) -> impl Iterator<Item = &Arc<dyn SourceCollector>> {
        self.collectors.values()
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    /// Entity types without a registered collector.
    pub fn missing(&self) -> Vec<EntityType> {
        EntityType::ALL
            .into_iter()
            .filter(|entity_type| !self.collectors.contains_key(entity_type))
            .collect()
    }
}
