use crate::aggregate::ArchiveAggregator;
use crate::config::ArchiveConfig;
use crate::core::{ArchiveError, CompositeId, Result};
use crate::dispatch::LifecycleDispatcher;
use crate::filter::ArchiveFilter;
use crate::model::{AggregatePage, ArchivedRecord, BulkDeleteReport, Outcome};
use crate::source::{ArchiveBackend, SourceRegistry};
use crate::state::ArchiveState;
use chrono::Utc;
use std::sync::Arc;

/// Archive hub: one aggregator and one dispatcher over a shared loaded page.
///
/// # Examples
///
/// ```
/// use crm_archive::{ArchiveConfig, ArchiveService, EntityType, InMemoryArchiveBackend};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = InMemoryArchiveBackend::new();
/// backend
///     .insert(EntityType::Customer, json!({"_id": "c1", "fullName": "Sara"}))
///     .await;
///
/// let service = ArchiveService::from_backend(Arc::new(backend), ArchiveConfig::new())?;
/// let page = service.fetch(1, None).await.expect("no fetch in flight");
/// assert_eq!(page.records[0].display_name, "Sara");
///
/// let outcome = service.restore(&page.records[0]).await;
/// assert!(outcome.ok);
/// # Ok(())
/// # }
/// ```
pub struct ArchiveService {
    config: ArchiveConfig,
    state: ArchiveState,
    aggregator: ArchiveAggregator,
    dispatcher: LifecycleDispatcher,
}

impl ArchiveService {
    /// Requires a collector for every entity type.
    pub fn new(registry: SourceRegistry, config: ArchiveConfig) -> Result<Self> {
        config.validate()?;
        let missing = registry.missing();
        if !missing.is_empty() {
            let names: Vec<_> = missing.iter().map(|entity| entity.as_str()).collect();
            return Err(ArchiveError::Config(format!(
                "missing source collectors: {}",
                names.join(", ")
            )));
        }

        let registry = Arc::new(registry);
        let state = ArchiveState::new();
        Ok(Self {
            aggregator: ArchiveAggregator::new(
                Arc::clone(&registry),
                config.clone(),
                state.clone(),
            ),
            dispatcher: LifecycleDispatcher::new(registry, config.clone(), state.clone()),
            config,
            state,
        })
    }

    pub fn from_backend(backend: Arc<dyn ArchiveBackend>, config: ArchiveConfig) -> Result<Self> {
        let registry = SourceRegistry::from_backend(backend, &config.without_bulk_wipe);
        Self::new(registry, config)
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    pub fn aggregator(&self) -> &ArchiveAggregator {
        &self.aggregator
    }

    pub fn dispatcher(&self) -> &LifecycleDispatcher {
        &self.dispatcher
    }

    /// See [`ArchiveAggregator::fetch`]; `None` means the call was dropped.
    pub async fn fetch(&self, page: u32, limit_per_source: Option<u32>) -> Option<AggregatePage> {
        let limit = self.config.effective_limit(limit_per_source);
        self.aggregator.fetch(page, limit).await
    }

    pub async fn current_page(&self) -> Option<AggregatePage> {
        self.state.snapshot().await
    }

    /// Loaded records narrowed by `filter`; never triggers a fetch.
    pub async fn filtered(&self, filter: &ArchiveFilter) -> Vec<ArchivedRecord> {
        match self.state.snapshot().await {
            Some(page) => filter.apply(&page.records, Utc::now()),
            None => Vec::new(),
        }
    }

    pub async fn restore(&self, record: &ArchivedRecord) -> Outcome {
        self.dispatcher.restore(record).await
    }

    pub async fn permanent_delete(&self, record: &ArchivedRecord) -> Outcome {
        self.dispatcher.permanent_delete(record).await
    }

    pub async fn restore_by_id(&self, id: &CompositeId) -> Outcome {
        self.dispatcher.restore_id(id).await
    }

    pub async fn permanent_delete_by_id(&self, id: &CompositeId) -> Outcome {
        self.dispatcher.permanent_delete_id(id).await
    }

    pub async fn permanent_delete_all(&self) -> BulkDeleteReport {
        self.dispatcher.permanent_delete_all().await
    }
}
