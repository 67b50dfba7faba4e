use super::backend::{
    ArchiveBackend, DeleteAllResponse, ListArchivedResponse, PageRequest, Pagination,
    PermanentDeleteResponse, RestoreResponse,
};
use crate::core::{ArchiveError, EntityType, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Default)]
struct InMemorySource {
    archived: Vec<Value>,
    restored: Vec<Value>,
    unavailable: bool,
    delay: Option<Duration>,
    bulk_wipe_unsupported: bool,
    omit_totals: bool,
    calls: usize,
}

/// An in-memory implementation of `ArchiveBackend` for tests and demos.
///
/// Holds raw archived documents per entity type and lets callers inject
/// outages and latency per source.
#[derive(Clone, Default)]
pub struct InMemoryArchiveBackend {
    sources: Arc<Mutex<HashMap<EntityType, InMemorySource>>>,
}

impl InMemoryArchiveBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, entity_type: EntityType, raw: Value) {
        let mut sources = self.sources.lock().await;
        sources.entry(entity_type).or_default().archived.push(raw);
    }

    pub async fn seed(&self, entity_type: EntityType, raws: impl IntoIterator<Item = Value>) {
        let mut sources = self.sources.lock().await;
        sources
            .entry(entity_type)
            .or_default()
            .archived
            .extend(raws);
    }

    /// Makes every call for `entity_type` fail until [`Self::recover`].
    pub async fn fail(&self, entity_type: EntityType) {
        self.configure(entity_type, |source| source.unavailable = true).await;
    }

    pub async fn recover(&self, entity_type: EntityType) {
        self.configure(entity_type, |source| {
            source.unavailable = false;
            source.delay = None;
        })
        .await;
    }

    /// Delays every call for `entity_type`; the lock is not held while waiting.
    pub async fn delay(&self, entity_type: EntityType, delay: Duration) {
        self.configure(entity_type, |source| source.delay = Some(delay)).await;
    }

    /// `permanent_delete_all` answers "unsupported" for `entity_type`.
    pub async fn disable_bulk_wipe(&self, entity_type: EntityType) {
        self.configure(entity_type, |source| source.bulk_wipe_unsupported = true).await;
    }

    /// Listing for `entity_type` omits `pagination.totalItems`.
    pub async fn omit_totals(&self, entity_type: EntityType) {
        self.configure(entity_type, |source| source.omit_totals = true).await;
    }

    pub async fn archived_ids(&self, entity_type: EntityType) -> Vec<String> {
        let sources = self.sources.lock().await;
        sources
            .get(&entity_type)
            .map(|source| source.archived.iter().filter_map(record_id).collect())
            .unwrap_or_default()
    }

    pub async fn restored_ids(&self, entity_type: EntityType) -> Vec<String> {
        let sources = self.sources.lock().await;
        sources
            .get(&entity_type)
            .map(|source| source.restored.iter().filter_map(record_id).collect())
            .unwrap_or_default()
    }

    /// Number of backend calls made for `entity_type`, including failed ones.
    pub async fn call_count(&self, entity_type: EntityType) -> usize {
        let sources = self.sources.lock().await;
        sources
            .get(&entity_type)
            .map(|source| source.calls)
            .unwrap_or_default()
    }

    async fn configure(&self, entity_type: EntityType, apply: impl FnOnce(&mut InMemorySource)) {
        let mut sources = self.sources.lock().await;
        apply(sources.entry(entity_type).or_default());
    }

    async fn enter(&self, entity_type: EntityType) -> Result<()> {
        let (unavailable, delay) = {
            let mut sources = self.sources.lock().await;
            let source = sources.entry(entity_type).or_default();
            source.calls += 1;
            (source.unavailable, source.delay)
        };
        if let Some(delay) = delay {
            sleep(delay).await;
        }
        if unavailable {
            return Err(ArchiveError::unavailable(
                entity_type,
                "in-memory source marked unavailable",
            ));
        }
        Ok(())
    }
}

fn record_id(raw: &Value) -> Option<String> {
    ["_id", "id"]
        .into_iter()
        .filter_map(|key| raw.get(key))
        .find_map(|value| match value {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
}

fn take_by_id(records: &mut Vec<Value>, native_id: &str) -> Option<Value> {
    let index = records
        .iter()
        .position(|raw| record_id(raw).as_deref() == Some(native_id))?;
    Some(records.remove(index))
}

#[async_trait]
impl ArchiveBackend for InMemoryArchiveBackend {
    async fn list_archived(
        &self,
        entity_type: EntityType,
        request: PageRequest,
    ) -> Result<ListArchivedResponse> {
        self.enter(entity_type).await?;
        let sources = self.sources.lock().await;
        let Some(source) = sources.get(&entity_type) else {
            return Ok(ListArchivedResponse {
                data: Vec::new(),
                pagination: Some(Pagination {
                    total_items: Some(0),
                }),
            });
        };

        let data = source
            .archived
            .iter()
            .skip(request.offset())
            .take(request.limit as usize)
            .cloned()
            .collect();
        let pagination = (!source.omit_totals).then(|| Pagination {
            total_items: Some(source.archived.len() as u64),
        });
        Ok(ListArchivedResponse { data, pagination })
    }

    async fn restore(&self, entity_type: EntityType, native_id: &str) -> Result<RestoreResponse> {
        self.enter(entity_type).await?;
        let mut sources = self.sources.lock().await;
        let source = sources.entry(entity_type).or_default();
        let restored = take_by_id(&mut source.archived, native_id)
            .ok_or_else(|| ArchiveError::not_found(entity_type, native_id))?;
        source.restored.push(restored.clone());
        Ok(RestoreResponse {
            data: Some(restored),
            success: Some(true),
            message: None,
        })
    }

    async fn permanent_delete(
        &self,
        entity_type: EntityType,
        native_id: &str,
    ) -> Result<PermanentDeleteResponse> {
        self.enter(entity_type).await?;
        let mut sources = self.sources.lock().await;
        let source = sources.entry(entity_type).or_default();
        take_by_id(&mut source.archived, native_id)
            .ok_or_else(|| ArchiveError::not_found(entity_type, native_id))?;
        Ok(PermanentDeleteResponse {
            message: Some(format!("{} permanently deleted", entity_type.label())),
            success: None,
        })
    }

    async fn permanent_delete_all(
        &self,
        entity_type: EntityType,
    ) -> Result<Option<DeleteAllResponse>> {
        self.enter(entity_type).await?;
        let mut sources = self.sources.lock().await;
        let source = sources.entry(entity_type).or_default();
        if source.bulk_wipe_unsupported {
            return Ok(None);
        }
        let deleted_count = source.archived.len() as u64;
        source.archived.clear();
        Ok(Some(DeleteAllResponse { deleted_count }))
    }
}
