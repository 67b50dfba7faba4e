use super::backend::{ArchiveBackend, PageRequest};
use crate::core::{EntityType, ErrorKind, Result, validate_native_id};
use crate::model::Outcome;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// One page of raw archived documents from a single source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcePage {
    pub items: Vec<Value>,
    /// Total archived items of this source only; `None` when the backend omits it.
    pub total: Option<u64>,
}

impl SourcePage {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Some(0),
        }
    }
}

/// Per-entity-type access to archived records.
///
/// Mutations report through `Outcome`; only reads and bulk wipes surface errors,
/// which the aggregator and dispatcher absorb per source.
#[async_trait]
pub trait SourceCollector: Send + Sync {
    fn entity_type(&self) -> EntityType;

    async fn fetch_page(&self, request: PageRequest) -> Result<SourcePage>;

    async fn restore(&self, native_id: &str) -> Outcome;

    async fn permanent_delete(&self, native_id: &str) -> Outcome;

    /// Number of deleted records; 0 when the source has no bulk wipe.
    async fn permanent_delete_all(&self) -> Result<u64>;
}

/// Binds a shared [`ArchiveBackend`] to one entity type.
pub struct BackendCollector {
    entity_type: EntityType,
    backend: Arc<dyn ArchiveBackend>,
    bulk_wipe: bool,
}

impl BackendCollector {
    pub fn new(entity_type: EntityType, backend: Arc<dyn ArchiveBackend>) -> Self {
        Self {
            entity_type,
            backend,
            bulk_wipe: true,
        }
    }

    /// Skips the backend call on `permanent_delete_all` and reports 0.
    pub fn without_bulk_wipe(mut self) -> Self {
        self.bulk_wipe = false;
        self
    }

    fn rejected(&self, action: &str, message: Option<String>) -> Outcome {
        Outcome::failure(
            ErrorKind::Rejected,
            message.unwrap_or_else(|| {
                format!("{} {} was not acknowledged", self.entity_type, action)
            }),
        )
    }
}

#[async_trait]
impl SourceCollector for BackendCollector {
    fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    async fn fetch_page(&self, request: PageRequest) -> Result<SourcePage> {
        let response = self.backend.list_archived(self.entity_type, request).await?;
        Ok(SourcePage {
            total: response.total_items(),
            items: response.data,
        })
    }

    async fn restore(&self, native_id: &str) -> Outcome {
        if let Err(err) = validate_native_id(native_id) {
            return Outcome::from(err);
        }
        match self.backend.restore(self.entity_type, native_id).await {
            Ok(response) if response.success == Some(false) => {
                self.rejected("restore", response.message)
            }
            Ok(_) => Outcome::success(),
            Err(err) => Outcome::from(err),
        }
    }

    async fn permanent_delete(&self, native_id: &str) -> Outcome {
        if let Err(err) = validate_native_id(native_id) {
            return Outcome::from(err);
        }
        match self.backend.permanent_delete(self.entity_type, native_id).await {
            Ok(response) if response.success == Some(false) => {
                self.rejected("permanent delete", response.message)
            }
            Ok(_) => Outcome::success(),
            Err(err) => Outcome::from(err),
        }
    }

    async fn permanent_delete_all(&self) -> Result<u64> {
        if !self.bulk_wipe {
            return Ok(0);
        }
        let response = self.backend.permanent_delete_all(self.entity_type).await?;
        Ok(response.map(|body| body.deleted_count).unwrap_or(0))
    }
}
