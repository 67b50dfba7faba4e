use crate::core::{EntityType, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Page request forwarded verbatim to every source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Zero-based offset of the first item of this page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub total_items: Option<u64>,
}

/// `GET …/archived` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListArchivedResponse {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl ListArchivedResponse {
    pub fn total_items(&self) -> Option<u64> {
        self.pagination
            .as_ref()
            .and_then(|pagination| pagination.total_items)
    }
}

/// Restore acknowledgement. Backends send either the restored document or a flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestoreResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Permanent delete acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermanentDeleteResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAllResponse {
    #[serde(rename = "deletedCount", default)]
    pub deleted_count: u64,
}

/// The service that actually stores and soft-deletes records.
///
/// One implementation serves all nine entity types; collectors bind it to a
/// single type.
#[async_trait]
pub trait ArchiveBackend: Send + Sync {
    async fn list_archived(
        &self,
        entity_type: EntityType,
        request: PageRequest,
    ) -> Result<ListArchivedResponse>;

    async fn restore(&self, entity_type: EntityType, native_id: &str) -> Result<RestoreResponse>;

    async fn permanent_delete(
        &self,
        entity_type: EntityType,
        native_id: &str,
    ) -> Result<PermanentDeleteResponse>;

    /// `Ok(None)` when the entity type has no bulk wipe.
    async fn permanent_delete_all(
        &self,
        entity_type: EntityType,
    ) -> Result<Option<DeleteAllResponse>>;
}
