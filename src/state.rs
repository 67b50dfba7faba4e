use crate::core::CompositeId;
use crate::model::{AggregatePage, ArchivedRecord};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The currently loaded aggregate page, shared by aggregator and dispatcher.
///
/// Replaced wholesale by every completed fetch; between fetches it only shrinks.
#[derive(Clone, Default)]
pub struct ArchiveState {
    page: Arc<RwLock<Option<AggregatePage>>>,
}

impl ArchiveState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn replace(&self, page: AggregatePage) {
        *self.page.write().await = Some(page);
    }

    pub async fn snapshot(&self) -> Option<AggregatePage> {
        self.page.read().await.clone()
    }

    pub async fn find(&self, id: &CompositeId) -> Option<ArchivedRecord> {
        self.page
            .read()
            .await
            .as_ref()
            .and_then(|page| page.find(id).cloned())
    }

    /// Drops one record after a confirmed mutation. Totals stay stale until the next fetch.
    pub async fn remove(&self, id: &CompositeId) -> bool {
        let mut guard = self.page.write().await;
        guard
            .as_mut()
            .and_then(|page| page.remove(id))
            .is_some()
    }

    pub async fn clear_records(&self) {
        if let Some(page) = self.page.write().await.as_mut() {
            page.clear();
        }
    }
}
