use super::ArchivedRecord;
use crate::core::{CompositeId, EntityType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One merged page over all sources.
///
/// Totals are approximate: every source is paginated independently, so only
/// page 1 is exact. Reconciliation shrinks `records` without touching the
/// totals; the next fetch recomputes everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatePage {
    pub records: Vec<ArchivedRecord>,
    pub page: u32,
    pub limit_per_source: u32,
    pub approx_total_items: u64,
    pub approx_total_pages: u64,
    /// Sources whose contribution was substituted with an empty page.
    pub unavailable_sources: Vec<EntityType>,
    pub fetched_at: DateTime<Utc>,
}

impl AggregatePage {
    pub fn empty(page: u32, limit_per_source: u32) -> Self {
        Self {
            records: Vec::new(),
            page,
            limit_per_source,
            approx_total_items: 0,
            approx_total_pages: 1,
            unavailable_sources: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, id: &CompositeId) -> Option<&ArchivedRecord> {
        self.records.iter().find(|record| &record.composite_id == id)
    }

    /// Removes exactly the record with `id`, keeping the order of the rest.
    pub fn remove(&mut self, id: &CompositeId) -> Option<ArchivedRecord> {
        let index = self
            .records
            .iter()
            .position(|record| &record.composite_id == id)?;
        Some(self.records.remove(index))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// `max(1, ceil(total / limit))`.
pub fn approx_total_pages(total_items: u64, limit_per_source: u32) -> u64 {
    let limit = u64::from(limit_per_source.max(1));
    total_items.div_ceil(limit).max(1)
}
