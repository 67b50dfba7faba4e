//! Fan-out over all sources, merged into one page.
//!
//! Pagination is per source: page N asks every source for its own Nth block
//! of `limit` items and merges whatever comes back. Page 1 is exact; later
//! pages only approximate the Nth block of the global archive-time order.
//! Exact global pages would need either loading every source fully and
//! paginating in memory, or a merged index on the server side.

pub mod merge;
pub mod single_flight;

pub use merge::{merge_batches, newest_first};
pub use single_flight::{FlightPermit, SingleFlight};

use crate::config::ArchiveConfig;
use crate::core::{ArchiveError, EntityType};
use crate::model::{AggregatePage, ArchivedRecord, approx_total_pages};
use crate::normalize::normalize;
use crate::source::{PageRequest, SourceCollector, SourceRegistry};
use crate::state::ArchiveState;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{Instrument, Level, event, info_span};
use uuid::Uuid;

/// What one source added to a fetch.
#[derive(Debug)]
struct SourceContribution {
    entity_type: EntityType,
    records: Vec<ArchivedRecord>,
    total: u64,
    failed: bool,
}

impl SourceContribution {
    fn unavailable(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            records: Vec::new(),
            total: 0,
            failed: true,
        }
    }
}

pub struct ArchiveAggregator {
    registry: Arc<SourceRegistry>,
    config: ArchiveConfig,
    state: ArchiveState,
    flight: SingleFlight,
}

impl ArchiveAggregator {
    pub fn new(registry: Arc<SourceRegistry>, config: ArchiveConfig, state: ArchiveState) -> Self {
        Self {
            registry,
            config,
            state,
            flight: SingleFlight::new(),
        }
    }

    /// True while a fetch holds the single-flight slot.
    pub fn is_fetching(&self) -> bool {
        self.flight.is_busy()
    }

    /// Loads one merged page and makes it the current state.
    ///
    /// Returns `None` without touching any source when another fetch is
    /// already running: overlapping calls are dropped, not queued and not
    /// restarted. A failing or slow source contributes an empty page and is
    /// listed in `unavailable_sources`; it never fails the whole fetch.
    pub async fn fetch(&self, page: u32, limit_per_source: u32) -> Option<AggregatePage> {
        let Some(_permit) = self.flight.try_acquire() else {
            event!(Level::DEBUG, page, "archive fetch dropped, another fetch in flight");
            return None;
        };

        let request = PageRequest::new(page, self.config.effective_limit(Some(limit_per_source)));
        let span = info_span!(
            "archive.fetch",
            fetch_id = %Uuid::new_v4(),
            page = request.page,
            limit = request.limit
        );
        let aggregate = self.fetch_unguarded(request).instrument(span).await;
        self.state.replace(aggregate.clone()).await;
        Some(aggregate)
    }

    async fn fetch_unguarded(&self, request: PageRequest) -> AggregatePage {
        let source_timeout = self.config.source_timeout;
        let handles: Vec<_> = self
            .registry
            .collectors()
            .map(|collector| {
                let entity_type = collector.entity_type();
                let collector = Arc::clone(collector);
                let task = tokio::spawn(
                    collect_source(collector, request, source_timeout).in_current_span(),
                );
                (entity_type, task)
            })
            .collect();

        let contributions = join_all(handles.into_iter().map(|(entity_type, task)| async move {
            task.await.unwrap_or_else(|err| {
                event!(
                    Level::ERROR,
                    entity_type = %entity_type,
                    error = %err,
                    "archive source task aborted"
                );
                SourceContribution::unavailable(entity_type)
            })
        }))
        .await;

        let mut approx_total_items = 0u64;
        let mut unavailable_sources = Vec::new();
        let mut batches = Vec::with_capacity(contributions.len());
        for contribution in contributions {
            if contribution.failed {
                unavailable_sources.push(contribution.entity_type);
            }
            approx_total_items = approx_total_items.saturating_add(contribution.total);
            batches.push(contribution.records);
        }

        let records = merge_batches(batches);
        event!(
            Level::INFO,
            records = records.len(),
            approx_total_items,
            unavailable = unavailable_sources.len(),
            "archive page assembled"
        );

        AggregatePage {
            records,
            page: request.page,
            limit_per_source: request.limit,
            approx_total_items,
            approx_total_pages: approx_total_pages(approx_total_items, request.limit),
            unavailable_sources,
            fetched_at: Utc::now(),
        }
    }
}

async fn collect_source(
    collector: Arc<dyn SourceCollector>,
    request: PageRequest,
    source_timeout: Duration,
) -> SourceContribution {
    let entity_type = collector.entity_type();
    let fetched = match timeout(source_timeout, collector.fetch_page(request)).await {
        Ok(result) => result,
        Err(_) => Err(ArchiveError::Timeout {
            entity_type,
            elapsed: source_timeout,
        }),
    };

    let page = match fetched {
        Ok(page) => page,
        Err(err) => {
            event!(
                Level::WARN,
                entity_type = %entity_type,
                error = %err,
                "archive source unavailable, contributing empty page"
            );
            return SourceContribution::unavailable(entity_type);
        }
    };

    let mut records = Vec::with_capacity(page.items.len());
    for raw in &page.items {
        let record = normalize(entity_type, raw);
        if record.composite_id.is_addressable() {
            records.push(record);
        } else {
            event!(
                Level::WARN,
                entity_type = %entity_type,
                native_id = %record.native_id(),
                "dropping archived record with malformed id"
            );
        }
    }

    let total = page.total.unwrap_or(records.len() as u64);
    event!(
        Level::DEBUG,
        entity_type = %entity_type,
        items = records.len(),
        total,
        "archive source collected"
    );
    SourceContribution {
        entity_type,
        records,
        total,
        failed: false,
    }
}
