use crate::config::ArchiveConfig;
use crate::core::{ArchiveError, CompositeId};
use crate::model::{ArchivedRecord, BulkDeleteReport, Outcome};
use crate::source::{SourceCollector, SourceRegistry};
use crate::state::ArchiveState;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{Instrument, Level, event, info_span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Restore,
    PermanentDelete,
}

impl Mutation {
    fn as_str(&self) -> &'static str {
        match self {
            Mutation::Restore => "restore",
            Mutation::PermanentDelete => "permanent_delete",
        }
    }
}

/// Routes lifecycle intents to the collector owning the record's entity type.
///
/// Single-record mutations are one call each with no automatic retry; on
/// success the record is dropped from the loaded page without re-fetching.
pub struct LifecycleDispatcher {
    registry: Arc<SourceRegistry>,
    config: ArchiveConfig,
    state: ArchiveState,
}

impl LifecycleDispatcher {
    pub fn new(registry: Arc<SourceRegistry>, config: ArchiveConfig, state: ArchiveState) -> Self {
        Self {
            registry,
            config,
            state,
        }
    }

    pub async fn restore(&self, record: &ArchivedRecord) -> Outcome {
        match target_of(record) {
            Ok(id) => self.mutate(id, Mutation::Restore).await,
            Err(err) => rejected_locally(err),
        }
    }

    pub async fn permanent_delete(&self, record: &ArchivedRecord) -> Outcome {
        match target_of(record) {
            Ok(id) => self.mutate(id, Mutation::PermanentDelete).await,
            Err(err) => rejected_locally(err),
        }
    }

    /// Restores by composite id alone; the record need not be in the loaded page.
    pub async fn restore_id(&self, id: &CompositeId) -> Outcome {
        self.mutate(id, Mutation::Restore).await
    }

    pub async fn permanent_delete_id(&self, id: &CompositeId) -> Outcome {
        self.mutate(id, Mutation::PermanentDelete).await
    }

    async fn mutate(&self, id: &CompositeId, mutation: Mutation) -> Outcome {
        let span = info_span!(
            "archive.mutate",
            action = mutation.as_str(),
            entity_type = %id.entity_type(),
            native_id = %id.native_id()
        );
        async {
            if !id.is_addressable() {
                return rejected_locally(ArchiveError::Validation(format!(
                    "malformed record id '{}'",
                    id
                )));
            }
            let collector = match self.registry.get(id.entity_type()) {
                Ok(collector) => Arc::clone(collector),
                Err(err) => return rejected_locally(err),
            };

            let call = async {
                match mutation {
                    Mutation::Restore => collector.restore(id.native_id()).await,
                    Mutation::PermanentDelete => collector.permanent_delete(id.native_id()).await,
                }
            };
            let outcome = match timeout(self.config.mutation_timeout, call).await {
                Ok(outcome) => outcome,
                Err(_) => Outcome::from(ArchiveError::Timeout {
                    entity_type: id.entity_type(),
                    elapsed: self.config.mutation_timeout,
                }),
            };

            if outcome.is_ok() {
                let removed = self.state.remove(id).await;
                event!(Level::INFO, reconciled = removed, "archive mutation applied");
            } else {
                event!(
                    Level::WARN,
                    error_kind = ?outcome.error_kind(),
                    "archive mutation failed, local state unchanged"
                );
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Wipes every source independently and waits for all of them to settle.
    ///
    /// The loaded page is cleared only when something was actually deleted.
    /// Sources without bulk wipe count as 0 deleted, not as failures.
    pub async fn permanent_delete_all(&self) -> BulkDeleteReport {
        let span = info_span!("archive.delete_all");
        async {
            let mutation_timeout = self.config.mutation_timeout;
            let handles: Vec<_> = self
                .registry
                .collectors()
                .map(|collector| {
                    let entity_type = collector.entity_type();
                    let collector = Arc::clone(collector);
                    let task = tokio::spawn(
                        wipe_source(collector, mutation_timeout).in_current_span(),
                    );
                    (entity_type, task)
                })
                .collect();

            let settled = join_all(handles.into_iter().map(|(entity_type, task)| async move {
                let result = match task.await {
                    Ok(result) => result,
                    Err(err) => Err(ArchiveError::unavailable(entity_type, err.to_string())),
                };
                (entity_type, result)
            }))
            .await;

            let mut report = BulkDeleteReport::default();
            for (entity_type, result) in settled {
                match result {
                    Ok(deleted) => {
                        report.total_deleted = report.total_deleted.saturating_add(deleted);
                        report.per_type_deleted.push((entity_type, deleted));
                    }
                    Err(err) => {
                        event!(
                            Level::WARN,
                            entity_type = %entity_type,
                            error = %err,
                            "bulk wipe failed for source"
                        );
                        report.per_type_failures.push(entity_type);
                    }
                }
            }

            if report.any_deleted() {
                self.state.clear_records().await;
            }
            event!(
                Level::INFO,
                total_deleted = report.total_deleted,
                failed_sources = report.per_type_failures.len(),
                "bulk wipe settled"
            );
            report
        }
        .instrument(span)
        .await
    }
}

async fn wipe_source(
    collector: Arc<dyn SourceCollector>,
    mutation_timeout: Duration,
) -> crate::core::Result<u64> {
    let entity_type = collector.entity_type();
    match timeout(mutation_timeout, collector.permanent_delete_all()).await {
        Ok(result) => result,
        Err(_) => Err(ArchiveError::Timeout {
            entity_type,
            elapsed: mutation_timeout,
        }),
    }
}

/// The record's own tag routes the call; its composite id must agree with it.
fn target_of(record: &ArchivedRecord) -> Result<&CompositeId, ArchiveError> {
    if record.composite_id.entity_type() != record.entity_type {
        return Err(ArchiveError::Validation(format!(
            "record '{}' is tagged as {}",
            record.composite_id, record.entity_type
        )));
    }
    Ok(&record.composite_id)
}

fn rejected_locally(err: ArchiveError) -> Outcome {
    event!(Level::WARN, error = %err, "archive mutation rejected before dispatch");
    Outcome::from(err)
}
