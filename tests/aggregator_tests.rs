use crm_archive::{ArchiveConfig, ArchiveService, EntityType, InMemoryArchiveBackend};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

fn archived(id: &str, at: &str) -> Value {
    json!({"_id": id, "name": id, "deletedAt": at})
}

fn service_over(backend: &InMemoryArchiveBackend, config: ArchiveConfig) -> ArchiveService {
    ArchiveService::from_backend(Arc::new(backend.clone()), config).expect("service")
}

fn composite_ids(page: &crm_archive::AggregatePage) -> Vec<String> {
    page.records
        .iter()
        .map(|record| record.composite_id.to_string())
        .collect()
}

async fn seed_every_type(backend: &InMemoryArchiveBackend, per_type: usize) {
    for (type_index, entity_type) in EntityType::ALL.into_iter().enumerate() {
        backend
            .seed(
                entity_type,
                (0..per_type).map(|index| {
                    archived(
                        &format!("{}-{}", entity_type.as_str().replace('_', ""), index),
                        &format!("2024-04-{:02}T{:02}:00:00Z", index + 1, type_index),
                    )
                }),
            )
            .await;
    }
}

#[tokio::test]
async fn merge_orders_across_sources_by_archive_time() {
    let backend = InMemoryArchiveBackend::new();
    backend
        .seed(
            EntityType::Customer,
            [
                archived("a10", "2024-01-01T10:00:00Z"),
                archived("a09", "2024-01-01T09:00:00Z"),
            ],
        )
        .await;
    backend
        .insert(EntityType::Deal, archived("b0930", "2024-01-01T09:30:00Z"))
        .await;

    let service = service_over(&backend, ArchiveConfig::new());
    let page = service.fetch(1, Some(50)).await.expect("fetch");

    assert_eq!(
        composite_ids(&page),
        ["customer:a10", "deal:b0930", "customer:a09"]
    );
}

#[tokio::test]
async fn merge_order_does_not_depend_on_completion_order() {
    let backend = InMemoryArchiveBackend::new();
    backend
        .insert(EntityType::Customer, archived("a10", "2024-01-01T10:00:00Z"))
        .await;
    backend
        .insert(EntityType::Customer, archived("a09", "2024-01-01T09:00:00Z"))
        .await;
    backend
        .insert(EntityType::Deal, archived("b0930", "2024-01-01T09:30:00Z"))
        .await;

    let service = service_over(&backend, ArchiveConfig::new());
    let fast = service.fetch(1, Some(50)).await.expect("fetch");

    // Customers now answer last.
    backend
        .delay(EntityType::Customer, Duration::from_millis(40))
        .await;
    let slow = service.fetch(1, Some(50)).await.expect("fetch");

    assert_eq!(composite_ids(&fast), composite_ids(&slow));
}

#[tokio::test]
async fn one_failing_source_does_not_fail_the_page() {
    let backend = InMemoryArchiveBackend::new();
    seed_every_type(&backend, 3).await;
    backend.fail(EntityType::Project).await;

    let service = service_over(&backend, ArchiveConfig::new());
    let page = service.fetch(1, Some(50)).await.expect("fetch");

    assert_eq!(page.records.len(), 8 * 3);
    assert_eq!(page.approx_total_items, 8 * 3);
    assert_eq!(page.unavailable_sources, [EntityType::Project]);
    assert!(
        page.records
            .iter()
            .all(|record| record.entity_type != EntityType::Project)
    );
}

#[tokio::test]
async fn hung_source_is_cut_off_by_timeout() {
    let backend = InMemoryArchiveBackend::new();
    seed_every_type(&backend, 1).await;
    backend
        .delay(EntityType::ScheduledReminder, Duration::from_secs(5))
        .await;

    let config = ArchiveConfig::new().source_timeout(Duration::from_millis(100));
    let service = service_over(&backend, config);

    let started = std::time::Instant::now();
    let page = service.fetch(1, Some(50)).await.expect("fetch");

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(page.records.len(), 8);
    assert_eq!(page.unavailable_sources, [EntityType::ScheduledReminder]);
}

#[tokio::test]
async fn overlapping_fetch_is_dropped() {
    let backend = InMemoryArchiveBackend::new();
    seed_every_type(&backend, 1).await;
    backend
        .delay(EntityType::Customer, Duration::from_millis(50))
        .await;

    let service = service_over(&backend, ArchiveConfig::new());
    let (first, second) = tokio::join!(service.fetch(1, Some(50)), service.fetch(1, Some(50)));

    assert!(first.is_some());
    assert!(second.is_none());
    assert_eq!(backend.call_count(EntityType::Customer).await, 1);
    assert!(!service.aggregator().is_fetching());

    // The slot is free again once the first fetch finished.
    assert!(service.fetch(1, Some(50)).await.is_some());
}

#[tokio::test]
async fn repeated_fetch_is_idempotent() {
    let backend = InMemoryArchiveBackend::new();
    seed_every_type(&backend, 4).await;
    backend
        .insert(EntityType::TodoItem, json!({"_id": "undated", "title": "x"}))
        .await;

    let service = service_over(&backend, ArchiveConfig::new());
    let first = service.fetch(1, Some(50)).await.expect("fetch");
    let second = service.fetch(1, Some(50)).await.expect("fetch");

    assert_eq!(composite_ids(&first), composite_ids(&second));
    assert_eq!(
        first.records.last().map(|record| record.composite_id.to_string()),
        Some("todo:undated".to_string())
    );
}

#[tokio::test]
async fn totals_sum_per_source_and_pages_are_per_source_blocks() {
    let backend = InMemoryArchiveBackend::new();
    backend
        .seed(
            EntityType::Customer,
            (0..5).map(|index| archived(&format!("c{index}"), "2024-01-01T00:00:00Z")),
        )
        .await;
    backend
        .seed(
            EntityType::Prospect,
            (0..3).map(|index| archived(&format!("p{index}"), "2024-01-02T00:00:00Z")),
        )
        .await;

    let service = service_over(&backend, ArchiveConfig::new());
    let second = service.fetch(2, Some(2)).await.expect("fetch");

    assert_eq!(second.approx_total_items, 8);
    assert_eq!(second.approx_total_pages, 4);
    assert_eq!(second.limit_per_source, 2);
    // Each source answers with its own second block.
    assert_eq!(
        composite_ids(&second),
        ["prospect:p2", "customer:c2", "customer:c3"]
    );
}

#[tokio::test]
async fn missing_source_total_falls_back_to_item_count() {
    let backend = InMemoryArchiveBackend::new();
    backend
        .seed(
            EntityType::InventoryUnit,
            (0..4).map(|index| archived(&format!("u{index}"), "2024-01-01T00:00:00Z")),
        )
        .await;
    backend.omit_totals(EntityType::InventoryUnit).await;

    let service = service_over(&backend, ArchiveConfig::new());
    let page = service.fetch(1, Some(3)).await.expect("fetch");

    assert_eq!(page.records.len(), 3);
    assert_eq!(page.approx_total_items, 3);
    assert_eq!(page.approx_total_pages, 1);
}

#[tokio::test]
async fn records_with_malformed_ids_are_dropped() {
    let backend = InMemoryArchiveBackend::new();
    backend
        .seed(
            EntityType::Customer,
            [
                json!({"fullName": "no id"}),
                json!({"_id": "bad id", "fullName": "spaces"}),
                json!({"_id": "ok-1", "fullName": "kept"}),
            ],
        )
        .await;

    let service = service_over(&backend, ArchiveConfig::new());
    let page = service.fetch(1, Some(50)).await.expect("fetch");

    assert_eq!(composite_ids(&page), ["customer:ok-1"]);
}

#[tokio::test]
async fn empty_archive_reports_one_page() {
    let backend = InMemoryArchiveBackend::new();
    let service = service_over(&backend, ArchiveConfig::new());
    let page = service.fetch(1, None).await.expect("fetch");

    assert!(page.is_empty());
    assert_eq!(page.approx_total_items, 0);
    assert_eq!(page.approx_total_pages, 1);
    assert_eq!(page.limit_per_source, 50);
}
