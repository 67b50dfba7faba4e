use crate::model::ArchivedRecord;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Newest first; undated records after every dated one.
pub fn newest_first(left: &ArchivedRecord, right: &ArchivedRecord) -> Ordering {
    match (left.archived_at, right.archived_at) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Concatenates per-source batches in the given order and sorts them stably.
///
/// Ties keep batch order, so the result does not depend on which source
/// answered first. A composite id seen twice keeps its first occurrence.
pub fn merge_batches<I>(batches: I) -> Vec<ArchivedRecord>
where
    I: IntoIterator<Item = Vec<ArchivedRecord>>,
{
    let mut seen = HashSet::new();
    let mut merged: Vec<ArchivedRecord> = batches
        .into_iter()
        .flatten()
        .filter(|record| seen.insert(record.composite_id.clone()))
        .collect();
    merged.sort_by(newest_first);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityType;
    use crate::normalize::normalize;
    use serde_json::json;

    fn record(entity_type: EntityType, id: &str, at: Option<&str>) -> ArchivedRecord {
        let raw = match at {
            Some(at) => json!({"_id": id, "deletedAt": at}),
            None => json!({"_id": id}),
        };
        normalize(entity_type, &raw)
    }

    fn ids(records: &[ArchivedRecord]) -> Vec<String> {
        records
            .iter()
            .map(|record| record.composite_id.to_string())
            .collect()
    }

    #[test]
    fn interleaves_sources_by_archive_time() {
        let source_a = vec![
            record(EntityType::Customer, "a1", Some("2024-01-01T10:00:00Z")),
            record(EntityType::Customer, "a2", Some("2024-01-01T09:00:00Z")),
        ];
        let source_b = vec![record(EntityType::Deal, "b1", Some("2024-01-01T09:30:00Z"))];

        let merged = merge_batches([source_a.clone(), source_b.clone()]);
        assert_eq!(ids(&merged), ["customer:a1", "deal:b1", "customer:a2"]);

        let reversed = merge_batches([source_b, source_a]);
        assert_eq!(ids(&reversed), ids(&merged));
    }

    #[test]
    fn undated_records_sink_and_ties_stay_stable() {
        let merged = merge_batches([
            vec![
                record(EntityType::TodoItem, "t1", None),
                record(EntityType::TodoItem, "t2", Some("2024-02-01T00:00:00Z")),
            ],
            vec![
                record(EntityType::ScheduledReminder, "r1", Some("2024-02-01T00:00:00Z")),
                record(EntityType::ScheduledReminder, "r2", None),
            ],
        ]);
        assert_eq!(
            ids(&merged),
            ["todo:t2", "reminder:r1", "todo:t1", "reminder:r2"]
        );
    }

    #[test]
    fn duplicate_composite_ids_keep_first() {
        let mut first = record(EntityType::Project, "p1", Some("2024-03-01T00:00:00Z"));
        first.display_name = "first".to_string();
        let mut second = first.clone();
        second.display_name = "second".to_string();

        let merged = merge_batches([vec![first], vec![second]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].display_name, "first");
    }
}
