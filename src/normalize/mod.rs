//! Per-entity mapping from raw backend documents to [`ArchivedRecord`].
//!
//! Every normalizer is pure and total: it never fails and always emits the
//! full attribute list of its entity type, with [`PLACEHOLDER`] standing in
//! for missing values. Each backend spells the same concept differently, so
//! every entity type decodes into its own typed raw shape and picks the
//! authoritative fields explicitly.

pub mod fields;

mod activities;
mod people;
mod sales;

pub use fields::{PLACEHOLDER, SYSTEM_ACTOR};

use crate::core::{CompositeId, EntityType};
use crate::model::{ArchivedRecord, Attribute};
use fields::ArchiveMeta;
use serde_json::Value;

/// Maps one raw archived document of `entity_type` into the unified view model.
pub fn normalize(entity_type: EntityType, raw: &Value) -> ArchivedRecord {
    match entity_type {
        EntityType::Customer => people::customer(raw),
        EntityType::Prospect => people::prospect(raw),
        EntityType::PartnerOrganization => people::partner(raw),
        EntityType::Deal => sales::deal(raw),
        EntityType::Project => sales::project(raw),
        EntityType::InventoryUnit => sales::unit(raw),
        EntityType::FollowUpTask => activities::follow_up(raw),
        EntityType::TodoItem => activities::todo(raw),
        EntityType::ScheduledReminder => activities::reminder(raw),
    }
}

/// Fixed attribute labels, in display order.
pub fn attribute_labels(entity_type: EntityType) -> &'static [&'static str] {
    match entity_type {
        EntityType::Customer => people::CUSTOMER_ATTRIBUTES,
        EntityType::Prospect => people::PROSPECT_ATTRIBUTES,
        EntityType::PartnerOrganization => people::PARTNER_ATTRIBUTES,
        EntityType::Deal => sales::DEAL_ATTRIBUTES,
        EntityType::Project => sales::PROJECT_ATTRIBUTES,
        EntityType::InventoryUnit => sales::UNIT_ATTRIBUTES,
        EntityType::FollowUpTask => activities::FOLLOW_UP_ATTRIBUTES,
        EntityType::TodoItem => activities::TODO_ATTRIBUTES,
        EntityType::ScheduledReminder => activities::REMINDER_ATTRIBUTES,
    }
}

struct RecordDraft<'a> {
    entity_type: EntityType,
    meta: &'a ArchiveMeta,
    display_name: Option<String>,
    contact_email: Option<String>,
    contact_phone: Option<String>,
}

impl<'a> RecordDraft<'a> {
    fn new(entity_type: EntityType, meta: &'a ArchiveMeta) -> Self {
        Self {
            entity_type,
            meta,
            display_name: None,
            contact_email: None,
            contact_phone: None,
        }
    }

    fn name(mut self, display_name: Option<String>) -> Self {
        self.display_name = display_name;
        self
    }

    fn contact(mut self, email: Option<String>, phone: Option<String>) -> Self {
        self.contact_email = email;
        self.contact_phone = phone;
        self
    }

    /// `values` must line up with `attribute_labels(entity_type)`.
    fn finish<const N: usize>(self, values: [Option<String>; N]) -> ArchivedRecord {
        let labels = attribute_labels(self.entity_type);
        debug_assert_eq!(labels.len(), N);
        let attributes = labels
            .iter()
            .zip(values)
            .map(|(label, value)| {
                Attribute::new(*label, value.unwrap_or_else(|| PLACEHOLDER.to_string()))
            })
            .collect();

        let native_id = self.meta.native_id();
        let display_name = self
            .display_name
            .unwrap_or_else(|| fallback_name(self.entity_type, &native_id));

        ArchivedRecord {
            composite_id: CompositeId::new(self.entity_type, native_id),
            entity_type: self.entity_type,
            display_name,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            archived_at: self.meta.archived_at(),
            archived_by_label: self.meta.archived_by_label(),
            reason_text: self.meta.reason_text(),
            attributes,
        }
    }
}

fn fallback_name(entity_type: EntityType, native_id: &str) -> String {
    let suffix: String = native_id
        .chars()
        .rev()
        .take(6)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if suffix.is_empty() {
        format!("Unnamed {}", entity_type.label())
    } else {
        format!("{} #{}", entity_type.label(), suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_type_survives_an_empty_document() {
        for entity_type in EntityType::ALL {
            let record = normalize(entity_type, &json!({}));
            assert_eq!(record.entity_type, entity_type);
            assert_eq!(
                record.attributes.len(),
                attribute_labels(entity_type).len()
            );
            assert!(
                record
                    .attributes
                    .iter()
                    .all(|attribute| attribute.value == PLACEHOLDER)
            );
            assert_eq!(record.archived_by_label, SYSTEM_ACTOR);
            assert_eq!(record.reason_text, PLACEHOLDER);
            assert!(record.archived_at.is_none());
            assert!(!record.display_name.is_empty());
        }
    }

    #[test]
    fn non_object_documents_do_not_panic() {
        for raw in [json!(null), json!([1, 2]), json!("customer"), json!(12)] {
            for entity_type in EntityType::ALL {
                let record = normalize(entity_type, &raw);
                assert_eq!(record.native_id(), "");
            }
        }
    }

    #[test]
    fn fallback_name_uses_id_suffix() {
        assert_eq!(
            fallback_name(EntityType::TodoItem, "65a1f0c2e4b0a1b2c3d4e5f6"),
            "To-do #d4e5f6"
        );
        assert_eq!(fallback_name(EntityType::Deal, ""), "Unnamed Deal");
    }
}
