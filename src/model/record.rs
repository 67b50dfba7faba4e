use crate::core::{CompositeId, EntityType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One type-specific display field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub label: String,
    pub value: String,
}

impl Attribute {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Unified view of a soft-deleted record from any of the nine sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedRecord {
    pub composite_id: CompositeId,
    pub entity_type: EntityType,
    pub display_name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    /// `None` sorts after every dated record.
    pub archived_at: Option<DateTime<Utc>>,
    pub archived_by_label: String,
    pub reason_text: String,
    pub attributes: Vec<Attribute>,
}

impl ArchivedRecord {
    pub fn native_id(&self) -> &str {
        self.composite_id.native_id()
    }

    pub fn attribute(&self, label: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.label == label)
            .map(|attribute| attribute.value.as_str())
    }
}
