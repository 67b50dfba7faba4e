use super::{ArchiveError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

lazy_static! {
    static ref NATIVE_ID_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,127}$").expect("native id pattern");
}

/// The nine archived domain collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "customer")]
    Customer,
    #[serde(rename = "prospect")]
    Prospect,
    #[serde(rename = "deal")]
    Deal,
    #[serde(rename = "project")]
    Project,
    #[serde(rename = "unit")]
    InventoryUnit,
    #[serde(rename = "partner")]
    PartnerOrganization,
    #[serde(rename = "follow_up")]
    FollowUpTask,
    #[serde(rename = "todo")]
    TodoItem,
    #[serde(rename = "reminder")]
    ScheduledReminder,
}

impl EntityType {
    /// Fixed fan-out order. Merge ties resolve in this order.
    pub const ALL: [EntityType; 9] = [
        EntityType::Customer,
        EntityType::Prospect,
        EntityType::Deal,
        EntityType::Project,
        EntityType::InventoryUnit,
        EntityType::PartnerOrganization,
        EntityType::FollowUpTask,
        EntityType::TodoItem,
        EntityType::ScheduledReminder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Customer => "customer",
            EntityType::Prospect => "prospect",
            EntityType::Deal => "deal",
            EntityType::Project => "project",
            EntityType::InventoryUnit => "unit",
            EntityType::PartnerOrganization => "partner",
            EntityType::FollowUpTask => "follow_up",
            EntityType::TodoItem => "todo",
            EntityType::ScheduledReminder => "reminder",
        }
    }

    /// Path segment of the backend REST resource.
    pub fn resource(&self) -> &'static str {
        match self {
            EntityType::Customer => "customers",
            EntityType::Prospect => "leads",
            EntityType::Deal => "deals",
            EntityType::Project => "projects",
            EntityType::InventoryUnit => "units",
            EntityType::PartnerOrganization => "developers",
            EntityType::FollowUpTask => "follow-ups",
            EntityType::TodoItem => "todos",
            EntityType::ScheduledReminder => "reminders",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Customer => "Customer",
            EntityType::Prospect => "Prospect",
            EntityType::Deal => "Deal",
            EntityType::Project => "Project",
            EntityType::InventoryUnit => "Unit",
            EntityType::PartnerOrganization => "Partner",
            EntityType::FollowUpTask => "Follow-up",
            EntityType::TodoItem => "To-do",
            EntityType::ScheduledReminder => "Reminder",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        EntityType::ALL
            .into_iter()
            .find(|entity| {
                entity.as_str().eq_ignore_ascii_case(needle)
                    || entity.resource().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ArchiveError::UnknownEntityType(s.to_string()))
    }
}

/// Checks a backend-native record id before it is used in a composite id or a request path.
pub fn validate_native_id(native_id: &str) -> Result<()> {
    if NATIVE_ID_PATTERN.is_match(native_id) {
        Ok(())
    } else {
        Err(ArchiveError::Validation(format!(
            "malformed record id '{}'",
            native_id
        )))
    }
}

/// `entity_type` + native id, unique across the merged archive.
///
/// Rendered as `<entity>:<native id>`, e.g. `customer:64f1c2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeId {
    entity_type: EntityType,
    native_id: String,
}

impl CompositeId {
    pub fn new(entity_type: EntityType, native_id: impl Into<String>) -> Self {
        Self {
            entity_type,
            native_id: native_id.into(),
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn native_id(&self) -> &str {
        &self.native_id
    }

    /// True when the native id can be sent to a backend.
    pub fn is_addressable(&self) -> bool {
        validate_native_id(&self.native_id).is_ok()
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.native_id)
    }
}

impl FromStr for CompositeId {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        let (entity, native_id) = s.split_once(':').ok_or_else(|| {
            ArchiveError::Validation(format!("composite id '{}' is missing ':'", s))
        })?;
        let entity_type = entity.parse::<EntityType>()?;
        validate_native_id(native_id)?;
        Ok(Self::new(entity_type, native_id))
    }
}

impl Serialize for CompositeId {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CompositeId {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
