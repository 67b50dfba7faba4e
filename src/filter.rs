//! Local filters over the currently loaded page.
//!
//! They only narrow records already fetched; they never reach the sources.

use crate::core::{ArchiveError, EntityType, Result};
use crate::model::ArchivedRecord;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relative archive-time window. Days are UTC calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateBucket {
    Today,
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[serde(rename = "last_30_days")]
    Last30Days,
}

impl DateBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateBucket::Today => "today",
            DateBucket::Last7Days => "last_7_days",
            DateBucket::Last30Days => "last_30_days",
        }
    }

    /// Undated records belong to no bucket.
    pub fn contains(&self, archived_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(archived_at) = archived_at else {
            return false;
        };
        match self {
            DateBucket::Today => archived_at.date_naive() == now.date_naive(),
            DateBucket::Last7Days => archived_at >= now - Duration::days(7),
            DateBucket::Last30Days => archived_at >= now - Duration::days(30),
        }
    }
}

impl fmt::Display for DateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateBucket {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(DateBucket::Today),
            "7d" | "week" | "last_7_days" => Ok(DateBucket::Last7Days),
            "30d" | "month" | "last_30_days" => Ok(DateBucket::Last30Days),
            other => Err(ArchiveError::Validation(format!(
                "unknown date filter '{}'",
                other
            ))),
        }
    }
}

/// Search text, entity type and date window; unset parts match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveFilter {
    pub search: Option<String>,
    pub entity_type: Option<EntityType>,
    pub date: Option<DateBucket>,
}

impl ArchiveFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        self.search = (!needle.trim().is_empty()).then_some(needle);
        self
    }

    pub fn entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    pub fn date(mut self, bucket: DateBucket) -> Self {
        self.date = Some(bucket);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.entity_type.is_none() && self.date.is_none()
    }

    pub fn matches(&self, record: &ArchivedRecord, now: DateTime<Utc>) -> bool {
        if let Some(entity_type) = self.entity_type {
            if record.entity_type != entity_type {
                return false;
            }
        }
        if let Some(bucket) = self.date {
            if !bucket.contains(record.archived_at, now) {
                return false;
            }
        }
        match self.search.as_deref() {
            Some(needle) => matches_text(record, needle),
            None => true,
        }
    }

    /// Matching records in their original relative order.
    pub fn apply(&self, records: &[ArchivedRecord], now: DateTime<Utc>) -> Vec<ArchivedRecord> {
        records
            .iter()
            .filter(|record| self.matches(record, now))
            .cloned()
            .collect()
    }
}

/// Case-insensitive match on name, email or phone. Phone numbers also match
/// on digits alone, so `0100 123` finds `0100-123`.
fn matches_text(record: &ArchivedRecord, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let text_hit = [
        Some(record.display_name.as_str()),
        record.contact_email.as_deref(),
        record.contact_phone.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle));
    if text_hit {
        return true;
    }

    let needle_digits = digits(&needle);
    let phone_like = !needle_digits.is_empty()
        && needle
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '+' | '(' | ')'));
    phone_like
        && record
            .contact_phone
            .as_deref()
            .is_some_and(|phone| digits(phone).contains(&needle_digits))
}

fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}
