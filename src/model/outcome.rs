use crate::core::{ArchiveError, EntityType, ErrorKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Uniform result of a collector mutation.
///
/// Success is the explicit `ok` flag; callers never look at backend payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
}

impl Outcome {
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(OutcomeError {
                kind,
                message: message.into(),
            }),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|error| error.kind)
    }
}

impl From<&ArchiveError> for Outcome {
    fn from(err: &ArchiveError) -> Self {
        Self::failure(err.kind(), err.to_string())
    }
}

impl From<ArchiveError> for Outcome {
    fn from(err: ArchiveError) -> Self {
        Self::from(&err)
    }
}

impl From<crate::core::Result<()>> for Outcome {
    fn from(result: crate::core::Result<()>) -> Self {
        match result {
            Ok(()) => Self::success(),
            Err(err) => Self::from(err),
        }
    }
}

/// Summary of a settle-all bulk wipe across every source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteReport {
    pub total_deleted: u64,
    pub per_type_deleted: Vec<(EntityType, u64)>,
    pub per_type_failures: Vec<EntityType>,
}

impl BulkDeleteReport {
    /// True when at least one source deleted something.
    pub fn any_deleted(&self) -> bool {
        self.total_deleted > 0
    }

    pub fn is_partial(&self) -> bool {
        !self.per_type_failures.is_empty()
    }

    /// `Outcome` view of the report, for surfaces that only show pass/fail.
    pub fn outcome(&self) -> Outcome {
        if !self.any_deleted() {
            let message = if self.per_type_failures.is_empty() {
                "nothing to delete".to_string()
            } else {
                format!("bulk delete failed for: {}", self.failed_types())
            };
            let kind = if self.per_type_failures.is_empty() {
                ErrorKind::NotFound
            } else {
                ErrorKind::PartialBulkFailure
            };
            return Outcome::failure(kind, message);
        }
        if self.is_partial() {
            return Outcome::failure(
                ErrorKind::PartialBulkFailure,
                format!(
                    "deleted {} records, failed for: {}",
                    self.total_deleted,
                    self.failed_types()
                ),
            );
        }
        Outcome::success()
    }

    fn failed_types(&self) -> String {
        self.per_type_failures
            .iter()
            .map(EntityType::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_explicit_flag() {
        let ok = serde_json::to_value(Outcome::success()).unwrap();
        assert_eq!(ok, serde_json::json!({"ok": true}));

        let failed = Outcome::from(ArchiveError::not_found(EntityType::TodoItem, "t1"));
        assert!(!failed.is_ok());
        assert_eq!(failed.error_kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn partial_report_is_not_a_clean_success() {
        let report = BulkDeleteReport {
            total_deleted: 4,
            per_type_deleted: vec![(EntityType::Customer, 4)],
            per_type_failures: vec![EntityType::Deal],
        };
        let outcome = report.outcome();
        assert!(!outcome.is_ok());
        assert_eq!(outcome.error_kind(), Some(ErrorKind::PartialBulkFailure));
    }
}
