use super::types::EntityType;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ArchiveError {
    #[error("Source '{entity_type}' unavailable: {reason}")]
    SourceUnavailable {
        entity_type: EntityType,
        reason: String,
    },

    #[error("Source '{entity_type}' timed out after {elapsed:?}")]
    Timeout {
        entity_type: EntityType,
        elapsed: Duration,
    },

    #[error("Archived {entity_type} '{native_id}' not found")]
    NotFound {
        entity_type: EntityType,
        native_id: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown entity type '{0}'")]
    UnknownEntityType(String),

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ArchiveError {
    pub fn unavailable(entity_type: EntityType, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            entity_type,
            reason: reason.into(),
        }
    }

    pub fn not_found(entity_type: EntityType, native_id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            native_id: native_id.into(),
        }
    }

    /// Classifies the error for the uniform `Outcome` contract.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) | Self::UnknownEntityType(_) => ErrorKind::ValidationFailure,
            Self::Backend { status, .. } if *status == 404 => ErrorKind::NotFound,
            Self::Backend { status, .. } if (400..500).contains(status) => ErrorKind::Rejected,
            Self::SourceUnavailable { .. }
            | Self::Timeout { .. }
            | Self::Backend { .. }
            | Self::Decode(_)
            | Self::Config(_) => ErrorKind::SourceUnavailable,
        }
    }
}

/// Failure classes reported through `Outcome` and bulk reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The collector call failed or timed out.
    SourceUnavailable,
    /// The target record does not exist server-side.
    NotFound,
    /// Malformed id or entity type; never reaches the backend.
    ValidationFailure,
    /// The backend answered but refused the operation.
    Rejected,
    /// One or more entity types failed during a bulk wipe.
    PartialBulkFailure,
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

impl From<reqwest::Error> for ArchiveError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Backend {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None if err.is_decode() => Self::Decode(err.to_string()),
            None => Self::Backend {
                status: 0,
                message: err.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for ArchiveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
