use crate::core::{ArchiveError, EntityType, Result};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

/// Archive aggregation settings
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Per-source page size used when the caller does not pass one
    pub default_limit: u32,

    /// Upper bound for a caller-supplied page size
    pub max_limit: u32,

    /// Limit for one collector read during fan-out
    pub source_timeout: Duration,

    /// Limit for one restore/delete/bulk-wipe call
    pub mutation_timeout: Duration,

    /// Entity types whose backend has no bulk wipe
    pub without_bulk_wipe: HashSet<EntityType>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveConfig {
    pub fn new() -> Self {
        Self {
            default_limit: 50,
            max_limit: 200,
            source_timeout: Duration::from_secs(10),
            mutation_timeout: Duration::from_secs(15),
            without_bulk_wipe: HashSet::new(),
        }
    }

    /// Set the default page size
    pub fn default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit;
        self
    }

    /// Set the maximum page size
    pub fn max_limit(mut self, limit: u32) -> Self {
        self.max_limit = limit;
        self
    }

    /// Set the per-source read timeout
    pub fn source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    /// Set the mutation timeout
    pub fn mutation_timeout(mut self, timeout: Duration) -> Self {
        self.mutation_timeout = timeout;
        self
    }

    /// Mark an entity type as lacking bulk wipe
    pub fn without_bulk_wipe(mut self, entity_type: EntityType) -> Self {
        self.without_bulk_wipe.insert(entity_type);
        self
    }

    /// Page size actually sent to sources: default when absent, clamped to `[1, max_limit]`.
    pub fn effective_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 || self.max_limit == 0 {
            return Err(ArchiveError::Config(
                "page limits must be greater than zero".to_string(),
            ));
        }
        if self.default_limit > self.max_limit {
            return Err(ArchiveError::Config(format!(
                "default_limit {} exceeds max_limit {}",
                self.default_limit, self.max_limit
            )));
        }
        if self.source_timeout.is_zero() || self.mutation_timeout.is_zero() {
            return Err(ArchiveError::Config(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Process settings for the `crm-archive` binary, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub backend_url: String,
    pub backend_token: Option<String>,
    pub archive: ArchiveConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = env_string("ARCHIVE_BIND_ADDR", "127.0.0.1:18090")
            .parse::<SocketAddr>()
            .map_err(|_| {
                ArchiveError::Config("ARCHIVE_BIND_ADDR must be a valid host:port".to_string())
            })?;

        let backend_url = env_string("ARCHIVE_BACKEND_URL", "http://127.0.0.1:8080/api");
        let backend_token = std::env::var("ARCHIVE_BACKEND_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        let mut archive = ArchiveConfig::new();
        if let Some(millis) = env_u64("ARCHIVE_SOURCE_TIMEOUT_MS")? {
            archive = archive.source_timeout(Duration::from_millis(millis));
        }
        if let Some(limit) = env_u64("ARCHIVE_DEFAULT_LIMIT")? {
            let limit = u32::try_from(limit).map_err(|_| {
                ArchiveError::Config("ARCHIVE_DEFAULT_LIMIT is out of range".to_string())
            })?;
            archive = archive.default_limit(limit);
        }
        if let Ok(list) = std::env::var("ARCHIVE_WITHOUT_BULK_WIPE") {
            for name in list.split(',').filter(|name| !name.trim().is_empty()) {
                archive = archive.without_bulk_wipe(name.parse()?);
            }
        }
        archive.validate()?;

        Ok(Self {
            bind_addr,
            backend_url,
            backend_token,
            archive,
        })
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ArchiveError::Config(format!("{} must be an unsigned integer", key))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_limit_clamps_to_bounds() {
        let config = ArchiveConfig::new().default_limit(25).max_limit(100);
        assert_eq!(config.effective_limit(None), 25);
        assert_eq!(config.effective_limit(Some(0)), 1);
        assert_eq!(config.effective_limit(Some(500)), 100);
    }

    #[test]
    fn validate_rejects_inverted_limits() {
        let config = ArchiveConfig::new().default_limit(300);
        assert!(matches!(config.validate(), Err(ArchiveError::Config(_))));
        assert!(
            ArchiveConfig::new()
                .source_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(ArchiveConfig::new().validate().is_ok());
    }
}
