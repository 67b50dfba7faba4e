// ============================================================================
// CRM Archive Library
// ============================================================================
//
// One paginated view over archived (soft-deleted) records of nine CRM entity
// collections, with restore and permanent delete routed back to the owning
// source.

pub mod core;
pub mod model;
pub mod config;
pub mod normalize;
pub mod source;
pub mod aggregate;
pub mod dispatch;
pub mod filter;
pub mod state;
pub mod service;
pub mod web;
pub mod demo;

// Re-export main types for convenience
pub use core::{ArchiveError, CompositeId, EntityType, ErrorKind, Result};
pub use model::{AggregatePage, ArchivedRecord, Attribute, BulkDeleteReport, Outcome};
pub use config::{AppConfig, ArchiveConfig};
pub use normalize::normalize;
pub use aggregate::ArchiveAggregator;
pub use dispatch::LifecycleDispatcher;
pub use filter::{ArchiveFilter, DateBucket};
pub use state::ArchiveState;
pub use service::ArchiveService;

// Re-export source API
pub use source::{
    ArchiveBackend, BackendCollector, InMemoryArchiveBackend, PageRequest, RestArchiveBackend,
    SourceCollector, SourcePage, SourceRegistry,
};
