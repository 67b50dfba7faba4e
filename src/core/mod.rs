pub mod error;
pub mod types;

pub use error::{ArchiveError, ErrorKind, Result};
pub use types::{CompositeId, EntityType, validate_native_id};
