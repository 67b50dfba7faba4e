pub mod outcome;
pub mod page;
pub mod record;

pub use outcome::{BulkDeleteReport, Outcome, OutcomeError};
pub use page::{AggregatePage, approx_total_pages};
pub use record::{ArchivedRecord, Attribute};
