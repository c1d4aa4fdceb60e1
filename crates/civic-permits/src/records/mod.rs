//! Shared plumbing for every record-keeping workflow: storage, pagination,
//! response envelopes, validation errors, status workflows and CSV export.

pub mod export;
pub mod pagination;
pub mod response;
pub mod search;
pub mod store;
pub mod validation;
pub mod workflow;

pub use export::{csv_attachment, CsvExport};
pub use pagination::{Page, PageRequest};
pub use response::{ApiError, Created, Envelope};
pub use search::matches_search;
pub use store::{
    InMemoryStore, Record, RecordId, RecordLookup, RecordStore, RemovalHook, StoreError,
};
pub use validation::{Choice, ValidationErrors};
pub use workflow::{transition, StatusChange, WorkflowStatus};
