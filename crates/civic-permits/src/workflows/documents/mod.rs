//! Supporting-document metadata attached to zoning, housing and occupancy records.

pub mod domain;
pub mod owners;
pub mod router;
pub mod service;

pub use domain::{
    Document, DocumentFilter, DocumentOwner, DocumentStatus, NewDocument, OwnerType,
    MAX_DOCUMENT_BYTES,
};
pub use owners::{DocumentCascade, OwnerDirectory};
pub use router::document_router;
pub use service::DocumentService;
