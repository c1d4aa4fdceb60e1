use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::{Choice, Record, RecordId, WorkflowStatus};

/// Upload ceiling for supporting documents.
pub const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Record type a document is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerType {
    Zoning,
    Housing,
    Occupancy,
}

impl Choice for OwnerType {
    const ALL: &'static [Self] = &[Self::Zoning, Self::Housing, Self::Occupancy];

    fn label(self) -> &'static str {
        match self {
            Self::Zoning => "zoning",
            Self::Housing => "housing",
            Self::Occupancy => "occupancy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentOwner {
    pub owner_type: OwnerType,
    pub owner_id: RecordId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Verified,
    Rejected,
}

impl Choice for DocumentStatus {
    const ALL: &'static [Self] = &[Self::Pending, Self::Verified, Self::Rejected];

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }
}

impl WorkflowStatus for DocumentStatus {
    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Verified, Self::Rejected],
            Self::Rejected => &[Self::Pending],
            Self::Verified => &[],
        }
    }
}

/// Metadata for a supporting document; file bytes live outside this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: RecordId,
    #[serde(flatten)]
    pub owner: DocumentOwner,
    pub name: String,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub status: DocumentStatus,
    pub remarks: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Media type implied by the file extension, or `application/octet-stream`.
    pub fn guess_mime_type(file_name: &str) -> String {
        mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

impl Record for Document {
    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    pub owner_type: String,
    pub owner_id: RecordId,
    pub name: String,
    pub file_name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentFilter {
    #[serde(default)]
    pub owner_type: Option<String>,
    #[serde(default)]
    pub owner_id: Option<RecordId>,
    #[serde(default)]
    pub status: Option<String>,
}
