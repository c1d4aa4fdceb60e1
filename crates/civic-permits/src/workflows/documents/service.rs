use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    Document, DocumentFilter, DocumentOwner, DocumentStatus, NewDocument, OwnerType,
    MAX_DOCUMENT_BYTES,
};
use super::owners::OwnerDirectory;
use crate::config::PaginationConfig;
use crate::records::validation::clean_optional;
use crate::records::{
    transition, ApiError, Choice, Page, PageRequest, RecordId, RecordStore, StatusChange,
    StoreError, ValidationErrors,
};
use crate::workflows::dashboard::{ModuleStats, ModuleSummary, StatsSource};

const RESOURCE: &str = "document";

pub struct DocumentService<S> {
    store: Arc<S>,
    owners: OwnerDirectory,
    pagination: PaginationConfig,
}

impl<S> DocumentService<S>
where
    S: RecordStore<Document> + 'static,
{
    pub fn new(store: Arc<S>, owners: OwnerDirectory, pagination: PaginationConfig) -> Self {
        Self {
            store,
            owners,
            pagination,
        }
    }

    pub fn list(
        &self,
        filter: &DocumentFilter,
        page: &PageRequest,
    ) -> Result<Page<Document>, ApiError> {
        let mut errors = ValidationErrors::new();
        let owner_type =
            errors.optional_choice::<OwnerType>("owner_type", filter.owner_type.as_deref());
        let status = errors.optional_choice::<DocumentStatus>("status", filter.status.as_deref());
        errors.into_result()?;

        let mut documents: Vec<Document> = self
            .store
            .list()?
            .into_iter()
            .filter(|doc| owner_type.map_or(true, |kind| doc.owner.owner_type == kind))
            .filter(|doc| filter.owner_id.map_or(true, |id| doc.owner.owner_id == id))
            .filter(|doc| status.map_or(true, |status| doc.status == status))
            .collect();
        documents.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        Ok(Page::paginate(documents, page, &self.pagination))
    }

    pub fn create(&self, payload: NewDocument) -> Result<Document, ApiError> {
        let mut errors = ValidationErrors::new();
        errors.require_text("name", &payload.name, 255);
        errors.require_text("file_name", &payload.file_name, 255);
        errors.optional_text("mime_type", payload.mime_type.as_deref(), 127);
        if payload.size_bytes == 0 {
            errors.add("size_bytes", "The document may not be empty.");
        } else if payload.size_bytes > MAX_DOCUMENT_BYTES {
            errors.add(
                "size_bytes",
                format!(
                    "The document may not be greater than {} kilobytes.",
                    MAX_DOCUMENT_BYTES / 1024
                ),
            );
        }
        let owner_type = match errors.choice::<OwnerType>("owner_type", &payload.owner_type) {
            Some(owner_type) if errors.is_empty() => owner_type,
            _ => return Err(errors.into()),
        };

        let owner = DocumentOwner {
            owner_type,
            owner_id: payload.owner_id,
        };
        if !self.owners.exists(owner)? {
            return Err(ValidationErrors::single(
                "owner_id",
                format!(
                    "The selected {} record {} does not exist.",
                    owner_type.label(),
                    payload.owner_id
                ),
            )
            .into());
        }

        let file_name = payload.file_name.trim().to_string();
        let mime_type = clean_optional(payload.mime_type)
            .unwrap_or_else(|| Document::guess_mime_type(&file_name));
        let now = Utc::now();
        let stored = self.store.insert(Document {
            id: 0,
            owner,
            name: payload.name.trim().to_string(),
            file_name,
            mime_type,
            size_bytes: payload.size_bytes,
            status: DocumentStatus::Pending,
            remarks: None,
            uploaded_at: now,
            updated_at: now,
        })?;
        info!(
            id = stored.id,
            owner_type = owner_type.label(),
            owner_id = stored.owner.owner_id,
            "document registered"
        );
        Ok(stored)
    }

    pub fn get(&self, id: RecordId) -> Result<Document, ApiError> {
        self.store
            .fetch(id)?
            .ok_or_else(|| ApiError::not_found(RESOURCE, id))
    }

    pub fn delete(&self, id: RecordId) -> Result<Document, ApiError> {
        let removed = self.store.remove(id).map_err(|err| match err {
            StoreError::NotFound => ApiError::not_found(RESOURCE, id),
            other => ApiError::Store(other),
        })?;
        info!(id, "document deleted");
        Ok(removed)
    }

    pub fn change_status(&self, id: RecordId, change: StatusChange) -> Result<Document, ApiError> {
        let mut errors = ValidationErrors::new();
        let target = errors.choice::<DocumentStatus>("status", &change.status);
        errors.optional_text("remarks", change.remarks.as_deref(), 2000);
        let target = match target {
            Some(target) if errors.is_empty() => target,
            _ => return Err(errors.into()),
        };

        let mut document = self.get(id)?;
        let previous = document.status;
        document.status = transition(previous, target).inspect_err(|_| {
            warn!(
                id,
                from = previous.label(),
                to = target.label(),
                "rejected document status change"
            );
        })?;
        document.remarks = clean_optional(change.remarks);
        document.updated_at = Utc::now();

        let stored = self.store.update(document)?;
        info!(
            id,
            from = previous.label(),
            to = target.label(),
            "document status changed"
        );
        Ok(stored)
    }
}

impl<S> StatsSource for DocumentService<S>
where
    S: RecordStore<Document> + 'static,
{
    fn module(&self) -> &'static str {
        "documents"
    }

    fn stats(&self) -> Result<ModuleSummary, StoreError> {
        let documents = self.store.list()?;
        let bytes: u64 = documents.iter().map(|doc| doc.size_bytes).sum();
        Ok(ModuleStats::tally(documents.iter().map(|doc| doc.status))
            .with_count("total_size_bytes", bytes)
            .into())
    }
}
