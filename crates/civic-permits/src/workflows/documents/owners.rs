use std::sync::Arc;

use tracing::info;

use super::domain::{Document, DocumentOwner, OwnerType};
use crate::records::{Choice, RecordId, RecordLookup, RecordStore, RemovalHook, StoreError};

/// Resolves document owners against the workflow that stores them.
#[derive(Clone)]
pub struct OwnerDirectory {
    zoning: Arc<dyn RecordLookup>,
    housing: Arc<dyn RecordLookup>,
    occupancy: Arc<dyn RecordLookup>,
}

impl OwnerDirectory {
    pub fn new(
        zoning: Arc<dyn RecordLookup>,
        housing: Arc<dyn RecordLookup>,
        occupancy: Arc<dyn RecordLookup>,
    ) -> Self {
        Self {
            zoning,
            housing,
            occupancy,
        }
    }

    pub fn exists(&self, owner: DocumentOwner) -> Result<bool, StoreError> {
        let lookup = match owner.owner_type {
            OwnerType::Zoning => &self.zoning,
            OwnerType::Housing => &self.housing,
            OwnerType::Occupancy => &self.occupancy,
        };
        lookup.contains(owner.owner_id)
    }
}

/// Drops every document of one owner type when its owning record is deleted.
pub struct DocumentCascade<S> {
    store: Arc<S>,
    owner_type: OwnerType,
}

impl<S> DocumentCascade<S>
where
    S: RecordStore<Document> + 'static,
{
    pub fn new(store: Arc<S>, owner_type: OwnerType) -> Self {
        Self { store, owner_type }
    }
}

impl<S> RemovalHook for DocumentCascade<S>
where
    S: RecordStore<Document> + 'static,
{
    fn record_removed(&self, id: RecordId) -> Result<(), StoreError> {
        let owner = DocumentOwner {
            owner_type: self.owner_type,
            owner_id: id,
        };
        let mut removed = 0usize;
        for document in self.store.list()? {
            if document.owner != owner {
                continue;
            }
            match self.store.remove(document.id) {
                Ok(_) | Err(StoreError::NotFound) => removed += 1,
                Err(err) => return Err(err),
            }
        }
        if removed > 0 {
            info!(
                owner_type = self.owner_type.label(),
                owner_id = id,
                removed,
                "owner deleted, documents removed"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::records::InMemoryStore;
    use crate::workflows::documents::DocumentStatus;

    fn document(owner_type: OwnerType, owner_id: RecordId) -> Document {
        let now = Utc::now();
        Document {
            id: 0,
            owner: DocumentOwner {
                owner_type,
                owner_id,
            },
            name: "Lot plan".to_string(),
            file_name: "lot-plan.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size_bytes: 2048,
            status: DocumentStatus::Pending,
            remarks: None,
            uploaded_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn cascade_only_touches_the_deleted_owner() {
        let store = Arc::new(InMemoryStore::<Document>::default());
        store.insert(document(OwnerType::Zoning, 1)).expect("insert");
        store.insert(document(OwnerType::Zoning, 1)).expect("insert");
        let other_record = store.insert(document(OwnerType::Zoning, 2)).expect("insert");
        let other_module = store.insert(document(OwnerType::Housing, 1)).expect("insert");

        let cascade = DocumentCascade::new(store.clone(), OwnerType::Zoning);
        cascade.record_removed(1).expect("cascade");

        let left: Vec<RecordId> = store
            .list()
            .expect("list")
            .into_iter()
            .map(|doc| doc.id)
            .collect();
        assert_eq!(left, vec![other_record.id, other_module.id]);

        cascade.record_removed(1).expect("nothing left to remove");
    }
}
