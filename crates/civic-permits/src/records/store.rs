use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Auto-incremented identifier shared by every stored record type.
pub type RecordId = u64;

/// A value that can be persisted by a [`RecordStore`].
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> RecordId;
    fn assign_id(&mut self, id: RecordId);
}

/// Storage abstraction so services can be exercised in isolation.
pub trait RecordStore<T: Record>: Send + Sync {
    /// Persist a new record, assigning it the next identifier.
    fn insert(&self, record: T) -> Result<T, StoreError>;
    fn update(&self, record: T) -> Result<T, StoreError>;
    fn fetch(&self, id: RecordId) -> Result<Option<T>, StoreError>;
    fn remove(&self, id: RecordId) -> Result<T, StoreError>;
    /// All records in identifier order.
    fn list(&self) -> Result<Vec<T>, StoreError>;
}

/// Existence check used when one record references another.
pub trait RecordLookup: Send + Sync {
    fn contains(&self, id: RecordId) -> Result<bool, StoreError>;
}

/// Notified after a record is deleted so dependent records can follow it.
pub trait RemovalHook: Send + Sync {
    fn record_removed(&self, id: RecordId) -> Result<(), StoreError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store; identifiers start at 1 and are never reused.
pub struct InMemoryStore<T> {
    records: Arc<Mutex<BTreeMap<RecordId, T>>>,
    sequence: Arc<AtomicU64>,
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(BTreeMap::new())),
            sequence: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl<T> Clone for InMemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            sequence: self.sequence.clone(),
        }
    }
}

impl<T> InMemoryStore<T> {
    fn guard(&self) -> Result<MutexGuard<'_, BTreeMap<RecordId, T>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl<T: Record> RecordStore<T> for InMemoryStore<T> {
    fn insert(&self, mut record: T) -> Result<T, StoreError> {
        let mut guard = self.guard()?;
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        record.assign_id(id);
        guard.insert(id, record.clone());
        Ok(record)
    }

    fn update(&self, record: T) -> Result<T, StoreError> {
        let mut guard = self.guard()?;
        match guard.get_mut(&record.id()) {
            Some(slot) => {
                *slot = record.clone();
                Ok(record)
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn fetch(&self, id: RecordId) -> Result<Option<T>, StoreError> {
        let guard = self.guard()?;
        Ok(guard.get(&id).cloned())
    }

    fn remove(&self, id: RecordId) -> Result<T, StoreError> {
        let mut guard = self.guard()?;
        guard.remove(&id).ok_or(StoreError::NotFound)
    }

    fn list(&self) -> Result<Vec<T>, StoreError> {
        let guard = self.guard()?;
        Ok(guard.values().cloned().collect())
    }
}
