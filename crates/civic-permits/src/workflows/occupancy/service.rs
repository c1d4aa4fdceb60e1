use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::info;

use super::domain::{
    NewOccupancyRecord, OccupancyFilter, OccupancyRecord, OccupancyRecordPatch, OccupancyStatus,
    OccupancyType,
};
use crate::config::PaginationConfig;
use crate::records::{
    matches_search, ApiError, Choice, Page, PageRequest, RecordId, RecordLookup, RecordStore,
    RemovalHook, StoreError, ValidationErrors,
};
use crate::workflows::dashboard::{ModuleStats, ModuleSummary, StatsSource};

const RESOURCE: &str = "occupancy record";

pub struct OccupancyService<S> {
    store: Arc<S>,
    pagination: PaginationConfig,
    // Serializes read-modify-write cycles on a single record.
    writes: Mutex<()>,
    removal_hooks: Vec<Arc<dyn RemovalHook>>,
}

impl<S> OccupancyService<S>
where
    S: RecordStore<OccupancyRecord> + 'static,
{
    pub fn new(store: Arc<S>, pagination: PaginationConfig) -> Self {
        Self {
            store,
            pagination,
            writes: Mutex::new(()),
            removal_hooks: Vec::new(),
        }
    }

    /// Run `hook` after every successful delete.
    pub fn with_removal_hook(mut self, hook: Arc<dyn RemovalHook>) -> Self {
        self.removal_hooks.push(hook);
        self
    }

    fn write_lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.writes
            .lock()
            .map_err(|_| StoreError::Unavailable("occupancy write lock poisoned".to_string()))
    }

    /// Filtered records ordered by building then unit.
    pub fn search(&self, filter: &OccupancyFilter) -> Result<Vec<OccupancyRecord>, ApiError> {
        let mut errors = ValidationErrors::new();
        let status = errors.optional_choice::<OccupancyStatus>("status", filter.status.as_deref());
        let occupancy_type = errors
            .optional_choice::<OccupancyType>("occupancy_type", filter.occupancy_type.as_deref());
        errors.into_result()?;

        let mut records: Vec<OccupancyRecord> = self
            .store
            .list()?
            .into_iter()
            .filter(|record| status.map_or(true, |status| record.status == status))
            .filter(|record| occupancy_type.map_or(true, |kind| record.occupancy_type == kind))
            .filter(|record| {
                filter
                    .over_capacity
                    .map_or(true, |flag| record.over_capacity() == flag)
            })
            .filter(|record| {
                matches_search(
                    filter.search.as_deref(),
                    [
                        record.building_name.as_str(),
                        record.address.as_str(),
                        record.occupant_name.as_str(),
                        record.unit_no.as_deref().unwrap_or_default(),
                    ],
                )
            })
            .collect();
        records.sort_by(|a, b| {
            a.building_name
                .to_lowercase()
                .cmp(&b.building_name.to_lowercase())
                .then_with(|| a.unit_no.cmp(&b.unit_no))
                .then(a.id.cmp(&b.id))
        });
        Ok(records)
    }

    pub fn list(
        &self,
        filter: &OccupancyFilter,
        page: &PageRequest,
    ) -> Result<Page<OccupancyRecord>, ApiError> {
        Ok(Page::paginate(self.search(filter)?, page, &self.pagination))
    }

    pub fn create(&self, payload: NewOccupancyRecord) -> Result<OccupancyRecord, ApiError> {
        let record = payload.into_record(Utc::now())?;
        let stored = self.store.insert(record)?;
        info!(
            id = stored.id,
            building = %stored.building_name,
            over_capacity = stored.over_capacity(),
            "occupancy record created"
        );
        Ok(stored)
    }

    pub fn get(&self, id: RecordId) -> Result<OccupancyRecord, ApiError> {
        self.store
            .fetch(id)?
            .ok_or_else(|| ApiError::not_found(RESOURCE, id))
    }

    pub fn update(
        &self,
        id: RecordId,
        patch: OccupancyRecordPatch,
    ) -> Result<OccupancyRecord, ApiError> {
        let _writes = self.write_lock()?;
        let mut record = self.get(id)?;
        let previous = record.status;
        patch.apply(&mut record, Utc::now())?;
        let stored = self.store.update(record)?;
        if stored.status != previous {
            info!(id, status = stored.status.label(), "occupancy status reclassified");
        }
        Ok(stored)
    }

    pub fn delete(&self, id: RecordId) -> Result<OccupancyRecord, ApiError> {
        let _writes = self.write_lock()?;
        let removed = self.store.remove(id).map_err(|err| match err {
            StoreError::NotFound => ApiError::not_found(RESOURCE, id),
            other => ApiError::Store(other),
        })?;
        info!(id, "occupancy record deleted");
        for hook in &self.removal_hooks {
            hook.record_removed(id)?;
        }
        Ok(removed)
    }
}

impl<S> StatsSource for OccupancyService<S>
where
    S: RecordStore<OccupancyRecord> + 'static,
{
    fn module(&self) -> &'static str {
        "occupancy"
    }

    fn stats(&self) -> Result<ModuleSummary, StoreError> {
        let records = self.store.list()?;
        let over_capacity = records.iter().filter(|record| record.over_capacity()).count();
        Ok(ModuleStats::tally(records.iter().map(|record| record.status))
            .with_count("over_capacity", over_capacity as u64)
            .into())
    }
}

impl<S> RecordLookup for OccupancyService<S>
where
    S: RecordStore<OccupancyRecord> + 'static,
{
    fn contains(&self, id: RecordId) -> Result<bool, StoreError> {
        Ok(self.store.fetch(id)?.is_some())
    }
}
