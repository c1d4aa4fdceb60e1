use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    LandUse, NewZoningApplication, ZoningApplication, ZoningApplicationPatch, ZoningFilter,
    ZoningStatus,
};
use crate::config::PaginationConfig;
use crate::records::validation::clean_optional;
use crate::records::{
    matches_search, transition, ApiError, Choice, Page, PageRequest, RecordId, RecordLookup,
    RecordStore, RemovalHook, StatusChange, StoreError, ValidationErrors, WorkflowStatus,
};
use crate::workflows::dashboard::{sum_amounts, ModuleStats, ModuleSummary, StatsSource};

const RESOURCE: &str = "zoning application";

/// Service composing the zoning store with validation and the review workflow.
pub struct ZoningService<S> {
    store: Arc<S>,
    pagination: PaginationConfig,
    // Serializes read-modify-write cycles on a single record.
    writes: Mutex<()>,
    removal_hooks: Vec<Arc<dyn RemovalHook>>,
}

impl<S> ZoningService<S>
where
    S: RecordStore<ZoningApplication> + 'static,
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
            .map_err(|_| StoreError::Unavailable("zoning write lock poisoned".to_string()))
    }

    /// Filtered applications, newest first.
    pub fn search(&self, filter: &ZoningFilter) -> Result<Vec<ZoningApplication>, ApiError> {
        let mut errors = ValidationErrors::new();
        let status = errors.optional_choice::<ZoningStatus>("status", filter.status.as_deref());
        let land_use = errors.optional_choice::<LandUse>("land_use", filter.land_use.as_deref());
        errors.into_result()?;

        let mut records: Vec<ZoningApplication> = self
            .store
            .list()?
            .into_iter()
            .filter(|record| status.map_or(true, |status| record.status == status))
            .filter(|record| land_use.map_or(true, |land_use| record.land_use == land_use))
            .filter(|record| {
                matches_search(
                    filter.search.as_deref(),
                    [
                        record.reference_no.as_str(),
                        record.applicant_name.as_str(),
                        record.applicant_email.as_str(),
                        record.property_address.as_str(),
                    ],
                )
            })
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    pub fn list(
        &self,
        filter: &ZoningFilter,
        page: &PageRequest,
    ) -> Result<Page<ZoningApplication>, ApiError> {
        let records = self.search(filter)?;
        Ok(Page::paginate(records, page, &self.pagination))
    }

    pub fn create(&self, payload: NewZoningApplication) -> Result<ZoningApplication, ApiError> {
        let record = payload.into_record(Utc::now())?;
        let stored = self.store.insert(record)?;
        info!(
            id = stored.id,
            reference_no = %stored.reference_no,
            "zoning application submitted"
        );
        Ok(stored)
    }

    pub fn get(&self, id: RecordId) -> Result<ZoningApplication, ApiError> {
        self.store
            .fetch(id)?
            .ok_or_else(|| ApiError::not_found(RESOURCE, id))
    }

    /// Edit applicant and property details while the application is still open.
    pub fn update(
        &self,
        id: RecordId,
        patch: ZoningApplicationPatch,
    ) -> Result<ZoningApplication, ApiError> {
        let _writes = self.write_lock()?;
        let mut record = self.get(id)?;
        if record.status.is_terminal() {
            return Err(ApiError::Conflict(format!(
                "{RESOURCE} {id} is {} and can no longer be edited",
                record.status.label()
            )));
        }

        patch.apply(&mut record, Utc::now())?;
        let stored = self.store.update(record)?;
        info!(id, "zoning application updated");
        Ok(stored)
    }

    pub fn delete(&self, id: RecordId) -> Result<ZoningApplication, ApiError> {
        let _writes = self.write_lock()?;
        let removed = self.store.remove(id).map_err(|err| match err {
            StoreError::NotFound => ApiError::not_found(RESOURCE, id),
            other => ApiError::Store(other),
        })?;
        info!(id, reference_no = %removed.reference_no, "zoning application deleted");
        for hook in &self.removal_hooks {
            hook.record_removed(id)?;
        }
        Ok(removed)
    }

    /// Apply a review decision guarded by the current status.
    pub fn change_status(
        &self,
        id: RecordId,
        change: StatusChange,
    ) -> Result<ZoningApplication, ApiError> {
        let mut errors = ValidationErrors::new();
        let target = errors.choice::<ZoningStatus>("status", &change.status);
        errors.optional_text("remarks", change.remarks.as_deref(), 2000);
        let remarks = clean_optional(change.remarks);
        if target == Some(ZoningStatus::Rejected) && remarks.is_none() {
            errors.add("remarks", "The remarks field is required when rejecting.");
        }
        let target = match target {
            Some(target) if errors.is_empty() => target,
            _ => return Err(errors.into()),
        };

        let _writes = self.write_lock()?;
        let mut record = self.get(id)?;
        let previous = record.status;
        record.status = transition(previous, target).inspect_err(|_| {
            warn!(
                id,
                from = previous.label(),
                to = target.label(),
                "rejected zoning status change"
            );
        })?;

        let now = Utc::now();
        record.reviewed_at = Some(now);
        record.updated_at = now;
        if remarks.is_some() {
            record.remarks = remarks;
        }

        let stored = self.store.update(record)?;
        info!(
            id,
            from = previous.label(),
            to = target.label(),
            "zoning application status changed"
        );
        Ok(stored)
    }
}

impl<S> StatsSource for ZoningService<S>
where
    S: RecordStore<ZoningApplication> + 'static,
{
    fn module(&self) -> &'static str {
        "zoning"
    }

    fn stats(&self) -> Result<ModuleSummary, StoreError> {
        let records = self.store.list()?;
        let total_area = sum_amounts(records.iter().map(|record| record.lot_area_sqm));
        Ok(ModuleStats::tally(records.iter().map(|record| record.status))
            .with_amount("total_lot_area_sqm", total_area)
            .into())
    }
}

impl<S> RecordLookup for ZoningService<S>
where
    S: RecordStore<ZoningApplication> + 'static,
{
    fn contains(&self, id: RecordId) -> Result<bool, StoreError> {
        Ok(self.store.fetch(id)?.is_some())
    }
}
