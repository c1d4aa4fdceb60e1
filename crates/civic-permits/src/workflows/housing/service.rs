use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    HousingApplication, HousingApplicationPatch, HousingFilter, HousingProgram, HousingStatus,
    NewHouseholdMember, NewHousingApplication,
};
use crate::config::PaginationConfig;
use crate::records::validation::clean_optional;
use crate::records::{
    matches_search, transition, ApiError, Choice, Page, PageRequest, RecordId, RecordLookup,
    RecordStore, RemovalHook, StatusChange, StoreError, ValidationErrors, WorkflowStatus,
};
use crate::workflows::dashboard::{ModuleStats, ModuleSummary, StatsSource};

const RESOURCE: &str = "housing application";

pub struct HousingService<S> {
    store: Arc<S>,
    pagination: PaginationConfig,
    // Serializes read-modify-write cycles on a single record.
    writes: Mutex<()>,
    removal_hooks: Vec<Arc<dyn RemovalHook>>,
}

impl<S> HousingService<S>
where
    S: RecordStore<HousingApplication> + 'static,
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
            .map_err(|_| StoreError::Unavailable("housing write lock poisoned".to_string()))
    }

    pub fn search(&self, filter: &HousingFilter) -> Result<Vec<HousingApplication>, ApiError> {
        let mut errors = ValidationErrors::new();
        let status = errors.optional_choice::<HousingStatus>("status", filter.status.as_deref());
        let program =
            errors.optional_choice::<HousingProgram>("program", filter.program.as_deref());
        errors.into_result()?;

        let mut records: Vec<HousingApplication> = self
            .store
            .list()?
            .into_iter()
            .filter(|record| status.map_or(true, |status| record.status == status))
            .filter(|record| program.map_or(true, |program| record.program == program))
            .filter(|record| {
                matches_search(
                    filter.search.as_deref(),
                    [
                        record.reference_no.as_str(),
                        record.applicant_name.as_str(),
                        record.contact_number.as_str(),
                        record.current_address.as_str(),
                    ],
                )
            })
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    pub fn list(
        &self,
        filter: &HousingFilter,
        page: &PageRequest,
    ) -> Result<Page<HousingApplication>, ApiError> {
        Ok(Page::paginate(self.search(filter)?, page, &self.pagination))
    }

    pub fn create(&self, payload: NewHousingApplication) -> Result<HousingApplication, ApiError> {
        let record = payload.into_record(Utc::now())?;
        let stored = self.store.insert(record)?;
        info!(
            id = stored.id,
            reference_no = %stored.reference_no,
            members = stored.household_members.len(),
            "housing application submitted"
        );
        Ok(stored)
    }

    pub fn get(&self, id: RecordId) -> Result<HousingApplication, ApiError> {
        self.store
            .fetch(id)?
            .ok_or_else(|| ApiError::not_found(RESOURCE, id))
    }

    pub fn update(
        &self,
        id: RecordId,
        patch: HousingApplicationPatch,
    ) -> Result<HousingApplication, ApiError> {
        let _writes = self.write_lock()?;
        let mut record = self.open_record(id)?;
        patch.apply(&mut record, Utc::now())?;
        let stored = self.store.update(record)?;
        info!(id, reference_no = %stored.reference_no, "housing application updated");
        Ok(stored)
    }

    pub fn delete(&self, id: RecordId) -> Result<HousingApplication, ApiError> {
        let _writes = self.write_lock()?;
        let removed = self.store.remove(id).map_err(|err| match err {
            StoreError::NotFound => ApiError::not_found(RESOURCE, id),
            other => ApiError::Store(other),
        })?;
        info!(id, reference_no = %removed.reference_no, "housing application deleted");
        for hook in &self.removal_hooks {
            hook.record_removed(id)?;
        }
        Ok(removed)
    }

    pub fn add_member(
        &self,
        id: RecordId,
        member: NewHouseholdMember,
    ) -> Result<HousingApplication, ApiError> {
        member.validate().into_result()?;
        let _writes = self.write_lock()?;
        let mut record = self.open_record(id)?;
        let member_id = record.next_member_id();
        record.household_members.push(member.into_member(member_id));
        record.updated_at = Utc::now();
        let stored = self.store.update(record)?;
        info!(id, member_id, "household member added");
        Ok(stored)
    }

    pub fn remove_member(
        &self,
        id: RecordId,
        member_id: u32,
    ) -> Result<HousingApplication, ApiError> {
        let _writes = self.write_lock()?;
        let mut record = self.open_record(id)?;
        let before = record.household_members.len();
        record
            .household_members
            .retain(|member| member.id != member_id);
        if record.household_members.len() == before {
            return Err(ApiError::not_found("household member", u64::from(member_id)));
        }
        record.updated_at = Utc::now();
        let stored = self.store.update(record)?;
        info!(id, member_id, "household member removed");
        Ok(stored)
    }

    pub fn change_status(
        &self,
        id: RecordId,
        change: StatusChange,
    ) -> Result<HousingApplication, ApiError> {
        let mut errors = ValidationErrors::new();
        let target = errors.choice::<HousingStatus>("status", &change.status);
        errors.optional_text("remarks", change.remarks.as_deref(), 2000);
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
                "rejected housing status change"
            );
        })?;

        let now = Utc::now();
        record.reviewed_at = Some(now);
        record.updated_at = now;
        if let Some(remarks) = clean_optional(change.remarks) {
            record.remarks = Some(remarks);
        }

        let stored = self.store.update(record)?;
        info!(
            id,
            from = previous.label(),
            to = target.label(),
            "housing application status changed"
        );
        Ok(stored)
    }

    /// Fetch an application that still accepts edits.
    fn open_record(&self, id: RecordId) -> Result<HousingApplication, ApiError> {
        let record = self.get(id)?;
        if record.status.is_terminal() {
            return Err(ApiError::Conflict(format!(
                "{RESOURCE} {id} is {} and can no longer be edited",
                record.status.label()
            )));
        }
        Ok(record)
    }
}

impl<S> StatsSource for HousingService<S>
where
    S: RecordStore<HousingApplication> + 'static,
{
    fn module(&self) -> &'static str {
        "housing"
    }

    fn stats(&self) -> Result<ModuleSummary, StoreError> {
        let records = self.store.list()?;
        let people: usize = records.iter().map(HousingApplication::household_size).sum();
        Ok(ModuleStats::tally(records.iter().map(|record| record.status))
            .with_count("household_persons", people as u64)
            .into())
    }
}

impl<S> RecordLookup for HousingService<S>
where
    S: RecordStore<HousingApplication> + 'static,
{
    fn contains(&self, id: RecordId) -> Result<bool, StoreError> {
        Ok(self.store.fetch(id)?.is_some())
    }
}
