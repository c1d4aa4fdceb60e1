use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::records::validation::{clean_optional, nullable};
use crate::records::{Choice, CsvExport, Record, RecordId, ValidationErrors};

/// Monitoring classification assigned by inspectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyStatus {
    Compliant,
    NonCompliant,
    ForInspection,
    Vacant,
}

impl Choice for OccupancyStatus {
    const ALL: &'static [Self] = &[
        Self::Compliant,
        Self::NonCompliant,
        Self::ForInspection,
        Self::Vacant,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::NonCompliant => "non_compliant",
            Self::ForInspection => "for_inspection",
            Self::Vacant => "vacant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyType {
    Residential,
    Commercial,
    Industrial,
    Mixed,
}

impl Choice for OccupancyType {
    const ALL: &'static [Self] = &[
        Self::Residential,
        Self::Commercial,
        Self::Industrial,
        Self::Mixed,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Commercial => "commercial",
            Self::Industrial => "industrial",
            Self::Mixed => "mixed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyRecord {
    pub id: RecordId,
    pub building_name: String,
    pub unit_no: Option<String>,
    pub address: String,
    pub occupant_name: String,
    pub occupancy_type: OccupancyType,
    pub occupants_count: u32,
    pub max_capacity: u32,
    pub status: OccupancyStatus,
    pub last_inspected_on: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OccupancyRecord {
    pub fn over_capacity(&self) -> bool {
        self.occupants_count > self.max_capacity
    }

    pub fn view(self) -> OccupancyRecordView {
        OccupancyRecordView {
            over_capacity: self.over_capacity(),
            record: self,
        }
    }

    /// Cross-field rules checked after every create or update.
    fn check_consistency(&self, today: NaiveDate, errors: &mut ValidationErrors) {
        if self.status == OccupancyStatus::Vacant && self.occupants_count > 0 {
            errors.add(
                "status",
                "A unit can only be marked vacant when it has no occupants.",
            );
        }
        if self.last_inspected_on.is_some_and(|date| date > today) {
            errors.add(
                "last_inspected_on",
                "The last inspected on date may not be in the future.",
            );
        }
    }
}

impl Record for OccupancyRecord {
    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyRecordView {
    #[serde(flatten)]
    pub record: OccupancyRecord,
    pub over_capacity: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOccupancyRecord {
    pub building_name: String,
    #[serde(default)]
    pub unit_no: Option<String>,
    pub address: String,
    pub occupant_name: String,
    pub occupancy_type: String,
    pub occupants_count: u32,
    pub max_capacity: u32,
    pub status: String,
    #[serde(default)]
    pub last_inspected_on: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewOccupancyRecord {
    pub fn into_record(self, now: DateTime<Utc>) -> Result<OccupancyRecord, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("building_name", &self.building_name, 255);
        errors.optional_text("unit_no", self.unit_no.as_deref(), 32);
        errors.require_text("address", &self.address, 500);
        errors.require_text("occupant_name", &self.occupant_name, 255);
        errors.optional_text("notes", self.notes.as_deref(), 2000);
        validate_capacity(&mut errors, self.max_capacity);
        let occupancy_type = errors.choice::<OccupancyType>("occupancy_type", &self.occupancy_type);
        let status = errors.choice::<OccupancyStatus>("status", &self.status);

        let (occupancy_type, status) = match (occupancy_type, status) {
            (Some(occupancy_type), Some(status)) if errors.is_empty() => (occupancy_type, status),
            _ => return Err(errors),
        };

        let record = OccupancyRecord {
            id: 0,
            building_name: self.building_name.trim().to_string(),
            unit_no: clean_optional(self.unit_no),
            address: self.address.trim().to_string(),
            occupant_name: self.occupant_name.trim().to_string(),
            occupancy_type,
            occupants_count: self.occupants_count,
            max_capacity: self.max_capacity,
            status,
            last_inspected_on: self.last_inspected_on,
            notes: clean_optional(self.notes),
            created_at: now,
            updated_at: now,
        };
        record.check_consistency(now.date_naive(), &mut errors);
        errors.into_result()?;
        Ok(record)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OccupancyRecordPatch {
    pub building_name: Option<String>,
    pub unit_no: Option<String>,
    pub address: Option<String>,
    pub occupant_name: Option<String>,
    pub occupancy_type: Option<String>,
    pub occupants_count: Option<u32>,
    pub max_capacity: Option<u32>,
    pub status: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_inspected_on: Option<Option<NaiveDate>>,
    pub notes: Option<String>,
}

impl OccupancyRecordPatch {
    pub fn apply(
        self,
        record: &mut OccupancyRecord,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.building_name {
            errors.require_text("building_name", name, 255);
        }
        errors.optional_text("unit_no", self.unit_no.as_deref(), 32);
        if let Some(address) = &self.address {
            errors.require_text("address", address, 500);
        }
        if let Some(occupant) = &self.occupant_name {
            errors.require_text("occupant_name", occupant, 255);
        }
        errors.optional_text("notes", self.notes.as_deref(), 2000);
        if let Some(capacity) = self.max_capacity {
            validate_capacity(&mut errors, capacity);
        }
        let occupancy_type =
            errors.optional_choice::<OccupancyType>("occupancy_type", self.occupancy_type.as_deref());
        let status = errors.optional_choice::<OccupancyStatus>("status", self.status.as_deref());
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut updated = record.clone();
        if let Some(name) = self.building_name {
            updated.building_name = name.trim().to_string();
        }
        if self.unit_no.is_some() {
            updated.unit_no = clean_optional(self.unit_no);
        }
        if let Some(address) = self.address {
            updated.address = address.trim().to_string();
        }
        if let Some(occupant) = self.occupant_name {
            updated.occupant_name = occupant.trim().to_string();
        }
        if let Some(occupancy_type) = occupancy_type {
            updated.occupancy_type = occupancy_type;
        }
        if let Some(count) = self.occupants_count {
            updated.occupants_count = count;
        }
        if let Some(capacity) = self.max_capacity {
            updated.max_capacity = capacity;
        }
        if let Some(status) = status {
            updated.status = status;
        }
        if let Some(inspected_on) = self.last_inspected_on {
            updated.last_inspected_on = inspected_on;
        }
        if self.notes.is_some() {
            updated.notes = clean_optional(self.notes);
        }
        updated.updated_at = now;

        updated.check_consistency(now.date_naive(), &mut errors);
        errors.into_result()?;
        *record = updated;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OccupancyFilter {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub occupancy_type: Option<String>,
    #[serde(default)]
    pub over_capacity: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
}

fn validate_capacity(errors: &mut ValidationErrors, capacity: u32) {
    if capacity == 0 {
        errors.add("max_capacity", "The max capacity must be at least 1.");
    }
}

impl CsvExport for OccupancyRecordView {
    fn headers() -> &'static [&'static str] {
        &[
            "Building",
            "Unit",
            "Address",
            "Occupant",
            "Type",
            "Occupants",
            "Capacity",
            "Over Capacity",
            "Status",
            "Last Inspected",
        ]
    }

    fn row(&self) -> Vec<String> {
        let record = &self.record;
        vec![
            record.building_name.clone(),
            record.unit_no.clone().unwrap_or_default(),
            record.address.clone(),
            record.occupant_name.clone(),
            record.occupancy_type.label().to_string(),
            record.occupants_count.to_string(),
            record.max_capacity.to_string(),
            if self.over_capacity { "yes" } else { "no" }.to_string(),
            record.status.label().to_string(),
            record
                .last_inspected_on
                .map(|date| date.to_string())
                .unwrap_or_default(),
        ]
    }
}
