use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::records::validation::{clean_optional, nullable};
use crate::records::{Choice, CsvExport, Record, RecordId, ValidationErrors, WorkflowStatus};

/// Review status of a zoning clearance application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoningStatus {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl Choice for ZoningStatus {
    const ALL: &'static [Self] = &[
        Self::Submitted,
        Self::UnderReview,
        Self::Approved,
        Self::Rejected,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl WorkflowStatus for ZoningStatus {
    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Submitted => &[Self::UnderReview],
            Self::UnderReview => &[Self::Approved, Self::Rejected],
            Self::Approved | Self::Rejected => &[],
        }
    }
}

/// Intended land use declared on the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandUse {
    Residential,
    Commercial,
    Industrial,
    Agricultural,
    Institutional,
    MixedUse,
}

impl Choice for LandUse {
    const ALL: &'static [Self] = &[
        Self::Residential,
        Self::Commercial,
        Self::Industrial,
        Self::Agricultural,
        Self::Institutional,
        Self::MixedUse,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Commercial => "commercial",
            Self::Industrial => "industrial",
            Self::Agricultural => "agricultural",
            Self::Institutional => "institutional",
            Self::MixedUse => "mixed_use",
        }
    }
}

/// Persisted zoning clearance application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoningApplication {
    pub id: RecordId,
    pub reference_no: String,
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: Option<String>,
    pub property_address: String,
    pub lot_area_sqm: f64,
    pub land_use: LandUse,
    pub project_description: Option<String>,
    pub zone_id: Option<RecordId>,
    pub status: ZoningStatus,
    pub remarks: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ZoningApplication {
    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
        self.reference_no = reference_number(self.submitted_at, id);
    }
}

pub(crate) fn reference_number(submitted_at: DateTime<Utc>, id: RecordId) -> String {
    format!("ZC-{}-{id:06}", submitted_at.year())
}

/// Payload accepted when filing a new application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewZoningApplication {
    pub applicant_name: String,
    pub applicant_email: String,
    #[serde(default)]
    pub applicant_phone: Option<String>,
    pub property_address: String,
    pub lot_area_sqm: f64,
    pub land_use: String,
    #[serde(default)]
    pub project_description: Option<String>,
    #[serde(default)]
    pub zone_id: Option<RecordId>,
}

impl NewZoningApplication {
    /// Validate the payload and build an unsaved record.
    pub fn into_record(self, now: DateTime<Utc>) -> Result<ZoningApplication, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("applicant_name", &self.applicant_name, 255);
        errors.require_text("applicant_email", &self.applicant_email, 255);
        if !self.applicant_email.trim().is_empty() {
            errors.email("applicant_email", &self.applicant_email);
        }
        errors.optional_text("applicant_phone", self.applicant_phone.as_deref(), 32);
        errors.require_text("property_address", &self.property_address, 500);
        validate_lot_area(&mut errors, self.lot_area_sqm);
        errors.optional_text(
            "project_description",
            self.project_description.as_deref(),
            5000,
        );
        let land_use = match errors.choice::<LandUse>("land_use", &self.land_use) {
            Some(land_use) if errors.is_empty() => land_use,
            _ => return Err(errors),
        };

        Ok(ZoningApplication {
            id: 0,
            reference_no: String::new(),
            applicant_name: self.applicant_name.trim().to_string(),
            applicant_email: self.applicant_email.trim().to_string(),
            applicant_phone: clean_optional(self.applicant_phone),
            property_address: self.property_address.trim().to_string(),
            lot_area_sqm: self.lot_area_sqm,
            land_use,
            project_description: clean_optional(self.project_description),
            zone_id: self.zone_id,
            status: ZoningStatus::Submitted,
            remarks: None,
            submitted_at: now,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update of the applicant and property fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoningApplicationPatch {
    pub applicant_name: Option<String>,
    pub applicant_email: Option<String>,
    pub applicant_phone: Option<String>,
    pub property_address: Option<String>,
    pub lot_area_sqm: Option<f64>,
    pub land_use: Option<String>,
    pub project_description: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub zone_id: Option<Option<RecordId>>,
}

impl ZoningApplicationPatch {
    pub fn apply(
        self,
        record: &mut ZoningApplication,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.applicant_name {
            errors.require_text("applicant_name", name, 255);
        }
        if let Some(email) = &self.applicant_email {
            errors.require_text("applicant_email", email, 255);
            if !email.trim().is_empty() {
                errors.email("applicant_email", email);
            }
        }
        errors.optional_text("applicant_phone", self.applicant_phone.as_deref(), 32);
        if let Some(address) = &self.property_address {
            errors.require_text("property_address", address, 500);
        }
        if let Some(area) = self.lot_area_sqm {
            validate_lot_area(&mut errors, area);
        }
        errors.optional_text(
            "project_description",
            self.project_description.as_deref(),
            5000,
        );
        let land_use = self
            .land_use
            .as_deref()
            .and_then(|value| errors.choice::<LandUse>("land_use", value));
        errors.into_result()?;

        if let Some(name) = self.applicant_name {
            record.applicant_name = name.trim().to_string();
        }
        if let Some(email) = self.applicant_email {
            record.applicant_email = email.trim().to_string();
        }
        if self.applicant_phone.is_some() {
            record.applicant_phone = clean_optional(self.applicant_phone);
        }
        if let Some(address) = self.property_address {
            record.property_address = address.trim().to_string();
        }
        if let Some(area) = self.lot_area_sqm {
            record.lot_area_sqm = area;
        }
        if let Some(land_use) = land_use {
            record.land_use = land_use;
        }
        if self.project_description.is_some() {
            record.project_description = clean_optional(self.project_description);
        }
        if let Some(zone_id) = self.zone_id {
            record.zone_id = zone_id;
        }
        record.updated_at = now;
        Ok(())
    }
}

/// List filters shared by the index and export endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ZoningFilter {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub land_use: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

fn validate_lot_area(errors: &mut ValidationErrors, area: f64) {
    if !area.is_finite() || area <= 0.0 {
        errors.add("lot_area_sqm", "The lot area sqm must be greater than 0.");
    }
}

impl CsvExport for ZoningApplication {
    fn headers() -> &'static [&'static str] {
        &[
            "Reference No",
            "Applicant",
            "Email",
            "Property Address",
            "Land Use",
            "Lot Area (sqm)",
            "Status",
            "Submitted At",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.reference_no.clone(),
            self.applicant_name.clone(),
            self.applicant_email.clone(),
            self.property_address.clone(),
            self.land_use.label().to_string(),
            format!("{:.2}", self.lot_area_sqm),
            self.status.label().to_string(),
            self.submitted_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]
    }
}
