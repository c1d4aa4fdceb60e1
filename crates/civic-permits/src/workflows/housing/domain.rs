use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::records::validation::clean_optional;
use crate::records::{Choice, CsvExport, Record, RecordId, ValidationErrors, WorkflowStatus};

/// Evaluation status of a housing application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HousingStatus {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Waitlisted,
}

impl Choice for HousingStatus {
    const ALL: &'static [Self] = &[
        Self::Submitted,
        Self::UnderReview,
        Self::Approved,
        Self::Rejected,
        Self::Waitlisted,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Waitlisted => "waitlisted",
        }
    }
}

impl WorkflowStatus for HousingStatus {
    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Submitted => &[Self::UnderReview],
            Self::UnderReview => &[Self::Approved, Self::Rejected, Self::Waitlisted],
            Self::Waitlisted => &[Self::Approved, Self::Rejected],
            Self::Approved | Self::Rejected => &[],
        }
    }
}

/// Housing assistance program applied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HousingProgram {
    SocializedHousing,
    RentalSubsidy,
    Relocation,
    HomeImprovement,
}

impl Choice for HousingProgram {
    const ALL: &'static [Self] = &[
        Self::SocializedHousing,
        Self::RentalSubsidy,
        Self::Relocation,
        Self::HomeImprovement,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::SocializedHousing => "socialized_housing",
            Self::RentalSubsidy => "rental_subsidy",
            Self::Relocation => "relocation",
            Self::HomeImprovement => "home_improvement",
        }
    }
}

/// A person living with the applicant. Ids are unique within one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdMember {
    pub id: u32,
    pub full_name: String,
    pub relationship: String,
    pub age: u16,
    pub monthly_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHouseholdMember {
    pub full_name: String,
    pub relationship: String,
    pub age: u16,
    #[serde(default)]
    pub monthly_income: f64,
}

impl NewHouseholdMember {
    pub(crate) fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require_text("full_name", &self.full_name, 255);
        errors.require_text("relationship", &self.relationship, 64);
        if self.age > 120 {
            errors.add("age", "The age may not be greater than 120.");
        }
        validate_income(&mut errors, "monthly_income", self.monthly_income);
        errors
    }

    pub(crate) fn into_member(self, id: u32) -> HouseholdMember {
        HouseholdMember {
            id,
            full_name: self.full_name.trim().to_string(),
            relationship: self.relationship.trim().to_string(),
            age: self.age,
            monthly_income: self.monthly_income,
        }
    }
}

/// Persisted housing application with its household roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingApplication {
    pub id: RecordId,
    pub reference_no: String,
    pub applicant_name: String,
    pub applicant_email: Option<String>,
    pub contact_number: String,
    pub current_address: String,
    pub monthly_income: f64,
    pub program: HousingProgram,
    pub household_members: Vec<HouseholdMember>,
    pub status: HousingStatus,
    pub remarks: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HousingApplication {
    /// Applicant plus listed members.
    pub fn household_size(&self) -> usize {
        self.household_members.len() + 1
    }

    pub fn total_household_income(&self) -> f64 {
        self.monthly_income
            + self
                .household_members
                .iter()
                .map(|member| member.monthly_income)
                .sum::<f64>()
    }

    pub fn per_capita_income(&self) -> f64 {
        self.total_household_income() / self.household_size() as f64
    }

    pub(crate) fn next_member_id(&self) -> u32 {
        self.household_members
            .iter()
            .map(|member| member.id)
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn view(self) -> HousingApplicationView {
        HousingApplicationView {
            household_size: self.household_size(),
            total_household_income: self.total_household_income(),
            per_capita_income: round_cents(self.per_capita_income()),
            application: self,
        }
    }
}

impl Record for HousingApplication {
    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
        self.reference_no = format!("HA-{}-{id:06}", self.submitted_at.year());
    }
}

/// Response shape carrying derived household figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HousingApplicationView {
    #[serde(flatten)]
    pub application: HousingApplication,
    pub household_size: usize,
    pub total_household_income: f64,
    pub per_capita_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHousingApplication {
    pub applicant_name: String,
    #[serde(default)]
    pub applicant_email: Option<String>,
    pub contact_number: String,
    pub current_address: String,
    pub monthly_income: f64,
    pub program: String,
    #[serde(default)]
    pub household_members: Vec<NewHouseholdMember>,
}

impl NewHousingApplication {
    pub fn into_record(self, now: DateTime<Utc>) -> Result<HousingApplication, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("applicant_name", &self.applicant_name, 255);
        let email = clean_optional(self.applicant_email);
        if let Some(email) = &email {
            errors.email("applicant_email", email);
        }
        errors.require_text("contact_number", &self.contact_number, 32);
        errors.require_text("current_address", &self.current_address, 500);
        validate_income(&mut errors, "monthly_income", self.monthly_income);
        for (index, member) in self.household_members.iter().enumerate() {
            errors.extend_prefixed(&format!("household_members.{index}"), member.validate());
        }
        let program = match errors.choice::<HousingProgram>("program", &self.program) {
            Some(program) if errors.is_empty() => program,
            _ => return Err(errors),
        };

        let household_members = self
            .household_members
            .into_iter()
            .zip(1..)
            .map(|(member, id)| member.into_member(id))
            .collect();

        Ok(HousingApplication {
            id: 0,
            reference_no: String::new(),
            applicant_name: self.applicant_name.trim().to_string(),
            applicant_email: email,
            contact_number: self.contact_number.trim().to_string(),
            current_address: self.current_address.trim().to_string(),
            monthly_income: self.monthly_income,
            program,
            household_members,
            status: HousingStatus::Submitted,
            remarks: None,
            submitted_at: now,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HousingApplicationPatch {
    pub applicant_name: Option<String>,
    pub applicant_email: Option<String>,
    pub contact_number: Option<String>,
    pub current_address: Option<String>,
    pub monthly_income: Option<f64>,
    pub program: Option<String>,
}

impl HousingApplicationPatch {
    pub fn apply(
        self,
        record: &mut HousingApplication,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.applicant_name {
            errors.require_text("applicant_name", name, 255);
        }
        if let Some(email) = self.applicant_email.as_deref().map(str::trim) {
            if !email.is_empty() {
                errors.email("applicant_email", email);
            }
        }
        if let Some(contact) = &self.contact_number {
            errors.require_text("contact_number", contact, 32);
        }
        if let Some(address) = &self.current_address {
            errors.require_text("current_address", address, 500);
        }
        if let Some(income) = self.monthly_income {
            validate_income(&mut errors, "monthly_income", income);
        }
        let program = errors.optional_choice::<HousingProgram>("program", self.program.as_deref());
        errors.into_result()?;

        if let Some(name) = self.applicant_name {
            record.applicant_name = name.trim().to_string();
        }
        if self.applicant_email.is_some() {
            record.applicant_email = clean_optional(self.applicant_email);
        }
        if let Some(contact) = self.contact_number {
            record.contact_number = contact.trim().to_string();
        }
        if let Some(address) = self.current_address {
            record.current_address = address.trim().to_string();
        }
        if let Some(income) = self.monthly_income {
            record.monthly_income = income;
        }
        if let Some(program) = program {
            record.program = program;
        }
        record.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HousingFilter {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

fn validate_income(errors: &mut ValidationErrors, field: &str, income: f64) {
    if !income.is_finite() || income < 0.0 {
        errors.add(field, "The monthly income must be at least 0.");
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl CsvExport for HousingApplicationView {
    fn headers() -> &'static [&'static str] {
        &[
            "Reference No",
            "Applicant",
            "Contact Number",
            "Program",
            "Household Size",
            "Monthly Income",
            "Per Capita Income",
            "Status",
            "Submitted At",
        ]
    }

    fn row(&self) -> Vec<String> {
        let application = &self.application;
        vec![
            application.reference_no.clone(),
            application.applicant_name.clone(),
            application.contact_number.clone(),
            application.program.label().to_string(),
            self.household_size.to_string(),
            format!("{:.2}", application.monthly_income),
            format!("{:.2}", self.per_capita_income),
            application.status.label().to_string(),
            application
                .submitted_at
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        ]
    }
}
