use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geometry::{geodesic_area, normalize_ring, LatLng};
use crate::records::validation::clean_optional;
use crate::records::{Record, RecordId, ValidationErrors};

/// Zoning classification drawn on the map, e.g. `R-1` residential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneType {
    pub id: RecordId,
    pub code: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl Record for ZoneType {
    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewZoneType {
    pub code: String,
    pub name: String,
    pub color: String,
}

impl NewZoneType {
    pub fn into_record(self, now: DateTime<Utc>) -> Result<ZoneType, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("code", &self.code, 32);
        errors.require_text("name", &self.name, 255);
        if !is_hex_color(self.color.trim()) {
            errors.add("color", "The color must be a hex value like #1E88E5.");
        }
        errors.into_result()?;

        Ok(ZoneType {
            id: 0,
            code: normalize_code(&self.code),
            name: self.name.trim().to_string(),
            color: self.color.trim().to_ascii_uppercase(),
            created_at: now,
        })
    }
}

/// Barangay or district used to scope map edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RecordId,
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Record for Region {
    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRegion {
    pub code: String,
    pub name: String,
}

impl NewRegion {
    pub fn into_record(self, now: DateTime<Utc>) -> Result<Region, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("code", &self.code, 32);
        errors.require_text("name", &self.name, 255);
        errors.into_result()?;

        Ok(Region {
            id: 0,
            code: normalize_code(&self.code),
            name: self.name.trim().to_string(),
            created_at: now,
        })
    }
}

/// Persisted zone polygon. `area_sqm` is always derived from `boundary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: RecordId,
    pub name: String,
    pub zone_type_id: RecordId,
    pub region_id: Option<RecordId>,
    pub boundary: Vec<LatLng>,
    pub area_sqm: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Zone {
    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

/// Client-drawn zone. Any `area_sqm` sent by the browser is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneInput {
    pub name: String,
    pub zone_type_id: RecordId,
    #[serde(default)]
    pub region_id: Option<RecordId>,
    pub boundary: Vec<LatLng>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Fields of a zone after local validation; references are checked by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneShape {
    pub name: String,
    pub zone_type_id: RecordId,
    pub region_id: Option<RecordId>,
    pub boundary: Vec<LatLng>,
    pub area_sqm: f64,
    pub description: Option<String>,
}

impl ZoneInput {
    pub fn validate(self) -> Result<ZoneShape, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("name", &self.name, 255);
        errors.optional_text("description", self.description.as_deref(), 2000);
        let boundary = match normalize_ring(&self.boundary) {
            Ok(ring) => Some(ring),
            Err(err) => {
                errors.add("boundary", err.to_string());
                None
            }
        };
        let boundary = match boundary {
            Some(ring) if errors.is_empty() => ring,
            _ => return Err(errors),
        };

        Ok(ZoneShape {
            name: self.name.trim().to_string(),
            zone_type_id: self.zone_type_id,
            region_id: self.region_id,
            area_sqm: geodesic_area(&boundary),
            boundary,
            description: clean_optional(self.description),
        })
    }
}

impl ZoneShape {
    pub fn into_zone(self, now: DateTime<Utc>) -> Zone {
        Zone {
            id: 0,
            name: self.name,
            zone_type_id: self.zone_type_id,
            region_id: self.region_id,
            boundary: self.boundary,
            area_sqm: self.area_sqm,
            description: self.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the editable fields of an existing zone.
    pub fn apply_to(self, zone: &mut Zone, now: DateTime<Utc>) {
        zone.name = self.name;
        zone.zone_type_id = self.zone_type_id;
        zone.region_id = self.region_id;
        zone.boundary = self.boundary;
        zone.area_sqm = self.area_sqm;
        zone.description = self.description;
        zone.updated_at = now;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneFilter {
    pub zone_type_id: Option<RecordId>,
    pub region_id: Option<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureRequest {
    pub boundary: Vec<LatLng>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub area_sqm: f64,
    pub area_hectares: f64,
    pub area_label: String,
    pub vertices: usize,
    pub centroid: LatLng,
    pub bounds: super::geometry::Bounds,
}

/// Full drawing-layer state for one region, or for the whole map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub region_id: Option<RecordId>,
    #[serde(default)]
    pub features: Vec<SyncFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncFeature {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(flatten)]
    pub zone: ZoneInput,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub created: Vec<RecordId>,
    pub updated: Vec<RecordId>,
    pub deleted: Vec<RecordId>,
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}
