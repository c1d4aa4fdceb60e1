use crate::routes::Services;
use civic_permits::records::{ApiError, StatusChange};
use civic_permits::workflows::documents::NewDocument;
use civic_permits::workflows::housing::{NewHouseholdMember, NewHousingApplication};
use civic_permits::workflows::mapping::{LatLng, NewRegion, NewZoneType, ZoneInput};
use civic_permits::workflows::occupancy::NewOccupancyRecord;
use civic_permits::workflows::zoning::NewZoningApplication;
use tracing::info;

/// Counts of the sample records loaded by `serve --seed`.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SeedSummary {
    pub(crate) zoning: usize,
    pub(crate) housing: usize,
    pub(crate) occupancy: usize,
    pub(crate) documents: usize,
    pub(crate) zones: usize,
}

fn change(status: &str, remarks: Option<&str>) -> StatusChange {
    StatusChange {
        status: status.to_string(),
        remarks: remarks.map(str::to_string),
    }
}

fn rectangle(south: f64, west: f64, north: f64, east: f64) -> Vec<LatLng> {
    vec![
        LatLng::new(south, west),
        LatLng::new(south, east),
        LatLng::new(north, east),
        LatLng::new(north, west),
    ]
}

pub(crate) fn seed_demo_records(services: &Services) -> Result<SeedSummary, ApiError> {
    let mut summary = SeedSummary::default();

    let residential = services.map.create_zone_type(NewZoneType {
        code: "R-1".to_string(),
        name: "Low density residential".to_string(),
        color: "#43A047".to_string(),
    })?;
    let commercial = services.map.create_zone_type(NewZoneType {
        code: "C-1".to_string(),
        name: "Light commercial".to_string(),
        color: "#E53935".to_string(),
    })?;
    let poblacion = services.map.create_region(NewRegion {
        code: "POB".to_string(),
        name: "Poblacion".to_string(),
    })?;
    let residential_zone = services.map.create_zone(ZoneInput {
        name: "Poblacion residential core".to_string(),
        zone_type_id: residential.id,
        region_id: Some(poblacion.id),
        boundary: rectangle(14.5990, 120.9830, 14.6010, 120.9855),
        description: Some("Single detached and duplex dwellings".to_string()),
    })?;
    services.map.create_zone(ZoneInput {
        name: "Rizal Avenue commercial strip".to_string(),
        zone_type_id: commercial.id,
        region_id: Some(poblacion.id),
        boundary: rectangle(14.6010, 120.9830, 14.6018, 120.9870),
        description: None,
    })?;
    summary.zones = 2;

    let filed = services.zoning.create(NewZoningApplication {
        applicant_name: "Maria Santos".to_string(),
        applicant_email: "maria.santos@example.ph".to_string(),
        applicant_phone: Some("0917 555 0101".to_string()),
        property_address: "12 Rizal Avenue, Poblacion".to_string(),
        lot_area_sqm: 450.5,
        land_use: "residential".to_string(),
        project_description: Some("Two-storey single detached dwelling".to_string()),
        zone_id: Some(residential_zone.id),
    })?;
    let reviewed = services.zoning.create(NewZoningApplication {
        applicant_name: "Mabini Hardware Corp.".to_string(),
        applicant_email: "permits@mabinihardware.example.ph".to_string(),
        applicant_phone: None,
        property_address: "88 Rizal Avenue, Poblacion".to_string(),
        lot_area_sqm: 1200.0,
        land_use: "commercial".to_string(),
        project_description: Some("Hardware store with second floor storage".to_string()),
        zone_id: None,
    })?;
    services
        .zoning
        .change_status(reviewed.id, change("under_review", Some("Site inspection scheduled")))?;
    summary.zoning = 2;

    let housing = services.housing.create(NewHousingApplication {
        applicant_name: "Jose Dela Cruz".to_string(),
        applicant_email: None,
        contact_number: "0918 222 3344".to_string(),
        current_address: "Purok 3, Barangay San Isidro".to_string(),
        monthly_income: 12000.0,
        program: "socialized_housing".to_string(),
        household_members: vec![NewHouseholdMember {
            full_name: "Ana Dela Cruz".to_string(),
            relationship: "spouse".to_string(),
            age: 34,
            monthly_income: 6500.0,
        }],
    })?;
    summary.housing = 1;

    services.occupancy.create(NewOccupancyRecord {
        building_name: "Santos Arcade".to_string(),
        unit_no: Some("2F-04".to_string()),
        address: "45 Bonifacio Street".to_string(),
        occupant_name: "Santos Trading".to_string(),
        occupancy_type: "commercial".to_string(),
        occupants_count: 12,
        max_capacity: 40,
        status: "compliant".to_string(),
        last_inspected_on: None,
        notes: None,
    })?;
    services.occupancy.create(NewOccupancyRecord {
        building_name: "Riverside Dormitory".to_string(),
        unit_no: None,
        address: "7 Luna Street".to_string(),
        occupant_name: "Riverside Boarding House".to_string(),
        occupancy_type: "residential".to_string(),
        occupants_count: 28,
        max_capacity: 24,
        status: "for_inspection".to_string(),
        last_inspected_on: None,
        notes: Some("Complaint about overcrowding".to_string()),
    })?;
    summary.occupancy = 2;

    services.documents.create(NewDocument {
        owner_type: "zoning".to_string(),
        owner_id: filed.id,
        name: "Lot plan".to_string(),
        file_name: "lot-plan.pdf".to_string(),
        mime_type: None,
        size_bytes: 512 * 1024,
    })?;
    services.documents.create(NewDocument {
        owner_type: "housing".to_string(),
        owner_id: housing.id,
        name: "Certificate of indigency".to_string(),
        file_name: "indigency.jpg".to_string(),
        mime_type: None,
        size_bytes: 180 * 1024,
    })?;
    summary.documents = 2;

    info!(?summary, "seeded demo records");
    Ok(summary)
}
