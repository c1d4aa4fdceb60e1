//! Read-only placeholder catalogs for the building review and infrastructure
//! screens. Both modules are served from fixed data until they get storage of
//! their own.

mod router;

use serde::{Deserialize, Serialize};

use crate::records::RecordId;

pub use router::catalog_router;

/// Entry that can be filtered by its status column.
pub trait CatalogEntry: Clone + Serialize + Send + Sync + 'static {
    const RESOURCE: &'static str;

    fn id(&self) -> RecordId;
    fn status(&self) -> &str;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFilter {
    pub status: Option<String>,
}

/// Entries matching the filter; an unknown status simply matches nothing.
pub fn filter_entries<T: CatalogEntry>(entries: &[T], filter: &CatalogFilter) -> Vec<T> {
    let status = filter
        .status
        .as_deref()
        .map(str::trim)
        .filter(|status| !status.is_empty());
    entries
        .iter()
        .filter(|entry| {
            status.map_or(true, |status| entry.status().eq_ignore_ascii_case(status))
        })
        .cloned()
        .collect()
}

pub fn find_entry<T: CatalogEntry>(entries: &[T], id: RecordId) -> Option<T> {
    entries.iter().find(|entry| entry.id() == id).cloned()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingReview {
    pub id: RecordId,
    pub reference_no: &'static str,
    pub project_name: &'static str,
    pub applicant_name: &'static str,
    pub location: &'static str,
    pub review_type: &'static str,
    pub floor_area_sqm: f64,
    pub status: &'static str,
    pub submitted_on: &'static str,
}

impl CatalogEntry for BuildingReview {
    const RESOURCE: &'static str = "building review";

    fn id(&self) -> RecordId {
        self.id
    }

    fn status(&self) -> &str {
        self.status
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfrastructureProject {
    pub id: RecordId,
    pub project_code: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub location: &'static str,
    pub contractor: &'static str,
    pub budget: f64,
    pub progress_percent: u8,
    pub status: &'static str,
    pub start_date: &'static str,
    pub target_completion: &'static str,
}

impl CatalogEntry for InfrastructureProject {
    const RESOURCE: &'static str = "infrastructure project";

    fn id(&self) -> RecordId {
        self.id
    }

    fn status(&self) -> &str {
        self.status
    }
}

pub const BUILDING_REVIEWS: &[BuildingReview] = &[
    BuildingReview {
        id: 1,
        reference_no: "BP-2024-000101",
        project_name: "Two-storey residential building",
        applicant_name: "Ramon Dizon",
        location: "Lot 4 Blk 2, Sampaguita St., Poblacion",
        review_type: "structural",
        floor_area_sqm: 186.0,
        status: "pending",
        submitted_on: "2024-02-12",
    },
    BuildingReview {
        id: 2,
        reference_no: "BP-2024-000102",
        project_name: "Commercial warehouse",
        applicant_name: "Northpoint Logistics Inc.",
        location: "National Highway, Barangay San Roque",
        review_type: "fire_safety",
        floor_area_sqm: 1240.0,
        status: "in_review",
        submitted_on: "2024-02-20",
    },
    BuildingReview {
        id: 3,
        reference_no: "BP-2024-000103",
        project_name: "Chapel extension",
        applicant_name: "San Isidro Parish",
        location: "Rizal Avenue, Barangay San Isidro",
        review_type: "architectural",
        floor_area_sqm: 320.0,
        status: "approved",
        submitted_on: "2024-01-08",
    },
    BuildingReview {
        id: 4,
        reference_no: "BP-2024-000104",
        project_name: "Four-unit apartment",
        applicant_name: "Liza Manalo",
        location: "Mabini Street, Barangay Mabini",
        review_type: "electrical",
        floor_area_sqm: 410.0,
        status: "rejected",
        submitted_on: "2024-01-29",
    },
];

pub const INFRASTRUCTURE_PROJECTS: &[InfrastructureProject] = &[
    InfrastructureProject {
        id: 1,
        project_code: "INF-2024-001",
        name: "Concreting of Purok 5 farm-to-market road",
        category: "road",
        location: "Barangay San Roque",
        contractor: "JM Builders",
        budget: 4_500_000.0,
        progress_percent: 65,
        status: "ongoing",
        start_date: "2024-01-15",
        target_completion: "2024-07-30",
    },
    InfrastructureProject {
        id: 2,
        project_code: "INF-2024-002",
        name: "Poblacion drainage rehabilitation",
        category: "drainage",
        location: "Poblacion",
        contractor: "Delta Civil Works",
        budget: 2_750_000.0,
        progress_percent: 0,
        status: "planned",
        start_date: "2024-06-01",
        target_completion: "2024-12-15",
    },
    InfrastructureProject {
        id: 3,
        project_code: "INF-2023-014",
        name: "Barangay Mabini multi-purpose hall",
        category: "building",
        location: "Barangay Mabini",
        contractor: "Solid Rock Construction",
        budget: 6_200_000.0,
        progress_percent: 100,
        status: "completed",
        start_date: "2023-03-10",
        target_completion: "2023-11-30",
    },
    InfrastructureProject {
        id: 4,
        project_code: "INF-2024-003",
        name: "San Isidro footbridge repair",
        category: "bridge",
        location: "Barangay San Isidro",
        contractor: "Riverbend Engineering",
        budget: 1_300_000.0,
        progress_percent: 20,
        status: "suspended",
        start_date: "2024-02-05",
        target_completion: "2024-05-31",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_is_case_insensitive_and_blank_means_all() {
        let filter = CatalogFilter {
            status: Some("ONGOING".into()),
        };
        let ongoing = filter_entries(INFRASTRUCTURE_PROJECTS, &filter);
        assert_eq!(ongoing.len(), 1);
        assert_eq!(ongoing[0].project_code, "INF-2024-001");

        let blank = CatalogFilter {
            status: Some("  ".into()),
        };
        assert_eq!(filter_entries(BUILDING_REVIEWS, &blank).len(), BUILDING_REVIEWS.len());
    }

    #[test]
    fn unknown_status_matches_nothing() {
        let filter = CatalogFilter {
            status: Some("demolished".into()),
        };
        assert!(filter_entries(BUILDING_REVIEWS, &filter).is_empty());
    }

    #[test]
    fn ids_are_unique_within_each_catalog() {
        for (index, review) in BUILDING_REVIEWS.iter().enumerate() {
            assert_eq!(find_entry(BUILDING_REVIEWS, review.id).as_ref(), Some(review));
            assert_eq!(review.id, index as RecordId + 1);
        }
        assert_eq!(find_entry(INFRASTRUCTURE_PROJECTS, 99), None);
    }
}
