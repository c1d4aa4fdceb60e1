use super::common::*;

use crate::records::{ApiError, PageRequest, RecordStore};
use crate::workflows::dashboard::StatsSource;
use crate::workflows::zoning::{
    LandUse, NewZoningApplication, ZoningApplicationPatch, ZoningFilter, ZoningStatus,
};

#[test]
fn create_assigns_reference_and_submitted_status() {
    let (service, store) = build_service();
    let record = service.create(new_application()).expect("create succeeds");

    assert_eq!(record.id, 1);
    assert!(record.reference_no.starts_with("ZC-"));
    assert!(record.reference_no.ends_with("-000001"));
    assert_eq!(record.status, ZoningStatus::Submitted);
    assert_eq!(record.land_use, LandUse::Residential);
    assert!(record.reviewed_at.is_none());

    let stored = store.fetch(record.id).expect("fetch").expect("stored");
    assert_eq!(stored.reference_no, record.reference_no);
}

#[test]
fn create_reports_every_invalid_field() {
    let (service, _) = build_service();
    let mut payload = new_application();
    payload.applicant_name = " ".to_string();
    payload.applicant_email = "not-an-email".to_string();
    payload.lot_area_sqm = 0.0;
    payload.land_use = "spaceport".to_string();

    match service.create(payload) {
        Err(ApiError::Validation(errors)) => {
            let fields: Vec<&str> = errors.fields().collect();
            assert_eq!(
                fields,
                vec!["applicant_email", "applicant_name", "land_use", "lot_area_sqm"]
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn review_workflow_follows_allowed_transitions() {
    let (service, _) = build_service();
    let record = service.create(new_application()).expect("create");

    let reviewing = service
        .change_status(record.id, status("under_review", None))
        .expect("submitted -> under_review");
    assert_eq!(reviewing.status, ZoningStatus::UnderReview);
    assert!(reviewing.reviewed_at.is_some());

    let approved = service
        .change_status(record.id, status("approved", Some("Compliant with CLUP")))
        .expect("under_review -> approved");
    assert_eq!(approved.status, ZoningStatus::Approved);
    assert_eq!(approved.remarks.as_deref(), Some("Compliant with CLUP"));
}

#[test]
fn cannot_skip_review() {
    let (service, _) = build_service();
    let record = service.create(new_application()).expect("create");

    let error = service
        .change_status(record.id, status("approved", None))
        .expect_err("submitted -> approved is not allowed");
    assert!(matches!(
        error,
        ApiError::InvalidTransition {
            from: "submitted",
            to: "approved"
        }
    ));
}

#[test]
fn rejection_requires_remarks() {
    let (service, _) = build_service();
    let record = service.create(new_application()).expect("create");
    service
        .change_status(record.id, status("under_review", None))
        .expect("start review");

    let error = service
        .change_status(record.id, status("rejected", Some("   ")))
        .expect_err("remarks required");
    match error {
        ApiError::Validation(errors) => assert!(errors.contains("remarks")),
        other => panic!("expected validation error, got {other:?}"),
    }

    let rejected = service
        .change_status(record.id, status("rejected", Some("Lot within buffer zone")))
        .expect("rejected with remarks");
    assert_eq!(rejected.status, ZoningStatus::Rejected);
}

#[test]
fn terminal_applications_cannot_be_edited() {
    let (service, _) = build_service();
    let record = service.create(new_application()).expect("create");
    service
        .change_status(record.id, status("under_review", None))
        .expect("review");
    service
        .change_status(record.id, status("approved", None))
        .expect("approve");

    let patch = ZoningApplicationPatch {
        lot_area_sqm: Some(10.0),
        ..ZoningApplicationPatch::default()
    };
    assert!(matches!(
        service.update(record.id, patch),
        Err(ApiError::Conflict(_))
    ));
}

#[test]
fn update_applies_only_provided_fields() {
    let (service, _) = build_service();
    let record = service.create(new_application()).expect("create");

    let patch = ZoningApplicationPatch {
        property_address: Some("14 Rizal Avenue".to_string()),
        land_use: Some("mixed_use".to_string()),
        ..ZoningApplicationPatch::default()
    };
    let updated = service.update(record.id, patch).expect("update");

    assert_eq!(updated.property_address, "14 Rizal Avenue");
    assert_eq!(updated.land_use, LandUse::MixedUse);
    assert_eq!(updated.applicant_name, record.applicant_name);
    assert!(updated.updated_at >= record.updated_at);
}

#[test]
fn list_filters_and_paginates_newest_first() {
    let (service, _) = build_service();
    service.create(new_application()).expect("create");
    service
        .create(commercial_application("Andres Bonifacio"))
        .expect("create");
    service
        .create(commercial_application("Gabriela Silang"))
        .expect("create");

    let filter = ZoningFilter {
        land_use: Some("commercial".to_string()),
        ..ZoningFilter::default()
    };
    let page = service
        .list(&filter, &PageRequest::default())
        .expect("list");
    assert_eq!(page.total, 2);
    assert_eq!(page.per_page, 2);
    assert_eq!(page.data[0].applicant_name, "Gabriela Silang");

    let search = ZoningFilter {
        search: Some("bonifacio".to_string()),
        ..ZoningFilter::default()
    };
    let page = service.list(&search, &PageRequest::new(1, 10)).expect("list");
    assert_eq!(page.total, 1);

    let all = service
        .list(&ZoningFilter::default(), &PageRequest::new(2, 2))
        .expect("list");
    assert_eq!(all.total, 3);
    assert_eq!(all.data.len(), 1);
    assert_eq!(all.last_page, 2);
}

#[test]
fn unknown_status_filter_is_a_validation_error() {
    let (service, _) = build_service();
    let filter = ZoningFilter {
        status: Some("archived".to_string()),
        ..ZoningFilter::default()
    };
    assert!(matches!(
        service.search(&filter),
        Err(ApiError::Validation(_))
    ));
}

#[test]
fn missing_records_are_not_found() {
    let (service, _) = build_service();
    assert!(matches!(service.get(99), Err(ApiError::NotFound { id: 99, .. })));
    assert!(matches!(
        service.delete(99),
        Err(ApiError::NotFound { id: 99, .. })
    ));
}

#[test]
fn stats_count_every_status() {
    let (service, _) = build_service();
    let record = service.create(new_application()).expect("create");
    service.create(new_application()).expect("create");
    service
        .change_status(record.id, status("under_review", None))
        .expect("review");

    let summary = service.stats().expect("stats");
    let stats = summary.workflow().expect("workflow stats");
    assert_eq!(stats.total, 2);
    assert_eq!(stats.by_status["submitted"], 1);
    assert_eq!(stats.by_status["under_review"], 1);
    assert_eq!(stats.by_status["approved"], 0);
    assert_eq!(stats.amounts["total_lot_area_sqm"], 901.0);
}

#[test]
fn explicit_null_detaches_the_zone() {
    let (service, _) = build_service();
    let record = service
        .create(NewZoningApplication {
            zone_id: Some(7),
            ..new_application()
        })
        .expect("create");

    let untouched: ZoningApplicationPatch =
        serde_json::from_value(serde_json::json!({ "lot_area_sqm": 450.0 })).expect("patch");
    let kept = service.update(record.id, untouched).expect("update");
    assert_eq!(kept.zone_id, Some(7));

    let moved: ZoningApplicationPatch =
        serde_json::from_value(serde_json::json!({ "zone_id": 9 })).expect("patch");
    assert_eq!(service.update(record.id, moved).expect("update").zone_id, Some(9));

    let cleared: ZoningApplicationPatch =
        serde_json::from_value(serde_json::json!({ "zone_id": null })).expect("patch");
    assert_eq!(service.update(record.id, cleared).expect("update").zone_id, None);
}
