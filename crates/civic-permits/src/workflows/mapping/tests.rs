use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::*;
use crate::records::{ApiError, RecordId};
use crate::workflows::dashboard::{MapStats, ModuleSummary, StatsSource};

fn service() -> MapService {
    MapService::new(MapStores::in_memory())
}

fn seeded() -> (MapService, ZoneType, Region) {
    let service = service();
    let zone_type = service
        .create_zone_type(NewZoneType {
            code: "R-1".into(),
            name: "Low density residential".into(),
            color: "#43A047".into(),
        })
        .expect("zone type");
    let region = service
        .create_region(NewRegion {
            code: "BRGY-01".into(),
            name: "Poblacion".into(),
        })
        .expect("region");
    (service, zone_type, region)
}

fn parcel(offset: f64) -> Vec<LatLng> {
    vec![
        LatLng::new(14.60 + offset, 120.98),
        LatLng::new(14.60 + offset, 120.981),
        LatLng::new(14.601 + offset, 120.981),
        LatLng::new(14.601 + offset, 120.98),
    ]
}

fn input(name: &str, zone_type: &ZoneType, region: Option<&Region>, offset: f64) -> ZoneInput {
    ZoneInput {
        name: name.into(),
        zone_type_id: zone_type.id,
        region_id: region.map(|r| r.id),
        boundary: parcel(offset),
        description: None,
    }
}

fn feature(id: Option<RecordId>, zone: ZoneInput) -> SyncFeature {
    SyncFeature { id, zone }
}

fn validation_fields(err: ApiError) -> Vec<String> {
    match err {
        ApiError::Validation(errors) => errors.fields().map(str::to_string).collect(),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn duplicate_codes_conflict_case_insensitively() {
    let (service, _, _) = seeded();
    let err = service
        .create_zone_type(NewZoneType {
            code: "r-1".into(),
            name: "Duplicate".into(),
            color: "#000000".into(),
        })
        .expect_err("duplicate code");
    assert!(matches!(err, ApiError::Conflict(_)));

    let err = service
        .create_region(NewRegion {
            code: "brgy-01".into(),
            name: "Again".into(),
        })
        .expect_err("duplicate code");
    assert_eq!(err.status(), StatusCode::CONFLICT);
}

#[test]
fn zones_require_existing_references() {
    let (service, zone_type, _) = seeded();
    let mut payload = input("Orphan", &zone_type, None, 0.0);
    payload.zone_type_id = 99;
    payload.region_id = Some(42);

    let fields = validation_fields(service.create_zone(payload).expect_err("unknown refs"));
    assert_eq!(fields, vec!["region_id", "zone_type_id"]);
}

#[test]
fn update_recomputes_area() {
    let (service, zone_type, region) = seeded();
    let zone = service
        .create_zone(input("Block A", &zone_type, Some(&region), 0.0))
        .expect("create");

    let mut larger = input("Block A", &zone_type, Some(&region), 0.0);
    larger.boundary[2] = LatLng::new(14.603, 120.981);
    larger.boundary[3] = LatLng::new(14.603, 120.98);
    let updated = service.update_zone(zone.id, larger).expect("update");

    assert!(updated.area_sqm > zone.area_sqm * 2.5);
    assert_eq!(updated.area_sqm, geodesic_area(&updated.boundary));
}

#[test]
fn measure_reports_hectares_and_bounds() {
    let measurement = service()
        .measure(MeasureRequest {
            boundary: parcel(0.0),
        })
        .expect("measure");

    assert_eq!(measurement.vertices, 4);
    assert!((measurement.area_hectares - measurement.area_sqm / 10_000.0).abs() < 1e-9);
    assert_eq!(measurement.bounds.south, 14.60);
    assert_eq!(measurement.bounds.east, 120.981);

    let err = service()
        .measure(MeasureRequest {
            boundary: parcel(0.0)[..2].to_vec(),
        })
        .expect_err("too few vertices");
    assert_eq!(validation_fields(err), vec!["boundary"]);
}

#[test]
fn sync_creates_updates_and_deletes_within_region() {
    let (service, zone_type, region) = seeded();
    let other_region = service
        .create_region(NewRegion {
            code: "BRGY-02".into(),
            name: "San Roque".into(),
        })
        .expect("region");

    let kept = service
        .create_zone(input("Kept", &zone_type, Some(&region), 0.0))
        .expect("create");
    let dropped = service
        .create_zone(input("Dropped", &zone_type, Some(&region), 0.01))
        .expect("create");
    let outside = service
        .create_zone(input("Outside", &zone_type, Some(&other_region), 0.02))
        .expect("create");

    let report = service
        .sync(SyncRequest {
            region_id: Some(region.id),
            features: vec![
                feature(Some(kept.id), input("Kept renamed", &zone_type, None, 0.0)),
                feature(None, input("Drawn", &zone_type, None, 0.03)),
            ],
        })
        .expect("sync");

    assert_eq!(report.deleted, vec![dropped.id]);
    assert_eq!(report.updated, vec![kept.id]);
    assert_eq!(report.created.len(), 1);

    let in_region = service
        .zones(&ZoneFilter {
            region_id: Some(region.id),
            ..ZoneFilter::default()
        })
        .expect("list");
    let names: Vec<&str> = in_region.iter().map(|z| z.name.as_str()).collect();
    assert_eq!(names, vec!["Drawn", "Kept renamed"]);
    assert!(service.get_zone(outside.id).is_ok());
}

#[test]
fn sync_rejects_unknown_ids_without_writing() {
    let (service, zone_type, region) = seeded();
    let existing = service
        .create_zone(input("Existing", &zone_type, Some(&region), 0.0))
        .expect("create");

    let err = service
        .sync(SyncRequest {
            region_id: Some(region.id),
            features: vec![
                feature(None, input("New", &zone_type, None, 0.01)),
                feature(Some(777), input("Ghost", &zone_type, None, 0.02)),
            ],
        })
        .expect_err("unknown id");

    assert_eq!(validation_fields(err), vec!["features.1.id"]);
    let zones = service.zones(&ZoneFilter::default()).expect("list");
    assert_eq!(zones, vec![existing]);
}

#[test]
fn sync_rejects_zones_from_another_region_and_duplicates() {
    let (service, zone_type, region) = seeded();
    let other = service
        .create_region(NewRegion {
            code: "BRGY-03".into(),
            name: "Mabini".into(),
        })
        .expect("region");
    let zone = service
        .create_zone(input("Here", &zone_type, Some(&region), 0.0))
        .expect("create");
    let elsewhere = service
        .create_zone(input("There", &zone_type, Some(&other), 0.01))
        .expect("create");

    let err = service
        .sync(SyncRequest {
            region_id: Some(region.id),
            features: vec![
                feature(Some(zone.id), input("Here", &zone_type, None, 0.0)),
                feature(Some(zone.id), input("Here again", &zone_type, None, 0.0)),
                feature(Some(elsewhere.id), input("There", &zone_type, None, 0.01)),
            ],
        })
        .expect_err("invalid payload");

    assert_eq!(
        validation_fields(err),
        vec!["features.1.id", "features.2.id"]
    );
}

#[test]
fn stats_sum_zone_areas() {
    let (service, zone_type, region) = seeded();
    let a = service
        .create_zone(input("A", &zone_type, Some(&region), 0.0))
        .expect("create");
    let b = service
        .create_zone(input("B", &zone_type, None, 0.01))
        .expect("create");

    let stats = service.stats().expect("stats");
    assert_eq!(
        stats,
        ModuleSummary::Map(MapStats {
            zones: 2,
            total_area_sqm: a.area_sqm + b.area_sqm,
        })
    );
}

async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn routes_cover_zone_lifecycle_and_geojson() {
    let (service, zone_type, region) = seeded();
    let router = map_router(Arc::new(service));

    let created = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/zones",
            json!({
                "name": "Market",
                "zone_type_id": zone_type.id,
                "region_id": region.id,
                "boundary": parcel(0.0),
                "area_sqm": 5
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(created.status(), StatusCode::CREATED);
    let payload = read_json_body(created).await;
    let id = payload["data"]["id"].as_u64().expect("id");
    assert!(payload["data"]["area_sqm"].as_f64().expect("area") > 5.0);

    let geojson = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/zones/geojson")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(geojson.status(), StatusCode::OK);
    assert_eq!(
        geojson.headers()[header::CONTENT_TYPE],
        "application/geo+json"
    );
    let collection = read_json_body(geojson).await;
    assert_eq!(collection["type"], json!("FeatureCollection"));
    assert_eq!(collection["features"][0]["properties"]["zone_type_code"], json!("R-1"));

    let deleted = router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/zones/{id}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(deleted.status(), StatusCode::OK);

    let missing = router
        .oneshot(
            Request::builder()
                .uri(format!("/api/zones/{id}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_zone_type_route_returns_conflict() {
    let (service, _, _) = seeded();
    let response = map_router(Arc::new(service))
        .oneshot(json_request(
            "POST",
            "/api/zone-types",
            json!({ "code": "R-1", "name": "Again", "color": "#FFFFFF" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert_eq!(body["success"], json!(false));
}
