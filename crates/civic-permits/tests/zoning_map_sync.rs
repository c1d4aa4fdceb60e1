//! HTTP-level tests for the zoning map editor: saving a drawing layer
//! through `/api/zones/sync` and reading it back as GeoJSON.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use civic_permits::workflows::mapping::{map_router, MapService, MapStores};

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request builds");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("route executes");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    (status, serde_json::from_slice(&bytes).expect("json payload"))
}

fn ring(offset: f64) -> Value {
    json!([
        { "lat": 10.30 + offset, "lng": 123.89 },
        { "lat": 10.30 + offset, "lng": 123.892 },
        { "lat": 10.302 + offset, "lng": 123.892 },
        { "lat": 10.302 + offset, "lng": 123.89 },
        { "lat": 10.30 + offset, "lng": 123.89 }
    ])
}

async fn setup() -> (Router, u64, u64) {
    let router = map_router(Arc::new(MapService::new(MapStores::in_memory())));
    let (status, zone_type) = send(
        &router,
        "POST",
        "/api/zone-types",
        Some(json!({ "code": "I-1", "name": "Light industrial", "color": "#8E24AA" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, region) = send(
        &router,
        "POST",
        "/api/regions",
        Some(json!({ "code": "PORT", "name": "Port district" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let zone_type_id = zone_type["data"]["id"].as_u64().expect("zone type id");
    let region_id = region["data"]["id"].as_u64().expect("region id");
    (router, zone_type_id, region_id)
}

#[tokio::test]
async fn saving_the_drawing_layer_round_trips_through_geojson() {
    let (router, zone_type_id, region_id) = setup().await;

    let (status, report) = send(
        &router,
        "POST",
        "/api/zones/sync",
        Some(json!({
            "region_id": region_id,
            "features": [
                {
                    "name": "Warehouse row",
                    "zone_type_id": zone_type_id,
                    "boundary": ring(0.0)
                },
                {
                    "name": "Fabrication yard",
                    "zone_type_id": zone_type_id,
                    "boundary": ring(0.01)
                }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let created = report["data"]["created"].as_array().expect("created ids").clone();
    assert_eq!(created.len(), 2);

    let (status, report) = send(
        &router,
        "POST",
        "/api/zones/sync",
        Some(json!({
            "region_id": region_id,
            "features": [
                {
                    "id": created[1],
                    "name": "Fabrication yard (expanded)",
                    "zone_type_id": zone_type_id,
                    "boundary": ring(0.011)
                }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["data"]["updated"], json!([created[1]]));
    assert_eq!(report["data"]["deleted"], json!([created[0]]));
    assert_eq!(report["data"]["created"], json!([]));

    let (status, collection) = send(&router, "GET", "/api/zones/geojson", None).await;
    assert_eq!(status, StatusCode::OK);
    let features = collection["features"].as_array().expect("features");
    assert_eq!(features.len(), 1);
    assert_eq!(
        features[0]["properties"]["name"],
        json!("Fabrication yard (expanded)")
    );
    assert_eq!(features[0]["properties"]["color"], json!("#8E24AA"));
    let coordinates = features[0]["geometry"]["coordinates"][0]
        .as_array()
        .expect("ring");
    assert_eq!(coordinates.len(), 5);
    assert_eq!(coordinates[0], json!([123.89, 10.30 + 0.011]));
}

#[tokio::test]
async fn rejected_sync_leaves_persisted_zones_untouched() {
    let (router, zone_type_id, region_id) = setup().await;
    let (status, _) = send(
        &router,
        "POST",
        "/api/zones",
        Some(json!({
            "name": "Container yard",
            "zone_type_id": zone_type_id,
            "region_id": region_id,
            "boundary": ring(0.0)
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &router,
        "POST",
        "/api/zones/sync",
        Some(json!({
            "region_id": region_id,
            "features": [
                { "name": "New lot", "zone_type_id": zone_type_id, "boundary": ring(0.02) },
                { "name": "Bad lot", "zone_type_id": 999, "boundary": ring(0.03) }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["features.1.zone_type_id"].is_array());

    let (_, zones) = send(&router, "GET", "/api/zones", None).await;
    let names: Vec<&str> = zones["data"]
        .as_array()
        .expect("zones")
        .iter()
        .filter_map(|zone| zone["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Container yard"]);
}

#[tokio::test]
async fn measure_endpoint_ignores_the_closing_vertex() {
    let (router, _, _) = setup().await;
    let (status, body) = send(
        &router,
        "POST",
        "/api/zones/measure",
        Some(json!({ "boundary": ring(0.0) })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["vertices"], json!(4));
    let hectares = body["data"]["area_hectares"].as_f64().expect("hectares");
    assert!(hectares > 4.0 && hectares < 5.5, "area was {hectares} ha");
}
