use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::domain::{
    MeasureRequest, Measurement, NewRegion, NewZoneType, Region, SyncReport, SyncRequest, Zone,
    ZoneFilter, ZoneInput, ZoneType,
};
use super::service::MapService;
use crate::records::{ApiError, Created, Envelope, RecordId};

const GEOJSON_CONTENT_TYPE: &str = "application/geo+json";

pub fn map_router(service: Arc<MapService>) -> Router {
    Router::new()
        .route(
            "/api/zone-types",
            get(zone_types_handler).post(create_zone_type_handler),
        )
        .route("/api/regions", get(regions_handler).post(create_region_handler))
        .route("/api/zones", get(index_handler).post(store_handler))
        .route("/api/zones/measure", post(measure_handler))
        .route("/api/zones/sync", post(sync_handler))
        .route("/api/zones/geojson", get(geojson_handler))
        .route(
            "/api/zones/:id",
            get(show_handler).put(update_handler).delete(destroy_handler),
        )
        .with_state(service)
}

async fn zone_types_handler(
    State(service): State<Arc<MapService>>,
) -> Result<Envelope<Vec<ZoneType>>, ApiError> {
    Ok(Envelope::ok(service.zone_types()?))
}

async fn create_zone_type_handler(
    State(service): State<Arc<MapService>>,
    Json(payload): Json<NewZoneType>,
) -> Result<Created<ZoneType>, ApiError> {
    Ok(Created(service.create_zone_type(payload)?))
}

async fn regions_handler(
    State(service): State<Arc<MapService>>,
) -> Result<Envelope<Vec<Region>>, ApiError> {
    Ok(Envelope::ok(service.regions()?))
}

async fn create_region_handler(
    State(service): State<Arc<MapService>>,
    Json(payload): Json<NewRegion>,
) -> Result<Created<Region>, ApiError> {
    Ok(Created(service.create_region(payload)?))
}

async fn index_handler(
    State(service): State<Arc<MapService>>,
    Query(filter): Query<ZoneFilter>,
) -> Result<Envelope<Vec<Zone>>, ApiError> {
    Ok(Envelope::ok(service.zones(&filter)?))
}

async fn store_handler(
    State(service): State<Arc<MapService>>,
    Json(payload): Json<ZoneInput>,
) -> Result<Created<Zone>, ApiError> {
    Ok(Created(service.create_zone(payload)?))
}

async fn show_handler(
    State(service): State<Arc<MapService>>,
    Path(id): Path<RecordId>,
) -> Result<Envelope<Zone>, ApiError> {
    Ok(Envelope::ok(service.get_zone(id)?))
}

async fn update_handler(
    State(service): State<Arc<MapService>>,
    Path(id): Path<RecordId>,
    Json(payload): Json<ZoneInput>,
) -> Result<Envelope<Zone>, ApiError> {
    Ok(Envelope::ok(service.update_zone(id, payload)?))
}

async fn destroy_handler(
    State(service): State<Arc<MapService>>,
    Path(id): Path<RecordId>,
) -> Result<Envelope<()>, ApiError> {
    let removed = service.delete_zone(id)?;
    Ok(Envelope::message(format!("Zone {} deleted", removed.name)))
}

async fn measure_handler(
    State(service): State<Arc<MapService>>,
    Json(request): Json<MeasureRequest>,
) -> Result<Envelope<Measurement>, ApiError> {
    Ok(Envelope::ok(service.measure(request)?))
}

async fn sync_handler(
    State(service): State<Arc<MapService>>,
    Json(request): Json<SyncRequest>,
) -> Result<Envelope<SyncReport>, ApiError> {
    Ok(Envelope::ok(service.sync(request)?))
}

async fn geojson_handler(
    State(service): State<Arc<MapService>>,
    Query(filter): Query<ZoneFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = service.geojson(&filter)?;
    Ok(([(CONTENT_TYPE, GEOJSON_CONTENT_TYPE)], Json(collection)))
}
