use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::domain::{
    NewZoningApplication, ZoningApplication, ZoningApplicationPatch, ZoningFilter,
};
use super::service::ZoningService;
use crate::records::{
    csv_attachment, ApiError, Created, Envelope, Page, PageRequest, RecordId, RecordStore,
    StatusChange,
};

/// Router builder exposing the zoning clearance endpoints.
pub fn zoning_router<S>(service: Arc<ZoningService<S>>) -> Router
where
    S: RecordStore<ZoningApplication> + 'static,
{
    Router::new()
        .route(
            "/api/zoning/applications",
            get(index_handler::<S>).post(store_handler::<S>),
        )
        .route(
            "/api/zoning/applications/:id",
            get(show_handler::<S>)
                .put(update_handler::<S>)
                .delete(destroy_handler::<S>),
        )
        .route(
            "/api/zoning/applications/:id/status",
            post(status_handler::<S>),
        )
        .route("/api/zoning/export", get(export_handler::<S>))
        .with_state(service)
}

pub(crate) async fn index_handler<S>(
    State(service): State<Arc<ZoningService<S>>>,
    Query(filter): Query<ZoningFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Envelope<Page<ZoningApplication>>, ApiError>
where
    S: RecordStore<ZoningApplication> + 'static,
{
    Ok(Envelope::ok(service.list(&filter, &page)?))
}

pub(crate) async fn store_handler<S>(
    State(service): State<Arc<ZoningService<S>>>,
    Json(payload): Json<NewZoningApplication>,
) -> Result<Created<ZoningApplication>, ApiError>
where
    S: RecordStore<ZoningApplication> + 'static,
{
    Ok(Created(service.create(payload)?))
}

pub(crate) async fn show_handler<S>(
    State(service): State<Arc<ZoningService<S>>>,
    Path(id): Path<RecordId>,
) -> Result<Envelope<ZoningApplication>, ApiError>
where
    S: RecordStore<ZoningApplication> + 'static,
{
    Ok(Envelope::ok(service.get(id)?))
}

pub(crate) async fn update_handler<S>(
    State(service): State<Arc<ZoningService<S>>>,
    Path(id): Path<RecordId>,
    Json(patch): Json<ZoningApplicationPatch>,
) -> Result<Envelope<ZoningApplication>, ApiError>
where
    S: RecordStore<ZoningApplication> + 'static,
{
    Ok(Envelope::ok(service.update(id, patch)?))
}

pub(crate) async fn destroy_handler<S>(
    State(service): State<Arc<ZoningService<S>>>,
    Path(id): Path<RecordId>,
) -> Result<Envelope<()>, ApiError>
where
    S: RecordStore<ZoningApplication> + 'static,
{
    let removed = service.delete(id)?;
    Ok(Envelope::message(format!(
        "Zoning application {} deleted successfully",
        removed.reference_no
    )))
}

pub(crate) async fn status_handler<S>(
    State(service): State<Arc<ZoningService<S>>>,
    Path(id): Path<RecordId>,
    Json(change): Json<StatusChange>,
) -> Result<Envelope<ZoningApplication>, ApiError>
where
    S: RecordStore<ZoningApplication> + 'static,
{
    Ok(Envelope::ok(service.change_status(id, change)?))
}

pub(crate) async fn export_handler<S>(
    State(service): State<Arc<ZoningService<S>>>,
    Query(filter): Query<ZoningFilter>,
) -> Result<Response, ApiError>
where
    S: RecordStore<ZoningApplication> + 'static,
{
    let records = service.search(&filter)?;
    csv_attachment("zoning-applications", &records)
}
