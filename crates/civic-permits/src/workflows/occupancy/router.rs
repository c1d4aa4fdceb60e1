use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};

use super::domain::{
    NewOccupancyRecord, OccupancyFilter, OccupancyRecord, OccupancyRecordPatch,
    OccupancyRecordView,
};
use super::service::OccupancyService;
use crate::records::{
    csv_attachment, ApiError, Created, Envelope, Page, PageRequest, RecordId, RecordStore,
};

pub fn occupancy_router<S>(service: Arc<OccupancyService<S>>) -> Router
where
    S: RecordStore<OccupancyRecord> + 'static,
{
    Router::new()
        .route(
            "/api/occupancy/records",
            get(index_handler::<S>).post(store_handler::<S>),
        )
        .route(
            "/api/occupancy/records/:id",
            get(show_handler::<S>)
                .put(update_handler::<S>)
                .delete(destroy_handler::<S>),
        )
        .route("/api/occupancy/export", get(export_handler::<S>))
        .with_state(service)
}

async fn index_handler<S>(
    State(service): State<Arc<OccupancyService<S>>>,
    Query(filter): Query<OccupancyFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Envelope<Page<OccupancyRecordView>>, ApiError>
where
    S: RecordStore<OccupancyRecord> + 'static,
{
    let page = service.list(&filter, &page)?;
    Ok(Envelope::ok(page.map(OccupancyRecord::view)))
}

async fn store_handler<S>(
    State(service): State<Arc<OccupancyService<S>>>,
    Json(payload): Json<NewOccupancyRecord>,
) -> Result<Created<OccupancyRecordView>, ApiError>
where
    S: RecordStore<OccupancyRecord> + 'static,
{
    Ok(Created(service.create(payload)?.view()))
}

async fn show_handler<S>(
    State(service): State<Arc<OccupancyService<S>>>,
    Path(id): Path<RecordId>,
) -> Result<Envelope<OccupancyRecordView>, ApiError>
where
    S: RecordStore<OccupancyRecord> + 'static,
{
    Ok(Envelope::ok(service.get(id)?.view()))
}

async fn update_handler<S>(
    State(service): State<Arc<OccupancyService<S>>>,
    Path(id): Path<RecordId>,
    Json(patch): Json<OccupancyRecordPatch>,
) -> Result<Envelope<OccupancyRecordView>, ApiError>
where
    S: RecordStore<OccupancyRecord> + 'static,
{
    Ok(Envelope::ok(service.update(id, patch)?.view()))
}

async fn destroy_handler<S>(
    State(service): State<Arc<OccupancyService<S>>>,
    Path(id): Path<RecordId>,
) -> Result<Envelope<()>, ApiError>
where
    S: RecordStore<OccupancyRecord> + 'static,
{
    service.delete(id)?;
    Ok(Envelope::message("Occupancy record deleted successfully"))
}

async fn export_handler<S>(
    State(service): State<Arc<OccupancyService<S>>>,
    Query(filter): Query<OccupancyFilter>,
) -> Result<Response, ApiError>
where
    S: RecordStore<OccupancyRecord> + 'static,
{
    let rows: Vec<OccupancyRecordView> = service
        .search(&filter)?
        .into_iter()
        .map(OccupancyRecord::view)
        .collect();
    csv_attachment("occupancy-records", &rows)
}
