use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use super::domain::{
    HousingApplication, HousingApplicationPatch, HousingApplicationView, HousingFilter,
    NewHouseholdMember, NewHousingApplication,
};
use super::service::HousingService;
use crate::records::{
    csv_attachment, ApiError, Created, Envelope, Page, PageRequest, RecordId, RecordStore,
    StatusChange,
};

pub fn housing_router<S>(service: Arc<HousingService<S>>) -> Router
where
    S: RecordStore<HousingApplication> + 'static,
{
    Router::new()
        .route(
            "/api/housing/applications",
            get(index_handler::<S>).post(store_handler::<S>),
        )
        .route(
            "/api/housing/applications/:id",
            get(show_handler::<S>)
                .put(update_handler::<S>)
                .delete(destroy_handler::<S>),
        )
        .route(
            "/api/housing/applications/:id/status",
            post(status_handler::<S>),
        )
        .route(
            "/api/housing/applications/:id/members",
            post(add_member_handler::<S>),
        )
        .route(
            "/api/housing/applications/:id/members/:member_id",
            delete(remove_member_handler::<S>),
        )
        .route("/api/housing/export", get(export_handler::<S>))
        .with_state(service)
}

type ServiceState<S> = State<Arc<HousingService<S>>>;

async fn index_handler<S>(
    State(service): ServiceState<S>,
    Query(filter): Query<HousingFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Envelope<Page<HousingApplicationView>>, ApiError>
where
    S: RecordStore<HousingApplication> + 'static,
{
    let page = service.list(&filter, &page)?;
    Ok(Envelope::ok(page.map(HousingApplication::view)))
}

async fn store_handler<S>(
    State(service): ServiceState<S>,
    Json(payload): Json<NewHousingApplication>,
) -> Result<Created<HousingApplicationView>, ApiError>
where
    S: RecordStore<HousingApplication> + 'static,
{
    Ok(Created(service.create(payload)?.view()))
}

async fn show_handler<S>(
    State(service): ServiceState<S>,
    Path(id): Path<RecordId>,
) -> Result<Envelope<HousingApplicationView>, ApiError>
where
    S: RecordStore<HousingApplication> + 'static,
{
    Ok(Envelope::ok(service.get(id)?.view()))
}

async fn update_handler<S>(
    State(service): ServiceState<S>,
    Path(id): Path<RecordId>,
    Json(patch): Json<HousingApplicationPatch>,
) -> Result<Envelope<HousingApplicationView>, ApiError>
where
    S: RecordStore<HousingApplication> + 'static,
{
    Ok(Envelope::ok(service.update(id, patch)?.view()))
}

async fn destroy_handler<S>(
    State(service): ServiceState<S>,
    Path(id): Path<RecordId>,
) -> Result<Envelope<()>, ApiError>
where
    S: RecordStore<HousingApplication> + 'static,
{
    let removed = service.delete(id)?;
    Ok(Envelope::message(format!(
        "Housing application {} deleted successfully",
        removed.reference_no
    )))
}

async fn status_handler<S>(
    State(service): ServiceState<S>,
    Path(id): Path<RecordId>,
    Json(change): Json<StatusChange>,
) -> Result<Envelope<HousingApplicationView>, ApiError>
where
    S: RecordStore<HousingApplication> + 'static,
{
    Ok(Envelope::ok(service.change_status(id, change)?.view()))
}

async fn add_member_handler<S>(
    State(service): ServiceState<S>,
    Path(id): Path<RecordId>,
    Json(member): Json<NewHouseholdMember>,
) -> Result<Created<HousingApplicationView>, ApiError>
where
    S: RecordStore<HousingApplication> + 'static,
{
    Ok(Created(service.add_member(id, member)?.view()))
}

async fn remove_member_handler<S>(
    State(service): ServiceState<S>,
    Path((id, member_id)): Path<(RecordId, u32)>,
) -> Result<Envelope<HousingApplicationView>, ApiError>
where
    S: RecordStore<HousingApplication> + 'static,
{
    Ok(Envelope::ok(service.remove_member(id, member_id)?.view()))
}

async fn export_handler<S>(
    State(service): ServiceState<S>,
    Query(filter): Query<HousingFilter>,
) -> Result<Response, ApiError>
where
    S: RecordStore<HousingApplication> + 'static,
{
    let rows: Vec<HousingApplicationView> = service
        .search(&filter)?
        .into_iter()
        .map(HousingApplication::view)
        .collect();
    csv_attachment("housing-applications", &rows)
}
