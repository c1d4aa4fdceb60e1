use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use super::domain::{Document, DocumentFilter, NewDocument};
use super::service::DocumentService;
use crate::records::{
    ApiError, Created, Envelope, Page, PageRequest, RecordId, RecordStore, StatusChange,
};

pub fn document_router<S>(service: Arc<DocumentService<S>>) -> Router
where
    S: RecordStore<Document> + 'static,
{
    Router::new()
        .route(
            "/api/documents",
            get(index_handler::<S>).post(store_handler::<S>),
        )
        .route(
            "/api/documents/:id",
            get(show_handler::<S>).delete(destroy_handler::<S>),
        )
        .route("/api/documents/:id/status", post(status_handler::<S>))
        .with_state(service)
}

async fn index_handler<S>(
    State(service): State<Arc<DocumentService<S>>>,
    Query(filter): Query<DocumentFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Envelope<Page<Document>>, ApiError>
where
    S: RecordStore<Document> + 'static,
{
    Ok(Envelope::ok(service.list(&filter, &page)?))
}

async fn store_handler<S>(
    State(service): State<Arc<DocumentService<S>>>,
    Json(payload): Json<NewDocument>,
) -> Result<Created<Document>, ApiError>
where
    S: RecordStore<Document> + 'static,
{
    Ok(Created(service.create(payload)?))
}

async fn show_handler<S>(
    State(service): State<Arc<DocumentService<S>>>,
    Path(id): Path<RecordId>,
) -> Result<Envelope<Document>, ApiError>
where
    S: RecordStore<Document> + 'static,
{
    Ok(Envelope::ok(service.get(id)?))
}

async fn destroy_handler<S>(
    State(service): State<Arc<DocumentService<S>>>,
    Path(id): Path<RecordId>,
) -> Result<Envelope<()>, ApiError>
where
    S: RecordStore<Document> + 'static,
{
    let removed = service.delete(id)?;
    Ok(Envelope::message(format!("Document {} deleted", removed.name)))
}

async fn status_handler<S>(
    State(service): State<Arc<DocumentService<S>>>,
    Path(id): Path<RecordId>,
    Json(change): Json<StatusChange>,
) -> Result<Envelope<Document>, ApiError>
where
    S: RecordStore<Document> + 'static,
{
    Ok(Envelope::ok(service.change_status(id, change)?))
}
