use axum::extract::{Path, Query};
use axum::routing::get;
use axum::Router;

use super::{
    filter_entries, find_entry, BuildingReview, CatalogEntry, CatalogFilter,
    InfrastructureProject, BUILDING_REVIEWS, INFRASTRUCTURE_PROJECTS,
};
use crate::records::{ApiError, Envelope, RecordId};

pub fn catalog_router() -> Router {
    Router::new()
        .route("/api/building/reviews", get(index_handler::<BuildingReview>))
        .route("/api/building/reviews/:id", get(show_handler::<BuildingReview>))
        .route(
            "/api/infrastructure/projects",
            get(index_handler::<InfrastructureProject>),
        )
        .route(
            "/api/infrastructure/projects/:id",
            get(show_handler::<InfrastructureProject>),
        )
}

trait Catalog: CatalogEntry {
    fn entries() -> &'static [Self];
}

impl Catalog for BuildingReview {
    fn entries() -> &'static [Self] {
        BUILDING_REVIEWS
    }
}

impl Catalog for InfrastructureProject {
    fn entries() -> &'static [Self] {
        INFRASTRUCTURE_PROJECTS
    }
}

async fn index_handler<T: Catalog>(Query(filter): Query<CatalogFilter>) -> Envelope<Vec<T>> {
    Envelope::ok(filter_entries(T::entries(), &filter))
}

async fn show_handler<T: Catalog>(Path(id): Path<RecordId>) -> Result<Envelope<T>, ApiError> {
    find_entry(T::entries(), id)
        .map(Envelope::ok)
        .ok_or_else(|| ApiError::not_found(T::RESOURCE, id))
}
