use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Router;

use super::{DashboardService, DashboardStats};
use crate::records::{ApiError, Envelope};

pub fn dashboard_router(service: Arc<DashboardService>) -> Router {
    Router::new()
        .route("/api/dashboard/stats", get(stats_handler))
        .with_state(service)
}

pub(crate) async fn stats_handler(
    State(service): State<Arc<DashboardService>>,
) -> Result<Envelope<DashboardStats>, ApiError> {
    Ok(Envelope::ok(service.stats()?))
}
