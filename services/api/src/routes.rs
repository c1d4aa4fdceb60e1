use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use civic_permits::config::PaginationConfig;
use civic_permits::records::InMemoryStore;
use civic_permits::workflows::catalog::catalog_router;
use civic_permits::workflows::dashboard::{dashboard_router, DashboardService, StatsSource};
use civic_permits::workflows::documents::{
    document_router, Document, DocumentCascade, DocumentService, OwnerDirectory, OwnerType,
};
use civic_permits::workflows::housing::{housing_router, HousingApplication, HousingService};
use civic_permits::workflows::mapping::{map_router, MapService, MapStores};
use civic_permits::workflows::occupancy::{occupancy_router, OccupancyRecord, OccupancyService};
use civic_permits::workflows::zoning::{zoning_router, ZoningApplication, ZoningService};
use serde_json::json;
use std::sync::Arc;

type ZoningStore = InMemoryStore<ZoningApplication>;
type HousingStore = InMemoryStore<HousingApplication>;
type OccupancyStore = InMemoryStore<OccupancyRecord>;
type DocumentStore = InMemoryStore<Document>;

/// Every workflow service wired to process-local storage.
#[derive(Clone)]
pub(crate) struct Services {
    pub(crate) zoning: Arc<ZoningService<ZoningStore>>,
    pub(crate) housing: Arc<HousingService<HousingStore>>,
    pub(crate) occupancy: Arc<OccupancyService<OccupancyStore>>,
    pub(crate) documents: Arc<DocumentService<DocumentStore>>,
    pub(crate) map: Arc<MapService>,
    pub(crate) dashboard: Arc<DashboardService>,
}

impl Services {
    pub(crate) fn in_memory(pagination: PaginationConfig) -> Self {
        let document_store = Arc::new(DocumentStore::default());
        let cascade =
            |owner_type| Arc::new(DocumentCascade::new(document_store.clone(), owner_type));

        let zoning = Arc::new(
            ZoningService::new(Arc::new(ZoningStore::default()), pagination)
                .with_removal_hook(cascade(OwnerType::Zoning)),
        );
        let housing = Arc::new(
            HousingService::new(Arc::new(HousingStore::default()), pagination)
                .with_removal_hook(cascade(OwnerType::Housing)),
        );
        let occupancy = Arc::new(
            OccupancyService::new(Arc::new(OccupancyStore::default()), pagination)
                .with_removal_hook(cascade(OwnerType::Occupancy)),
        );
        let owners = OwnerDirectory::new(zoning.clone(), housing.clone(), occupancy.clone());
        let documents = Arc::new(DocumentService::new(document_store, owners, pagination));
        let map = Arc::new(MapService::new(MapStores::in_memory()));

        let sources: Vec<Arc<dyn StatsSource>> = vec![
            zoning.clone(),
            housing.clone(),
            occupancy.clone(),
            documents.clone(),
            map.clone(),
        ];
        let dashboard = Arc::new(DashboardService::new(sources));

        Self {
            zoning,
            housing,
            occupancy,
            documents,
            map,
            dashboard,
        }
    }
}

pub(crate) fn build_router(services: &Services) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .merge(zoning_router(services.zoning.clone()))
        .merge(housing_router(services.housing.clone()))
        .merge(occupancy_router(services.occupancy.clone()))
        .merge(document_router(services.documents.clone()))
        .merge(map_router(services.map.clone()))
        .merge(catalog_router())
        .merge(dashboard_router(services.dashboard.clone()))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn app(ready: bool) -> (Router, Arc<AtomicBool>) {
        let readiness = Arc::new(AtomicBool::new(ready));
        let state = AppState {
            readiness: readiness.clone(),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let services = Services::in_memory(PaginationConfig::default());
        (build_router(&services).layer(Extension(state)), readiness)
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("route executes");
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&body).expect("json payload"))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request builds")
    }

    fn post_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn readiness_follows_flag() {
        let (router, readiness) = app(false);
        let (status, body) = send(&router, get_request("/ready")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");

        readiness.store(true, Ordering::Release);
        let (status, _) = send(&router, get_request("/ready")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&router, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn documents_attach_to_records_from_other_modules() {
        let (router, _) = app(true);
        let (status, created) = send(
            &router,
            post_request(
                "/api/occupancy/records",
                json!({
                    "building_name": "Santos Arcade",
                    "address": "45 Bonifacio Street",
                    "occupant_name": "Santos Trading",
                    "occupancy_type": "commercial",
                    "occupants_count": 12,
                    "max_capacity": 40,
                    "status": "compliant"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let owner_id = created["data"]["id"].clone();

        let (status, document) = send(
            &router,
            post_request(
                "/api/documents",
                json!({
                    "owner_type": "occupancy",
                    "owner_id": owner_id,
                    "name": "Fire safety certificate",
                    "file_name": "fsic-2024.pdf",
                    "size_bytes": 204800
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(document["data"]["mime_type"], "application/pdf");

        let (status, missing_owner) = send(
            &router,
            post_request(
                "/api/documents",
                json!({
                    "owner_type": "housing",
                    "owner_id": 404,
                    "name": "Barangay certificate",
                    "file_name": "residency.png",
                    "size_bytes": 1024
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(missing_owner["errors"]["owner_id"].is_array());
    }

    #[tokio::test]
    async fn dashboard_reports_every_module() {
        let (router, _) = app(true);
        let (status, body) = send(&router, get_request("/api/dashboard/stats")).await;
        assert_eq!(status, StatusCode::OK);

        let modules = body["data"]["modules"].as_object().expect("modules");
        for module in ["documents", "housing", "occupancy", "zoning", "zoning_map"] {
            assert!(modules.contains_key(module), "missing {module}");
        }
        assert_eq!(body["data"]["modules"]["zoning"]["by_status"]["submitted"], 0);
    }

    #[tokio::test]
    async fn dashboard_figures_have_their_documented_shape() {
        let (router, _) = app(true);
        let (status, body) = send(&router, get_request("/api/dashboard/stats")).await;
        assert_eq!(status, StatusCode::OK);

        let modules = &body["data"]["modules"];
        assert_eq!(modules["zoning_map"], json!({ "zones": 0, "total_area_sqm": 0.0 }));
        assert!(modules["zoning_map"]["total_area_sqm"]
            .as_f64()
            .is_some_and(f64::is_sign_positive));

        let occupancy = modules["occupancy"].as_object().expect("occupancy stats");
        let mut keys: Vec<&str> = occupancy.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["by_status", "over_capacity", "total"]);
        assert!(occupancy["over_capacity"].is_u64());
        assert_eq!(occupancy["over_capacity"], 0);
        assert!(body["data"]["modules"]["zoning"].get("metrics").is_none());
    }

    #[tokio::test]
    async fn deleting_an_owner_removes_its_documents() {
        let (router, _) = app(true);
        let (status, created) = send(
            &router,
            post_request(
                "/api/zoning/applications",
                json!({
                    "applicant_name": "Lorna Reyes",
                    "applicant_email": "lorna.reyes@example.ph",
                    "property_address": "3 Del Pilar Street, Barangay Mabini",
                    "lot_area_sqm": 300.0,
                    "land_use": "residential"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let owner_id = created["data"]["id"].as_u64().expect("id");

        let (status, _) = send(
            &router,
            post_request(
                "/api/documents",
                json!({
                    "owner_type": "zoning",
                    "owner_id": owner_id,
                    "name": "Lot plan",
                    "file_name": "lot-plan.pdf",
                    "size_bytes": 4096
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let delete = Request::builder()
            .method("DELETE")
            .uri(format!("/api/zoning/applications/{owner_id}"))
            .body(Body::empty())
            .expect("request builds");
        let (status, _) = send(&router, delete).await;
        assert_eq!(status, StatusCode::OK);

        let (status, listed) = send(
            &router,
            get_request(&format!("/api/documents?owner_type=zoning&owner_id={owner_id}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["data"]["total"], 0);
    }

    #[tokio::test]
    async fn catalog_routes_are_mounted() {
        let (router, _) = app(true);
        let (status, body) = send(&router, get_request("/api/building/reviews")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["data"].as_array().expect("reviews").is_empty());
    }
}
