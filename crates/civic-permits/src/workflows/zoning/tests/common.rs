use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::config::PaginationConfig;
use crate::records::{InMemoryStore, RecordId, RecordStore, StatusChange, StoreError};
use crate::workflows::zoning::{
    zoning_router, NewZoningApplication, ZoningApplication, ZoningService,
};

pub(super) type MemoryStore = InMemoryStore<ZoningApplication>;

pub(super) fn pagination() -> PaginationConfig {
    PaginationConfig {
        default_per_page: 2,
        max_per_page: 10,
    }
}

pub(super) fn new_application() -> NewZoningApplication {
    NewZoningApplication {
        applicant_name: "Maria Santos".to_string(),
        applicant_email: "maria.santos@example.ph".to_string(),
        applicant_phone: Some("0917 555 0101".to_string()),
        property_address: "12 Rizal Avenue, Poblacion".to_string(),
        lot_area_sqm: 450.5,
        land_use: "residential".to_string(),
        project_description: Some("Two-storey single detached dwelling".to_string()),
        zone_id: None,
    }
}

pub(super) fn commercial_application(name: &str) -> NewZoningApplication {
    NewZoningApplication {
        applicant_name: name.to_string(),
        property_address: "88 Mabini Street".to_string(),
        land_use: "commercial".to_string(),
        lot_area_sqm: 1200.0,
        ..new_application()
    }
}

pub(super) fn status(value: &str, remarks: Option<&str>) -> StatusChange {
    StatusChange {
        status: value.to_string(),
        remarks: remarks.map(str::to_string),
    }
}

pub(super) fn build_service() -> (ZoningService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = ZoningService::new(store.clone(), pagination());
    (service, store)
}

pub(super) fn router_with_service(service: ZoningService<MemoryStore>) -> axum::Router {
    zoning_router(Arc::new(service))
}

/// Store whose every call fails, standing in for an unreachable database.
pub(super) struct UnavailableStore;

impl RecordStore<ZoningApplication> for UnavailableStore {
    fn insert(&self, _record: ZoningApplication) -> Result<ZoningApplication, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: ZoningApplication) -> Result<ZoningApplication, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: RecordId) -> Result<Option<ZoningApplication>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn remove(&self, _id: RecordId) -> Result<ZoningApplication, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<ZoningApplication>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf8 body")
}
