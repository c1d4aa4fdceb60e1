use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use super::store::{RecordId, StoreError};
use super::validation::ValidationErrors;

/// `{success, data|message}` body shared by every JSON endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Wraps an envelope for `201 Created` responses.
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(Envelope::ok(self.0))).into_response()
    }
}

/// Request-level failures surfaced as JSON envelopes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("The given data was invalid.")]
    Validation(ValidationErrors),
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: RecordId },
    #[error("cannot change status from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Store(StoreError),
    #[error("failed to export records: {0}")]
    Export(#[from] csv::Error),
}

impl ApiError {
    pub fn not_found(resource: &'static str, id: RecordId) -> Self {
        Self::NotFound { resource, id }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidTransition { .. } | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Store(_) | ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(errors) => {
                warn!(%errors, "request validation failed");
                json!({
                    "success": false,
                    "message": self.to_string(),
                    "errors": errors,
                })
            }
            ApiError::Store(_) | ApiError::Export(_) => {
                error!(error = %self, "request failed");
                json!({
                    "success": false,
                    "message": "An unexpected error occurred. Please try again later.",
                })
            }
            _ => json!({
                "success": false,
                "message": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
