//! HTTP mapping of domain errors
//!
//! Every failure leaves the server as `{ "error": "<message>" }`. Store
//! failures are logged here and never echoed to the client.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::domain::DomainError;

pub type ApiResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn status(&self) -> StatusCode {
        match self {
            DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            DomainError::InvalidInput(msg)
            | DomainError::NotFound(msg)
            | DomainError::Conflict(msg) => msg,
            DomainError::Internal(detail) => {
                log::error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for DomainError {
    fn from(rejection: JsonRejection) -> Self {
        DomainError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for DomainError {
    fn from(rejection: PathRejection) -> Self {
        DomainError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for DomainError {
    fn from(rejection: QueryRejection) -> Self {
        DomainError::InvalidInput(rejection.body_text())
    }
}
