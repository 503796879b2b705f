use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::{DomainError, StoreError, Violation};

/// Carries a domain failure out of a handler.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    violations: Vec<Violation>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::MissingIdentifier(_) => StatusCode::BAD_REQUEST,
            DomainError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            DomainError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            DomainError::Store(_) => StatusCode::BAD_GATEWAY,
            DomainError::Initialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        let violations = match &self.0 {
            DomainError::Validation(err) => err.violations.clone(),
            _ => Vec::new(),
        };

        let body = ErrorBody {
            error: self.0.to_string(),
            violations,
        };
        (status, Json(body)).into_response()
    }
}
