//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_warranty::{ErrorKind, FieldErrors, WarrantyError};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A collaborator failed in a way a retry may fix
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation(FieldErrors::single(field, message))
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
    /// Whether the same request may succeed when retried
    pub transient: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, details) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
            ApiError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                Some(fields.clone()),
            ),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict", None),
            ApiError::Unavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", None)
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            details,
            transient: matches!(self, ApiError::Unavailable(_)),
        };

        (status, Json(body)).into_response()
    }
}

impl From<WarrantyError> for ApiError {
    fn from(err: WarrantyError) -> Self {
        match err {
            WarrantyError::Validation(fields) => ApiError::Validation(fields),
            WarrantyError::InvalidClaimId(id) => {
                ApiError::invalid("claim_id", format!("Invalid claim id: {}", id))
            }
            WarrantyError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            WarrantyError::Collaborator(PortError::Conflict { message }) => {
                ApiError::Conflict(message)
            }
            other => match other.kind() {
                ErrorKind::Validation => ApiError::invalid("request", other.to_string()),
                ErrorKind::Precondition => ApiError::Conflict(other.to_string()),
                ErrorKind::Transient => ApiError::Unavailable(other.to_string()),
                ErrorKind::Fatal => ApiError::Internal(other.to_string()),
            },
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, problems) in errors.field_errors() {
            for problem in problems {
                let message = problem
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| problem.code.to_string());
                fields.add(field.to_string(), message);
            }
        }
        ApiError::Validation(fields)
    }
}
