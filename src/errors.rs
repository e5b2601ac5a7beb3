use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Error type shared by services and handlers.
///
/// `status_code()` and `response_message()` are the single source of truth
/// for how each variant crosses the HTTP boundary; internal failures are
/// logged in full but reach the client as a generic message.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No available vehicles: {0}")]
    NoAvailableVehicles(String),

    #[error("Approval not required: {0}")]
    ApprovalNotRequired(String),

    #[error("Already decided: {0}")]
    AlreadyDecided(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ServiceError {
    /// Creates a NotFound error for an entity and id.
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("{} {}", entity, id))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::ValidationError(_)
            | ServiceError::InvalidInput(_)
            | ServiceError::NoAvailableVehicles(_)
            | ServiceError::ApprovalNotRequired(_)
            | ServiceError::AlreadyDecided(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::DatabaseError(_)
            | ServiceError::InternalError(_)
            | ServiceError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to expose to API clients.
    pub fn response_message(&self) -> String {
        match self {
            ServiceError::NotFound(what) => format!("{} not found", what),
            ServiceError::ValidationError(msg) | ServiceError::InvalidInput(msg) => msg.clone(),
            ServiceError::NoAvailableVehicles(msg) => msg.clone(),
            ServiceError::ApprovalNotRequired(msg) => msg.clone(),
            ServiceError::AlreadyDecided(msg) => msg.clone(),
            ServiceError::Conflict(msg) => msg.clone(),
            ServiceError::DatabaseError(_)
            | ServiceError::InternalError(_)
            | ServiceError::Other(_) => "An internal error occurred".to_string(),
        }
    }

    fn error_label(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "not_found",
            ServiceError::ValidationError(_) => "validation_error",
            ServiceError::InvalidInput(_) => "invalid_input",
            ServiceError::NoAvailableVehicles(_) => "no_available_vehicles",
            ServiceError::ApprovalNotRequired(_) => "approval_not_required",
            ServiceError::AlreadyDecided(_) => "already_decided",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::DatabaseError(_) => "database_error",
            ServiceError::InternalError(_) | ServiceError::Other(_) => "internal_error",
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(errors.to_string())
    }
}

/// JSON body returned for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = ErrorResponse {
            error: self.error_label().to_string(),
            message: self.response_message(),
            details: None,
            request_id: crate::tracing_support::current_request_id().map(|id| id.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = ServiceError::not_found("Order", 42);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.response_message(), "Order 42 not found");
    }

    #[test]
    fn assignment_and_approval_failures_map_to_400() {
        let no_vehicles = ServiceError::NoAvailableVehicles("No available vehicles found".into());
        assert_eq!(no_vehicles.status_code(), StatusCode::BAD_REQUEST);

        let decided = ServiceError::AlreadyDecided("Status update 7 was already decided".into());
        assert_eq!(decided.status_code(), StatusCode::BAD_REQUEST);

        let not_required =
            ServiceError::ApprovalNotRequired("Status update 7 does not require approval".into());
        assert_eq!(not_required.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = ServiceError::InternalError("connection pool exhausted".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.response_message(), "An internal error occurred");
    }

    #[test]
    fn validation_errors_pass_message_through() {
        let err = ServiceError::ValidationError("capacity must be positive".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.response_message(), "capacity must be positive");
    }
}
