//! Shared response helpers for handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::Validate;

use crate::errors::ServiceError;
use crate::ApiResponse;

/// 200 with the standard envelope.
pub fn success<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// 201 with the standard envelope.
pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

/// 201 with an explanatory message alongside the data.
pub fn created_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    (
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(data, message)),
    )
        .into_response()
}

/// Bodyless 204 for deletes.
pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Runs declarative validation and maps failures to a 400.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input.validate().map_err(ServiceError::from)
}
