use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::entities::driver;
use crate::errors::ServiceError;
use crate::handlers::common::{created, no_content, success, validate_input};
use crate::services::drivers::{DriverChanges, NewDriver};
use crate::{ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers).post(create_driver))
        .route(
            "/:id",
            get(get_driver).patch(update_driver).delete(delete_driver),
        )
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DriverResponse {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub license_number: String,
    pub assigned_vehicle_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<driver::Model> for DriverResponse {
    fn from(model: driver::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            license_number: model.license_number,
            assigned_vehicle_id: model.assigned_vehicle_id,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DriverListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDriverRequest {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
    #[validate(length(min = 1, max = 64))]
    pub license_number: String,
    pub assigned_vehicle_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDriverRequest {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub license_number: Option<String>,
    pub assigned_vehicle_id: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/drivers",
    params(DriverListQuery),
    responses((status = 200, description = "List drivers", body = [DriverResponse])),
    tag = "drivers"
)]
pub async fn list_drivers(
    State(state): State<AppState>,
    Query(query): Query<DriverListQuery>,
) -> ApiResult<PaginatedResponse<DriverResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .limit
        .unwrap_or(state.config.api_default_page_size)
        .clamp(1, state.config.api_max_page_size);

    let (drivers, total) = state.driver_service().list_drivers(page, per_page).await?;

    let items = drivers.into_iter().map(DriverResponse::from).collect();
    Ok(success(PaginatedResponse::new(items, total, page, per_page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/drivers/{id}",
    params(("id" = i64, Path, description = "Driver id")),
    responses(
        (status = 200, description = "Driver found", body = DriverResponse),
        (status = 404, description = "Driver not found")
    ),
    tag = "drivers"
)]
pub async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<DriverResponse> {
    let driver = state.driver_service().get_driver(id).await?;
    Ok(success(DriverResponse::from(driver)))
}

#[utoipa::path(
    post,
    path = "/api/v1/drivers",
    request_body = CreateDriverRequest,
    responses(
        (status = 201, description = "Driver registered", body = DriverResponse),
        (status = 400, description = "Invalid input")
    ),
    tag = "drivers"
)]
pub async fn create_driver(
    State(state): State<AppState>,
    Json(payload): Json<CreateDriverRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let driver = state
        .driver_service()
        .create_driver(NewDriver {
            name: payload.name,
            phone: payload.phone,
            license_number: payload.license_number,
            assigned_vehicle_id: payload.assigned_vehicle_id,
        })
        .await?;

    Ok(created(DriverResponse::from(driver)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/drivers/{id}",
    params(("id" = i64, Path, description = "Driver id")),
    request_body = UpdateDriverRequest,
    responses(
        (status = 200, description = "Driver updated", body = DriverResponse),
        (status = 404, description = "Driver not found")
    ),
    tag = "drivers"
)]
pub async fn update_driver(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateDriverRequest>,
) -> ApiResult<DriverResponse> {
    validate_input(&payload)?;

    let driver = state
        .driver_service()
        .update_driver(
            id,
            DriverChanges {
                name: payload.name,
                phone: payload.phone,
                license_number: payload.license_number,
                assigned_vehicle_id: payload.assigned_vehicle_id.map(Some),
            },
        )
        .await?;

    Ok(success(DriverResponse::from(driver)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/drivers/{id}",
    params(("id" = i64, Path, description = "Driver id")),
    responses(
        (status = 204, description = "Driver deleted"),
        (status = 404, description = "Driver not found")
    ),
    tag = "drivers"
)]
pub async fn delete_driver(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ServiceError> {
    state.driver_service().delete_driver(id).await?;
    Ok(no_content())
}
