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

use crate::entities::vehicle::{self, VehicleStatus};
use crate::errors::ServiceError;
use crate::handlers::common::{created, no_content, success, validate_input};
use crate::services::fleets::{NewVehicle, VehicleChanges, VehicleFilter};
use crate::{ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_fleets).post(create_fleet))
        .route(
            "/:id",
            get(get_fleet).patch(update_fleet).delete(delete_fleet),
        )
}

/// Parses a vehicle status from its wire representation.
pub(crate) fn parse_vehicle_status(value: &str) -> Result<VehicleStatus, ServiceError> {
    match value.to_ascii_lowercase().replace('_', " ").as_str() {
        "available" => Ok(VehicleStatus::Available),
        "in use" => Ok(VehicleStatus::InUse),
        "maintenance" => Ok(VehicleStatus::Maintenance),
        "out of service" => Ok(VehicleStatus::OutOfService),
        _ => Err(ServiceError::InvalidInput(format!(
            "Invalid vehicle status '{}'. Must be one of: Available, In Use, Maintenance, Out of Service",
            value
        ))),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FleetResponse {
    pub id: i64,
    pub vehicle_number: String,
    pub vehicle_type: String,
    pub capacity: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<vehicle::Model> for FleetResponse {
    fn from(model: vehicle::Model) -> Self {
        Self {
            id: model.id,
            vehicle_number: model.vehicle_number,
            vehicle_type: model.vehicle_type,
            capacity: model.capacity,
            status: model.status.to_string(),
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FleetListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFleetRequest {
    #[validate(length(min = 1, max = 64))]
    pub vehicle_number: String,
    #[validate(length(min = 1, max = 64))]
    pub vehicle_type: String,
    #[validate(range(min = 1))]
    pub capacity: i32,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFleetRequest {
    #[validate(length(min = 1, max = 64))]
    pub vehicle_number: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub vehicle_type: Option<String>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    pub status: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/fleets",
    params(FleetListQuery),
    responses((status = 200, description = "List vehicles", body = [FleetResponse])),
    tag = "fleets"
)]
pub async fn list_fleets(
    State(state): State<AppState>,
    Query(query): Query<FleetListQuery>,
) -> ApiResult<PaginatedResponse<FleetResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .limit
        .unwrap_or(state.config.api_default_page_size)
        .clamp(1, state.config.api_max_page_size);
    let status = query
        .status
        .as_deref()
        .map(parse_vehicle_status)
        .transpose()?;

    let (vehicles, total) = state
        .fleet_service()
        .list_vehicles(VehicleFilter {
            status,
            page,
            per_page,
        })
        .await?;

    let items = vehicles.into_iter().map(FleetResponse::from).collect();
    Ok(success(PaginatedResponse::new(items, total, page, per_page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/fleets/{id}",
    params(("id" = i64, Path, description = "Vehicle id")),
    responses(
        (status = 200, description = "Vehicle found", body = FleetResponse),
        (status = 404, description = "Vehicle not found")
    ),
    tag = "fleets"
)]
pub async fn get_fleet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<FleetResponse> {
    let vehicle = state.fleet_service().get_vehicle(id).await?;
    Ok(success(FleetResponse::from(vehicle)))
}

#[utoipa::path(
    post,
    path = "/api/v1/fleets",
    request_body = CreateFleetRequest,
    responses(
        (status = 201, description = "Vehicle registered", body = FleetResponse),
        (status = 400, description = "Invalid input")
    ),
    tag = "fleets"
)]
pub async fn create_fleet(
    State(state): State<AppState>,
    Json(payload): Json<CreateFleetRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let status = payload
        .status
        .as_deref()
        .map(parse_vehicle_status)
        .transpose()?
        .unwrap_or(VehicleStatus::Available);

    let vehicle = state
        .fleet_service()
        .create_vehicle(NewVehicle {
            vehicle_number: payload.vehicle_number,
            vehicle_type: payload.vehicle_type,
            capacity: payload.capacity,
            status,
        })
        .await?;

    Ok(created(FleetResponse::from(vehicle)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/fleets/{id}",
    params(("id" = i64, Path, description = "Vehicle id")),
    request_body = UpdateFleetRequest,
    responses(
        (status = 200, description = "Vehicle updated", body = FleetResponse),
        (status = 404, description = "Vehicle not found")
    ),
    tag = "fleets"
)]
pub async fn update_fleet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateFleetRequest>,
) -> ApiResult<FleetResponse> {
    validate_input(&payload)?;
    let status = payload
        .status
        .as_deref()
        .map(parse_vehicle_status)
        .transpose()?;

    let vehicle = state
        .fleet_service()
        .update_vehicle(
            id,
            VehicleChanges {
                vehicle_number: payload.vehicle_number,
                vehicle_type: payload.vehicle_type,
                capacity: payload.capacity,
                status,
            },
        )
        .await?;

    Ok(success(FleetResponse::from(vehicle)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/fleets/{id}",
    params(("id" = i64, Path, description = "Vehicle id")),
    responses(
        (status = 204, description = "Vehicle deleted"),
        (status = 404, description = "Vehicle not found")
    ),
    tag = "fleets"
)]
pub async fn delete_fleet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ServiceError> {
    state.fleet_service().delete_vehicle(id).await?;
    Ok(no_content())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_status_parsing_is_forgiving_about_case() {
        assert_eq!(
            parse_vehicle_status("available").unwrap(),
            VehicleStatus::Available
        );
        assert_eq!(
            parse_vehicle_status("In Use").unwrap(),
            VehicleStatus::InUse
        );
        assert_eq!(
            parse_vehicle_status("out_of_service").unwrap(),
            VehicleStatus::OutOfService
        );
        assert!(parse_vehicle_status("parked").is_err());
    }
}
