use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::entities::shipment;
use crate::errors::ServiceError;
use crate::handlers::common::{created, created_with_message, no_content, success, validate_input};
use crate::handlers::drivers::DriverResponse;
use crate::handlers::fleets::FleetResponse;
use crate::services::shipments::{
    AutoAssignShipment, NewShipment, ShipmentChanges, ShipmentFilter,
};
use crate::{ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shipments).post(create_shipment))
        .route("/auto-assign", post(auto_assign_shipment))
        .route("/available-vehicles", get(available_vehicles))
        .route("/available-drivers", get(available_drivers))
        .route(
            "/:id",
            get(get_shipment)
                .patch(update_shipment)
                .delete(delete_shipment),
        )
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentResponse {
    pub id: i64,
    pub order_id: i64,
    pub vehicle_id: Option<i64>,
    pub driver_id: Option<i64>,
    pub shipment_date: DateTime<Utc>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub status: String,
    pub tracking_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<shipment::Model> for ShipmentResponse {
    fn from(model: shipment::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            vehicle_id: model.vehicle_id,
            driver_id: model.driver_id,
            shipment_date: model.shipment_date,
            delivery_date: model.delivery_date,
            status: model.status,
            tracking_number: model.tracking_number,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Shipment plus the fleet resources attached during auto-assignment.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentResponse {
    pub shipment: ShipmentResponse,
    pub assigned_vehicle: FleetResponse,
    pub assigned_driver: Option<DriverResponse>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ShipmentListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub order_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateShipmentRequest {
    pub order_id: i64,
    pub vehicle_id: Option<i64>,
    pub driver_id: Option<i64>,
    pub shipment_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 64))]
    pub status: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub tracking_number: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AutoAssignRequest {
    pub order_id: i64,
    pub delivery_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 64))]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateShipmentRequest {
    pub vehicle_id: Option<i64>,
    pub driver_id: Option<i64>,
    #[validate(length(min = 1, max = 64))]
    pub status: Option<String>,
    pub delivery_date: Option<DateTime<Utc>>,
}

#[utoipa::path(
    get,
    path = "/api/v1/shipments",
    params(ShipmentListQuery),
    responses((status = 200, description = "List shipments", body = [ShipmentResponse])),
    tag = "shipments"
)]
pub async fn list_shipments(
    State(state): State<AppState>,
    Query(query): Query<ShipmentListQuery>,
) -> ApiResult<PaginatedResponse<ShipmentResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .limit
        .unwrap_or(state.config.api_default_page_size)
        .clamp(1, state.config.api_max_page_size);

    let (shipments, total) = state
        .shipment_service()
        .list_shipments(ShipmentFilter {
            status: query.status,
            order_id: query.order_id,
            page,
            per_page,
        })
        .await?;

    let items = shipments.into_iter().map(ShipmentResponse::from).collect();
    Ok(success(PaginatedResponse::new(items, total, page, per_page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/shipments/{id}",
    params(("id" = i64, Path, description = "Shipment id")),
    responses(
        (status = 200, description = "Shipment found", body = ShipmentResponse),
        (status = 404, description = "Shipment not found")
    ),
    tag = "shipments"
)]
pub async fn get_shipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ShipmentResponse> {
    let shipment = state.shipment_service().get_shipment(id).await?;
    Ok(success(ShipmentResponse::from(shipment)))
}

#[utoipa::path(
    post,
    path = "/api/v1/shipments",
    request_body = CreateShipmentRequest,
    responses(
        (status = 201, description = "Shipment recorded", body = ShipmentResponse),
        (status = 400, description = "Invalid input")
    ),
    tag = "shipments"
)]
pub async fn create_shipment(
    State(state): State<AppState>,
    Json(payload): Json<CreateShipmentRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let shipment = state
        .shipment_service()
        .create_shipment(NewShipment {
            order_id: payload.order_id,
            vehicle_id: payload.vehicle_id,
            driver_id: payload.driver_id,
            shipment_date: payload.shipment_date,
            delivery_date: payload.delivery_date,
            status: payload.status,
            tracking_number: payload.tracking_number,
        })
        .await?;

    Ok(created(ShipmentResponse::from(shipment)))
}

#[utoipa::path(
    post,
    path = "/api/v1/shipments/auto-assign",
    request_body = AutoAssignRequest,
    responses(
        (status = 201, description = "Shipment created with assignment", body = AssignmentResponse),
        (status = 400, description = "No available vehicles"),
        (status = 404, description = "Order not found")
    ),
    tag = "shipments"
)]
pub async fn auto_assign_shipment(
    State(state): State<AppState>,
    Json(payload): Json<AutoAssignRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let outcome = state
        .shipment_service()
        .create_with_auto_assignment(AutoAssignShipment {
            order_id: payload.order_id,
            delivery_date: payload.delivery_date,
            status: payload.status,
        })
        .await?;

    let response = AssignmentResponse {
        shipment: ShipmentResponse::from(outcome.shipment),
        assigned_vehicle: FleetResponse::from(outcome.vehicle),
        assigned_driver: outcome.driver.map(DriverResponse::from),
    };

    Ok(created_with_message(
        response,
        "Shipment created with automatic vehicle assignment",
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/shipments/available-vehicles",
    responses((status = 200, description = "Vehicles ready for assignment", body = [FleetResponse])),
    tag = "shipments"
)]
pub async fn available_vehicles(State(state): State<AppState>) -> ApiResult<Vec<FleetResponse>> {
    let vehicles = state.fleet_service().available_vehicles().await?;
    Ok(success(
        vehicles.into_iter().map(FleetResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/shipments/available-drivers",
    responses((status = 200, description = "Drivers orderable for assignment", body = [DriverResponse])),
    tag = "shipments"
)]
pub async fn available_drivers(State(state): State<AppState>) -> ApiResult<Vec<DriverResponse>> {
    let drivers = state.driver_service().available_drivers().await?;
    Ok(success(
        drivers.into_iter().map(DriverResponse::from).collect(),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/shipments/{id}",
    params(("id" = i64, Path, description = "Shipment id")),
    request_body = UpdateShipmentRequest,
    responses(
        (status = 200, description = "Shipment updated", body = ShipmentResponse),
        (status = 404, description = "Shipment not found")
    ),
    tag = "shipments"
)]
pub async fn update_shipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateShipmentRequest>,
) -> ApiResult<ShipmentResponse> {
    validate_input(&payload)?;

    let shipment = state
        .shipment_service()
        .update_shipment(
            id,
            ShipmentChanges {
                vehicle_id: payload.vehicle_id.map(Some),
                driver_id: payload.driver_id.map(Some),
                status: payload.status,
                delivery_date: payload.delivery_date.map(Some),
            },
        )
        .await?;

    Ok(success(ShipmentResponse::from(shipment)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/shipments/{id}",
    params(("id" = i64, Path, description = "Shipment id")),
    responses(
        (status = 204, description = "Shipment deleted, fleet resources released"),
        (status = 404, description = "Shipment not found")
    ),
    tag = "shipments"
)]
pub async fn delete_shipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ServiceError> {
    state.shipment_service().delete_shipment(id).await?;
    Ok(no_content())
}
