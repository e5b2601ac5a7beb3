use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::entities::status_update::{self, StakeholderType};
use crate::errors::ServiceError;
use crate::handlers::common::{created, created_with_message, success, validate_input};
use crate::services::status_updates::{
    ApprovalDecision, CancellationRequest, NewStatusUpdate,
};
use crate::{ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_status_updates).post(create_status_update))
        .route("/order/:order_id", get(status_updates_for_order))
        .route("/shipment/:shipment_id", get(status_updates_for_shipment))
        .route("/pending-approvals", get(pending_approvals))
        .route("/:id/approve", patch(approve_status_update))
        .route("/cancel", post(request_cancellation))
}

/// Parses a stakeholder type from its wire representation.
pub(crate) fn parse_stakeholder_type(value: &str) -> Result<StakeholderType, ServiceError> {
    match value.to_ascii_lowercase().as_str() {
        "customer" => Ok(StakeholderType::Customer),
        "supplier" => Ok(StakeholderType::Supplier),
        "driver" => Ok(StakeholderType::Driver),
        "admin" => Ok(StakeholderType::Admin),
        _ => Err(ServiceError::ValidationError(
            "Invalid stakeholder_type. Must be one of: customer, supplier, driver, admin"
                .to_string(),
        )),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusUpdateResponse {
    pub id: i64,
    pub order_id: Option<i64>,
    pub shipment_id: Option<i64>,
    pub stakeholder_type: String,
    pub stakeholder_id: i64,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub update_reason: Option<String>,
    pub customer_notes: Option<String>,
    pub internal_notes: Option<String>,
    pub is_cancellation_request: bool,
    pub cancellation_reason: Option<String>,
    pub requires_approval: bool,
    pub approval_status: String,
    pub approved_by: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<status_update::Model> for StatusUpdateResponse {
    fn from(model: status_update::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            shipment_id: model.shipment_id,
            stakeholder_type: model.stakeholder_type.to_string(),
            stakeholder_id: model.stakeholder_id,
            previous_status: model.previous_status,
            new_status: model.new_status,
            update_reason: model.update_reason,
            customer_notes: model.customer_notes,
            internal_notes: model.internal_notes,
            is_cancellation_request: model.is_cancellation_request,
            cancellation_reason: model.cancellation_reason,
            requires_approval: model.requires_approval,
            approval_status: model.approval_status.to_string(),
            approved_by: model.approved_by,
            approved_at: model.approved_at,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StatusUpdateListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Mandatory fields are optional here so their absence maps to the
/// documented 400 rather than a deserialization rejection.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStatusUpdateRequest {
    pub order_id: Option<i64>,
    pub shipment_id: Option<i64>,
    pub stakeholder_type: Option<String>,
    pub stakeholder_id: Option<i64>,
    #[validate(length(min = 1, max = 64))]
    pub previous_status: Option<String>,
    pub new_status: Option<String>,
    #[validate(length(max = 1024))]
    pub update_reason: Option<String>,
    #[validate(length(max = 4096))]
    pub customer_notes: Option<String>,
    #[validate(length(max = 4096))]
    pub internal_notes: Option<String>,
    pub is_cancellation_request: Option<bool>,
    #[validate(length(max = 1024))]
    pub cancellation_reason: Option<String>,
    pub requires_approval: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveStatusUpdateRequest {
    pub is_approved: Option<bool>,
    pub admin_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RequestCancellationRequest {
    pub order_id: Option<i64>,
    pub shipment_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub cancellation_reason: Option<String>,
    #[validate(length(max = 4096))]
    pub customer_notes: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/statusUpdates",
    params(StatusUpdateListQuery),
    responses((status = 200, description = "List status updates", body = [StatusUpdateResponse])),
    tag = "status-updates"
)]
pub async fn list_status_updates(
    State(state): State<AppState>,
    Query(query): Query<StatusUpdateListQuery>,
) -> ApiResult<PaginatedResponse<StatusUpdateResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .limit
        .unwrap_or(state.config.api_default_page_size)
        .clamp(1, state.config.api_max_page_size);

    let (updates, total) = state
        .status_update_service()
        .list_status_updates(page, per_page)
        .await?;

    let items = updates.into_iter().map(StatusUpdateResponse::from).collect();
    Ok(success(PaginatedResponse::new(items, total, page, per_page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/statusUpdates/order/{order_id}",
    params(("order_id" = i64, Path, description = "Order id")),
    responses((status = 200, description = "Status updates for the order", body = [StatusUpdateResponse])),
    tag = "status-updates"
)]
pub async fn status_updates_for_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> ApiResult<Vec<StatusUpdateResponse>> {
    let updates = state
        .status_update_service()
        .list_for_order(order_id)
        .await?;
    Ok(success(
        updates.into_iter().map(StatusUpdateResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/statusUpdates/shipment/{shipment_id}",
    params(("shipment_id" = i64, Path, description = "Shipment id")),
    responses((status = 200, description = "Status updates for the shipment", body = [StatusUpdateResponse])),
    tag = "status-updates"
)]
pub async fn status_updates_for_shipment(
    State(state): State<AppState>,
    Path(shipment_id): Path<i64>,
) -> ApiResult<Vec<StatusUpdateResponse>> {
    let updates = state
        .status_update_service()
        .list_for_shipment(shipment_id)
        .await?;
    Ok(success(
        updates.into_iter().map(StatusUpdateResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/statusUpdates/pending-approvals",
    responses((status = 200, description = "Updates awaiting a decision, oldest first", body = [StatusUpdateResponse])),
    tag = "status-updates"
)]
pub async fn pending_approvals(
    State(state): State<AppState>,
) -> ApiResult<Vec<StatusUpdateResponse>> {
    let updates = state.status_update_service().pending_approvals().await?;
    Ok(success(
        updates.into_iter().map(StatusUpdateResponse::from).collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/statusUpdates",
    request_body = CreateStatusUpdateRequest,
    responses(
        (status = 201, description = "Status update recorded", body = StatusUpdateResponse),
        (status = 400, description = "Invalid input")
    ),
    tag = "status-updates"
)]
pub async fn create_status_update(
    State(state): State<AppState>,
    Json(payload): Json<CreateStatusUpdateRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let (stakeholder_type, stakeholder_id, new_status) = match (
        payload.stakeholder_type.as_deref(),
        payload.stakeholder_id,
        payload.new_status.as_deref(),
    ) {
        (Some(kind), Some(id), Some(status)) if !kind.is_empty() && !status.is_empty() => {
            (kind, id, status)
        }
        _ => {
            return Err(ServiceError::ValidationError(
                "stakeholder_type, stakeholder_id, and new_status are required".to_string(),
            ));
        }
    };
    let stakeholder_type = parse_stakeholder_type(stakeholder_type)?;

    let update = state
        .status_update_service()
        .create_status_update(NewStatusUpdate {
            order_id: payload.order_id,
            shipment_id: payload.shipment_id,
            stakeholder_type,
            stakeholder_id,
            previous_status: payload.previous_status,
            new_status: new_status.to_string(),
            update_reason: payload.update_reason,
            customer_notes: payload.customer_notes,
            internal_notes: payload.internal_notes,
            is_cancellation_request: payload.is_cancellation_request.unwrap_or(false),
            cancellation_reason: payload.cancellation_reason,
            requires_approval: payload.requires_approval.unwrap_or(false),
        })
        .await?;

    Ok(created(StatusUpdateResponse::from(update)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/statusUpdates/{id}/approve",
    params(("id" = i64, Path, description = "Status update id")),
    request_body = ApproveStatusUpdateRequest,
    responses(
        (status = 200, description = "Decision recorded", body = StatusUpdateResponse),
        (status = 400, description = "Not approvable or already decided"),
        (status = 404, description = "Status update not found")
    ),
    tag = "status-updates"
)]
pub async fn approve_status_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ApproveStatusUpdateRequest>,
) -> ApiResult<StatusUpdateResponse> {
    let is_approved = payload.is_approved.ok_or_else(|| {
        ServiceError::ValidationError("is_approved must be a boolean value".to_string())
    })?;
    let admin_id = payload
        .admin_id
        .ok_or_else(|| ServiceError::ValidationError("admin_id is required".to_string()))?;

    let decided = state
        .status_update_service()
        .decide_status_update(
            id,
            ApprovalDecision {
                is_approved,
                admin_id,
            },
        )
        .await?;

    Ok(success(StatusUpdateResponse::from(decided)))
}

#[utoipa::path(
    post,
    path = "/api/v1/statusUpdates/cancel",
    request_body = RequestCancellationRequest,
    responses(
        (status = 201, description = "Cancellation request submitted", body = StatusUpdateResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Target order or shipment not found")
    ),
    tag = "status-updates"
)]
pub async fn request_cancellation(
    State(state): State<AppState>,
    Json(payload): Json<RequestCancellationRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let (customer_id, cancellation_reason) =
        match (payload.customer_id, payload.cancellation_reason) {
            (Some(customer_id), Some(reason)) if !reason.is_empty() => (customer_id, reason),
            _ => {
                return Err(ServiceError::ValidationError(
                    "customer_id and cancellation_reason are required".to_string(),
                ));
            }
        };

    let update = state
        .status_update_service()
        .request_cancellation(CancellationRequest {
            order_id: payload.order_id,
            shipment_id: payload.shipment_id,
            customer_id,
            cancellation_reason,
            customer_notes: payload.customer_notes,
        })
        .await?;

    Ok(created_with_message(
        StatusUpdateResponse::from(update),
        "Cancellation request submitted successfully",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stakeholder_type_parsing() {
        assert_eq!(
            parse_stakeholder_type("customer").unwrap(),
            StakeholderType::Customer
        );
        assert_eq!(
            parse_stakeholder_type("Admin").unwrap(),
            StakeholderType::Admin
        );
        assert!(parse_stakeholder_type("robot").is_err());
    }
}
