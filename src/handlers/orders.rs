use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::entities::order;
use crate::errors::ServiceError;
use crate::handlers::common::{created, no_content, success, validate_input};
use crate::services::orders::{NewOrder, OrderChanges, OrderFilter};
use crate::{ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route(
            "/:id",
            get(get_order).patch(update_order).delete(delete_order),
        )
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub customer_id: i64,
    pub status: String,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<order::Model> for OrderResponse {
    fn from(model: order::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            status: model.status,
            order_date: model.order_date,
            total_amount: model.total_amount,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct OrderListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub customer_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: i64,
    #[validate(length(min = 1, max = 64))]
    pub status: Option<String>,
    pub order_date: Option<DateTime<Utc>>,
    pub total_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderRequest {
    #[validate(length(min = 1, max = 64))]
    pub status: Option<String>,
    pub total_amount: Option<Decimal>,
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(OrderListQuery),
    responses((status = 200, description = "List orders", body = [OrderResponse])),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<PaginatedResponse<OrderResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .limit
        .unwrap_or(state.config.api_default_page_size)
        .clamp(1, state.config.api_max_page_size);

    let (orders, total) = state
        .order_service()
        .list_orders(OrderFilter {
            status: query.status,
            customer_id: query.customer_id,
            page,
            per_page,
        })
        .await?;

    let items = orders.into_iter().map(OrderResponse::from).collect();
    Ok(success(PaginatedResponse::new(items, total, page, per_page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found")
    ),
    tag = "orders"
)]
pub async fn get_order(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<OrderResponse> {
    let order = state.order_service().get_order(id).await?;
    Ok(success(OrderResponse::from(order)))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Invalid input")
    ),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let order = state
        .order_service()
        .create_order(NewOrder {
            customer_id: payload.customer_id,
            status: payload.status,
            order_date: payload.order_date,
            total_amount: payload.total_amount,
        })
        .await?;

    Ok(created(OrderResponse::from(order)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 404, description = "Order not found")
    ),
    tag = "orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOrderRequest>,
) -> ApiResult<OrderResponse> {
    validate_input(&payload)?;

    let order = state
        .order_service()
        .update_order(
            id,
            OrderChanges {
                status: payload.status,
                total_amount: payload.total_amount,
            },
        )
        .await?;

    Ok(success(OrderResponse::from(order)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found")
    ),
    tag = "orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ServiceError> {
    state.order_service().delete_order(id).await?;
    Ok(no_content())
}
