//! Logistics management backend.
//!
//! Fleet, driver, order and shipment management with an auto-assignment
//! selector for shipments and an approval-gated status update workflow.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use tracing::error;

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing_support;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::handlers::AppServices;
use crate::services::{
    DriverService, FleetService, OrderService, ShipmentService, StatusUpdateService,
};

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub event_sender: EventSender,
    pub services: AppServices,
}

impl AppState {
    pub fn fleet_service(&self) -> Arc<FleetService> {
        self.services.fleet.clone()
    }

    pub fn driver_service(&self) -> Arc<DriverService> {
        self.services.drivers.clone()
    }

    pub fn order_service(&self) -> Arc<OrderService> {
        self.services.orders.clone()
    }

    pub fn shipment_service(&self) -> Arc<ShipmentService> {
        self.services.shipments.clone()
    }

    pub fn status_update_service(&self) -> Arc<StatusUpdateService> {
        self.services.status_updates.clone()
    }
}

/// Standard response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    pub meta: ResponseMeta,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: ResponseMeta::capture(),
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            errors: None,
            meta: ResponseMeta::capture(),
        }
    }
}

/// Per-response metadata: request id (when in scope) and server timestamp.
#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    pub fn capture() -> Self {
        Self {
            request_id: tracing_support::current_request_id().map(|id| id.to_string()),
            timestamp: Utc::now(),
        }
    }
}

/// A page of results plus paging bookkeeping.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, per_page: u64) -> Self {
        let per_page = per_page.max(1);
        Self {
            items,
            total,
            page,
            per_page,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// Result alias for handlers returning the standard envelope.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ServiceError>;

/// Routes mounted under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/fleets", handlers::fleets::routes())
        .nest("/drivers", handlers::drivers::routes())
        .nest("/orders", handlers::orders::routes())
        .nest("/shipments", handlers::shipments::routes())
        .nest("/statusUpdates", handlers::status_updates::routes())
}

/// Builds the full application router with middleware applied.
pub fn app(state: AppState) -> Router {
    let cors = build_cors(&state.config);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/status", get(api_status))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::propagate_request_id,
        ))
        .layer(tracing_support::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

fn build_cors(config: &AppConfig) -> CorsLayer {
    if config.has_cors_allowed_origins() {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .as_deref()
            .unwrap_or("")
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    }
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/swagger-ui",
    }))
}

async fn api_status() -> Json<serde_json::Value> {
    Json(json!({
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "git_hash": env!("GIT_HASH"),
        "build_time": env!("BUILD_TIME"),
        "timestamp": Utc::now(),
    }))
}

async fn health_check(State(state): State<AppState>) -> Response {
    match db::check_connection(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"status": "ok", "database": "up"})),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "degraded", "database": "down"})),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_math() {
        let page: PaginatedResponse<i32> = PaginatedResponse::new(vec![1, 2, 3], 7, 1, 3);
        assert_eq!(page.total_pages, 3);

        let empty: PaginatedResponse<i32> = PaginatedResponse::new(vec![], 0, 1, 20);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn envelope_omits_empty_fields() {
        let body = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], 42);
        assert!(body.get("message").is_none());
        assert!(body.get("errors").is_none());
        assert!(body["meta"]["timestamp"].is_string());
    }
}
