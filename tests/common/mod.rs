#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::Value;
use tower::ServiceExt;

use logistics_api::config::AppConfig;
use logistics_api::entities::vehicle::VehicleStatus;
use logistics_api::entities::{admin, customer, driver, order, vehicle};
use logistics_api::handlers::AppServices;
use logistics_api::{app, db, events, AppState};

/// Full application wired against a throwaway SQLite database.
pub struct TestApp {
    pub state: AppState,
    router: axum::Router,
    _tmp: tempfile::TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let db_path = tmp.path().join("logistics_test.db");
        let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let config = AppConfig::new(
            database_url,
            "127.0.0.1".to_string(),
            0,
            "development".to_string(),
        );

        let pool = db::establish_connection_from_app_config(&config)
            .await
            .expect("connect to test database");
        db::run_migrations(&pool).await.expect("run migrations");
        let db_pool = Arc::new(pool);

        let event_sender = events::spawn_event_processor(64);

        let base_logger = slog::Logger::root(slog::Discard, slog::o!());
        let services = AppServices::new(
            db_pool.clone(),
            Arc::new(event_sender.clone()),
            &base_logger,
        );

        let state = AppState {
            db: db_pool,
            config,
            event_sender,
            services,
        };
        let router = app(state.clone());

        Self {
            state,
            router,
            _tmp: tmp,
        }
    }

    /// Sends a request through the full router and decodes the JSON body
    /// (Null for empty bodies).
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn seed_vehicle(
        &self,
        vehicle_number: &str,
        capacity: i32,
        status: VehicleStatus,
    ) -> vehicle::Model {
        vehicle::ActiveModel {
            vehicle_number: Set(vehicle_number.to_string()),
            vehicle_type: Set("Box Truck".to_string()),
            capacity: Set(capacity),
            status: Set(status),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .unwrap()
    }

    pub async fn seed_driver(
        &self,
        name: &str,
        assigned_vehicle_id: Option<i64>,
    ) -> driver::Model {
        driver::ActiveModel {
            name: Set(name.to_string()),
            phone: Set("555-0100".to_string()),
            license_number: Set(format!("LIC-{}", name.to_uppercase())),
            assigned_vehicle_id: Set(assigned_vehicle_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .unwrap()
    }

    pub async fn seed_customer(&self, email: &str) -> customer::Model {
        customer::ActiveModel {
            name: Set("Test Customer".to_string()),
            email: Set(email.to_string()),
            phone: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .unwrap()
    }

    pub async fn seed_order(&self, customer_id: i64, status: &str) -> order::Model {
        let now = Utc::now();
        order::ActiveModel {
            customer_id: Set(customer_id),
            status: Set(status.to_string()),
            order_date: Set(now),
            total_amount: Set(dec!(199.99)),
            created_at: Set(now),
            updated_at: Set(None),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .unwrap()
    }

    /// The admin seeded by the migrations.
    pub async fn default_admin_id(&self) -> i64 {
        admin::Entity::find()
            .one(&*self.state.db)
            .await
            .unwrap()
            .expect("default admin seeded by migrations")
            .id
    }
}
