//! HTTP handlers and the service registry they dispatch to.

pub mod common;
pub mod drivers;
pub mod fleets;
pub mod orders;
pub mod shipments;
pub mod status_updates;

use std::sync::Arc;

use slog::Logger;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::logging::component_logger;
use crate::services::{
    DriverService, FleetService, OrderService, ShipmentService, StatusUpdateService,
};

/// Registry of the application services, shared via [`crate::AppState`].
#[derive(Clone)]
pub struct AppServices {
    pub fleet: Arc<FleetService>,
    pub drivers: Arc<DriverService>,
    pub orders: Arc<OrderService>,
    pub shipments: Arc<ShipmentService>,
    pub status_updates: Arc<StatusUpdateService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        base_logger: &Logger,
    ) -> Self {
        Self {
            fleet: Arc::new(FleetService::new(db_pool.clone(), event_sender.clone())),
            drivers: Arc::new(DriverService::new(db_pool.clone(), event_sender.clone())),
            orders: Arc::new(OrderService::new(db_pool.clone(), event_sender.clone())),
            shipments: Arc::new(ShipmentService::new(
                db_pool.clone(),
                event_sender.clone(),
                component_logger(base_logger, "shipments"),
            )),
            status_updates: Arc::new(StatusUpdateService::new(
                db_pool,
                event_sender,
                component_logger(base_logger, "status_updates"),
            )),
        }
    }
}
