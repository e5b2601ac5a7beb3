//! Business logic services.
//!
//! Each service owns the database access and transactional rules for one
//! aggregate; handlers stay thin and translate between DTOs and services.

pub mod drivers;
pub mod fleets;
pub mod orders;
pub mod shipments;
pub mod status_updates;

pub use drivers::DriverService;
pub use fleets::FleetService;
pub use orders::OrderService;
pub use shipments::ShipmentService;
pub use status_updates::StatusUpdateService;
