//! Database entities for the logistics domain.

pub mod admin;
pub mod customer;
pub mod driver;
pub mod order;
pub mod shipment;
pub mod status_update;
pub mod supplier;
pub mod vehicle;
