use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Default status stamped on shipments created without an explicit one.
pub const DEFAULT_SHIPMENT_STATUS: &str = "Pending";

/// Shipment entity model.
///
/// `vehicle_id` and `driver_id` are nullable: a shipment may be recorded
/// before any fleet resources are attached, and auto-assignment can succeed
/// on the vehicle while finding no eligible driver.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shipments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: i64,
    pub vehicle_id: Option<i64>,
    pub driver_id: Option<i64>,
    pub shipment_date: DateTime<Utc>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub status: String,
    #[sea_orm(unique)]
    pub tracking_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id"
    )]
    Vehicle,
    #[sea_orm(
        belongs_to = "super::driver::Entity",
        from = "Column::DriverId",
        to = "super::driver::Column::Id"
    )]
    Driver,
    #[sea_orm(has_many = "super::status_update::Entity")]
    StatusUpdates,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl Related<super::driver::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Driver.def()
    }
}

impl Related<super::status_update::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusUpdates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
