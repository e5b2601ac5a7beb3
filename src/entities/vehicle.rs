use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vehicle availability status.
///
/// Stored as the human-readable strings the fleet portal displays, so the
/// database values double as presentation values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum VehicleStatus {
    #[sea_orm(string_value = "Available")]
    Available,

    #[sea_orm(string_value = "In Use")]
    InUse,

    #[sea_orm(string_value = "Maintenance")]
    Maintenance,

    #[sea_orm(string_value = "Out of Service")]
    OutOfService,
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleStatus::Available => write!(f, "Available"),
            VehicleStatus::InUse => write!(f, "In Use"),
            VehicleStatus::Maintenance => write!(f, "Maintenance"),
            VehicleStatus::OutOfService => write!(f, "Out of Service"),
        }
    }
}

/// Fleet vehicle entity model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub vehicle_number: String,
    pub vehicle_type: String,
    pub capacity: i32,
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::shipment::Entity")]
    Shipments,
    #[sea_orm(has_many = "super::driver::Entity")]
    Drivers,
}

impl Related<super::shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipments.def()
    }
}

impl Related<super::driver::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Drivers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
