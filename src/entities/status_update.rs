use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who recorded a status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum StakeholderType {
    #[sea_orm(string_value = "customer")]
    Customer,

    #[sea_orm(string_value = "supplier")]
    Supplier,

    #[sea_orm(string_value = "driver")]
    Driver,

    #[sea_orm(string_value = "admin")]
    Admin,
}

impl fmt::Display for StakeholderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StakeholderType::Customer => write!(f, "customer"),
            StakeholderType::Supplier => write!(f, "supplier"),
            StakeholderType::Driver => write!(f, "driver"),
            StakeholderType::Admin => write!(f, "admin"),
        }
    }
}

/// Approval state of a status update.
///
/// Rows with `requires_approval = false` stay `Pending` forever; the gate
/// rejects decisions on them, so `Pending` on such a row never means
/// "awaiting review".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,

    #[sea_orm(string_value = "Approved")]
    Approved,

    #[sea_orm(string_value = "Rejected")]
    Rejected,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "Pending"),
            ApprovalStatus::Approved => write!(f, "Approved"),
            ApprovalStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

/// Status update entity model: an audit row describing a requested or applied
/// status transition on an order and/or shipment.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "status_updates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: Option<i64>,
    pub shipment_id: Option<i64>,
    pub stakeholder_type: StakeholderType,
    pub stakeholder_id: i64,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub update_reason: Option<String>,
    pub customer_notes: Option<String>,
    pub internal_notes: Option<String>,
    pub is_cancellation_request: bool,
    pub cancellation_reason: Option<String>,
    pub requires_approval: bool,
    pub approval_status: ApprovalStatus,
    pub approved_by: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
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
        belongs_to = "super::shipment::Entity",
        from = "Column::ShipmentId",
        to = "super::shipment::Column::Id"
    )]
    Shipment,
    #[sea_orm(
        belongs_to = "super::admin::Entity",
        from = "Column::ApprovedBy",
        to = "super::admin::Column::Id"
    )]
    ApprovedByAdmin,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipment.def()
    }
}

impl Related<super::admin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApprovedByAdmin.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
