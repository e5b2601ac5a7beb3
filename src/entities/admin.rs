use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Admin entity model. Admins decide pending status updates.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::status_update::Entity")]
    StatusUpdates,
}

impl Related<super::status_update::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusUpdates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
