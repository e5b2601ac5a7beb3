use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{instrument, warn};

use crate::db::DbPool;
use crate::entities::vehicle::{self, VehicleStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Fields accepted when registering a vehicle.
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub vehicle_number: String,
    pub vehicle_type: String,
    pub capacity: i32,
    pub status: VehicleStatus,
}

/// Partial update to a vehicle. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct VehicleChanges {
    pub vehicle_number: Option<String>,
    pub vehicle_type: Option<String>,
    pub capacity: Option<i32>,
    pub status: Option<VehicleStatus>,
}

#[derive(Debug, Clone)]
pub struct VehicleFilter {
    pub status: Option<VehicleStatus>,
    pub page: u64,
    pub per_page: u64,
}

/// Service for the fleet of vehicles.
pub struct FleetService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl FleetService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_vehicle(&self, input: NewVehicle) -> Result<vehicle::Model, ServiceError> {
        let created = vehicle::ActiveModel {
            vehicle_number: Set(input.vehicle_number),
            vehicle_type: Set(input.vehicle_type),
            capacity: Set(input.capacity),
            status: Set(input.status),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        if let Err(e) = self.event_sender.send(Event::VehicleCreated(created.id)).await {
            warn!(vehicle_id = created.id, error = %e, "failed to publish vehicle created event");
        }

        Ok(created)
    }

    pub async fn get_vehicle(&self, id: i64) -> Result<vehicle::Model, ServiceError> {
        vehicle::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Vehicle", id))
    }

    pub async fn list_vehicles(
        &self,
        filter: VehicleFilter,
    ) -> Result<(Vec<vehicle::Model>, u64), ServiceError> {
        let mut query = vehicle::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(vehicle::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_desc(vehicle::Column::CreatedAt)
            .paginate(&*self.db_pool, filter.per_page.max(1));
        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(filter.page.saturating_sub(1))
            .await?;

        Ok((items, total))
    }

    #[instrument(skip(self, changes))]
    pub async fn update_vehicle(
        &self,
        id: i64,
        changes: VehicleChanges,
    ) -> Result<vehicle::Model, ServiceError> {
        let existing = self.get_vehicle(id).await?;

        let mut active: vehicle::ActiveModel = existing.into();
        if let Some(vehicle_number) = changes.vehicle_number {
            active.vehicle_number = Set(vehicle_number);
        }
        if let Some(vehicle_type) = changes.vehicle_type {
            active.vehicle_type = Set(vehicle_type);
        }
        if let Some(capacity) = changes.capacity {
            active.capacity = Set(capacity);
        }
        if let Some(status) = changes.status {
            active.status = Set(status);
        }

        let updated = active.update(&*self.db_pool).await?;

        if let Err(e) = self.event_sender.send(Event::VehicleUpdated(updated.id)).await {
            warn!(vehicle_id = updated.id, error = %e, "failed to publish vehicle updated event");
        }

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_vehicle(&self, id: i64) -> Result<(), ServiceError> {
        let existing = self.get_vehicle(id).await?;
        existing.delete(&*self.db_pool).await?;

        if let Err(e) = self.event_sender.send(Event::VehicleDeleted(id)).await {
            warn!(vehicle_id = id, error = %e, "failed to publish vehicle deleted event");
        }

        Ok(())
    }

    /// Vehicles ready for assignment, largest capacity first. The same
    /// ordering drives the auto-assignment selector.
    pub async fn available_vehicles(&self) -> Result<Vec<vehicle::Model>, ServiceError> {
        let vehicles = vehicle::Entity::find()
            .filter(vehicle::Column::Status.eq(VehicleStatus::Available))
            .order_by_desc(vehicle::Column::Capacity)
            .all(&*self.db_pool)
            .await?;
        Ok(vehicles)
    }
}
