use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryOrder, Set};
use tracing::{instrument, warn};

use crate::db::DbPool;
use crate::entities::{driver, vehicle};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Debug, Clone)]
pub struct NewDriver {
    pub name: String,
    pub phone: String,
    pub license_number: String,
    pub assigned_vehicle_id: Option<i64>,
}

/// Partial update to a driver. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct DriverChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub assigned_vehicle_id: Option<Option<i64>>,
}

/// Service for drivers.
pub struct DriverService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl DriverService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn ensure_vehicle_exists(&self, vehicle_id: i64) -> Result<(), ServiceError> {
        let exists = vehicle::Entity::find_by_id(vehicle_id)
            .one(&*self.db_pool)
            .await?
            .is_some();
        if exists {
            Ok(())
        } else {
            Err(ServiceError::ValidationError(format!(
                "Vehicle {} does not exist",
                vehicle_id
            )))
        }
    }

    #[instrument(skip(self))]
    pub async fn create_driver(&self, input: NewDriver) -> Result<driver::Model, ServiceError> {
        if let Some(vehicle_id) = input.assigned_vehicle_id {
            self.ensure_vehicle_exists(vehicle_id).await?;
        }

        let created = driver::ActiveModel {
            name: Set(input.name),
            phone: Set(input.phone),
            license_number: Set(input.license_number),
            assigned_vehicle_id: Set(input.assigned_vehicle_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        if let Err(e) = self.event_sender.send(Event::DriverCreated(created.id)).await {
            warn!(driver_id = created.id, error = %e, "failed to publish driver created event");
        }

        Ok(created)
    }

    pub async fn get_driver(&self, id: i64) -> Result<driver::Model, ServiceError> {
        driver::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Driver", id))
    }

    pub async fn list_drivers(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<driver::Model>, u64), ServiceError> {
        let paginator = driver::Entity::find()
            .order_by_asc(driver::Column::Name)
            .paginate(&*self.db_pool, per_page.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    #[instrument(skip(self, changes))]
    pub async fn update_driver(
        &self,
        id: i64,
        changes: DriverChanges,
    ) -> Result<driver::Model, ServiceError> {
        let existing = self.get_driver(id).await?;

        if let Some(Some(vehicle_id)) = changes.assigned_vehicle_id {
            self.ensure_vehicle_exists(vehicle_id).await?;
        }

        let mut active: driver::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(license_number) = changes.license_number {
            active.license_number = Set(license_number);
        }
        if let Some(assigned_vehicle_id) = changes.assigned_vehicle_id {
            active.assigned_vehicle_id = Set(assigned_vehicle_id);
        }

        let updated = active.update(&*self.db_pool).await?;

        if let Err(e) = self.event_sender.send(Event::DriverUpdated(updated.id)).await {
            warn!(driver_id = updated.id, error = %e, "failed to publish driver updated event");
        }

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_driver(&self, id: i64) -> Result<(), ServiceError> {
        let existing = self.get_driver(id).await?;
        existing.delete(&*self.db_pool).await?;

        if let Err(e) = self.event_sender.send(Event::DriverDeleted(id)).await {
            warn!(driver_id = id, error = %e, "failed to publish driver deleted event");
        }

        Ok(())
    }

    /// All drivers ordered by name; assignment filtering is left to the
    /// caller, matching how dispatch tooling consumes this list.
    pub async fn available_drivers(&self) -> Result<Vec<driver::Model>, ServiceError> {
        let drivers = driver::Entity::find()
            .order_by_asc(driver::Column::Name)
            .all(&*self.db_pool)
            .await?;
        Ok(drivers)
    }
}
