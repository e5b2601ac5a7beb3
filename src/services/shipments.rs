use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use slog::Logger;
use tracing::{instrument, warn};

use crate::db::DbPool;
use crate::entities::shipment::{self, DEFAULT_SHIPMENT_STATUS};
use crate::entities::vehicle::VehicleStatus;
use crate::entities::{driver, order, vehicle};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Generates a tracking number: `TRK-<unix millis>-<0..999>`.
///
/// Uniqueness is enforced by the database; a collision inside the same
/// millisecond surfaces as an insert error rather than being retried.
pub fn generate_tracking_number() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = rand::thread_rng().gen_range(0..1000);
    format!("TRK-{}-{}", millis, suffix)
}

/// Fields accepted when recording a shipment directly.
#[derive(Debug, Clone)]
pub struct NewShipment {
    pub order_id: i64,
    pub vehicle_id: Option<i64>,
    pub driver_id: Option<i64>,
    pub shipment_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub tracking_number: Option<String>,
}

/// Request for the auto-assignment flow.
#[derive(Debug, Clone)]
pub struct AutoAssignShipment {
    pub order_id: i64,
    pub delivery_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

/// Result of a successful auto-assignment.
#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    pub shipment: shipment::Model,
    pub vehicle: vehicle::Model,
    pub driver: Option<driver::Model>,
}

/// Partial update to a shipment. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ShipmentChanges {
    pub vehicle_id: Option<Option<i64>>,
    pub driver_id: Option<Option<i64>>,
    pub status: Option<String>,
    pub delivery_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone)]
pub struct ShipmentFilter {
    pub status: Option<String>,
    pub order_id: Option<i64>,
    pub page: u64,
    pub per_page: u64,
}

/// Service for shipments, including the vehicle/driver assignment flow.
pub struct ShipmentService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    logger: Logger,
}

impl ShipmentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, logger: Logger) -> Self {
        Self {
            db_pool,
            event_sender,
            logger,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_shipment(
        &self,
        input: NewShipment,
    ) -> Result<shipment::Model, ServiceError> {
        let db = &*self.db_pool;

        let order_exists = order::Entity::find_by_id(input.order_id)
            .one(db)
            .await?
            .is_some();
        if !order_exists {
            return Err(ServiceError::ValidationError(format!(
                "Order {} does not exist",
                input.order_id
            )));
        }
        if let Some(vehicle_id) = input.vehicle_id {
            let exists = vehicle::Entity::find_by_id(vehicle_id).one(db).await?.is_some();
            if !exists {
                return Err(ServiceError::ValidationError(format!(
                    "Vehicle {} does not exist",
                    vehicle_id
                )));
            }
        }
        if let Some(driver_id) = input.driver_id {
            let exists = driver::Entity::find_by_id(driver_id).one(db).await?.is_some();
            if !exists {
                return Err(ServiceError::ValidationError(format!(
                    "Driver {} does not exist",
                    driver_id
                )));
            }
        }

        let now = Utc::now();
        let created = shipment::ActiveModel {
            order_id: Set(input.order_id),
            vehicle_id: Set(input.vehicle_id),
            driver_id: Set(input.driver_id),
            shipment_date: Set(input.shipment_date.unwrap_or(now)),
            delivery_date: Set(input.delivery_date),
            status: Set(input
                .status
                .unwrap_or_else(|| DEFAULT_SHIPMENT_STATUS.to_string())),
            tracking_number: Set(input
                .tracking_number
                .unwrap_or_else(generate_tracking_number)),
            created_at: Set(now),
            updated_at: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;

        if let Err(e) = self
            .event_sender
            .send(Event::ShipmentCreated(created.id))
            .await
        {
            warn!(shipment_id = created.id, error = %e, "failed to publish shipment created event");
        }

        Ok(created)
    }

    /// Creates a shipment for an order and assigns fleet resources in a
    /// single transaction.
    ///
    /// Vehicle selection: the available vehicle with the largest capacity.
    /// Driver selection: the first driver (by id) who is either unassigned
    /// or already bound to the selected vehicle; finding none is not an
    /// error, the shipment just goes out without a driver.
    #[instrument(skip(self))]
    pub async fn create_with_auto_assignment(
        &self,
        input: AutoAssignShipment,
    ) -> Result<AssignmentOutcome, ServiceError> {
        let txn = self.db_pool.begin().await?;

        let order = order::Entity::find_by_id(input.order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", input.order_id))?;

        let available = vehicle::Entity::find()
            .filter(vehicle::Column::Status.eq(VehicleStatus::Available))
            .order_by_desc(vehicle::Column::Capacity)
            .all(&txn)
            .await?;

        let selected_vehicle = match available.first() {
            Some(v) => v.clone(),
            None => {
                return Err(ServiceError::NoAvailableVehicles(
                    "No available vehicles found".to_string(),
                ));
            }
        };

        let available_ids: Vec<i64> = available.iter().map(|v| v.id).collect();
        let candidates = driver::Entity::find()
            .filter(
                Condition::any()
                    .add(driver::Column::AssignedVehicleId.is_null())
                    .add(driver::Column::AssignedVehicleId.is_in(available_ids)),
            )
            .order_by_asc(driver::Column::Id)
            .all(&txn)
            .await?;
        let selected_driver = candidates.into_iter().find(|d| {
            d.assigned_vehicle_id == Some(selected_vehicle.id) || d.assigned_vehicle_id.is_none()
        });

        let now = Utc::now();
        let shipment = shipment::ActiveModel {
            order_id: Set(order.id),
            vehicle_id: Set(Some(selected_vehicle.id)),
            driver_id: Set(selected_driver.as_ref().map(|d| d.id)),
            shipment_date: Set(now),
            delivery_date: Set(input.delivery_date),
            status: Set(input
                .status
                .unwrap_or_else(|| DEFAULT_SHIPMENT_STATUS.to_string())),
            tracking_number: Set(generate_tracking_number()),
            created_at: Set(now),
            updated_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut vehicle_active: vehicle::ActiveModel = selected_vehicle.into();
        vehicle_active.status = Set(VehicleStatus::InUse);
        let assigned_vehicle = vehicle_active.update(&txn).await?;

        let assigned_driver = match selected_driver {
            Some(d) => {
                let mut driver_active: driver::ActiveModel = d.into();
                driver_active.assigned_vehicle_id = Set(Some(assigned_vehicle.id));
                Some(driver_active.update(&txn).await?)
            }
            None => None,
        };

        txn.commit().await?;

        slog::info!(self.logger, "shipment auto-assigned";
            "shipment_id" => shipment.id,
            "order_id" => shipment.order_id,
            "vehicle_id" => assigned_vehicle.id,
            "driver_id" => assigned_driver.as_ref().map(|d| d.id),
            "tracking_number" => &shipment.tracking_number,
        );

        if let Err(e) = self
            .event_sender
            .send(Event::ShipmentAutoAssigned {
                shipment_id: shipment.id,
                vehicle_id: assigned_vehicle.id,
                driver_id: assigned_driver.as_ref().map(|d| d.id),
            })
            .await
        {
            warn!(shipment_id = shipment.id, error = %e, "failed to publish assignment event");
        }

        Ok(AssignmentOutcome {
            shipment,
            vehicle: assigned_vehicle,
            driver: assigned_driver,
        })
    }

    pub async fn get_shipment(&self, id: i64) -> Result<shipment::Model, ServiceError> {
        shipment::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Shipment", id))
    }

    pub async fn list_shipments(
        &self,
        filter: ShipmentFilter,
    ) -> Result<(Vec<shipment::Model>, u64), ServiceError> {
        let mut query = shipment::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(shipment::Column::Status.eq(status));
        }
        if let Some(order_id) = filter.order_id {
            query = query.filter(shipment::Column::OrderId.eq(order_id));
        }

        let paginator = query
            .order_by_desc(shipment::Column::CreatedAt)
            .paginate(&*self.db_pool, filter.per_page.max(1));
        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(filter.page.saturating_sub(1))
            .await?;

        Ok((items, total))
    }

    #[instrument(skip(self, changes))]
    pub async fn update_shipment(
        &self,
        id: i64,
        changes: ShipmentChanges,
    ) -> Result<shipment::Model, ServiceError> {
        let existing = self.get_shipment(id).await?;
        let old_status = existing.status.clone();

        let mut active: shipment::ActiveModel = existing.into();
        if let Some(vehicle_id) = changes.vehicle_id {
            active.vehicle_id = Set(vehicle_id);
        }
        if let Some(driver_id) = changes.driver_id {
            active.driver_id = Set(driver_id);
        }
        if let Some(status) = changes.status.clone() {
            active.status = Set(status);
        }
        if let Some(delivery_date) = changes.delivery_date {
            active.delivery_date = Set(delivery_date);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db_pool).await?;

        if let Some(new_status) = changes.status {
            if new_status != old_status {
                if let Err(e) = self
                    .event_sender
                    .send(Event::ShipmentStatusChanged {
                        shipment_id: updated.id,
                        old_status,
                        new_status,
                    })
                    .await
                {
                    warn!(shipment_id = updated.id, error = %e, "failed to publish shipment status event");
                }
            }
        } else if let Err(e) = self
            .event_sender
            .send(Event::ShipmentUpdated(updated.id))
            .await
        {
            warn!(shipment_id = updated.id, error = %e, "failed to publish shipment updated event");
        }

        Ok(updated)
    }

    /// Deletes a shipment and releases its fleet resources in one
    /// transaction: the vehicle goes back to Available and the driver's
    /// binding to that vehicle is cleared.
    #[instrument(skip(self))]
    pub async fn delete_shipment(&self, id: i64) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        let existing = shipment::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Shipment", id))?;

        let released_vehicle_id = existing.vehicle_id;
        if let Some(vehicle_id) = existing.vehicle_id {
            if let Some(v) = vehicle::Entity::find_by_id(vehicle_id).one(&txn).await? {
                let mut vehicle_active: vehicle::ActiveModel = v.into();
                vehicle_active.status = Set(VehicleStatus::Available);
                vehicle_active.update(&txn).await?;
            }

            if let Some(driver_id) = existing.driver_id {
                if let Some(d) = driver::Entity::find_by_id(driver_id).one(&txn).await? {
                    if d.assigned_vehicle_id == Some(vehicle_id) {
                        let mut driver_active: driver::ActiveModel = d.into();
                        driver_active.assigned_vehicle_id = Set(None);
                        driver_active.update(&txn).await?;
                    }
                }
            }
        }

        shipment::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        slog::info!(self.logger, "shipment deleted";
            "shipment_id" => id,
            "released_vehicle_id" => released_vehicle_id,
        );

        if let Err(e) = self
            .event_sender
            .send(Event::ShipmentDeleted {
                shipment_id: id,
                released_vehicle_id,
            })
            .await
        {
            warn!(shipment_id = id, error = %e, "failed to publish shipment deleted event");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_numbers_follow_the_expected_shape() {
        let tracking = generate_tracking_number();
        let mut parts = tracking.splitn(3, '-');

        assert_eq!(parts.next(), Some("TRK"));

        let millis: i64 = parts.next().unwrap().parse().unwrap();
        assert!(millis > 0);

        let suffix: u32 = parts.next().unwrap().parse().unwrap();
        assert!(suffix < 1000);
    }
}
