use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{instrument, warn};

use crate::db::DbPool;
use crate::entities::{customer, order};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Status stamped on orders created without an explicit one.
pub const DEFAULT_ORDER_STATUS: &str = "Pending";

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: i64,
    pub status: Option<String>,
    pub order_date: Option<DateTime<Utc>>,
    pub total_amount: Option<Decimal>,
}

/// Partial update to an order. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub status: Option<String>,
    pub total_amount: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct OrderFilter {
    pub status: Option<String>,
    pub customer_id: Option<i64>,
    pub page: u64,
    pub per_page: u64,
}

/// Service for orders.
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_order(&self, input: NewOrder) -> Result<order::Model, ServiceError> {
        let customer_exists = customer::Entity::find_by_id(input.customer_id)
            .one(&*self.db_pool)
            .await?
            .is_some();
        if !customer_exists {
            return Err(ServiceError::ValidationError(format!(
                "Customer {} does not exist",
                input.customer_id
            )));
        }

        let now = Utc::now();
        let created = order::ActiveModel {
            customer_id: Set(input.customer_id),
            status: Set(input
                .status
                .unwrap_or_else(|| DEFAULT_ORDER_STATUS.to_string())),
            order_date: Set(input.order_date.unwrap_or(now)),
            total_amount: Set(input.total_amount.unwrap_or_default()),
            created_at: Set(now),
            updated_at: Set(None),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        if let Err(e) = self.event_sender.send(Event::OrderCreated(created.id)).await {
            warn!(order_id = created.id, error = %e, "failed to publish order created event");
        }

        Ok(created)
    }

    pub async fn get_order(&self, id: i64) -> Result<order::Model, ServiceError> {
        order::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", id))
    }

    pub async fn list_orders(
        &self,
        filter: OrderFilter,
    ) -> Result<(Vec<order::Model>, u64), ServiceError> {
        let mut query = order::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(order::Column::Status.eq(status));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(order::Column::CustomerId.eq(customer_id));
        }

        let paginator = query
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db_pool, filter.per_page.max(1));
        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(filter.page.saturating_sub(1))
            .await?;

        Ok((items, total))
    }

    #[instrument(skip(self, changes))]
    pub async fn update_order(
        &self,
        id: i64,
        changes: OrderChanges,
    ) -> Result<order::Model, ServiceError> {
        let existing = self.get_order(id).await?;
        let old_status = existing.status.clone();

        let mut active: order::ActiveModel = existing.into();
        if let Some(status) = changes.status.clone() {
            active.status = Set(status);
        }
        if let Some(total_amount) = changes.total_amount {
            active.total_amount = Set(total_amount);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db_pool).await?;

        if let Some(new_status) = changes.status {
            if new_status != old_status {
                if let Err(e) = self
                    .event_sender
                    .send(Event::OrderStatusChanged {
                        order_id: updated.id,
                        old_status,
                        new_status,
                    })
                    .await
                {
                    warn!(order_id = updated.id, error = %e, "failed to publish order status event");
                }
            }
        } else if let Err(e) = self.event_sender.send(Event::OrderUpdated(updated.id)).await {
            warn!(order_id = updated.id, error = %e, "failed to publish order updated event");
        }

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: i64) -> Result<(), ServiceError> {
        let existing = self.get_order(id).await?;
        existing.delete(&*self.db_pool).await?;

        if let Err(e) = self.event_sender.send(Event::OrderDeleted(id)).await {
            warn!(order_id = id, error = %e, "failed to publish order deleted event");
        }

        Ok(())
    }
}
