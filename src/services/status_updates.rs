use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use slog::Logger;
use tracing::{instrument, warn};

use crate::db::DbPool;
use crate::entities::status_update::{self, ApprovalStatus, StakeholderType};
use crate::entities::{admin, customer, driver, order, shipment, supplier};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Status recorded on cancellation requests.
pub const CANCELLATION_REQUESTED_STATUS: &str = "Cancellation Requested";
const CANCELLATION_REASON_NOTE: &str = "Customer requested cancellation";

/// Fields accepted when recording a status update.
#[derive(Debug, Clone)]
pub struct NewStatusUpdate {
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
}

/// Fields accepted for a customer cancellation request.
#[derive(Debug, Clone)]
pub struct CancellationRequest {
    pub order_id: Option<i64>,
    pub shipment_id: Option<i64>,
    pub customer_id: i64,
    pub cancellation_reason: String,
    pub customer_notes: Option<String>,
}

/// An approve/reject decision on a pending status update.
#[derive(Debug, Clone)]
pub struct ApprovalDecision {
    pub is_approved: bool,
    pub admin_id: i64,
}

/// Service for the status update and approval workflow.
pub struct StatusUpdateService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    logger: Logger,
}

impl StatusUpdateService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, logger: Logger) -> Self {
        Self {
            db_pool,
            event_sender,
            logger,
        }
    }

    async fn ensure_stakeholder_exists<C: ConnectionTrait>(
        conn: &C,
        stakeholder_type: StakeholderType,
        stakeholder_id: i64,
    ) -> Result<(), ServiceError> {
        let exists = match stakeholder_type {
            StakeholderType::Customer => customer::Entity::find_by_id(stakeholder_id)
                .one(conn)
                .await?
                .is_some(),
            StakeholderType::Supplier => supplier::Entity::find_by_id(stakeholder_id)
                .one(conn)
                .await?
                .is_some(),
            StakeholderType::Driver => driver::Entity::find_by_id(stakeholder_id)
                .one(conn)
                .await?
                .is_some(),
            StakeholderType::Admin => admin::Entity::find_by_id(stakeholder_id)
                .one(conn)
                .await?
                .is_some(),
        };

        if exists {
            Ok(())
        } else {
            Err(ServiceError::ValidationError(format!(
                "{} {} does not exist",
                stakeholder_type, stakeholder_id
            )))
        }
    }

    /// Applies `new_status` to the update's order and/or shipment. Targets
    /// that disappeared since the update was recorded are skipped.
    async fn apply_status<C: ConnectionTrait>(
        conn: &C,
        order_id: Option<i64>,
        shipment_id: Option<i64>,
        new_status: &str,
    ) -> Result<(), ServiceError> {
        if let Some(order_id) = order_id {
            if let Some(o) = order::Entity::find_by_id(order_id).one(conn).await? {
                let mut active: order::ActiveModel = o.into();
                active.status = Set(new_status.to_string());
                active.updated_at = Set(Some(Utc::now()));
                active.update(conn).await?;
            }
        }
        if let Some(shipment_id) = shipment_id {
            if let Some(s) = shipment::Entity::find_by_id(shipment_id).one(conn).await? {
                let mut active: shipment::ActiveModel = s.into();
                active.status = Set(new_status.to_string());
                active.updated_at = Set(Some(Utc::now()));
                active.update(conn).await?;
            }
        }
        Ok(())
    }

    /// Records a status update. When the update does not require approval
    /// the new status is applied to the named order/shipment in the same
    /// transaction; otherwise the row waits in the approval queue.
    #[instrument(skip(self, input))]
    pub async fn create_status_update(
        &self,
        input: NewStatusUpdate,
    ) -> Result<status_update::Model, ServiceError> {
        let txn = self.db_pool.begin().await?;

        Self::ensure_stakeholder_exists(&txn, input.stakeholder_type, input.stakeholder_id)
            .await?;

        if let Some(order_id) = input.order_id {
            let exists = order::Entity::find_by_id(order_id).one(&txn).await?.is_some();
            if !exists {
                return Err(ServiceError::ValidationError(format!(
                    "Order {} does not exist",
                    order_id
                )));
            }
        }
        if let Some(shipment_id) = input.shipment_id {
            let exists = shipment::Entity::find_by_id(shipment_id)
                .one(&txn)
                .await?
                .is_some();
            if !exists {
                return Err(ServiceError::ValidationError(format!(
                    "Shipment {} does not exist",
                    shipment_id
                )));
            }
        }

        let created = status_update::ActiveModel {
            order_id: Set(input.order_id),
            shipment_id: Set(input.shipment_id),
            stakeholder_type: Set(input.stakeholder_type),
            stakeholder_id: Set(input.stakeholder_id),
            previous_status: Set(input.previous_status),
            new_status: Set(input.new_status.clone()),
            update_reason: Set(input.update_reason),
            customer_notes: Set(input.customer_notes),
            internal_notes: Set(input.internal_notes),
            is_cancellation_request: Set(input.is_cancellation_request),
            cancellation_reason: Set(input.cancellation_reason),
            requires_approval: Set(input.requires_approval),
            approval_status: Set(ApprovalStatus::Pending),
            approved_by: Set(None),
            approved_at: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if !created.requires_approval {
            Self::apply_status(&txn, created.order_id, created.shipment_id, &created.new_status)
                .await?;
        }

        txn.commit().await?;

        slog::info!(self.logger, "status update recorded";
            "status_update_id" => created.id,
            "order_id" => created.order_id,
            "shipment_id" => created.shipment_id,
            "requires_approval" => created.requires_approval,
        );

        if let Err(e) = self
            .event_sender
            .send(Event::StatusUpdateCreated(created.id))
            .await
        {
            warn!(status_update_id = created.id, error = %e, "failed to publish status update event");
        }

        Ok(created)
    }

    /// Decides a pending status update. Approval applies the recorded
    /// status to the order/shipment; rejection only marks the row.
    #[instrument(skip(self))]
    pub async fn decide_status_update(
        &self,
        id: i64,
        decision: ApprovalDecision,
    ) -> Result<status_update::Model, ServiceError> {
        let txn = self.db_pool.begin().await?;

        let existing = status_update::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Status update", id))?;

        if !existing.requires_approval {
            return Err(ServiceError::ApprovalNotRequired(
                "This status update does not require approval".to_string(),
            ));
        }
        if existing.approval_status != ApprovalStatus::Pending {
            return Err(ServiceError::AlreadyDecided(
                "This status update has already been processed".to_string(),
            ));
        }

        let admin_exists = admin::Entity::find_by_id(decision.admin_id)
            .one(&txn)
            .await?
            .is_some();
        if !admin_exists {
            return Err(ServiceError::ValidationError(format!(
                "Admin {} does not exist",
                decision.admin_id
            )));
        }

        let order_id = existing.order_id;
        let shipment_id = existing.shipment_id;
        let new_status = existing.new_status.clone();

        let mut active: status_update::ActiveModel = existing.into();
        active.approval_status = Set(if decision.is_approved {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Rejected
        });
        active.approved_by = Set(Some(decision.admin_id));
        active.approved_at = Set(Some(Utc::now()));
        let decided = active.update(&txn).await?;

        if decision.is_approved {
            Self::apply_status(&txn, order_id, shipment_id, &new_status).await?;
        }

        txn.commit().await?;

        slog::info!(self.logger, "status update decided";
            "status_update_id" => decided.id,
            "approved" => decision.is_approved,
            "admin_id" => decision.admin_id,
        );

        if let Err(e) = self
            .event_sender
            .send(Event::StatusUpdateDecided {
                status_update_id: decided.id,
                approved: decision.is_approved,
            })
            .await
        {
            warn!(status_update_id = decided.id, error = %e, "failed to publish decision event");
        }

        Ok(decided)
    }

    /// Records a customer cancellation request: always approval-gated, with
    /// the target's live status captured as the previous status.
    #[instrument(skip(self, input))]
    pub async fn request_cancellation(
        &self,
        input: CancellationRequest,
    ) -> Result<status_update::Model, ServiceError> {
        if input.order_id.is_none() && input.shipment_id.is_none() {
            return Err(ServiceError::ValidationError(
                "A cancellation request must name an order_id or a shipment_id".to_string(),
            ));
        }

        let txn = self.db_pool.begin().await?;

        Self::ensure_stakeholder_exists(&txn, StakeholderType::Customer, input.customer_id)
            .await?;

        let previous_status = if let Some(order_id) = input.order_id {
            order::Entity::find_by_id(order_id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::not_found("Order", order_id))?
                .status
        } else if let Some(shipment_id) = input.shipment_id {
            shipment::Entity::find_by_id(shipment_id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::not_found("Shipment", shipment_id))?
                .status
        } else {
            unreachable!("target presence checked above")
        };

        let created = status_update::ActiveModel {
            order_id: Set(input.order_id),
            shipment_id: Set(input.shipment_id),
            stakeholder_type: Set(StakeholderType::Customer),
            stakeholder_id: Set(input.customer_id),
            previous_status: Set(Some(previous_status)),
            new_status: Set(CANCELLATION_REQUESTED_STATUS.to_string()),
            update_reason: Set(Some(CANCELLATION_REASON_NOTE.to_string())),
            customer_notes: Set(input.customer_notes),
            internal_notes: Set(None),
            is_cancellation_request: Set(true),
            cancellation_reason: Set(Some(input.cancellation_reason)),
            requires_approval: Set(true),
            approval_status: Set(ApprovalStatus::Pending),
            approved_by: Set(None),
            approved_at: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        slog::info!(self.logger, "cancellation requested";
            "status_update_id" => created.id,
            "order_id" => created.order_id,
            "shipment_id" => created.shipment_id,
        );

        if let Err(e) = self
            .event_sender
            .send(Event::CancellationRequested {
                status_update_id: created.id,
                order_id: created.order_id,
                shipment_id: created.shipment_id,
            })
            .await
        {
            warn!(status_update_id = created.id, error = %e, "failed to publish cancellation event");
        }

        Ok(created)
    }

    pub async fn get_status_update(&self, id: i64) -> Result<status_update::Model, ServiceError> {
        status_update::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Status update", id))
    }

    /// All status updates, most recent first.
    pub async fn list_status_updates(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<status_update::Model>, u64), ServiceError> {
        let paginator = status_update::Entity::find()
            .order_by_desc(status_update::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    pub async fn list_for_order(
        &self,
        order_id: i64,
    ) -> Result<Vec<status_update::Model>, ServiceError> {
        let items = status_update::Entity::find()
            .filter(status_update::Column::OrderId.eq(order_id))
            .order_by_desc(status_update::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        Ok(items)
    }

    pub async fn list_for_shipment(
        &self,
        shipment_id: i64,
    ) -> Result<Vec<status_update::Model>, ServiceError> {
        let items = status_update::Entity::find()
            .filter(status_update::Column::ShipmentId.eq(shipment_id))
            .order_by_desc(status_update::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        Ok(items)
    }

    /// The approval queue: gated, undecided updates, oldest first.
    pub async fn pending_approvals(&self) -> Result<Vec<status_update::Model>, ServiceError> {
        let items = status_update::Entity::find()
            .filter(status_update::Column::RequiresApproval.eq(true))
            .filter(status_update::Column::ApprovalStatus.eq(ApprovalStatus::Pending))
            .order_by_asc(status_update::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        Ok(items)
    }
}
