//! Domain events.
//!
//! Services emit events after their transaction commits; delivery is
//! best-effort and failures are logged, never propagated to the caller.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    VehicleCreated(i64),
    VehicleUpdated(i64),
    VehicleDeleted(i64),

    DriverCreated(i64),
    DriverUpdated(i64),
    DriverDeleted(i64),

    OrderCreated(i64),
    OrderUpdated(i64),
    OrderDeleted(i64),
    OrderStatusChanged {
        order_id: i64,
        old_status: String,
        new_status: String,
    },

    ShipmentCreated(i64),
    ShipmentAutoAssigned {
        shipment_id: i64,
        vehicle_id: i64,
        driver_id: Option<i64>,
    },
    ShipmentUpdated(i64),
    ShipmentDeleted {
        shipment_id: i64,
        released_vehicle_id: Option<i64>,
    },
    ShipmentStatusChanged {
        shipment_id: i64,
        old_status: String,
        new_status: String,
    },

    StatusUpdateCreated(i64),
    StatusUpdateDecided {
        status_update_id: i64,
        approved: bool,
    },
    CancellationRequested {
        status_update_id: i64,
        order_id: Option<i64>,
        shipment_id: Option<i64>,
    },
}

/// Cloneable handle for publishing events onto the process-wide channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Consumes events from the channel until all senders are dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        handle_event(&event).await;
    }
    info!("Event processor stopped");
}

async fn handle_event(event: &Event) {
    match event {
        Event::ShipmentAutoAssigned {
            shipment_id,
            vehicle_id,
            driver_id,
        } => {
            info!(
                shipment_id,
                vehicle_id,
                driver_id = ?driver_id,
                "shipment auto-assigned"
            );
        }
        Event::OrderStatusChanged {
            order_id,
            old_status,
            new_status,
        } => {
            info!(order_id, %old_status, %new_status, "order status changed");
        }
        Event::ShipmentStatusChanged {
            shipment_id,
            old_status,
            new_status,
        } => {
            info!(shipment_id, %old_status, %new_status, "shipment status changed");
        }
        Event::StatusUpdateDecided {
            status_update_id,
            approved,
        } => {
            info!(status_update_id, approved, "status update decided");
        }
        Event::CancellationRequested {
            status_update_id,
            order_id,
            shipment_id,
        } => {
            info!(
                status_update_id,
                order_id = ?order_id,
                shipment_id = ?shipment_id,
                "cancellation requested"
            );
        }
        other => {
            debug!(event = ?other, "event processed");
        }
    }
}

/// Builds a channel with the given capacity and spawns the consumer task.
pub fn spawn_event_processor(capacity: usize) -> EventSender {
    let (tx, rx) = mpsc::channel(capacity);
    tokio::spawn(async move {
        process_events(rx).await;
    });
    EventSender::new(tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_flow_through_the_channel() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        sender.send(Event::OrderCreated(1)).await.unwrap();
        sender
            .send(Event::ShipmentAutoAssigned {
                shipment_id: 2,
                vehicle_id: 3,
                driver_id: None,
            })
            .await
            .unwrap();

        assert_eq!(rx.recv().await, Some(Event::OrderCreated(1)));
        assert_eq!(
            rx.recv().await,
            Some(Event::ShipmentAutoAssigned {
                shipment_id: 2,
                vehicle_id: 3,
                driver_id: None,
            })
        );
    }

    #[tokio::test]
    async fn send_fails_once_receiver_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let sender = EventSender::new(tx);
        assert!(sender.send(Event::OrderCreated(1)).await.is_err());
    }
}
