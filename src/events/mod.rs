use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted after successful mutations. Consumers are
/// notification/log sinks; emission failures never roll back the mutation
/// that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Catalog events
    SupplyCreated(i64),
    SupplyUpdated(i64),
    SupplyDeleted(i64),

    // Shipment ledger events
    ShipmentRecorded {
        shipment_id: i64,
        supply_id: i64,
        quantity: i32,
    },
    ShipmentReceived {
        shipment_id: i64,
        supply_id: i64,
        quantity: i32,
    },

    // Requisition workflow events
    RequisitionSubmitted {
        requisition_id: i64,
        user_id: Uuid,
        item_count: usize,
    },
    RequisitionApproved {
        requisition_id: i64,
        decided_by: Uuid,
    },
    RequisitionRejected {
        requisition_id: i64,
        decided_by: Uuid,
    },
    RequisitionArchived(i64),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Fire-and-forget emission; a full or closed channel is logged and
    /// otherwise ignored so mutations never fail on the event path.
    pub async fn emit(&self, event: Event) {
        if let Err(err) = self.send(event).await {
            warn!("Dropping event: {}", err);
        }
    }
}

/// Background task draining the event channel into the log.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::RequisitionApproved {
                requisition_id,
                decided_by,
            } => info!(
                requisition_id,
                %decided_by,
                "requisition approved and stock deducted"
            ),
            Event::RequisitionRejected {
                requisition_id,
                decided_by,
            } => info!(requisition_id, %decided_by, "requisition rejected"),
            Event::ShipmentReceived {
                shipment_id,
                supply_id,
                quantity,
            } => info!(
                shipment_id,
                supply_id, quantity, "incoming shipment added to inventory"
            ),
            other => info!(event = ?other, "domain event"),
        }
    }
    info!("Event channel closed; event processor exiting");
}
