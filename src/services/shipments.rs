use crate::{
    auth::Actor,
    db::DbPool,
    entities::{
        incoming_shipment::{self, Entity as IncomingShipment, ShipmentStatus},
        supply::{self, Entity as Supply},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

/// Incoming-shipment ledger. Recording a shipment does not touch stock;
/// only the receipt does, exactly once per shipment.
#[derive(Clone)]
pub struct ShipmentService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

/// Shipments are entered in boxes; the unit quantity is derived from the
/// supply's packaging at record time.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RecordShipmentInput {
    pub supply_id: i64,
    #[validate(range(min = 1, message = "Boxes count must be greater than zero"))]
    pub boxes_count: i32,
    pub expected_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentView {
    pub shipment: incoming_shipment::Model,
    pub supply: supply::Model,
}

/// Receiving an already-received shipment is an informational no-op.
#[derive(Debug)]
pub enum ReceiveOutcome {
    Received {
        shipment: incoming_shipment::Model,
        supply: supply::Model,
    },
    AlreadyReceived(incoming_shipment::Model),
}

impl ShipmentService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Records a pending shipment. The stored quantity is in units:
    /// box-counted supplies take the boxes figure directly, unit-counted
    /// supplies multiply it out and therefore need a known pack size.
    pub async fn record(
        &self,
        actor: &Actor,
        input: RecordShipmentInput,
    ) -> Result<incoming_shipment::Model, ServiceError> {
        actor.require_staff()?;
        input.validate()?;

        let supply = Supply::find_by_id(input.supply_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Supply {} not found", input.supply_id))
            })?;

        let quantity = if supply.unit.counts_by_box() {
            input.boxes_count
        } else {
            if supply.items_per_box <= 0 {
                return Err(ServiceError::ValidationError(format!(
                    "{} has no items-per-box set; update the supply before recording shipments",
                    supply.name
                )));
            }
            input.boxes_count * supply.items_per_box
        };

        let model = incoming_shipment::ActiveModel {
            supply_id: Set(supply.id),
            quantity: Set(quantity),
            expected_date: Set(input.expected_date),
            notes: Set(input.notes.trim().to_string()),
            status: Set(ShipmentStatus::Pending),
            created_at: Set(Utc::now()),
            received_at: Set(None),
            ..Default::default()
        };
        let created = model.insert(self.db.as_ref()).await?;

        info!(
            shipment_id = created.id,
            supply_id = supply.id,
            quantity,
            "incoming shipment recorded"
        );
        self.event_sender
            .emit(Event::ShipmentRecorded {
                shipment_id: created.id,
                supply_id: supply.id,
                quantity,
            })
            .await;
        Ok(created)
    }

    /// The full ledger, newest first, with supply snapshots.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<ShipmentView>, ServiceError> {
        actor.require_staff()?;
        let shipments = IncomingShipment::find()
            .order_by_desc(incoming_shipment::Column::CreatedAt)
            .order_by_desc(incoming_shipment::Column::Id)
            .all(self.db.as_ref())
            .await?;

        let supply_ids: Vec<i64> = shipments.iter().map(|s| s.supply_id).collect();
        let supplies: HashMap<i64, supply::Model> = Supply::find()
            .filter(supply::Column::Id.is_in(supply_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(shipments
            .into_iter()
            .filter_map(|shipment| {
                supplies
                    .get(&shipment.supply_id)
                    .cloned()
                    .map(|supply| ShipmentView { shipment, supply })
            })
            .collect())
    }

    /// Marks a pending shipment received and folds its quantity into the
    /// supply's stock, all inside one transaction. The status flip is
    /// guarded and the stock increase is a relative UPDATE, so concurrent
    /// receives can neither fold the same shipment in twice nor overwrite
    /// each other's increments.
    pub async fn receive(&self, actor: &Actor, id: i64) -> Result<ReceiveOutcome, ServiceError> {
        actor.require_staff()?;

        let outcome = self
            .db
            .transaction::<_, ReceiveOutcome, ServiceError>(move |txn| {
                Box::pin(async move {
                    let shipment = find_shipment(txn, id).await?;
                    if shipment.status == ShipmentStatus::Received {
                        return Ok(ReceiveOutcome::AlreadyReceived(shipment));
                    }

                    let claimed = IncomingShipment::update_many()
                        .set(incoming_shipment::ActiveModel {
                            status: Set(ShipmentStatus::Received),
                            received_at: Set(Some(Utc::now())),
                            ..Default::default()
                        })
                        .filter(incoming_shipment::Column::Id.eq(id))
                        .filter(incoming_shipment::Column::Status.eq(ShipmentStatus::Pending))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if claimed.rows_affected != 1 {
                        return Ok(ReceiveOutcome::AlreadyReceived(
                            find_shipment(txn, id).await?,
                        ));
                    }

                    let supply = Supply::find_by_id(shipment.supply_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Supply {} not found",
                                shipment.supply_id
                            ))
                        })?;
                    restock(txn, &supply, shipment.quantity).await?;

                    let supply = Supply::find_by_id(supply.id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Supply {} not found", supply.id))
                        })?;
                    let shipment = find_shipment(txn, id).await?;
                    Ok(ReceiveOutcome::Received { shipment, supply })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        if let ReceiveOutcome::Received { shipment, supply } = &outcome {
            info!(
                shipment_id = shipment.id,
                supply_id = supply.id,
                quantity = shipment.quantity,
                "shipment received into stock"
            );
            self.event_sender
                .emit(Event::ShipmentReceived {
                    shipment_id: shipment.id,
                    supply_id: supply.id,
                    quantity: shipment.quantity,
                })
                .await;
        }
        Ok(outcome)
    }
}

async fn find_shipment<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<incoming_shipment::Model, ServiceError> {
    IncomingShipment::find_by_id(id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Shipment {} not found", id)))
}

/// Folds `quantity` received units into a supply as relative column
/// additions. Box-counted supplies keep `quantity == boxes_count`;
/// unit-counted supplies gain whole boxes only for full multiples of the
/// pack size.
async fn restock<C: ConnectionTrait>(
    txn: &C,
    supply: &supply::Model,
    quantity: i32,
) -> Result<(), ServiceError> {
    let update = if supply.unit.counts_by_box() {
        Supply::update_many()
            .col_expr(
                supply::Column::BoxesCount,
                Expr::col(supply::Column::BoxesCount).add(quantity),
            )
            .col_expr(
                supply::Column::Quantity,
                Expr::col(supply::Column::BoxesCount).add(quantity),
            )
    } else {
        let per_box = supply.items_per_box.max(0);
        let added_boxes = if per_box > 0 { quantity / per_box } else { 0 };
        Supply::update_many()
            .col_expr(
                supply::Column::BoxesCount,
                Expr::col(supply::Column::BoxesCount).add(added_boxes),
            )
            .col_expr(
                supply::Column::Quantity,
                Expr::col(supply::Column::Quantity).add(quantity),
            )
    };
    let result = update
        .filter(supply::Column::Id.eq(supply.id))
        .exec(txn)
        .await
        .map_err(ServiceError::db_error)?;
    if result.rows_affected != 1 {
        return Err(ServiceError::NotFound(format!(
            "Supply {} not found",
            supply.id
        )));
    }
    Ok(())
}
