use crate::{
    auth::Actor,
    db::DbPool,
    entities::{
        cart_item::{self, Entity as CartItem},
        requisition::{self, Entity as Requisition, RequisitionStatus},
        requisition_item::{self, Entity as RequisitionItem},
        supply::{self, Entity as Supply, SupplyUnit},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// The requisition workflow: submission by any authenticated user, then a
/// staff decision. Approval deducts stock inside one transaction; rejection
/// and archival never touch stock.
#[derive(Clone)]
pub struct RequisitionService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

/// One requested line, passed as explicit typed input rather than reading
/// dynamically-named form fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequisitionLineInput {
    pub supply_id: i64,
    pub quantity: i32,
    pub price_per_unit: Option<Decimal>,
    pub needed_by: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitRequisitionInput {
    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub requester_name: String,
    #[validate(length(min = 1, max = 255, message = "ID is required"))]
    pub organization_name: String,
    #[validate(length(min = 1, max = 255, message = "Office section is required"))]
    pub department: String,
    #[serde(default)]
    pub notes: String,
    #[validate(length(min = 1, message = "Please select at least one supply"))]
    pub items: Vec<RequisitionLineInput>,
}

/// Result of a decision action. Acting on an already-decided requisition is
/// an informational no-op, not an error.
#[derive(Debug)]
pub enum DecisionOutcome {
    Applied(requisition::Model),
    AlreadyProcessed(requisition::Model),
}

#[derive(Debug)]
pub enum ArchiveOutcome {
    Archived(requisition::Model),
    AlreadyArchived(requisition::Model),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemView {
    pub id: i64,
    pub supply_id: i64,
    pub supply_name: String,
    pub size_spec: String,
    pub unit: SupplyUnit,
    pub quantity: i32,
    pub price_per_unit: Option<Decimal>,
    pub total_cost: Option<Decimal>,
    pub needed_by: Option<NaiveDate>,
    /// Live availability at render time; shortages surface before approval.
    pub available: i32,
    pub is_shortage: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequisitionView {
    pub requisition: requisition::Model,
    pub items: Vec<ItemView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequisitionBoard {
    pub pending: Vec<RequisitionView>,
    pub approved: Vec<RequisitionView>,
    pub rejected: Vec<RequisitionView>,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct StatusCounts {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserHistory {
    pub counts: StatusCounts,
    pub requests: Vec<RequisitionView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserGroup {
    pub user_id: Uuid,
    pub display_name: String,
    pub total_requests: usize,
    pub counts: StatusCounts,
    pub requests: Vec<RequisitionView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Receipt {
    pub requisition: requisition::Model,
    pub items: Vec<ItemView>,
    pub generated_at: DateTime<Utc>,
}

impl RequisitionService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Creates a pending requisition and its items atomically, then clears
    /// the submitter's cart. Any validation failure persists nothing.
    pub async fn submit(
        &self,
        actor: &Actor,
        mut input: SubmitRequisitionInput,
    ) -> Result<requisition::Model, ServiceError> {
        // Validate the trimmed values so whitespace-only fields fail the
        // required checks.
        input.requester_name = input.requester_name.trim().to_string();
        input.organization_name = input.organization_name.trim().to_string();
        input.department = input.department.trim().to_string();
        input.notes = input.notes.trim().to_string();
        input.validate()?;

        let supply_ids: Vec<i64> = input.items.iter().map(|l| l.supply_id).collect();
        let supplies: HashMap<i64, supply::Model> = Supply::find()
            .filter(supply::Column::Id.is_in(supply_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut invalid = Vec::new();
        let mut shortages = Vec::new();
        for line in &input.items {
            let Some(supply) = supplies.get(&line.supply_id) else {
                invalid.push(format!("Supply {} does not exist", line.supply_id));
                continue;
            };
            if line.quantity <= 0 {
                invalid.push(format!(
                    "Quantity for {} must be greater than zero",
                    supply.name
                ));
            } else if line.quantity > supply.available_units() {
                shortages.push(format!(
                    "{} (requested {}, available {})",
                    supply.name,
                    line.quantity,
                    supply.available_units()
                ));
            }
            if let Some(price) = line.price_per_unit {
                if price < Decimal::ZERO {
                    invalid.push(format!("Price for {} must be non-negative", supply.name));
                }
            }
        }
        if !invalid.is_empty() {
            return Err(ServiceError::ValidationError(invalid.join("; ")));
        }
        if !shortages.is_empty() {
            return Err(ServiceError::InsufficientStock(shortages.join("; ")));
        }

        let user_id = actor.id;
        let header = requisition::ActiveModel {
            user_id: Set(user_id),
            status: Set(RequisitionStatus::Pending),
            requested_at: Set(Utc::now()),
            requester_name: Set(input.requester_name.clone()),
            organization_name: Set(input.organization_name.clone()),
            department: Set(input.department.clone()),
            notes: Set(input.notes.clone()),
            decided_by: Set(None),
            decision_at: Set(None),
            is_archived: Set(false),
            ..Default::default()
        };
        let lines = input.items.clone();

        let created = self
            .db
            .transaction::<_, requisition::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let created = header.insert(txn).await.map_err(ServiceError::db_error)?;
                    let items: Vec<requisition_item::ActiveModel> = lines
                        .iter()
                        .map(|line| requisition_item::ActiveModel {
                            requisition_id: Set(created.id),
                            supply_id: Set(line.supply_id),
                            quantity: Set(line.quantity),
                            price_per_unit: Set(line.price_per_unit),
                            needed_by: Set(line.needed_by),
                            ..Default::default()
                        })
                        .collect();
                    RequisitionItem::insert_many(items)
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    // The submission consumes the staged selection.
                    CartItem::delete_many()
                        .filter(cart_item::Column::UserId.eq(user_id))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    Ok(created)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            requisition_id = created.id,
            %user_id,
            items = input.items.len(),
            "requisition submitted for approval"
        );
        self.event_sender
            .emit(Event::RequisitionSubmitted {
                requisition_id: created.id,
                user_id,
                item_count: input.items.len(),
            })
            .await;
        Ok(created)
    }

    /// Approves a pending requisition, deducting every item's stock inside
    /// one transaction. The availability check is all-or-nothing across the
    /// whole requisition: one short line aborts with no mutation. Both the
    /// status flip and the deducting UPDATEs are guarded, so a concurrent
    /// committer can neither decide the same requisition twice nor drive
    /// stock negative.
    pub async fn approve(&self, actor: &Actor, id: i64) -> Result<DecisionOutcome, ServiceError> {
        actor.require_staff()?;
        let decided_by = actor.id;

        let outcome = self
            .db
            .transaction::<_, DecisionOutcome, ServiceError>(move |txn| {
                Box::pin(async move {
                    let requisition = find_requisition(txn, id).await?;
                    if !requisition.is_pending() {
                        return Ok(DecisionOutcome::AlreadyProcessed(requisition));
                    }
                    if !claim_pending(txn, id, RequisitionStatus::Approved, decided_by).await? {
                        return Ok(DecisionOutcome::AlreadyProcessed(
                            find_requisition(txn, id).await?,
                        ));
                    }

                    let items = RequisitionItem::find()
                        .filter(requisition_item::Column::RequisitionId.eq(id))
                        .all(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    let supply_ids: Vec<i64> = items.iter().map(|i| i.supply_id).collect();
                    let supplies: HashMap<i64, supply::Model> = Supply::find()
                        .filter(supply::Column::Id.is_in(supply_ids))
                        .all(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .into_iter()
                        .map(|s| (s.id, s))
                        .collect();

                    let mut pairs = Vec::with_capacity(items.len());
                    for item in &items {
                        let supply = supplies.get(&item.supply_id).ok_or_else(|| {
                            ServiceError::NotFound(format!("Supply {} not found", item.supply_id))
                        })?;
                        pairs.push((item, supply));
                    }

                    let shortages: Vec<String> = pairs
                        .iter()
                        .filter(|(item, supply)| item.quantity > supply.available_units())
                        .map(|(item, supply)| {
                            format!(
                                "{} (requested {}, available {})",
                                supply.name,
                                item.quantity,
                                supply.available_units()
                            )
                        })
                        .collect();
                    if !shortages.is_empty() {
                        return Err(ServiceError::InsufficientStock(format!(
                            "Cannot approve: {}",
                            shortages.join("; ")
                        )));
                    }

                    for (item, supply) in &pairs {
                        deduct_stock(txn, supply, item.quantity).await?;
                    }

                    Ok(DecisionOutcome::Applied(find_requisition(txn, id).await?))
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        if let DecisionOutcome::Applied(requisition) = &outcome {
            info!(requisition_id = requisition.id, "requisition approved");
            self.event_sender
                .emit(Event::RequisitionApproved {
                    requisition_id: requisition.id,
                    decided_by,
                })
                .await;
        }
        Ok(outcome)
    }

    /// Rejects a pending requisition. No stock mutation.
    pub async fn reject(&self, actor: &Actor, id: i64) -> Result<DecisionOutcome, ServiceError> {
        actor.require_staff()?;
        let decided_by = actor.id;

        let outcome = self
            .db
            .transaction::<_, DecisionOutcome, ServiceError>(move |txn| {
                Box::pin(async move {
                    let requisition = find_requisition(txn, id).await?;
                    if !requisition.is_pending() {
                        return Ok(DecisionOutcome::AlreadyProcessed(requisition));
                    }
                    if !claim_pending(txn, id, RequisitionStatus::Rejected, decided_by).await? {
                        return Ok(DecisionOutcome::AlreadyProcessed(
                            find_requisition(txn, id).await?,
                        ));
                    }
                    Ok(DecisionOutcome::Applied(find_requisition(txn, id).await?))
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        if let DecisionOutcome::Applied(requisition) = &outcome {
            info!(requisition_id = requisition.id, "requisition rejected");
            self.event_sender
                .emit(Event::RequisitionRejected {
                    requisition_id: requisition.id,
                    decided_by,
                })
                .await;
        }
        Ok(outcome)
    }

    /// Soft-hides a decided requisition from active lists. Pending
    /// requisitions must be processed first.
    pub async fn archive(&self, actor: &Actor, id: i64) -> Result<ArchiveOutcome, ServiceError> {
        actor.require_staff()?;

        let outcome = self
            .db
            .transaction::<_, ArchiveOutcome, ServiceError>(move |txn| {
                Box::pin(async move {
                    let requisition = find_requisition(txn, id).await?;
                    if requisition.is_pending() {
                        return Err(ServiceError::ValidationError(
                            "Pending requests cannot be removed. Process them first.".to_string(),
                        ));
                    }
                    if requisition.is_archived {
                        return Ok(ArchiveOutcome::AlreadyArchived(requisition));
                    }
                    let mut active: requisition::ActiveModel = requisition.into();
                    active.is_archived = Set(true);
                    let updated = active.update(txn).await.map_err(ServiceError::db_error)?;
                    Ok(ArchiveOutcome::Archived(updated))
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        if let ArchiveOutcome::Archived(requisition) = &outcome {
            info!(requisition_id = requisition.id, "requisition archived");
            self.event_sender
                .emit(Event::RequisitionArchived(requisition.id))
                .await;
        }
        Ok(outcome)
    }

    /// Active (unarchived) requisitions split by status, newest first.
    /// Non-staff callers see only their own.
    pub async fn board(&self, actor: &Actor) -> Result<RequisitionBoard, ServiceError> {
        let mut select = Requisition::find()
            .filter(requisition::Column::IsArchived.eq(false))
            .order_by_desc(requisition::Column::RequestedAt);
        if !actor.is_staff {
            select = select.filter(requisition::Column::UserId.eq(actor.id));
        }
        let requisitions = select.all(self.db.as_ref()).await?;
        let views = self.load_views(requisitions).await?;

        let mut board = RequisitionBoard {
            pending: Vec::new(),
            approved: Vec::new(),
            rejected: Vec::new(),
        };
        for view in views {
            match view.requisition.status {
                RequisitionStatus::Pending => board.pending.push(view),
                RequisitionStatus::Approved => board.approved.push(view),
                RequisitionStatus::Rejected => board.rejected.push(view),
            }
        }
        Ok(board)
    }

    /// Full history (including archived) grouped per requesting user.
    pub async fn history_all(&self, actor: &Actor) -> Result<Vec<UserGroup>, ServiceError> {
        actor.require_staff()?;
        let requisitions = Requisition::find()
            .order_by_asc(requisition::Column::UserId)
            .order_by_desc(requisition::Column::RequestedAt)
            .all(self.db.as_ref())
            .await?;
        let views = self.load_views(requisitions).await?;

        let mut groups: Vec<UserGroup> = Vec::new();
        for view in views {
            let user_id = view.requisition.user_id;
            let idx = match groups.iter().position(|g| g.user_id == user_id) {
                Some(idx) => idx,
                None => {
                    groups.push(UserGroup {
                        user_id,
                        display_name: view.requisition.requester_name.clone(),
                        total_requests: 0,
                        counts: StatusCounts::default(),
                        requests: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[idx];
            bump_count(&mut group.counts, view.requisition.status);
            group.total_requests += 1;
            group.requests.push(view);
        }
        groups.sort_by(|a, b| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
        });
        Ok(groups)
    }

    /// The caller's own history (including archived) with status counts.
    pub async fn history_for_user(&self, actor: &Actor) -> Result<UserHistory, ServiceError> {
        let requisitions = Requisition::find()
            .filter(requisition::Column::UserId.eq(actor.id))
            .order_by_desc(requisition::Column::RequestedAt)
            .all(self.db.as_ref())
            .await?;
        let views = self.load_views(requisitions).await?;

        let mut counts = StatusCounts::default();
        for view in &views {
            bump_count(&mut counts, view.requisition.status);
        }
        Ok(UserHistory {
            counts,
            requests: views,
        })
    }

    /// Staff detail view with live availability and shortage flags per item.
    pub async fn detail(&self, actor: &Actor, id: i64) -> Result<RequisitionView, ServiceError> {
        actor.require_staff()?;
        let requisition = find_requisition(self.db.as_ref(), id).await?;
        let mut views = self.load_views(vec![requisition]).await?;
        views
            .pop()
            .ok_or_else(|| ServiceError::InternalError("requisition view not built".to_string()))
    }

    /// Receipt for an approved requisition, visible to its owner or staff.
    pub async fn receipt(&self, actor: &Actor, id: i64) -> Result<Receipt, ServiceError> {
        let requisition = find_requisition(self.db.as_ref(), id).await?;
        if !actor.is_staff && requisition.user_id != actor.id {
            return Err(ServiceError::Forbidden(
                "You do not have access to this receipt".to_string(),
            ));
        }
        if requisition.status != RequisitionStatus::Approved {
            return Err(ServiceError::ValidationError(
                "Receipt is available only after approval".to_string(),
            ));
        }
        let mut views = self.load_views(vec![requisition]).await?;
        let view = views
            .pop()
            .ok_or_else(|| ServiceError::InternalError("requisition view not built".to_string()))?;
        Ok(Receipt {
            requisition: view.requisition,
            items: view.items,
            generated_at: Utc::now(),
        })
    }

    async fn load_views(
        &self,
        requisitions: Vec<requisition::Model>,
    ) -> Result<Vec<RequisitionView>, ServiceError> {
        if requisitions.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = requisitions.iter().map(|r| r.id).collect();
        let items = RequisitionItem::find()
            .filter(requisition_item::Column::RequisitionId.is_in(ids))
            .order_by_asc(requisition_item::Column::Id)
            .all(self.db.as_ref())
            .await?;
        let supply_ids: Vec<i64> = items.iter().map(|i| i.supply_id).collect();
        let supplies: HashMap<i64, supply::Model> = Supply::find()
            .filter(supply::Column::Id.is_in(supply_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut by_requisition: HashMap<i64, Vec<ItemView>> = HashMap::new();
        for item in items {
            let Some(supply) = supplies.get(&item.supply_id) else {
                continue;
            };
            let available = supply.available_units();
            by_requisition
                .entry(item.requisition_id)
                .or_default()
                .push(ItemView {
                    id: item.id,
                    supply_id: supply.id,
                    supply_name: supply.name.clone(),
                    size_spec: supply.size_spec.clone(),
                    unit: supply.unit,
                    quantity: item.quantity,
                    price_per_unit: item.price_per_unit,
                    total_cost: item.total_cost(),
                    needed_by: item.needed_by,
                    available,
                    is_shortage: item.quantity > available,
                });
        }

        Ok(requisitions
            .into_iter()
            .map(|requisition| {
                let items = by_requisition.remove(&requisition.id).unwrap_or_default();
                RequisitionView { requisition, items }
            })
            .collect())
    }
}

async fn find_requisition<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<requisition::Model, ServiceError> {
    Requisition::find_by_id(id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Requisition {} not found", id)))
}

/// Flips a pending requisition to its decided status with a guard on the
/// current status. Zero rows affected means another decision committed
/// first, and the caller reports the requisition as already processed.
async fn claim_pending<C: ConnectionTrait>(
    txn: &C,
    id: i64,
    status: RequisitionStatus,
    decided_by: Uuid,
) -> Result<bool, ServiceError> {
    let result = Requisition::update_many()
        .set(requisition::ActiveModel {
            status: Set(status),
            decided_by: Set(Some(decided_by)),
            decision_at: Set(Some(Utc::now())),
            ..Default::default()
        })
        .filter(requisition::Column::Id.eq(id))
        .filter(requisition::Column::Status.eq(RequisitionStatus::Pending))
        .exec(txn)
        .await
        .map_err(ServiceError::db_error)?;
    Ok(result.rows_affected == 1)
}

/// Deducts `quantity` units from a supply with an availability guard: zero
/// rows affected means a concurrent writer consumed the stock first, and the
/// surrounding transaction rolls the whole approval back.
async fn deduct_stock<C: ConnectionTrait>(
    txn: &C,
    supply: &supply::Model,
    quantity: i32,
) -> Result<(), ServiceError> {
    let result = if supply.unit.counts_by_box() {
        Supply::update_many()
            .col_expr(
                supply::Column::BoxesCount,
                Expr::col(supply::Column::BoxesCount).sub(quantity),
            )
            .col_expr(
                supply::Column::Quantity,
                Expr::col(supply::Column::BoxesCount).sub(quantity),
            )
            .filter(supply::Column::Id.eq(supply.id))
            .filter(supply::Column::BoxesCount.gte(quantity))
            .exec(txn)
            .await
            .map_err(ServiceError::db_error)?
    } else {
        Supply::update_many()
            .col_expr(
                supply::Column::Quantity,
                Expr::col(supply::Column::Quantity).sub(quantity),
            )
            .filter(supply::Column::Id.eq(supply.id))
            .filter(supply::Column::Quantity.gte(quantity))
            .exec(txn)
            .await
            .map_err(ServiceError::db_error)?
    };

    if result.rows_affected != 1 {
        return Err(ServiceError::InsufficientStock(format!(
            "{} (requested {}, stock changed concurrently)",
            supply.name, quantity
        )));
    }
    Ok(())
}

fn bump_count(counts: &mut StatusCounts, status: RequisitionStatus) {
    match status {
        RequisitionStatus::Pending => counts.pending += 1,
        RequisitionStatus::Approved => counts.approved += 1,
        RequisitionStatus::Rejected => counts.rejected += 1,
    }
}
