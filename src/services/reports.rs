use crate::{
    auth::Actor,
    db::DbPool,
    entities::{
        requisition::{self, Entity as Requisition, RequisitionStatus},
        requisition_item::{self, Entity as RequisitionItem},
        supply::{self, Entity as Supply},
    },
    errors::ServiceError,
};
use chrono::Datelike;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

/// Read-only dashboard aggregates for staff. Rollups are computed in
/// process from plain row fetches so they behave identically on every
/// backend.
#[derive(Clone)]
pub struct ReportService {
    db: Arc<DbPool>,
    low_stock_threshold: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopSupply {
    pub supply_id: i64,
    pub name: String,
    pub size_spec: String,
    pub approved_quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyOutgoing {
    /// Calendar month of the approval decision, `YYYY-MM`.
    pub month: String,
    pub quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardReport {
    pub supply_count: u64,
    pub total_quantity: i64,
    pub low_stock_threshold: i32,
    pub low_stock: Vec<supply::Model>,
    pub out_of_stock: Vec<supply::Model>,
    pub pending_requisitions: u64,
    pub top_requested: Vec<TopSupply>,
    pub monthly_outgoing: Vec<MonthlyOutgoing>,
}

impl ReportService {
    pub fn new(db: Arc<DbPool>, low_stock_threshold: i32) -> Self {
        Self {
            db,
            low_stock_threshold,
        }
    }

    pub async fn dashboard(&self, actor: &Actor) -> Result<DashboardReport, ServiceError> {
        actor.require_staff()?;

        let supplies = Supply::find()
            .order_by_asc(supply::Column::Name)
            .all(self.db.as_ref())
            .await?;
        let supply_count = supplies.len() as u64;
        let total_quantity: i64 = supplies.iter().map(|s| i64::from(s.quantity)).sum();
        let low_stock: Vec<supply::Model> = supplies
            .iter()
            .filter(|s| s.is_low_stock(self.low_stock_threshold))
            .cloned()
            .collect();
        let out_of_stock: Vec<supply::Model> = supplies
            .iter()
            .filter(|s| s.is_out_of_stock())
            .cloned()
            .collect();

        let pending_requisitions = Requisition::find()
            .filter(requisition::Column::Status.eq(RequisitionStatus::Pending))
            .count(self.db.as_ref())
            .await?;

        let approved = Requisition::find()
            .filter(requisition::Column::Status.eq(RequisitionStatus::Approved))
            .all(self.db.as_ref())
            .await?;
        let approved_ids: Vec<i64> = approved.iter().map(|r| r.id).collect();
        let items = if approved_ids.is_empty() {
            Vec::new()
        } else {
            RequisitionItem::find()
                .filter(requisition_item::Column::RequisitionId.is_in(approved_ids))
                .all(self.db.as_ref())
                .await?
        };

        let top_requested = top_requested(&supplies, &items);
        let monthly_outgoing = monthly_outgoing(&approved, &items);

        Ok(DashboardReport {
            supply_count,
            total_quantity,
            low_stock_threshold: self.low_stock_threshold,
            low_stock,
            out_of_stock,
            pending_requisitions,
            top_requested,
            monthly_outgoing,
        })
    }
}

/// Top five supplies by total approved quantity, ties broken by name.
fn top_requested(
    supplies: &[supply::Model],
    approved_items: &[requisition_item::Model],
) -> Vec<TopSupply> {
    let mut totals: HashMap<i64, i64> = HashMap::new();
    for item in approved_items {
        *totals.entry(item.supply_id).or_default() += i64::from(item.quantity);
    }

    let mut ranked: Vec<TopSupply> = supplies
        .iter()
        .filter_map(|s| {
            totals.get(&s.id).map(|&approved_quantity| TopSupply {
                supply_id: s.id,
                name: s.name.clone(),
                size_spec: s.size_spec.clone(),
                approved_quantity,
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.approved_quantity
            .cmp(&a.approved_quantity)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(5);
    ranked
}

/// Approved outgoing units per calendar month of the decision, oldest
/// month first.
fn monthly_outgoing(
    approved: &[requisition::Model],
    approved_items: &[requisition_item::Model],
) -> Vec<MonthlyOutgoing> {
    let mut items_by_requisition: HashMap<i64, i64> = HashMap::new();
    for item in approved_items {
        *items_by_requisition.entry(item.requisition_id).or_default() +=
            i64::from(item.quantity);
    }

    let mut by_month: HashMap<String, i64> = HashMap::new();
    for requisition in approved {
        let Some(decision_at) = requisition.decision_at else {
            continue;
        };
        let month = format!("{:04}-{:02}", decision_at.year(), decision_at.month());
        let quantity = items_by_requisition
            .get(&requisition.id)
            .copied()
            .unwrap_or(0);
        *by_month.entry(month).or_default() += quantity;
    }

    let mut months: Vec<MonthlyOutgoing> = by_month
        .into_iter()
        .map(|(month, quantity)| MonthlyOutgoing { month, quantity })
        .collect();
    months.sort_by(|a, b| a.month.cmp(&b.month));
    months
}
