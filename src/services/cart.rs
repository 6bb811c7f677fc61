use crate::{
    db::DbPool,
    entities::{
        cart_item::{self, Entity as CartItem},
        supply::{self, Entity as Supply},
    },
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, TransactionError,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-user staging area for requisition lines. Selections are validated
/// against live availability when staged and revalidated at submission; the
/// cart never reserves stock.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DbPool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CartLineInput {
    pub supply_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLine {
    pub supply: supply::Model,
    pub quantity: i32,
}

impl CartService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Replaces the user's cart with the given selection. Each line must
    /// reference an existing supply, carry a positive quantity, and fit
    /// within current availability.
    pub async fn set_items(
        &self,
        user_id: Uuid,
        lines: Vec<CartLineInput>,
    ) -> Result<Vec<CartLine>, ServiceError> {
        if lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "Please select at least one supply".to_string(),
            ));
        }

        let supplies = self.load_supplies(&lines).await?;
        let mut violations = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for line in &lines {
            if !seen.insert(line.supply_id) {
                violations.push(format!("Supply {} is listed more than once", line.supply_id));
                continue;
            }
            let Some(supply) = supplies.get(&line.supply_id) else {
                violations.push(format!("Supply {} does not exist", line.supply_id));
                continue;
            };
            if line.quantity <= 0 {
                violations.push(format!(
                    "Quantity for {} must be greater than zero",
                    supply.name
                ));
            } else if line.quantity > supply.available_units() {
                violations.push(format!("Not enough stock for {}", supply.name));
            }
        }
        if !violations.is_empty() {
            return Err(ServiceError::ValidationError(violations.join("; ")));
        }

        let now = Utc::now();
        let rows: Vec<cart_item::ActiveModel> = lines
            .iter()
            .map(|line| cart_item::ActiveModel {
                user_id: Set(user_id),
                supply_id: Set(line.supply_id),
                quantity: Set(line.quantity),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
            .collect();

        self.db
            .transaction::<_, (), DbErr>(move |txn| {
                Box::pin(async move {
                    CartItem::delete_many()
                        .filter(cart_item::Column::UserId.eq(user_id))
                        .exec(txn)
                        .await?;
                    CartItem::insert_many(rows).exec(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(db_err) => ServiceError::db_error(db_err),
            })?;

        self.get_items(user_id).await
    }

    /// The user's current selection joined with live supply snapshots.
    pub async fn get_items(&self, user_id: Uuid) -> Result<Vec<CartLine>, ServiceError> {
        let items = CartItem::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .order_by_asc(cart_item::Column::Id)
            .all(self.db.as_ref())
            .await?;

        let lines: Vec<CartLineInput> = items
            .iter()
            .map(|i| CartLineInput {
                supply_id: i.supply_id,
                quantity: i.quantity,
            })
            .collect();
        let supplies = self.load_supplies(&lines).await?;

        Ok(items
            .into_iter()
            .filter_map(|item| {
                supplies.get(&item.supply_id).cloned().map(|supply| CartLine {
                    supply,
                    quantity: item.quantity,
                })
            })
            .collect())
    }

    pub async fn clear(&self, user_id: Uuid) -> Result<(), ServiceError> {
        CartItem::delete_many()
            .filter(cart_item::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn load_supplies(
        &self,
        lines: &[CartLineInput],
    ) -> Result<HashMap<i64, supply::Model>, ServiceError> {
        let ids: Vec<i64> = lines.iter().map(|l| l.supply_id).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let supplies = Supply::find()
            .filter(supply::Column::Id.is_in(ids))
            .all(self.db.as_ref())
            .await?;
        Ok(supplies.into_iter().map(|s| (s.id, s)).collect())
    }
}
