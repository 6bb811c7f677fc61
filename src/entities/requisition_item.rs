use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One requested line on a requisition. The unit price is a snapshot taken
/// at request time; supplies themselves carry no price.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = RequisitionItem)]
#[sea_orm(table_name = "requisition_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub requisition_id: i64,
    pub supply_id: i64,
    pub quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub price_per_unit: Option<Decimal>,
    pub needed_by: Option<NaiveDate>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::requisition::Entity",
        from = "Column::RequisitionId",
        to = "super::requisition::Column::Id"
    )]
    Requisition,
    #[sea_orm(
        belongs_to = "super::supply::Entity",
        from = "Column::SupplyId",
        to = "super::supply::Column::Id"
    )]
    Supply,
}

impl Related<super::requisition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requisition.def()
    }
}

impl Related<super::supply::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supply.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn total_cost(&self) -> Option<Decimal> {
        self.price_per_unit
            .map(|price| price * Decimal::from(self.quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn total_cost_multiplies_snapshot_price() {
        let item = Model {
            id: 1,
            requisition_id: 1,
            supply_id: 1,
            quantity: 4,
            price_per_unit: Some(dec!(12.50)),
            needed_by: None,
        };
        assert_eq!(item.total_cost(), Some(dec!(50.00)));
    }

    #[test]
    fn total_cost_is_none_without_price() {
        let item = Model {
            id: 1,
            requisition_id: 1,
            supply_id: 1,
            quantity: 4,
            price_per_unit: None,
            needed_by: None,
        };
        assert_eq!(item.total_cost(), None);
    }
}
