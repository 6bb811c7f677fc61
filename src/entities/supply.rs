use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A catalog entry for one office supply, identified by (name, size_spec).
///
/// `boxes_count`, `items_per_box` and `quantity` are linked by the unit
/// type: pack/ream supplies are counted in boxes (`quantity == boxes_count`),
/// everything else tracks `quantity` in loose units.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Supply)]
#[sea_orm(table_name = "supplies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub size_spec: String,
    pub description: String,
    pub category: SupplyCategory,
    pub unit: SupplyUnit,
    pub boxes_count: i32,
    pub items_per_box: i32,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::incoming_shipment::Entity")]
    IncomingShipments,
    #[sea_orm(has_many = "super::requisition_item::Entity")]
    RequisitionItems,
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
}

impl Related<super::incoming_shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IncomingShipments.def()
    }
}

impl Related<super::requisition_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequisitionItems.def()
    }
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Supply category enumeration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(64))")]
pub enum SupplyCategory {
    #[sea_orm(string_value = "Writing Supplies")]
    #[serde(rename = "Writing Supplies")]
    WritingSupplies,
    #[sea_orm(string_value = "Paper Supplies")]
    #[serde(rename = "Paper Supplies")]
    PaperSupplies,
    #[sea_orm(string_value = "Filing Supplies")]
    #[serde(rename = "Filing Supplies")]
    FilingSupplies,
    #[sea_orm(string_value = "Printing Supplies")]
    #[serde(rename = "Printing Supplies")]
    PrintingSupplies,
    #[sea_orm(string_value = "Desk Accessories")]
    #[serde(rename = "Desk Accessories")]
    DeskAccessories,
    #[sea_orm(string_value = "IT Office Accessories")]
    #[serde(rename = "IT Office Accessories")]
    ItOfficeAccessories,
    #[sea_orm(string_value = "Official Forms & Stationery")]
    #[serde(rename = "Official Forms & Stationery")]
    OfficialFormsStationery,
    #[sea_orm(string_value = "Office Maintenance Supplies")]
    #[serde(rename = "Office Maintenance Supplies")]
    OfficeMaintenanceSupplies,
}

/// Unit of issue for a supply
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum SupplyUnit {
    #[sea_orm(string_value = "pc")]
    Pc,
    #[sea_orm(string_value = "pack")]
    Pack,
    #[sea_orm(string_value = "box")]
    Box,
    #[sea_orm(string_value = "ream")]
    Ream,
    #[sea_orm(string_value = "sheet")]
    Sheet,
    #[sea_orm(string_value = "set")]
    Set,
    #[sea_orm(string_value = "bottle")]
    Bottle,
    #[sea_orm(string_value = "roll")]
    Roll,
    #[sea_orm(string_value = "can")]
    Can,
}

impl SupplyUnit {
    /// Pack and ream supplies are issued and counted per box.
    pub fn counts_by_box(self) -> bool {
        matches!(self, SupplyUnit::Pack | SupplyUnit::Ream)
    }
}

impl Model {
    /// Units currently available to request. Recomputed at every validation
    /// site rather than cached: concurrent approvals can change stock
    /// between a user's selection and submission.
    pub fn available_units(&self) -> i32 {
        if self.unit.counts_by_box() {
            self.boxes_count
        } else {
            self.quantity
        }
    }

    pub fn is_low_stock(&self, threshold: i32) -> bool {
        self.quantity > 0 && self.quantity <= threshold
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity <= 0
    }
}

/// Stored quantity derived from box counts for a given unit type.
pub fn derive_quantity(unit: SupplyUnit, boxes_count: i32, items_per_box: i32) -> i32 {
    if unit.counts_by_box() {
        boxes_count
    } else {
        boxes_count * items_per_box
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(unit: SupplyUnit, boxes_count: i32, quantity: i32) -> Model {
        Model {
            id: 1,
            name: "Bond paper A4".into(),
            size_spec: "A4".into(),
            description: String::new(),
            category: SupplyCategory::PaperSupplies,
            unit,
            boxes_count,
            items_per_box: 0,
            quantity,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn availability_counts_boxes_for_pack_and_ream() {
        assert_eq!(sample(SupplyUnit::Ream, 3, 3).available_units(), 3);
        assert_eq!(sample(SupplyUnit::Pack, 7, 7).available_units(), 7);
    }

    #[test]
    fn availability_counts_quantity_for_loose_units() {
        assert_eq!(sample(SupplyUnit::Pc, 2, 48).available_units(), 48);
        assert_eq!(sample(SupplyUnit::Bottle, 0, 5).available_units(), 5);
    }

    #[test]
    fn derived_quantity_follows_unit_type() {
        assert_eq!(derive_quantity(SupplyUnit::Ream, 3, 500), 3);
        assert_eq!(derive_quantity(SupplyUnit::Pc, 2, 24), 48);
        assert_eq!(derive_quantity(SupplyUnit::Pc, 2, 0), 0);
    }

    #[test]
    fn stock_level_flags() {
        assert!(sample(SupplyUnit::Pc, 0, 2).is_low_stock(2));
        assert!(!sample(SupplyUnit::Pc, 0, 3).is_low_stock(2));
        assert!(sample(SupplyUnit::Pc, 0, 0).is_out_of_stock());
        assert!(!sample(SupplyUnit::Pc, 0, 0).is_low_stock(2));
    }
}
