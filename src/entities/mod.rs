pub mod cart_item;
pub mod incoming_shipment;
pub mod requisition;
pub mod requisition_item;
pub mod supply;

pub use cart_item::Entity as CartItem;
pub use incoming_shipment::Entity as IncomingShipment;
pub use requisition::Entity as Requisition;
pub use requisition_item::Entity as RequisitionItem;
pub use supply::Entity as Supply;
