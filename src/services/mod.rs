pub mod cart;
pub mod catalog;
pub mod reports;
pub mod requisitions;
pub mod shipments;
