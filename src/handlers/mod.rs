pub mod cart;
pub mod health;
pub mod reports;
pub mod requisitions;
pub mod shipments;
pub mod supplies;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<crate::services::catalog::CatalogService>,
    pub cart: Arc<crate::services::cart::CartService>,
    pub requisitions: Arc<crate::services::requisitions::RequisitionService>,
    pub shipments: Arc<crate::services::shipments::ShipmentService>,
    pub reports: Arc<crate::services::reports::ReportService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, low_stock_threshold: i32) -> Self {
        Self {
            catalog: Arc::new(crate::services::catalog::CatalogService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            cart: Arc::new(crate::services::cart::CartService::new(db_pool.clone())),
            requisitions: Arc::new(crate::services::requisitions::RequisitionService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            shipments: Arc::new(crate::services::shipments::ShipmentService::new(
                db_pool.clone(),
                event_sender,
            )),
            reports: Arc::new(crate::services::reports::ReportService::new(
                db_pool,
                low_stock_threshold,
            )),
        }
    }
}
