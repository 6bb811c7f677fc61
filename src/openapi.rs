use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SupplyDesk API",
        version = "1.0.0",
        description = r#"
# SupplyDesk Office Supplies API

Inventory and requisition tracking for an office-supplies store room.

- **Catalog**: staff manage the supply catalog (categories, units, stock)
- **Shipments**: staff record expected deliveries and receive them into stock
- **Cart & Requisitions**: users stage supplies, submit requisitions, and
  collect receipts; staff approve or reject with atomic stock deduction
- **Reports**: stock levels, shortages, and outgoing-volume rollups

## Authentication

All endpoints require a bearer token:

```
Authorization: Bearer <your-jwt-token>
```

Staff-only endpoints additionally require the `staff` claim.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "supplies", description = "Supply catalog management"),
        (name = "cart", description = "Per-user requisition staging"),
        (name = "requisitions", description = "Requisition workflow"),
        (name = "shipments", description = "Incoming shipment ledger"),
        (name = "reports", description = "Staff dashboard reports")
    ),
    paths(
        // Supplies
        crate::handlers::supplies::list_supplies,
        crate::handlers::supplies::browse_catalog,
        crate::handlers::supplies::create_supply,
        crate::handlers::supplies::get_supply,
        crate::handlers::supplies::update_supply,
        crate::handlers::supplies::delete_supply,

        // Cart
        crate::handlers::cart::get_cart,
        crate::handlers::cart::set_cart,
        crate::handlers::cart::clear_cart,

        // Requisitions
        crate::handlers::requisitions::submit_requisition,
        crate::handlers::requisitions::list_requisitions,
        crate::handlers::requisitions::history_all,
        crate::handlers::requisitions::history_me,
        crate::handlers::requisitions::requisition_detail,
        crate::handlers::requisitions::approve_requisition,
        crate::handlers::requisitions::reject_requisition,
        crate::handlers::requisitions::archive_requisition,
        crate::handlers::requisitions::requisition_receipt,

        // Shipments
        crate::handlers::shipments::list_shipments,
        crate::handlers::shipments::record_shipment,
        crate::handlers::shipments::receive_shipment,

        // Reports
        crate::handlers::reports::dashboard,
    ),
    components(schemas(
        crate::entities::supply::Model,
        crate::entities::supply::SupplyCategory,
        crate::entities::supply::SupplyUnit,
        crate::entities::incoming_shipment::Model,
        crate::entities::incoming_shipment::ShipmentStatus,
        crate::entities::requisition::Model,
        crate::entities::requisition::RequisitionStatus,
        crate::entities::requisition_item::Model,
        crate::services::catalog::SupplyInput,
        crate::services::cart::CartLineInput,
        crate::services::cart::CartLine,
        crate::services::requisitions::SubmitRequisitionInput,
        crate::services::requisitions::RequisitionLineInput,
        crate::services::requisitions::ItemView,
        crate::services::requisitions::RequisitionView,
        crate::services::requisitions::RequisitionBoard,
        crate::services::requisitions::StatusCounts,
        crate::services::requisitions::UserHistory,
        crate::services::requisitions::UserGroup,
        crate::services::requisitions::Receipt,
        crate::services::shipments::RecordShipmentInput,
        crate::services::shipments::ShipmentView,
        crate::services::reports::DashboardReport,
        crate::services::reports::TopSupply,
        crate::services::reports::MonthlyOutgoing,
        crate::errors::ErrorResponse,
    ))
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/docs`, serving the schema at
/// `/api-docs/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
