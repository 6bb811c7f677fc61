use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::shipments::{RecordShipmentInput, ReceiveOutcome};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::json;

pub fn shipments_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shipments).post(record_shipment))
        .route("/:id/receive", post(receive_shipment))
}

/// The shipment ledger, newest first
#[utoipa::path(
    get,
    path = "/api/v1/shipments",
    responses(
        (status = 200, description = "Shipments returned"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn list_shipments(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let shipments = state.services.shipments.list(&user.actor()).await?;
    Ok(Json(ApiResponse::success(shipments)))
}

/// Record an expected shipment
#[utoipa::path(
    post,
    path = "/api/v1/shipments",
    request_body = RecordShipmentInput,
    responses(
        (status = 201, description = "Shipment recorded"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supply not found", body = crate::errors::ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn record_shipment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<RecordShipmentInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .services
        .shipments
        .record(&user.actor(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Receive a pending shipment into stock
#[utoipa::path(
    post,
    path = "/api/v1/shipments/{id}/receive",
    params(("id" = i64, Path, description = "Shipment ID")),
    responses(
        (status = 200, description = "Shipment received or already received"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn receive_shipment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state.services.shipments.receive(&user.actor(), id).await?;
    let response = match outcome {
        ReceiveOutcome::Received { shipment, supply } => {
            ApiResponse::success(json!({ "shipment": shipment, "supply": supply }))
        }
        ReceiveOutcome::AlreadyReceived(shipment) => ApiResponse::success_with_message(
            json!({ "shipment": shipment }),
            "Shipment was already received",
        ),
    };
    Ok(Json(response))
}
