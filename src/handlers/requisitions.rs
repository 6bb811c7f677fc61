use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::requisitions::{ArchiveOutcome, DecisionOutcome, SubmitRequisitionInput};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

pub fn requisitions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_requisitions).post(submit_requisition))
        .route("/history", get(history_all))
        .route("/history/me", get(history_me))
        .route("/:id", get(requisition_detail))
        .route("/:id/approve", post(approve_requisition))
        .route("/:id/reject", post(reject_requisition))
        .route("/:id/archive", post(archive_requisition))
        .route("/:id/receipt", get(requisition_receipt))
}

/// Submit a requisition; consumes the caller's cart
#[utoipa::path(
    post,
    path = "/api/v1/requisitions",
    request_body = SubmitRequisitionInput,
    responses(
        (status = 201, description = "Requisition submitted"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    tag = "requisitions"
)]
pub async fn submit_requisition(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<SubmitRequisitionInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .services
        .requisitions
        .submit(&user.actor(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Active requisitions split by status; non-staff see only their own
#[utoipa::path(
    get,
    path = "/api/v1/requisitions",
    responses(
        (status = 200, description = "Active requisitions returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "requisitions"
)]
pub async fn list_requisitions(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let board = state.services.requisitions.board(&user.actor()).await?;
    Ok(Json(ApiResponse::success(board)))
}

/// Full history grouped per user
#[utoipa::path(
    get,
    path = "/api/v1/requisitions/history",
    responses(
        (status = 200, description = "History returned"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "requisitions"
)]
pub async fn history_all(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let groups = state
        .services
        .requisitions
        .history_all(&user.actor())
        .await?;
    Ok(Json(ApiResponse::success(groups)))
}

/// The caller's own history with status counts
#[utoipa::path(
    get,
    path = "/api/v1/requisitions/history/me",
    responses(
        (status = 200, description = "History returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "requisitions"
)]
pub async fn history_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let history = state
        .services
        .requisitions
        .history_for_user(&user.actor())
        .await?;
    Ok(Json(ApiResponse::success(history)))
}

/// Staff detail with live availability per item
#[utoipa::path(
    get,
    path = "/api/v1/requisitions/{id}",
    params(("id" = i64, Path, description = "Requisition ID")),
    responses(
        (status = 200, description = "Requisition returned"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "requisitions"
)]
pub async fn requisition_detail(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let view = state
        .services
        .requisitions
        .detail(&user.actor(), id)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

/// Approve a pending requisition and deduct stock
#[utoipa::path(
    post,
    path = "/api/v1/requisitions/{id}/approve",
    params(("id" = i64, Path, description = "Requisition ID")),
    responses(
        (status = 200, description = "Requisition approved or already processed"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    tag = "requisitions"
)]
pub async fn approve_requisition(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state
        .services
        .requisitions
        .approve(&user.actor(), id)
        .await?;
    Ok(Json(decision_response(outcome)))
}

/// Reject a pending requisition
#[utoipa::path(
    post,
    path = "/api/v1/requisitions/{id}/reject",
    params(("id" = i64, Path, description = "Requisition ID")),
    responses(
        (status = 200, description = "Requisition rejected or already processed"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "requisitions"
)]
pub async fn reject_requisition(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state
        .services
        .requisitions
        .reject(&user.actor(), id)
        .await?;
    Ok(Json(decision_response(outcome)))
}

/// Archive a decided requisition
#[utoipa::path(
    post,
    path = "/api/v1/requisitions/{id}/archive",
    params(("id" = i64, Path, description = "Requisition ID")),
    responses(
        (status = 200, description = "Requisition archived or already archived"),
        (status = 400, description = "Still pending", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "requisitions"
)]
pub async fn archive_requisition(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state
        .services
        .requisitions
        .archive(&user.actor(), id)
        .await?;
    let response = match outcome {
        ArchiveOutcome::Archived(requisition) => ApiResponse::success(requisition),
        ArchiveOutcome::AlreadyArchived(requisition) => {
            ApiResponse::success_with_message(requisition, "Request was already removed")
        }
    };
    Ok(Json(response))
}

/// Receipt for an approved requisition
#[utoipa::path(
    get,
    path = "/api/v1/requisitions/{id}/receipt",
    params(("id" = i64, Path, description = "Requisition ID")),
    responses(
        (status = 200, description = "Receipt returned"),
        (status = 400, description = "Not approved yet", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "requisitions"
)]
pub async fn requisition_receipt(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let receipt = state
        .services
        .requisitions
        .receipt(&user.actor(), id)
        .await?;
    Ok(Json(ApiResponse::success(receipt)))
}

fn decision_response(
    outcome: DecisionOutcome,
) -> ApiResponse<crate::entities::requisition::Model> {
    match outcome {
        DecisionOutcome::Applied(requisition) => ApiResponse::success(requisition),
        DecisionOutcome::AlreadyProcessed(requisition) => {
            ApiResponse::success_with_message(requisition, "Request was already processed")
        }
    }
}
