use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::{ApiResponse, AppState};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

pub fn reports_router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

/// Stock and workflow overview for staff
#[utoipa::path(
    get,
    path = "/api/v1/reports/dashboard",
    responses(
        (status = 200, description = "Dashboard returned", body = crate::services::reports::DashboardReport),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.reports.dashboard(&user.actor()).await?;
    Ok(Json(ApiResponse::success(report)))
}
