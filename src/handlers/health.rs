use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde_json::json;

pub fn health_router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Liveness plus a database round-trip
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match crate::db::ping(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "up",
                "timestamp": Utc::now().to_rfc3339(),
            })),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "database": err.to_string(),
                "timestamp": Utc::now().to_rfc3339(),
            })),
        ),
    }
}
