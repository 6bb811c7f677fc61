//! SupplyDesk API Library
//!
//! Office-supplies inventory and requisition tracking: a supply catalog and
//! incoming-shipment ledger managed by staff, and a requisition workflow
//! (cart, submission, staff decision with atomic stock deduction, archival,
//! dashboard reporting) for everyone else.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{routing::get, Extension, Json, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub timestamp: String,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Success payload with an informational note, used by no-op outcomes.
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Root banner, mostly useful as a smoke check behind load balancers.
async fn root() -> Json<Value> {
    Json(json!({
        "name": "SupplyDesk API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/docs",
        "health": "/health",
    }))
}

/// Builds the full application router. The auth service rides along as a
/// request extension so the `AuthUser` extractor can validate bearer tokens
/// on any route.
pub fn app_router(state: AppState, auth_service: Arc<auth::AuthService>) -> Router {
    let api = Router::new()
        .nest("/supplies", handlers::supplies::supplies_router())
        .nest("/cart", handlers::cart::cart_router())
        .nest("/requisitions", handlers::requisitions::requisitions_router())
        .nest("/shipments", handlers::shipments::shipments_router())
        .nest("/reports", handlers::reports::reports_router());

    Router::new()
        .route("/", get(root))
        .merge(handlers::health::health_router())
        .nest("/api/v1", api)
        .merge(openapi::swagger_ui())
        .layer(Extension(auth_service))
        .with_state(state)
}

#[cfg(test)]
mod response_tests {
    use super::*;

    #[test]
    fn success_response_carries_data() {
        let response = ApiResponse::success(42);
        assert!(response.success);
        assert_eq!(response.data, Some(42));
        assert!(response.message.is_none());
    }

    #[test]
    fn informational_no_op_keeps_success_shape() {
        let response = ApiResponse::success_with_message("row", "already processed");
        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some("already processed"));
    }
}
