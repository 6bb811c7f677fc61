use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::catalog::{SupplyInput, SupplyListQuery};
use crate::{ApiResponse, AppState, PaginatedResponse};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};

pub fn supplies_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_supplies).post(create_supply))
        .route("/catalog", get(browse_catalog))
        .route(
            "/:id",
            get(get_supply).put(update_supply).delete(delete_supply),
        )
}

/// List supplies for staff management
#[utoipa::path(
    get,
    path = "/api/v1/supplies",
    params(
        ("q" = Option<String>, Query, description = "Free-text search"),
        ("category" = Option<String>, Query, description = "Category filter"),
        ("page" = Option<u64>, Query, description = "Page number, 1-based"),
        ("per_page" = Option<u64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Supply list returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "supplies"
)]
pub async fn list_supplies(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SupplyListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    user.actor().require_staff()?;
    let page = state.services.catalog.list_supplies(&query).await?;
    Ok(Json(ApiResponse::success(PaginatedResponse {
        total_pages: page.total.div_ceil(page.per_page),
        items: page.supplies,
        total: page.total,
        page: page.page,
        limit: page.per_page,
    })))
}

/// Browse the catalog; open to any authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/supplies/catalog",
    params(
        ("q" = Option<String>, Query, description = "Free-text search"),
        ("category" = Option<String>, Query, description = "Category filter"),
        ("page" = Option<u64>, Query, description = "Page number, 1-based"),
        ("per_page" = Option<u64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Catalog returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "supplies"
)]
pub async fn browse_catalog(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<SupplyListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state.services.catalog.list_supplies(&query).await?;
    Ok(Json(ApiResponse::success(PaginatedResponse {
        total_pages: page.total.div_ceil(page.per_page),
        items: page.supplies,
        total: page.total,
        page: page.page,
        limit: page.per_page,
    })))
}

/// Add a new supply to the catalog
#[utoipa::path(
    post,
    path = "/api/v1/supplies",
    request_body = SupplyInput,
    responses(
        (status = 201, description = "Supply created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate name and size/spec", body = crate::errors::ErrorResponse)
    ),
    tag = "supplies"
)]
pub async fn create_supply(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<SupplyInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .services
        .catalog
        .create_supply(&user.actor(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Get one supply
#[utoipa::path(
    get,
    path = "/api/v1/supplies/{id}",
    params(("id" = i64, Path, description = "Supply ID")),
    responses(
        (status = 200, description = "Supply returned"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "supplies"
)]
pub async fn get_supply(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let supply = state.services.catalog.get_supply(id).await?;
    Ok(Json(ApiResponse::success(supply)))
}

/// Update a supply
#[utoipa::path(
    put,
    path = "/api/v1/supplies/{id}",
    params(("id" = i64, Path, description = "Supply ID")),
    request_body = SupplyInput,
    responses(
        (status = 200, description = "Supply updated"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate name and size/spec", body = crate::errors::ErrorResponse)
    ),
    tag = "supplies"
)]
pub async fn update_supply(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(input): Json<SupplyInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .catalog
        .update_supply(&user.actor(), id, input)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Remove a supply from the catalog
#[utoipa::path(
    delete,
    path = "/api/v1/supplies/{id}",
    params(("id" = i64, Path, description = "Supply ID")),
    responses(
        (status = 200, description = "Supply deleted"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "supplies"
)]
pub async fn delete_supply(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .catalog
        .delete_supply(&user.actor(), id)
        .await?;
    Ok(Json(ApiResponse::<()>::message("Supply deleted")))
}
