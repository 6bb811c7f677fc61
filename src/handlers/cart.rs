use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::cart::CartLineInput;
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::get,
    Router,
};

pub fn cart_router() -> Router<AppState> {
    Router::new().route("/", get(get_cart).put(set_cart).delete(clear_cart))
}

/// The caller's current cart with live supply snapshots
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    responses(
        (status = 200, description = "Cart returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let lines = state.services.cart.get_items(user.user_id).await?;
    Ok(Json(ApiResponse::success(lines)))
}

/// Replace the caller's cart with the given selection
#[utoipa::path(
    put,
    path = "/api/v1/cart",
    request_body = Vec<CartLineInput>,
    responses(
        (status = 200, description = "Cart replaced"),
        (status = 400, description = "Invalid selection", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn set_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(lines): Json<Vec<CartLineInput>>,
) -> Result<impl IntoResponse, ServiceError> {
    let lines = state.services.cart.set_items(user.user_id, lines).await?;
    Ok(Json(ApiResponse::success(lines)))
}

/// Empty the caller's cart
#[utoipa::path(
    delete,
    path = "/api/v1/cart",
    responses(
        (status = 200, description = "Cart cleared"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.cart.clear(user.user_id).await?;
    Ok(Json(ApiResponse::<()>::message("Cart cleared")))
}
