//! Cart, wishlist and purchase routes.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::handlers::{
    handle_add_to_cart, handle_add_to_wishlist, handle_checkout, handle_clear_cart,
    handle_list_cart, handle_list_wishlist, handle_purchase_history, handle_remove_from_cart,
    handle_remove_from_wishlist, handle_update_cart_item, PurchaseQuery, UpdateOutcome,
};
use crate::AppState;
use basket_engine::wire::{
    AddCartItem, AddWishlistItem, CartItemRow, CartListing, CheckoutRequest, MessageResponse,
    OrderResponse, PurchaseHistory, UpdateCartItem, WishlistItemRow, WishlistListing,
};

/// Create user-states routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart/{user_id}", get(list_cart))
        .route("/cart/{user_id}/add", post(add_to_cart))
        .route("/cart/{user_id}/update/{item_id}", put(update_cart_item))
        .route("/cart/{user_id}/remove/{product_id}", delete(remove_from_cart))
        .route("/cart/{user_id}/clear", delete(clear_cart))
        .route("/wishlist/{user_id}", get(list_wishlist))
        .route("/wishlist/{user_id}/add", post(add_to_wishlist))
        .route("/wishlist/{user_id}/remove/{product_id}", delete(remove_from_wishlist))
        .route("/purchases/{user_id}", get(purchase_history))
        .route("/purchases/{user_id}/checkout", post(checkout))
}

/// GET /cart/{user_id}
async fn list_cart(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
) -> Json<CartListing> {
    Json(handle_list_cart(&state.db, &user_id))
}

/// POST /cart/{user_id}/add
async fn add_to_cart(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
    Json(request): Json<AddCartItem>,
) -> Result<Json<CartItemRow>> {
    Ok(Json(handle_add_to_cart(&state.db, &user_id, request)?))
}

/// PUT /cart/{user_id}/update/{item_id}
async fn update_cart_item(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((user_id, item_id)): Path<(String, i64)>,
    Json(request): Json<UpdateCartItem>,
) -> Result<Json<UpdateOutcome>> {
    Ok(Json(handle_update_cart_item(&state.db, &user_id, item_id, request)?))
}

/// DELETE /cart/{user_id}/remove/{product_id}
async fn remove_from_cart(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((user_id, product_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    Ok(Json(handle_remove_from_cart(&state.db, &user_id, &product_id)?))
}

/// DELETE /cart/{user_id}/clear
async fn clear_cart(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
) -> Json<MessageResponse> {
    Json(handle_clear_cart(&state.db, &user_id))
}

/// GET /wishlist/{user_id}
async fn list_wishlist(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
) -> Json<WishlistListing> {
    Json(handle_list_wishlist(&state.db, &user_id))
}

/// POST /wishlist/{user_id}/add
async fn add_to_wishlist(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
    Json(request): Json<AddWishlistItem>,
) -> Result<Json<WishlistItemRow>> {
    Ok(Json(handle_add_to_wishlist(&state.db, &user_id, request)?))
}

/// DELETE /wishlist/{user_id}/remove/{product_id}
async fn remove_from_wishlist(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((user_id, product_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    Ok(Json(handle_remove_from_wishlist(&state.db, &user_id, &product_id)?))
}

/// GET /purchases/{user_id}
async fn purchase_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
    Query(query): Query<PurchaseQuery>,
) -> Result<Json<PurchaseHistory>> {
    Ok(Json(handle_purchase_history(&state.db, &user_id, query)?))
}

/// POST /purchases/{user_id}/checkout
async fn checkout(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<OrderResponse>> {
    Ok(Json(handle_checkout(&state.db, &user_id, request)?))
}
