//! Catalog routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::auth::AuthUser;
use crate::db::Product;
use crate::error::Result;
use crate::handlers::{handle_get_product, handle_upsert_product};
use crate::AppState;

/// Create catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", post(upsert_product))
        .route("/api/products/{product_id}", get(get_product))
}

/// GET /api/products/{product_id}
async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>> {
    Ok(Json(handle_get_product(&state.db, &product_id)?))
}

/// POST /api/products
async fn upsert_product(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(product): Json<Product>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = handle_upsert_product(&state.db, product)?;
    Ok((StatusCode::CREATED, Json(product)))
}
