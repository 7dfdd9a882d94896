//! Catalog handlers.

use super::check_product_id;
use crate::db::{Database, Product};
use crate::error::{AppError, Result};

pub fn handle_get_product(db: &Database, product_id: &str) -> Result<Product> {
    db.get_product(product_id)
        .map_err(|_| AppError::NotFound(format!("Product {product_id} not found")))
}

/// Insert or replace a catalog product.
pub fn handle_upsert_product(db: &Database, product: Product) -> Result<Product> {
    check_product_id(&product.product_id)?;
    if product.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    if !product.price.is_finite() || product.price < 0.0 {
        return Err(AppError::BadRequest("price must be a non-negative number".to_string()));
    }
    if !(0.0..=100.0).contains(&product.discount_percent) {
        return Err(AppError::BadRequest(
            "discount_percent must be between 0 and 100".to_string(),
        ));
    }
    tracing::info!(product_id = %product.product_id, "upserted product");
    Ok(db.upsert_product(product))
}
