//! Cart handlers.

use crate::db::Database;
use crate::error::{AppError, Result};
use basket_engine::wire::{AddCartItem, CartItemRow, CartListing, MessageResponse, UpdateCartItem};
use serde::Serialize;

/// Largest quantity accepted in a single add or update.
pub const MAX_QUANTITY: u32 = 100;

/// Response of a cart row update.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UpdateOutcome {
    Updated(CartItemRow),
    Removed(MessageResponse),
}

pub(crate) fn check_product_id(product_id: &str) -> Result<()> {
    if product_id.trim().is_empty() {
        return Err(AppError::BadRequest("product_id must not be empty".to_string()));
    }
    Ok(())
}

/// List the cart.
pub fn handle_list_cart(db: &Database, user_id: &str) -> CartListing {
    db.list_cart(user_id)
}

/// Add to the cart.
pub fn handle_add_to_cart(db: &Database, user_id: &str, request: AddCartItem) -> Result<CartItemRow> {
    check_product_id(&request.product_id)?;
    if !(1..=MAX_QUANTITY).contains(&request.quantity) {
        return Err(AppError::BadRequest(format!(
            "quantity must be between 1 and {MAX_QUANTITY}"
        )));
    }
    Ok(db.add_to_cart(user_id, &request.product_id, request.quantity)?)
}

/// Set a row's quantity; zero removes the row.
pub fn handle_update_cart_item(
    db: &Database,
    user_id: &str,
    item_id: i64,
    request: UpdateCartItem,
) -> Result<UpdateOutcome> {
    if request.quantity > MAX_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "quantity must be between 0 and {MAX_QUANTITY}"
        )));
    }

    let outcome = match db.update_cart_item(user_id, item_id, request.quantity)? {
        Some(row) => UpdateOutcome::Updated(row),
        None => UpdateOutcome::Removed(MessageResponse {
            message: "Item removed from cart".to_string(),
            cleared: None,
        }),
    };
    Ok(outcome)
}

/// Remove a product from the cart.
pub fn handle_remove_from_cart(db: &Database, user_id: &str, product_id: &str) -> Result<MessageResponse> {
    db.remove_from_cart(user_id, product_id)?;
    Ok(MessageResponse {
        message: "Item removed from cart".to_string(),
        cleared: None,
    })
}

/// Empty the cart.
pub fn handle_clear_cart(db: &Database, user_id: &str) -> MessageResponse {
    let cleared = db.clear_cart(user_id);
    MessageResponse {
        message: format!("Cleared {cleared} items from cart"),
        cleared: Some(cleared),
    }
}
