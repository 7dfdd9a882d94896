//! Wishlist handlers.

use super::check_product_id;
use crate::db::Database;
use crate::error::Result;
use basket_engine::wire::{AddWishlistItem, MessageResponse, WishlistItemRow, WishlistListing};

pub fn handle_list_wishlist(db: &Database, user_id: &str) -> WishlistListing {
    db.list_wishlist(user_id)
}

/// Add to the wishlist. Products already present are rejected.
pub fn handle_add_to_wishlist(
    db: &Database,
    user_id: &str,
    request: AddWishlistItem,
) -> Result<WishlistItemRow> {
    check_product_id(&request.product_id)?;
    Ok(db.add_to_wishlist(user_id, &request.product_id)?)
}

pub fn handle_remove_from_wishlist(
    db: &Database,
    user_id: &str,
    product_id: &str,
) -> Result<MessageResponse> {
    db.remove_from_wishlist(user_id, product_id)?;
    Ok(MessageResponse {
        message: "Item removed from wishlist".to_string(),
        cleared: None,
    })
}
