//! Wire types of the user-states REST API.
//!
//! Shared by the HTTP gateway and `basket-server`. Field names are
//! snake_case to match the API.

use crate::{Collection, CollectionItem, CollectionKind, ProductId, Receipt, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn to_millis(at: DateTime<Utc>) -> u64 {
    u64::try_from(at.timestamp_millis()).unwrap_or(0)
}

/// A cart row joined with its product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItemRow {
    pub id: i64,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub product_name: String,
    pub product_price: f64,
    #[serde(default)]
    pub product_discount_percent: f64,
    #[serde(default)]
    pub product_image: Option<String>,
}

impl From<CartItemRow> for CollectionItem {
    fn from(row: CartItemRow) -> Self {
        CollectionItem {
            product_id: row.product_id,
            name: row.product_name,
            price: row.product_price,
            discount_percent: row.product_discount_percent,
            image_url: row.product_image,
            quantity: row.quantity,
            added_at: to_millis(row.updated_at.max(row.added_at)),
        }
    }
}

/// Response of `GET /cart/{user_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartListing {
    pub items: Vec<CartItemRow>,
    pub total_items: u64,
    pub total_price: f64,
}

impl CartListing {
    /// Convert into an engine collection.
    pub fn into_collection(self) -> Collection {
        Collection::from_items(
            CollectionKind::Cart,
            self.items.into_iter().map(CollectionItem::from),
        )
    }
}

/// A wishlist row joined with its product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItemRow {
    pub id: i64,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub added_at: DateTime<Utc>,
    pub product_name: String,
    pub product_price: f64,
    #[serde(default)]
    pub product_discount_percent: f64,
    #[serde(default)]
    pub product_image: Option<String>,
}

impl From<WishlistItemRow> for CollectionItem {
    fn from(row: WishlistItemRow) -> Self {
        CollectionItem {
            product_id: row.product_id,
            name: row.product_name,
            price: row.product_price,
            discount_percent: row.product_discount_percent,
            image_url: row.product_image,
            quantity: 1,
            added_at: to_millis(row.added_at),
        }
    }
}

/// Response of `GET /wishlist/{user_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistListing {
    pub items: Vec<WishlistItemRow>,
    pub total_items: u64,
}

impl WishlistListing {
    /// Convert into an engine collection.
    pub fn into_collection(self) -> Collection {
        Collection::from_items(
            CollectionKind::Wishlist,
            self.items.into_iter().map(CollectionItem::from),
        )
    }
}

/// Body of `POST /cart/{user_id}/add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `PUT /cart/{user_id}/update/{item_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCartItem {
    pub quantity: u32,
}

/// Body of `POST /wishlist/{user_id}/add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddWishlistItem {
    pub product_id: ProductId,
}

/// Body of `POST /purchases/{user_id}/checkout`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,
}

/// Response of a checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub user_id: UserId,
    pub purchased_count: u64,
    pub total_amount: f64,
    pub payment_method: String,
    pub payment_status: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<OrderResponse> for Receipt {
    fn from(order: OrderResponse) -> Self {
        Receipt {
            order_id: Some(order.order_id),
            purchased_count: order.purchased_count,
            total_value: order.total_amount,
        }
    }
}

/// A purchase history row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRow {
    pub id: i64,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
    pub order_id: String,
    pub purchased_at: DateTime<Utc>,
    pub payment_method: String,
    pub payment_status: String,
    pub product_name: String,
    #[serde(default)]
    pub product_image: Option<String>,
}

/// Response of `GET /purchases/{user_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseHistory {
    pub items: Vec<PurchaseRow>,
    pub total_items: u64,
    pub total_spent: f64,
    /// Number of distinct orders
    pub orders: u64,
}

/// Generic acknowledgement body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleared: Option<u64>,
}

/// Error body returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn cart_row(id: i64, product_id: &str, quantity: u32) -> CartItemRow {
        CartItemRow {
            id,
            user_id: "u1".into(),
            product_id: product_id.into(),
            quantity,
            added_at: at(10),
            updated_at: at(20),
            product_name: "Mug".into(),
            product_price: 10.0,
            product_discount_percent: 10.0,
            product_image: None,
        }
    }

    #[test]
    fn cart_listing_into_collection() {
        let listing = CartListing {
            items: vec![cart_row(1, "p1", 2), cart_row(2, "p2", 1)],
            total_items: 3,
            total_price: 30.0,
        };

        let cart = listing.into_collection();
        assert_eq!(cart.kind(), CollectionKind::Cart);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), 27.0);
        assert_eq!(cart.get("p1").unwrap().added_at, 20_000);
    }

    #[test]
    fn wishlist_listing_into_collection() {
        let listing = WishlistListing {
            items: vec![WishlistItemRow {
                id: 7,
                user_id: "u1".into(),
                product_id: "p9".into(),
                added_at: at(5),
                product_name: "Lamp".into(),
                product_price: 40.0,
                product_discount_percent: 0.0,
                product_image: Some("https://cdn/p9.png".into()),
            }],
            total_items: 1,
        };

        let wishlist = listing.into_collection();
        assert_eq!(wishlist.kind(), CollectionKind::Wishlist);
        let item = wishlist.get("p9").unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.added_at, 5_000);
    }

    #[test]
    fn checkout_request_omits_empty_fields() {
        let json = serde_json::to_string(&CheckoutRequest::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn order_into_receipt() {
        let order = OrderResponse {
            order_id: "o1".into(),
            user_id: "u1".into(),
            purchased_count: 3,
            total_amount: 42.5,
            payment_method: "credit_card".into(),
            payment_status: "completed".into(),
            created_at: None,
        };
        let receipt = Receipt::from(order);
        assert_eq!(receipt.order_id.as_deref(), Some("o1"));
        assert_eq!(receipt.purchased_count, 3);
        assert_eq!(receipt.total_value, 42.5);
    }
}
