//! Table rows and their joins with the catalog.

use basket_engine::wire::{CartItemRow, PurchaseRow, WishlistItemRow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub discount_percent: f64,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Product {
    /// Price after discount.
    pub fn discounted_price(&self) -> f64 {
        self.price * (1.0 - self.discount_percent.clamp(0.0, 100.0) / 100.0)
    }
}

/// A row of the cart table.
#[derive(Debug, Clone, PartialEq)]
pub struct CartRow {
    pub id: i64,
    pub product_id: String,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartRow {
    /// Join with the product for the API response.
    pub fn joined(&self, user_id: &str, product: &Product) -> CartItemRow {
        CartItemRow {
            id: self.id,
            user_id: user_id.to_string(),
            product_id: self.product_id.clone(),
            quantity: self.quantity,
            added_at: self.added_at,
            updated_at: self.updated_at,
            product_name: product.name.clone(),
            product_price: product.price,
            product_discount_percent: product.discount_percent,
            product_image: product.image_url.clone(),
        }
    }
}

/// A row of the wishlist table.
#[derive(Debug, Clone, PartialEq)]
pub struct WishlistRow {
    pub id: i64,
    pub product_id: String,
    pub added_at: DateTime<Utc>,
}

impl WishlistRow {
    pub fn joined(&self, user_id: &str, product: &Product) -> WishlistItemRow {
        WishlistItemRow {
            id: self.id,
            user_id: user_id.to_string(),
            product_id: self.product_id.clone(),
            added_at: self.added_at,
            product_name: product.name.clone(),
            product_price: product.price,
            product_discount_percent: product.discount_percent,
            product_image: product.image_url.clone(),
        }
    }
}

/// A row of the purchase history table. Prices are frozen at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRecord {
    pub id: i64,
    pub product_id: String,
    pub product_name: String,
    pub product_image: Option<String>,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
    pub order_id: String,
    pub purchased_at: DateTime<Utc>,
    pub payment_method: String,
    pub payment_status: String,
}

impl PurchaseRecord {
    pub fn to_row(&self, user_id: &str) -> PurchaseRow {
        PurchaseRow {
            id: self.id,
            user_id: user_id.to_string(),
            product_id: self.product_id.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            total_price: self.total_price,
            order_id: self.order_id.clone(),
            purchased_at: self.purchased_at,
            payment_method: self.payment_method.clone(),
            payment_status: self.payment_status.clone(),
            product_name: self.product_name.clone(),
            product_image: self.product_image.clone(),
        }
    }
}
