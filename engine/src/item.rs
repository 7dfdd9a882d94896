//! Item types held by carts and wishlists.

use crate::{ProductId, Timestamp};
use serde::{Deserialize, Serialize};

/// Catalog fields captured when a product is added to a collection.
///
/// The snapshot is denormalized into the item and never refreshed from the
/// catalog afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub product_id: ProductId,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub discount_percent: f64,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductSnapshot {
    /// Create a snapshot with no discount and no image.
    pub fn new(product_id: impl Into<ProductId>, name: impl Into<String>, price: f64) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            price,
            discount_percent: 0.0,
            image_url: None,
        }
    }

    /// Set the discount, in percent.
    pub fn with_discount(mut self, discount_percent: f64) -> Self {
        self.discount_percent = discount_percent;
        self
    }

    /// Set the image URL.
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

fn one() -> u32 {
    1
}

/// An entry in a cart or wishlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItem {
    /// Unique within a collection
    pub product_id: ProductId,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub discount_percent: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Always at least 1; wishlist items are implicitly 1
    #[serde(default = "one")]
    pub quantity: u32,
    /// Most recent insertion or quantity bump (milliseconds since epoch)
    pub added_at: Timestamp,
}

impl CollectionItem {
    /// Create an item from a catalog snapshot.
    pub fn from_snapshot(product: ProductSnapshot, quantity: u32, added_at: Timestamp) -> Self {
        Self {
            product_id: product.product_id,
            name: product.name,
            price: product.price,
            discount_percent: product.discount_percent,
            image_url: product.image_url,
            quantity,
            added_at,
        }
    }

    /// Unit price after discount. Discounts outside 0..=100 are clamped.
    pub fn discounted_price(&self) -> f64 {
        let discount = self.discount_percent.clamp(0.0, 100.0);
        self.price * (1.0 - discount / 100.0)
    }

    /// Discounted price times quantity.
    pub fn line_total(&self) -> f64 {
        self.discounted_price() * f64::from(self.quantity)
    }

    /// Increase the quantity and refresh the timestamp.
    pub fn bump(&mut self, by: u32, at: Timestamp) {
        self.quantity = self.quantity.saturating_add(by);
        self.added_at = at;
    }

    /// The catalog fields of this item.
    pub fn product(&self) -> ProductSnapshot {
        ProductSnapshot {
            product_id: self.product_id.clone(),
            name: self.name.clone(),
            price: self.price,
            discount_percent: self.discount_percent,
            image_url: self.image_url.clone(),
        }
    }
}
