//! Operations on the cart, wishlist, purchase and product tables.

use super::{CartRow, Database, DbError, Product, PurchaseRecord, WishlistRow};
use basket_engine::wire::{
    CartItemRow, CartListing, OrderResponse, PurchaseHistory, WishlistItemRow, WishlistListing,
};
use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

/// Payment method recorded when the client sends none.
pub const DEFAULT_PAYMENT_METHOD: &str = "credit_card";

/// Payment status recorded when the client sends none.
pub const DEFAULT_PAYMENT_STATUS: &str = "completed";

fn line_total(price: f64, discount_percent: f64, quantity: u32) -> f64 {
    price * (1.0 - discount_percent.clamp(0.0, 100.0) / 100.0) * f64::from(quantity)
}

impl Database {
    /// Insert or replace a catalog product.
    pub fn upsert_product(&self, product: Product) -> Product {
        self.products
            .insert(product.product_id.clone(), product.clone());
        product
    }

    /// Get a catalog product.
    pub fn get_product(&self, product_id: &str) -> Result<Product, DbError> {
        self.products
            .get(product_id)
            .map(|p| p.clone())
            .ok_or_else(|| DbError::ProductNotFound(product_id.to_string()))
    }

    /// Number of catalog products.
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    // ------------------------------------------------------------------
    // Cart
    // ------------------------------------------------------------------

    /// List a user's cart, newest first.
    pub fn list_cart(&self, user_id: &str) -> CartListing {
        let rows = self
            .carts
            .get(user_id)
            .map(|rows| rows.clone())
            .unwrap_or_default();

        let mut items: Vec<CartItemRow> = rows
            .iter()
            .filter_map(|row| match self.products.get(&row.product_id) {
                Some(product) => Some(row.joined(user_id, &product)),
                None => {
                    tracing::warn!(%user_id, product_id = %row.product_id, "cart row without catalog product");
                    None
                }
            })
            .collect();
        items.sort_by(|a, b| b.added_at.cmp(&a.added_at).then(b.id.cmp(&a.id)));

        let total_items: u64 = items.iter().map(|i| u64::from(i.quantity)).sum();
        let total_price: f64 = items
            .iter()
            .map(|i| line_total(i.product_price, i.product_discount_percent, i.quantity))
            .sum();

        CartListing {
            items,
            total_items,
            total_price,
        }
    }

    /// Add a product to the cart, bumping the quantity when present.
    pub fn add_to_cart(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> Result<CartItemRow, DbError> {
        let product = self.get_product(product_id)?;
        let now = Utc::now();
        let mut cart = self.carts.entry(user_id.to_string()).or_default();

        let row = match cart.iter().position(|r| r.product_id == product_id) {
            Some(index) => {
                let row = &mut cart[index];
                row.quantity = row.quantity.saturating_add(quantity);
                row.updated_at = now;
                tracing::info!(%user_id, %product_id, quantity = row.quantity, "updated cart quantity");
                row.clone()
            }
            None => {
                let row = CartRow {
                    id: self.next_id(),
                    product_id: product_id.to_string(),
                    quantity,
                    added_at: now,
                    updated_at: now,
                };
                cart.push(row.clone());
                tracing::info!(%user_id, %product_id, quantity, "added cart item");
                row
            }
        };

        Ok(row.joined(user_id, &product))
    }

    /// Set the quantity of a cart row. Zero deletes it and returns `None`.
    pub fn update_cart_item(
        &self,
        user_id: &str,
        item_id: i64,
        quantity: u32,
    ) -> Result<Option<CartItemRow>, DbError> {
        let mut cart = self
            .carts
            .get_mut(user_id)
            .ok_or(DbError::ItemNotFound("Cart item not found"))?;
        let index = cart
            .iter()
            .position(|r| r.id == item_id)
            .ok_or(DbError::ItemNotFound("Cart item not found"))?;

        if quantity == 0 {
            let removed = cart.remove(index);
            tracing::info!(%user_id, product_id = %removed.product_id, "removed cart item");
            return Ok(None);
        }

        let row = &mut cart[index];
        row.quantity = quantity;
        row.updated_at = Utc::now();
        let row = row.clone();
        drop(cart);

        let product = self.get_product(&row.product_id)?;
        Ok(Some(row.joined(user_id, &product)))
    }

    /// Remove a product from the cart.
    pub fn remove_from_cart(&self, user_id: &str, product_id: &str) -> Result<(), DbError> {
        let mut cart = self
            .carts
            .get_mut(user_id)
            .ok_or(DbError::ItemNotFound("Item not found in cart"))?;
        let before = cart.len();
        cart.retain(|r| r.product_id != product_id);
        if cart.len() == before {
            return Err(DbError::ItemNotFound("Item not found in cart"));
        }
        tracing::info!(%user_id, %product_id, "removed cart item");
        Ok(())
    }

    /// Empty the cart. Returns the number of rows removed.
    pub fn clear_cart(&self, user_id: &str) -> u64 {
        let cleared = self
            .carts
            .remove(user_id)
            .map(|(_, rows)| rows.len() as u64)
            .unwrap_or(0);
        tracing::info!(%user_id, cleared, "cleared cart");
        cleared
    }

    // ------------------------------------------------------------------
    // Wishlist
    // ------------------------------------------------------------------

    /// List a user's wishlist, newest first.
    pub fn list_wishlist(&self, user_id: &str) -> WishlistListing {
        let rows = self
            .wishlists
            .get(user_id)
            .map(|rows| rows.clone())
            .unwrap_or_default();

        let mut items: Vec<WishlistItemRow> = rows
            .iter()
            .filter_map(|row| {
                self.products
                    .get(&row.product_id)
                    .map(|product| row.joined(user_id, &product))
            })
            .collect();
        items.sort_by(|a, b| b.added_at.cmp(&a.added_at).then(b.id.cmp(&a.id)));

        WishlistListing {
            total_items: items.len() as u64,
            items,
        }
    }

    /// Add a product to the wishlist.
    pub fn add_to_wishlist(&self, user_id: &str, product_id: &str) -> Result<WishlistItemRow, DbError> {
        let product = self.get_product(product_id)?;
        let mut wishlist = self.wishlists.entry(user_id.to_string()).or_default();
        if wishlist.iter().any(|r| r.product_id == product_id) {
            return Err(DbError::AlreadyInWishlist);
        }

        let row = WishlistRow {
            id: self.next_id(),
            product_id: product_id.to_string(),
            added_at: Utc::now(),
        };
        wishlist.push(row.clone());
        tracing::info!(%user_id, %product_id, "added wishlist item");
        Ok(row.joined(user_id, &product))
    }

    /// Remove a product from the wishlist.
    pub fn remove_from_wishlist(&self, user_id: &str, product_id: &str) -> Result<(), DbError> {
        let mut wishlist = self
            .wishlists
            .get_mut(user_id)
            .ok_or(DbError::ItemNotFound("Item not found in wishlist"))?;
        let before = wishlist.len();
        wishlist.retain(|r| r.product_id != product_id);
        if wishlist.len() == before {
            return Err(DbError::ItemNotFound("Item not found in wishlist"));
        }
        tracing::info!(%user_id, %product_id, "removed wishlist item");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Purchases
    // ------------------------------------------------------------------

    /// Page through a user's purchases, newest first.
    ///
    /// `total_spent` and `orders` cover the whole history, not just the page.
    pub fn purchase_history(&self, user_id: &str, limit: usize, offset: usize) -> PurchaseHistory {
        let mut records = self
            .purchases
            .get(user_id)
            .map(|rows| rows.clone())
            .unwrap_or_default();
        records.sort_by(|a, b| {
            b.purchased_at
                .cmp(&a.purchased_at)
                .then(b.id.cmp(&a.id))
        });

        let total_spent: f64 = records.iter().map(|r| r.total_price).sum();
        let orders = records
            .iter()
            .map(|r| r.order_id.as_str())
            .collect::<HashSet<_>>()
            .len() as u64;

        let items: Vec<_> = records
            .iter()
            .skip(offset)
            .take(limit)
            .map(|r| r.to_row(user_id))
            .collect();

        PurchaseHistory {
            total_items: items.len() as u64,
            items,
            total_spent,
            orders,
        }
    }

    /// Move the stored cart into purchase history under a new order.
    ///
    /// An empty cart yields an order with nothing purchased. Prices are the
    /// discounted catalog prices at checkout time. Nothing changes when a
    /// cart product has left the catalog.
    pub fn checkout(
        &self,
        user_id: &str,
        payment_method: Option<String>,
        payment_status: Option<String>,
    ) -> Result<OrderResponse, DbError> {
        let order_id = Uuid::new_v4().to_string();
        let payment_method = payment_method.unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());
        let payment_status = payment_status.unwrap_or_else(|| DEFAULT_PAYMENT_STATUS.to_string());

        let mut cart = match self.carts.get_mut(user_id) {
            Some(cart) if !cart.is_empty() => cart,
            _ => {
                return Ok(OrderResponse {
                    order_id,
                    user_id: user_id.to_string(),
                    purchased_count: 0,
                    total_amount: 0.0,
                    payment_method,
                    payment_status,
                    created_at: None,
                })
            }
        };

        let now = Utc::now();
        let mut records = Vec::with_capacity(cart.len());
        for row in cart.iter() {
            let product = self.get_product(&row.product_id)?;
            let unit_price = product.discounted_price();
            records.push(PurchaseRecord {
                id: self.next_id(),
                product_id: row.product_id.clone(),
                product_name: product.name,
                product_image: product.image_url,
                quantity: row.quantity,
                unit_price,
                total_price: unit_price * f64::from(row.quantity),
                order_id: order_id.clone(),
                purchased_at: now,
                payment_method: payment_method.clone(),
                payment_status: payment_status.clone(),
            });
        }
        cart.clear();
        drop(cart);

        let purchased_count: u64 = records.iter().map(|r| u64::from(r.quantity)).sum();
        let total_amount: f64 = records.iter().map(|r| r.total_price).sum();
        self.purchases
            .entry(user_id.to_string())
            .or_default()
            .extend(records);

        tracing::info!(%user_id, %order_id, purchased_count, total_amount, "processed checkout");
        Ok(OrderResponse {
            order_id,
            user_id: user_id.to_string(),
            purchased_count,
            total_amount,
            payment_method,
            payment_status,
            created_at: Some(now),
        })
    }
}
