//! In-memory tables for the user-states API.
//!
//! Each user's cart, wishlist and purchase history is a row list keyed by
//! user id. Products are joined in at read time, so catalog updates show up
//! in listings immediately.

mod operations;
mod records;

pub use operations::*;
pub use records::*;

use dashmap::DashMap;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Product {0} not found")]
    ProductNotFound(String),

    #[error("{0}")]
    ItemNotFound(&'static str),

    #[error("Item already in wishlist")]
    AlreadyInWishlist,

    #[error("Failed to load catalog: {0}")]
    Catalog(String),
}

/// The server's tables.
#[derive(Debug)]
pub struct Database {
    products: DashMap<String, Product>,
    carts: DashMap<String, Vec<CartRow>>,
    wishlists: DashMap<String, Vec<WishlistRow>>,
    purchases: DashMap<String, Vec<PurchaseRecord>>,
    next_id: AtomicI64,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    /// Create empty tables.
    pub fn new() -> Self {
        Self {
            products: DashMap::new(),
            carts: DashMap::new(),
            wishlists: DashMap::new(),
            purchases: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Create tables with a pre-loaded catalog.
    pub fn with_catalog(products: impl IntoIterator<Item = Product>) -> Self {
        let db = Self::new();
        for product in products {
            db.upsert_product(product);
        }
        db
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// Read a JSON array of products from `path`.
pub fn load_catalog(path: &Path) -> Result<Vec<Product>, DbError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| DbError::Catalog(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw).map_err(|e| DbError::Catalog(format!("{}: {e}", path.display())))
}
