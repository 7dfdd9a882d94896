//! Remote collection gateway.
//!
//! The gateway is the typed transport to the server of record. It never
//! retries; the reconciler decides what a failure means.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpGateway;

use crate::error::RemoteResult;
use crate::{Collection, CollectionKind, RemoteError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Order identifier assigned by the server, `None` when nothing was bought
    pub order_id: Option<String>,
    pub purchased_count: u64,
    pub total_value: f64,
}

impl Receipt {
    /// A receipt for an empty purchase.
    pub fn empty() -> Self {
        Self {
            order_id: None,
            purchased_count: 0,
            total_value: 0.0,
        }
    }
}

/// Typed operations on the authoritative remote collection of one user.
#[async_trait]
pub trait CollectionGateway: Send + Sync + fmt::Debug {
    /// The collection kind this gateway serves.
    fn kind(&self) -> CollectionKind;

    /// Fetch the full remote collection.
    async fn list(&self, user_id: &str) -> RemoteResult<Collection>;

    /// Add a product, bumping the quantity when the remote cart has it.
    async fn add(&self, user_id: &str, product_id: &str, quantity: u32) -> RemoteResult<()>;

    /// Remove a product.
    async fn remove(&self, user_id: &str, product_id: &str) -> RemoteResult<()>;

    /// Set an absolute quantity. Cart only.
    async fn update_quantity(
        &self,
        _user_id: &str,
        _product_id: &str,
        _quantity: u32,
    ) -> RemoteResult<()> {
        Err(RemoteError::Unsupported {
            kind: self.kind(),
            operation: "update_quantity",
        })
    }

    /// Purchase the remote cart. Cart only.
    async fn checkout(&self, _user_id: &str) -> RemoteResult<Receipt> {
        Err(RemoteError::Unsupported {
            kind: self.kind(),
            operation: "checkout",
        })
    }
}
