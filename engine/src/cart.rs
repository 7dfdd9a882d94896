//! Shopping cart.

use crate::error::{RemoteResult, Result};
use crate::{
    CheckoutError, Clock, Collection, CollectionGateway, CollectionItem, CollectionKind,
    CommitOutcome, EventBus, LocalStore, Mutation, ProductSnapshot, Receipt, Reconciler,
    SessionListener, SyncState,
};
use std::sync::Arc;

/// The cart: products with quantities.
///
/// A thin typed view over a [`Reconciler`] of kind [`CollectionKind::Cart`].
/// Clones share the same cart.
#[derive(Debug, Clone)]
pub struct Cart {
    engine: Reconciler,
}

impl Cart {
    /// Create a cart hydrated from `store`.
    pub fn new(store: Arc<dyn LocalStore>, gateway: Arc<dyn CollectionGateway>, bus: EventBus) -> Self {
        Self {
            engine: Reconciler::new(CollectionKind::Cart, store, gateway, bus),
        }
    }

    /// Create a cart with an explicit clock.
    pub fn with_clock(
        store: Arc<dyn LocalStore>,
        gateway: Arc<dyn CollectionGateway>,
        bus: EventBus,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            engine: Reconciler::with_clock(CollectionKind::Cart, store, gateway, bus, clock),
        }
    }

    /// The underlying reconciler.
    pub fn engine(&self) -> &Reconciler {
        &self.engine
    }

    /// Listener to register with [`follow_session`](crate::follow_session).
    pub fn listener(&self) -> Arc<dyn SessionListener> {
        Arc::new(self.engine.clone())
    }

    /// Add `quantity` units of a product, bumping an existing line.
    pub async fn add(&self, product: ProductSnapshot, quantity: u32) -> Result<CommitOutcome> {
        let mutation = Mutation::add(product, quantity)?;
        Ok(self.engine.commit(mutation).await)
    }

    /// Add a single unit.
    pub async fn add_one(&self, product: ProductSnapshot) -> Result<CommitOutcome> {
        self.add(product, 1).await
    }

    /// Remove a product. Removing an absent product is not an error.
    pub async fn remove(&self, product_id: &str) -> Result<CommitOutcome> {
        let mutation = Mutation::remove(product_id)?;
        Ok(self.engine.commit(mutation).await)
    }

    /// Set the quantity of a line. Zero or less removes it.
    pub async fn update_quantity(&self, product_id: &str, quantity: i64) -> Result<CommitOutcome> {
        let mutation = Mutation::set_quantity(product_id, quantity)?;
        Ok(self.engine.commit(mutation).await)
    }

    /// Empty the cart locally.
    pub fn clear(&self) {
        self.engine.clear();
    }

    pub async fn refresh(&self) -> RemoteResult<()> {
        self.engine.refresh().await
    }

    /// Purchase everything in the cart.
    pub async fn checkout(&self) -> std::result::Result<Receipt, CheckoutError> {
        self.engine.checkout().await
    }

    pub fn snapshot(&self) -> Collection {
        self.engine.snapshot()
    }

    pub fn items(&self) -> Vec<CollectionItem> {
        self.engine.snapshot().into_items()
    }

    pub fn state(&self) -> SyncState {
        self.engine.state()
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.engine.contains(product_id)
    }

    /// Quantity of a product, `None` when not in the cart.
    pub fn quantity_of(&self, product_id: &str) -> Option<u32> {
        self.engine.get(product_id).map(|item| item.quantity)
    }

    /// Sum of quantities.
    pub fn total_items(&self) -> u64 {
        self.engine.total_items()
    }

    /// Sum of discounted line totals.
    pub fn total_price(&self) -> f64 {
        self.engine.total_price()
    }
}
