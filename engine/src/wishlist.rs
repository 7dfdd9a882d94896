//! Wishlist and the wishlist-to-cart move.

use crate::error::{RemoteResult, Result};
use crate::{
    Cart, Clock, Collection, CollectionGateway, CollectionItem, CollectionKind, CommitOutcome,
    EventBus, LocalStore, Mutation, ProductSnapshot, Reconciler, SessionListener, SyncState,
};
use std::sync::Arc;

/// Result of [`Wishlist::move_to_cart`].
///
/// Both halves are committed independently, so the remote side may end up
/// with only one of them applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Outcome of adding to the cart
    pub cart: CommitOutcome,
    /// Outcome of removing from the wishlist
    pub wishlist: CommitOutcome,
}

impl MoveOutcome {
    /// Whether exactly one half reached the server.
    pub fn is_partial(&self) -> bool {
        matches!(
            (&self.cart, &self.wishlist),
            (CommitOutcome::Synced, CommitOutcome::Degraded(_))
                | (CommitOutcome::Degraded(_), CommitOutcome::Synced)
        )
    }

    /// Whether both halves reached the server.
    pub fn is_synced(&self) -> bool {
        self.cart.is_synced() && self.wishlist.is_synced()
    }
}

/// The wishlist: a set of products.
///
/// A thin typed view over a [`Reconciler`] of kind
/// [`CollectionKind::Wishlist`]. Clones share the same wishlist.
#[derive(Debug, Clone)]
pub struct Wishlist {
    engine: Reconciler,
}

impl Wishlist {
    /// Create a wishlist hydrated from `store`.
    pub fn new(store: Arc<dyn LocalStore>, gateway: Arc<dyn CollectionGateway>, bus: EventBus) -> Self {
        Self {
            engine: Reconciler::new(CollectionKind::Wishlist, store, gateway, bus),
        }
    }

    /// Create a wishlist with an explicit clock.
    pub fn with_clock(
        store: Arc<dyn LocalStore>,
        gateway: Arc<dyn CollectionGateway>,
        bus: EventBus,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            engine: Reconciler::with_clock(CollectionKind::Wishlist, store, gateway, bus, clock),
        }
    }

    pub fn engine(&self) -> &Reconciler {
        &self.engine
    }

    /// Listener to register with [`follow_session`](crate::follow_session).
    pub fn listener(&self) -> Arc<dyn SessionListener> {
        Arc::new(self.engine.clone())
    }

    /// Add a product. Adding a product already present changes nothing.
    pub async fn add(&self, product: ProductSnapshot) -> Result<CommitOutcome> {
        let mutation = Mutation::add(product, 1)?;
        Ok(self.engine.commit(mutation).await)
    }

    /// Remove a product. Removing an absent product is not an error.
    pub async fn remove(&self, product_id: &str) -> Result<CommitOutcome> {
        let mutation = Mutation::remove(product_id)?;
        Ok(self.engine.commit(mutation).await)
    }

    /// Empty the wishlist locally.
    pub fn clear(&self) {
        self.engine.clear();
    }

    pub async fn refresh(&self) -> RemoteResult<()> {
        self.engine.refresh().await
    }

    /// Move a product into `cart`: add it there, then drop it from here.
    ///
    /// Each half degrades on its own. The local wishlist removal always
    /// happens, even when the cart add could not reach the server.
    pub async fn move_to_cart(
        &self,
        cart: &Cart,
        product: ProductSnapshot,
        quantity: u32,
    ) -> Result<MoveOutcome> {
        let remove = Mutation::remove(product.product_id.clone())?;
        let add = Mutation::add(product, quantity)?;
        let product_id = add.product_id().to_string();

        let cart_outcome = cart.engine().commit(add).await;
        let wishlist_outcome = self.engine.commit(remove).await;

        let outcome = MoveOutcome {
            cart: cart_outcome,
            wishlist: wishlist_outcome,
        };
        if outcome.is_partial() {
            tracing::warn!(
                %product_id,
                cart = ?outcome.cart,
                wishlist = ?outcome.wishlist,
                "move to cart only partially reached the server"
            );
        }
        Ok(outcome)
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

    /// Number of products.
    pub fn total_items(&self) -> u64 {
        self.engine.total_items()
    }

    pub fn total_price(&self) -> f64 {
        self.engine.total_price()
    }
}
