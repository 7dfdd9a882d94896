//! Reconciliation between the local collection and the server of record.
//!
//! A [`Reconciler`] owns one collection. Every change is committed in two
//! phases:
//!
//! 1. Apply the [`Mutation`] locally, recompute aggregates, persist the
//!    snapshot and publish the change event. This finishes before the first
//!    suspension point, so the change is visible immediately.
//! 2. When a session is active, send the mutation to the gateway. On success
//!    the remote listing replaces local state; on failure the local change
//!    stays and the outcome is [`CommitOutcome::Degraded`].
//!
//! Sign-in and sign-out bump a session generation. Remote listings fetched
//! under an older generation are discarded, so a resync that completes after
//! logout never resurrects the previous user's items.

use crate::clock::SystemClock;
use crate::error::RemoteResult;
use crate::snapshot::{discard_collection, load_collection, persist_collection};
use crate::{
    BusEvent, CheckoutError, Clock, Collection, CollectionGateway, CollectionItem, CollectionKind,
    EventBus, LocalStore, Mutation, Receipt, RemoteError, SessionListener, Subscription, UserId,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Synchronization mode of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncState {
    /// No session; changes are local only
    #[default]
    Guest,
    /// Signed in, waiting for the first remote listing
    Syncing,
    /// Signed in and mirroring the remote collection
    Authenticated,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncState::Guest => "guest",
            SyncState::Syncing => "syncing",
            SyncState::Authenticated => "authenticated",
        };
        f.write_str(name)
    }
}

/// What happened to a committed mutation beyond the local apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Applied locally; nothing was sent
    LocalOnly,
    /// Committed remotely
    Synced,
    /// The remote call failed; the local change stands
    Degraded(RemoteError),
}

impl CommitOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, CommitOutcome::Synced)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, CommitOutcome::Degraded(_))
    }

    /// The remote failure, if the commit degraded.
    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            CommitOutcome::Degraded(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: SyncState,
    user_id: Option<UserId>,
    generation: u64,
    collection: Collection,
}

struct Shared {
    kind: CollectionKind,
    inner: Mutex<Inner>,
    store: Arc<dyn LocalStore>,
    gateway: Arc<dyn CollectionGateway>,
    bus: EventBus,
    clock: Arc<dyn Clock>,
    _session_end: Subscription,
}

/// Owner of one collection.
///
/// Cheap to clone; clones share the same collection. The reconciler resets
/// itself to guest mode whenever [`BusEvent::SessionEnded`] is published on
/// its bus.
#[derive(Clone)]
pub struct Reconciler {
    shared: Arc<Shared>,
}

impl Reconciler {
    /// Create a reconciler, hydrating from `store`.
    pub fn new(
        kind: CollectionKind,
        store: Arc<dyn LocalStore>,
        gateway: Arc<dyn CollectionGateway>,
        bus: EventBus,
    ) -> Self {
        Self::with_clock(kind, store, gateway, bus, Arc::new(SystemClock))
    }

    /// Create a reconciler reading time from `clock`.
    pub fn with_clock(
        kind: CollectionKind,
        store: Arc<dyn LocalStore>,
        gateway: Arc<dyn CollectionGateway>,
        bus: EventBus,
        clock: Arc<dyn Clock>,
    ) -> Self {
        if gateway.kind() != kind {
            tracing::warn!(%kind, gateway = %gateway.kind(), "gateway serves a different collection kind");
        }

        let collection = load_collection(&*store, kind).unwrap_or_else(|| Collection::new(kind));
        tracing::debug!(%kind, items = collection.len(), "hydrated collection");

        let shared = Arc::new_cyclic(|weak: &Weak<Shared>| {
            let weak = weak.clone();
            let session_end = bus.subscribe(BusEvent::SessionEnded, move |_| {
                if let Some(shared) = weak.upgrade() {
                    Reconciler { shared }.end_session();
                }
            });

            Shared {
                kind,
                inner: Mutex::new(Inner {
                    state: SyncState::Guest,
                    user_id: None,
                    generation: 0,
                    collection,
                }),
                store,
                gateway,
                bus: bus.clone(),
                clock,
                _session_end: session_end,
            }
        });

        Self { shared }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, collection: &Collection) {
        persist_collection(&*self.shared.store, collection);
    }

    fn publish(&self) {
        self.shared.bus.publish(self.shared.kind.change_event());
    }

    pub fn kind(&self) -> CollectionKind {
        self.shared.kind
    }

    pub fn state(&self) -> SyncState {
        self.lock().state
    }

    /// The signed-in account this collection belongs to.
    pub fn user_id(&self) -> Option<UserId> {
        self.lock().user_id.clone()
    }

    /// Clone of the current collection.
    pub fn snapshot(&self) -> Collection {
        self.lock().collection.clone()
    }

    pub fn get(&self, product_id: &str) -> Option<CollectionItem> {
        self.lock().collection.get(product_id).cloned()
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.lock().collection.contains(product_id)
    }

    pub fn total_items(&self) -> u64 {
        self.lock().collection.total_items()
    }

    pub fn total_price(&self) -> f64 {
        self.lock().collection.total_price()
    }

    /// Commit a mutation.
    ///
    /// Remote calls are skipped for changes the server would reject as
    /// redundant: adding a product already on the wishlist, or setting the
    /// quantity of a product the collection does not hold.
    pub async fn commit(&self, mutation: Mutation) -> CommitOutcome {
        let target = {
            let mut inner = self.lock();
            let was_present = inner.collection.contains(mutation.product_id());
            let now = self.shared.clock.now();
            inner.collection.apply(&mutation, now);
            self.persist(&inner.collection);

            let needs_remote = match &mutation {
                Mutation::Add { .. } => self.shared.kind.tracks_quantity() || !was_present,
                Mutation::Remove { .. } => true,
                Mutation::SetQuantity { .. } => was_present,
            };
            match (inner.state, inner.user_id.clone()) {
                (SyncState::Authenticated, Some(user_id)) if needs_remote => {
                    Some((user_id, inner.generation))
                }
                _ => None,
            }
        };
        self.publish();

        let Some((user_id, generation)) = target else {
            return CommitOutcome::LocalOnly;
        };

        match self.send(&user_id, &mutation).await {
            Ok(()) => {
                if let Err(e) = self.resync(&user_id, generation).await {
                    tracing::warn!(kind = %self.kind(), error = %e, "resync after commit failed");
                }
                CommitOutcome::Synced
            }
            Err(e) => {
                tracing::warn!(
                    kind = %self.kind(),
                    operation = mutation.name(),
                    product_id = %mutation.product_id(),
                    error = %e,
                    "remote commit failed, keeping local change"
                );
                CommitOutcome::Degraded(e)
            }
        }
    }

    async fn send(&self, user_id: &str, mutation: &Mutation) -> RemoteResult<()> {
        let gateway = &self.shared.gateway;
        match mutation {
            Mutation::Add { product, quantity } => {
                gateway.add(user_id, &product.product_id, *quantity).await
            }
            Mutation::Remove { product_id } => match gateway.remove(user_id, product_id).await {
                // Already gone remotely.
                Err(e) if e.is_status(404) => Ok(()),
                result => result,
            },
            Mutation::SetQuantity {
                product_id,
                quantity,
            } => gateway.update_quantity(user_id, product_id, *quantity).await,
        }
    }

    async fn resync(&self, user_id: &str, generation: u64) -> RemoteResult<()> {
        let remote = self.shared.gateway.list(user_id).await?;
        self.apply_remote(remote, generation);
        Ok(())
    }

    /// Replace local state with a remote listing fetched under `generation`.
    ///
    /// Returns `false` when the session changed while the listing was in
    /// flight; the listing is then dropped.
    fn apply_remote(&self, remote: Collection, generation: u64) -> bool {
        {
            let mut inner = self.lock();
            if inner.generation != generation || inner.state == SyncState::Guest {
                tracing::debug!(
                    kind = %self.kind(),
                    generation,
                    current = inner.generation,
                    "discarding stale remote listing"
                );
                return false;
            }

            inner.collection = if remote.kind() == self.shared.kind {
                remote
            } else {
                Collection::from_items(self.shared.kind, remote.into_items())
            };
            inner.state = SyncState::Authenticated;
            self.persist(&inner.collection);
        }
        self.publish();
        true
    }

    /// Enter a session for `user_id` and fetch the remote collection.
    ///
    /// Remote state wins: local guest items are replaced by the listing.
    /// When the fetch fails the reconciler stays in [`SyncState::Syncing`]
    /// until [`refresh`](Self::refresh) succeeds. Returns the resulting state.
    pub async fn sign_in(&self, user_id: &str) -> SyncState {
        let generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.state = SyncState::Syncing;
            inner.user_id = Some(user_id.to_string());
            inner.generation
        };
        tracing::info!(kind = %self.kind(), %user_id, "syncing collection from remote");

        if let Err(e) = self.resync(user_id, generation).await {
            tracing::warn!(kind = %self.kind(), %user_id, error = %e, "initial remote fetch failed");
        }
        self.state()
    }

    /// Leave the session: clear memory and the persisted copy, back to guest.
    pub fn end_session(&self) {
        {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.state = SyncState::Guest;
            inner.user_id = None;
            inner.collection.clear();
            discard_collection(&*self.shared.store, self.shared.kind);
        }
        tracing::info!(kind = %self.kind(), "collection reset to guest mode");
        self.publish();
    }

    /// Empty the collection locally. Nothing is sent to the server.
    pub fn clear(&self) {
        {
            let mut inner = self.lock();
            inner.collection.clear();
            discard_collection(&*self.shared.store, self.shared.kind);
        }
        self.publish();
    }

    /// Re-read the collection from its source of truth.
    ///
    /// Signed in, this fetches the remote listing (completing a pending
    /// sign-in). As a guest it reloads the local store, picking up changes
    /// made by other instances sharing it.
    pub async fn refresh(&self) -> RemoteResult<()> {
        let (state, user_id, generation) = {
            let inner = self.lock();
            (inner.state, inner.user_id.clone(), inner.generation)
        };

        match (state, user_id) {
            (SyncState::Syncing | SyncState::Authenticated, Some(user_id)) => {
                let result = self.resync(&user_id, generation).await;
                if let Err(e) = &result {
                    tracing::warn!(kind = %self.kind(), %user_id, error = %e, "refresh failed");
                }
                result
            }
            _ => {
                let kind = self.shared.kind;
                let stored = load_collection(&*self.shared.store, kind)
                    .unwrap_or_else(|| Collection::new(kind));
                {
                    let mut inner = self.lock();
                    if inner.generation != generation {
                        return Ok(());
                    }
                    inner.collection = stored;
                }
                self.publish();
                Ok(())
            }
        }
    }

    /// Purchase the remote cart and clear it locally.
    ///
    /// An empty collection returns [`Receipt::empty`] without a remote call.
    pub async fn checkout(&self) -> Result<Receipt, CheckoutError> {
        let (user_id, generation, is_empty) = {
            let inner = self.lock();
            match (inner.state, inner.user_id.clone()) {
                (SyncState::Authenticated, Some(user_id)) => {
                    (user_id, inner.generation, inner.collection.is_empty())
                }
                _ => return Err(CheckoutError::NotAuthenticated),
            }
        };

        if is_empty {
            return Ok(Receipt::empty());
        }

        let receipt = self.shared.gateway.checkout(&user_id).await.map_err(|e| {
            tracing::warn!(kind = %self.kind(), %user_id, error = %e, "checkout failed");
            CheckoutError::Remote(e)
        })?;

        let cleared = {
            let mut inner = self.lock();
            if inner.generation == generation {
                inner.collection.clear();
                discard_collection(&*self.shared.store, self.shared.kind);
                true
            } else {
                false
            }
        };
        if cleared {
            self.publish();
        }

        tracing::info!(
            %user_id,
            order_id = receipt.order_id.as_deref().unwrap_or(""),
            purchased = receipt.purchased_count,
            "checkout completed"
        );
        Ok(receipt)
    }
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("Reconciler")
            .field("kind", &self.shared.kind)
            .field("state", &inner.state)
            .field("user_id", &inner.user_id)
            .field("items", &inner.collection.len())
            .finish()
    }
}

#[async_trait]
impl SessionListener for Reconciler {
    async fn signed_in(&self, user_id: &str) {
        self.sign_in(user_id).await;
    }
}
