//! Event notification bus.
//!
//! A process-wide publish/subscribe registry that tells independently
//! mounted views when a collection changed or the session ended.

use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Events carried by the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusEvent {
    /// The cart's contents changed
    CartChanged,
    /// The wishlist's contents changed
    WishlistChanged,
    /// The signed-in session ended; collections reset to guest mode
    SessionEnded,
}

type Handler = Arc<dyn Fn(BusEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    handlers: DashMap<BusEvent, Vec<(u64, Handler)>>,
}

/// Publish/subscribe bus.
///
/// Cheap to clone; clones share subscribers. Dispatch is synchronous and
/// runs against a snapshot of the subscribers taken at publish time, so
/// handlers may publish or subscribe themselves. Ordering among subscribers
/// is unspecified.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Registry>,
}

impl EventBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every current subscriber.
    ///
    /// Returns the number of handlers invoked.
    pub fn publish(&self, event: BusEvent) -> usize {
        let handlers: Vec<Handler> = self
            .registry
            .handlers
            .get(&event)
            .map(|entry| entry.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        for handler in &handlers {
            handler(event);
        }

        tracing::trace!(?event, recipients = handlers.len(), "published bus event");
        handlers.len()
    }

    /// Register `handler` for `event`.
    ///
    /// The handler stays registered until the returned [`Subscription`] is
    /// dropped or unsubscribed.
    pub fn subscribe<F>(&self, event: BusEvent, handler: F) -> Subscription
    where
        F: Fn(BusEvent) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .handlers
            .entry(event)
            .or_default()
            .push((id, Arc::new(handler)));

        Subscription {
            registry: Arc::downgrade(&self.registry),
            event,
            id,
        }
    }

    /// Number of handlers registered for `event`.
    pub fn subscriber_count(&self, event: BusEvent) -> usize {
        self.registry
            .handlers
            .get(&event)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("cart_subscribers", &self.subscriber_count(BusEvent::CartChanged))
            .field("wishlist_subscribers", &self.subscriber_count(BusEvent::WishlistChanged))
            .field("session_subscribers", &self.subscriber_count(BusEvent::SessionEnded))
            .finish()
    }
}

/// Handle keeping a handler registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the handler"]
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<Registry>,
    event: BusEvent,
    id: u64,
}

impl Subscription {
    /// Remove the handler now.
    pub fn unsubscribe(self) {}

    /// The event this subscription listens to.
    pub fn event(&self) -> BusEvent {
        self.event
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        if let Some(mut handlers) = registry.handlers.get_mut(&self.event) {
            handlers.retain(|(id, _)| *id != self.id);
        };
    }
}
