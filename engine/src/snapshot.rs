//! Snapshot types for persisting and restoring collections.
//!
//! Snapshots are the bridge between the in-memory [`Collection`] and the
//! [`LocalStore`]. One snapshot is kept per collection kind under the kind's
//! storage key, shaped `{ items, totalItems, totalPrice }`.

use crate::{error::Result, Collection, CollectionItem, CollectionKind, Error, LocalStore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Persisted form of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSnapshot {
    pub items: Vec<CollectionItem>,
    pub total_items: u64,
    pub total_price: f64,
}

impl CollectionSnapshot {
    /// Capture a collection.
    pub fn of(collection: &Collection) -> Self {
        Self {
            items: collection.items().to_vec(),
            total_items: collection.total_items(),
            total_price: collection.total_price(),
        }
    }

    /// Check item invariants: non-empty unique ids and positive quantities.
    ///
    /// Stored aggregates are not checked; they are recomputed on load.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if item.product_id.is_empty() {
                return Err(Error::MalformedState("item with empty product id".into()));
            }
            if item.quantity == 0 {
                return Err(Error::MalformedState(format!(
                    "item {} has zero quantity",
                    item.product_id
                )));
            }
            if !seen.insert(item.product_id.as_str()) {
                return Err(Error::MalformedState(format!(
                    "duplicate item {}",
                    item.product_id
                )));
            }
        }
        Ok(())
    }

    /// Turn the snapshot back into a collection of the given kind.
    pub fn into_collection(self, kind: CollectionKind) -> Result<Collection> {
        self.validate()?;
        Ok(Collection::from_items(kind, self.items))
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::MalformedState(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::MalformedState(e.to_string()))
    }
}

/// Load the persisted collection of `kind`.
///
/// Returns `None` when nothing is stored, the store fails, or the entry is
/// corrupt. Corrupt entries are removed.
pub fn load_collection(store: &dyn LocalStore, kind: CollectionKind) -> Option<Collection> {
    let key = kind.storage_key();
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(%kind, error = %e, "failed to read persisted collection");
            return None;
        }
    };

    match CollectionSnapshot::from_json(&raw).and_then(|s| s.into_collection(kind)) {
        Ok(collection) => Some(collection),
        Err(e) => {
            tracing::warn!(%kind, error = %e, "discarding malformed persisted collection");
            discard_collection(store, kind);
            None
        }
    }
}

/// Persist a collection under its kind's key.
pub fn persist_collection(store: &dyn LocalStore, collection: &Collection) {
    let kind = collection.kind();
    let result = CollectionSnapshot::of(collection)
        .to_json()
        .and_then(|json| store.set(kind.storage_key(), &json));
    if let Err(e) = result {
        tracing::warn!(%kind, error = %e, "failed to persist collection");
    }
}

/// Remove the persisted collection of `kind`.
pub fn discard_collection(store: &dyn LocalStore, kind: CollectionKind) {
    if let Err(e) = store.remove(kind.storage_key()) {
        tracing::warn!(%kind, error = %e, "failed to remove persisted collection");
    }
}
