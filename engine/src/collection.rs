//! Collection - the in-memory cart or wishlist.
//!
//! A collection holds insertion-ordered items, unique by product id, and
//! keeps its aggregates current after every change.

use crate::{BusEvent, CollectionItem, Mutation, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which collection a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Cart,
    Wishlist,
}

impl CollectionKind {
    /// Key under which the collection is persisted locally.
    pub fn storage_key(self) -> &'static str {
        match self {
            CollectionKind::Cart => "cart",
            CollectionKind::Wishlist => "wishlist",
        }
    }

    /// Event published after the collection changes.
    pub fn change_event(self) -> BusEvent {
        match self {
            CollectionKind::Cart => BusEvent::CartChanged,
            CollectionKind::Wishlist => BusEvent::WishlistChanged,
        }
    }

    /// Whether items carry a quantity. Wishlist presence is boolean.
    pub fn tracks_quantity(self) -> bool {
        matches!(self, CollectionKind::Cart)
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// A cart or wishlist.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    kind: CollectionKind,
    items: Vec<CollectionItem>,
    total_items: u64,
    total_price: f64,
}

impl Collection {
    /// Create an empty collection.
    pub fn new(kind: CollectionKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
            total_items: 0,
            total_price: 0.0,
        }
    }

    /// Build a collection from items of unknown quality, e.g. a remote listing.
    ///
    /// Rows repeating a product are folded into the first occurrence (cart
    /// quantities are summed). Rows with an empty id or zero quantity are
    /// dropped. Wishlist quantities are normalized to 1.
    pub fn from_items(kind: CollectionKind, items: impl IntoIterator<Item = CollectionItem>) -> Self {
        let mut collection = Self::new(kind);
        for mut item in items {
            if item.product_id.is_empty() || item.quantity == 0 {
                tracing::warn!(%kind, product_id = %item.product_id, "dropping invalid item");
                continue;
            }
            if !kind.tracks_quantity() {
                item.quantity = 1;
            }
            match collection.position(&item.product_id) {
                Some(index) if kind.tracks_quantity() => {
                    let existing = &mut collection.items[index];
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                Some(_) => {}
                None => collection.items.push(item),
            }
        }
        collection.recompute();
        collection
    }

    /// The collection kind.
    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[CollectionItem] {
        &self.items
    }

    /// Consume the collection, returning its items.
    pub fn into_items(self) -> Vec<CollectionItem> {
        self.items
    }

    /// Get an item by product id.
    pub fn get(&self, product_id: &str) -> Option<&CollectionItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Check if a product is present.
    pub fn contains(&self, product_id: &str) -> bool {
        self.position(product_id).is_some()
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the collection has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of item quantities.
    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Sum of discounted line totals.
    pub fn total_price(&self) -> f64 {
        self.total_price
    }

    /// Apply a mutation. Returns whether anything changed.
    ///
    /// Adding a product already on a wishlist and setting the quantity of an
    /// absent product are no-ops.
    pub fn apply(&mut self, mutation: &Mutation, now: Timestamp) -> bool {
        let changed = match mutation {
            Mutation::Add { product, quantity } => self.apply_add(product, *quantity, now),
            Mutation::Remove { product_id } => self.apply_remove(product_id),
            Mutation::SetQuantity {
                product_id,
                quantity,
            } => self.apply_set_quantity(product_id, *quantity),
        };
        self.recompute();
        changed
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute();
    }

    fn apply_add(&mut self, product: &crate::ProductSnapshot, quantity: u32, now: Timestamp) -> bool {
        match self.position(&product.product_id) {
            Some(index) if self.kind.tracks_quantity() => {
                self.items[index].bump(quantity, now);
                true
            }
            Some(_) => false,
            None => {
                let quantity = if self.kind.tracks_quantity() { quantity } else { 1 };
                self.items
                    .push(CollectionItem::from_snapshot(product.clone(), quantity, now));
                true
            }
        }
    }

    fn apply_remove(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    fn apply_set_quantity(&mut self, product_id: &str, quantity: u32) -> bool {
        if !self.kind.tracks_quantity() {
            return false;
        }
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) if item.quantity != quantity => {
                item.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.product_id == product_id)
    }

    fn recompute(&mut self) {
        self.total_items = self.items.iter().map(|i| u64::from(i.quantity)).sum();
        self.total_price = self.items.iter().map(CollectionItem::line_total).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProductSnapshot;

    fn product(id: &str, price: f64) -> ProductSnapshot {
        ProductSnapshot::new(id, format!("Product {id}"), price)
    }

    fn add(id: &str, quantity: u32) -> Mutation {
        Mutation::add(product(id, 10.0), quantity).unwrap()
    }

    #[test]
    fn create_collection() {
        let cart = Collection::new(CollectionKind::Cart);
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), 0.0);
    }

    #[test]
    fn cart_add_twice_bumps_quantity() {
        let mut cart = Collection::new(CollectionKind::Cart);
        assert!(cart.apply(&add("p1", 1), 1000));
        assert!(cart.apply(&add("p1", 1), 2000));

        assert_eq!(cart.len(), 1);
        let item = cart.get("p1").unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.added_at, 2000);
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn wishlist_add_twice_is_noop() {
        let mut wishlist = Collection::new(CollectionKind::Wishlist);
        assert!(wishlist.apply(&add("p1", 3), 1000));
        assert!(!wishlist.apply(&add("p1", 1), 2000));

        let item = wishlist.get("p1").unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.added_at, 1000);
    }

    #[test]
    fn insertion_order_preserved() {
        let mut cart = Collection::new(CollectionKind::Cart);
        for id in ["c", "a", "b"] {
            cart.apply(&add(id, 1), 1000);
        }
        cart.apply(&add("a", 1), 2000);

        let ids: Vec<_> = cart.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut cart = Collection::new(CollectionKind::Cart);
        cart.apply(&add("p1", 2), 1000);
        let before = cart.clone();

        assert!(!cart.apply(&Mutation::remove("p9").unwrap(), 2000));
        assert_eq!(cart, before);
    }

    #[test]
    fn set_quantity_is_absolute() {
        let mut cart = Collection::new(CollectionKind::Cart);
        cart.apply(&add("p1", 2), 1000);
        cart.apply(&Mutation::set_quantity("p1", 5).unwrap(), 2000);

        assert_eq!(cart.get("p1").unwrap().quantity, 5);
        assert_eq!(cart.total_items(), 5);
    }

    #[test]
    fn set_quantity_absent_is_noop() {
        let mut cart = Collection::new(CollectionKind::Cart);
        assert!(!cart.apply(&Mutation::set_quantity("p1", 5).unwrap(), 1000));
        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_zero_equals_remove() {
        let mut via_update = Collection::new(CollectionKind::Cart);
        via_update.apply(&add("p1", 2), 1000);
        via_update.apply(&add("p2", 1), 1000);
        let mut via_remove = via_update.clone();

        via_update.apply(&Mutation::set_quantity("p1", 0).unwrap(), 2000);
        via_remove.apply(&Mutation::remove("p1").unwrap(), 2000);

        assert_eq!(via_update, via_remove);
    }

    #[test]
    fn total_price_uses_discount() {
        let mut cart = Collection::new(CollectionKind::Cart);
        let discounted = product("p1", 40.0).with_discount(50.0);
        cart.apply(&Mutation::add(discounted, 2).unwrap(), 1000);
        cart.apply(&Mutation::add(product("p2", 5.0), 1).unwrap(), 1000);

        assert_eq!(cart.total_price(), 45.0);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn from_items_folds_duplicates() {
        let a = CollectionItem::from_snapshot(product("p1", 10.0), 2, 1000);
        let b = CollectionItem::from_snapshot(product("p1", 10.0), 3, 2000);
        let c = CollectionItem::from_snapshot(product("p2", 10.0), 1, 3000);

        let cart = Collection::from_items(CollectionKind::Cart, vec![a.clone(), b.clone(), c.clone()]);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get("p1").unwrap().quantity, 5);
        assert_eq!(cart.total_items(), 6);

        let wishlist = Collection::from_items(CollectionKind::Wishlist, vec![a, b, c]);
        assert_eq!(wishlist.len(), 2);
        assert_eq!(wishlist.get("p1").unwrap().quantity, 1);
        assert_eq!(wishlist.get("p1").unwrap().added_at, 1000);
    }

    #[test]
    fn from_items_drops_invalid_rows() {
        let zero = CollectionItem::from_snapshot(product("p1", 10.0), 0, 1000);
        let blank = CollectionItem::from_snapshot(product("", 10.0), 1, 1000);
        let cart = Collection::from_items(CollectionKind::Cart, vec![zero, blank]);
        assert!(cart.is_empty());
    }

    #[test]
    fn clear_resets_aggregates() {
        let mut cart = Collection::new(CollectionKind::Cart);
        cart.apply(&add("p1", 4), 1000);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), 0.0);
    }

    #[test]
    fn kind_keys_and_events() {
        assert_eq!(CollectionKind::Cart.storage_key(), "cart");
        assert_eq!(CollectionKind::Wishlist.storage_key(), "wishlist");
        assert_eq!(CollectionKind::Cart.change_event(), BusEvent::CartChanged);
        assert_eq!(CollectionKind::Wishlist.change_event(), BusEvent::WishlistChanged);
        assert_eq!(CollectionKind::Wishlist.to_string(), "wishlist");
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Step {
            Add(u8, u32),
            Remove(u8),
            Set(u8, i64),
        }

        fn arb_step() -> impl Strategy<Value = Step> {
            prop_oneof![
                (0u8..6, 1u32..5).prop_map(|(id, q)| Step::Add(id, q)),
                (0u8..6).prop_map(Step::Remove),
                (0u8..6, -2i64..6).prop_map(|(id, q)| Step::Set(id, q)),
            ]
        }

        fn to_mutation(step: &Step) -> Mutation {
            match step {
                Step::Add(id, q) => {
                    let price = f64::from(*id) + 1.0;
                    Mutation::add(
                        ProductSnapshot::new(format!("p{id}"), "item", price).with_discount(10.0),
                        *q,
                    )
                    .unwrap()
                }
                Step::Remove(id) => Mutation::remove(format!("p{id}")).unwrap(),
                Step::Set(id, q) => Mutation::set_quantity(format!("p{id}"), *q).unwrap(),
            }
        }

        fn arb_kind() -> impl Strategy<Value = CollectionKind> {
            prop_oneof![Just(CollectionKind::Cart), Just(CollectionKind::Wishlist)]
        }

        proptest! {
            #[test]
            fn prop_product_ids_unique(kind in arb_kind(), steps in prop::collection::vec(arb_step(), 0..40)) {
                let mut collection = Collection::new(kind);
                for (t, step) in steps.iter().enumerate() {
                    collection.apply(&to_mutation(step), t as u64);
                }

                let mut ids: Vec<_> = collection.items().iter().map(|i| i.product_id.clone()).collect();
                let len = ids.len();
                ids.sort();
                ids.dedup();
                prop_assert_eq!(ids.len(), len);
            }

            #[test]
            fn prop_quantities_positive(kind in arb_kind(), steps in prop::collection::vec(arb_step(), 0..40)) {
                let mut collection = Collection::new(kind);
                for (t, step) in steps.iter().enumerate() {
                    collection.apply(&to_mutation(step), t as u64);
                    prop_assert!(collection.items().iter().all(|i| i.quantity >= 1));
                    if kind == CollectionKind::Wishlist {
                        prop_assert!(collection.items().iter().all(|i| i.quantity == 1));
                    }
                }
            }

            #[test]
            fn prop_aggregates_match_items(kind in arb_kind(), steps in prop::collection::vec(arb_step(), 0..40)) {
                let mut collection = Collection::new(kind);
                for (t, step) in steps.iter().enumerate() {
                    collection.apply(&to_mutation(step), t as u64);

                    let items: u64 = collection.items().iter().map(|i| u64::from(i.quantity)).sum();
                    let price: f64 = collection.items().iter().map(CollectionItem::line_total).sum();
                    prop_assert_eq!(collection.total_items(), items);
                    prop_assert!((collection.total_price() - price).abs() < 1e-9);
                }
            }
        }
    }
}
