//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use basket_engine::{
    Collection, CollectionGateway, CollectionItem, CollectionKind, ProductSnapshot, Receipt,
    RemoteError,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// A product priced at 10.0 with no discount.
pub fn product(id: &str) -> ProductSnapshot {
    ProductSnapshot::new(id, format!("Product {id}"), 10.0)
}

/// In-memory stand-in for the user-states API of a single user.
///
/// Every call yields once before touching server state so concurrent
/// commits interleave the way real network calls do.
#[derive(Debug)]
pub struct MockGateway {
    kind: CollectionKind,
    server: Mutex<Vec<CollectionItem>>,
    failing: AtomicBool,
    calls: Mutex<Vec<String>>,
    list_gate: Mutex<Option<Arc<Notify>>>,
    ticks: AtomicU64,
    orders: AtomicU64,
}

impl MockGateway {
    pub fn new(kind: CollectionKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            server: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            list_gate: Mutex::new(None),
            ticks: AtomicU64::new(1),
            orders: AtomicU64::new(0),
        })
    }

    /// Put products on the server, one unit each.
    pub fn seed(&self, ids: &[&str]) {
        let mut server = self.server.lock().unwrap();
        for id in ids {
            let at = self.tick();
            server.push(CollectionItem::from_snapshot(product(id), 1, at));
        }
    }

    /// Make every following call fail with a transport error.
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Hold every following listing until the returned handle is notified.
    pub fn gate_lists(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn server_items(&self) -> Vec<CollectionItem> {
        self.server.lock().unwrap().clone()
    }

    pub fn server_quantity(&self, product_id: &str) -> Option<u32> {
        self.server
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.product_id == product_id)
            .map(|i| i.quantity)
    }

    fn tick(&self) -> u64 {
        self.ticks.fetch_add(1, Ordering::SeqCst)
    }

    async fn enter(&self, call: String) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(call);
        tokio::task::yield_now().await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(RemoteError::Transport("connection refused".into()));
        }
        Ok(())
    }

    fn not_found(product_id: &str) -> RemoteError {
        RemoteError::Status {
            status: 404,
            message: format!("{product_id} not found"),
        }
    }
}

#[async_trait]
impl CollectionGateway for MockGateway {
    fn kind(&self) -> CollectionKind {
        self.kind
    }

    async fn list(&self, user_id: &str) -> Result<Collection, RemoteError> {
        let gate = self.list_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.enter(format!("list:{user_id}")).await?;
        let items = self.server_items();
        Ok(Collection::from_items(self.kind, items))
    }

    async fn add(&self, _user_id: &str, product_id: &str, quantity: u32) -> Result<(), RemoteError> {
        self.enter(format!("add:{product_id}:{quantity}")).await?;
        let at = self.tick();
        let mut server = self.server.lock().unwrap();
        match server.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) if self.kind == CollectionKind::Cart => item.bump(quantity, at),
            Some(_) => {
                return Err(RemoteError::Status {
                    status: 400,
                    message: "Item already in wishlist".into(),
                })
            }
            None => {
                let quantity = if self.kind == CollectionKind::Cart { quantity } else { 1 };
                server.push(CollectionItem::from_snapshot(product(product_id), quantity, at));
            }
        }
        Ok(())
    }

    async fn remove(&self, _user_id: &str, product_id: &str) -> Result<(), RemoteError> {
        self.enter(format!("remove:{product_id}")).await?;
        let mut server = self.server.lock().unwrap();
        let before = server.len();
        server.retain(|i| i.product_id != product_id);
        if server.len() == before {
            return Err(Self::not_found(product_id));
        }
        Ok(())
    }

    async fn update_quantity(
        &self,
        _user_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> Result<(), RemoteError> {
        self.enter(format!("update:{product_id}:{quantity}")).await?;
        let mut server = self.server.lock().unwrap();
        let item = server
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| Self::not_found(product_id))?;
        item.quantity = quantity;
        Ok(())
    }

    async fn checkout(&self, _user_id: &str) -> Result<Receipt, RemoteError> {
        self.enter("checkout".to_string()).await?;
        let mut server = self.server.lock().unwrap();
        if server.is_empty() {
            return Ok(Receipt::empty());
        }
        let purchased: Vec<CollectionItem> = server.drain(..).collect();
        let order = self.orders.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Receipt {
            order_id: Some(format!("order-{order}")),
            purchased_count: purchased.iter().map(|i| u64::from(i.quantity)).sum(),
            total_value: purchased.iter().map(CollectionItem::line_total).sum(),
        })
    }
}
