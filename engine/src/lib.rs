//! # Basket Engine
//!
//! Cart and wishlist state that keeps working for guests and re-synchronizes
//! against a server of record once a user signs in.
//!
//! Each collection (cart or wishlist) is owned by a [`Reconciler`]. The
//! reconciler keeps the in-memory collection authoritative for the UI,
//! persists every change to a [`LocalStore`], and when a session is active
//! forwards the change to a [`CollectionGateway`] before replacing local
//! state with the server's listing.
//!
//! ## Operating modes
//!
//! - **Guest**: every change is local only and survives restarts through the
//!   local store.
//! - **Syncing**: a user signed in and the remote listing is being fetched.
//! - **Authenticated**: changes are applied locally first, then committed
//!   remotely and followed by a resync. A failed remote call keeps the local
//!   change and is logged, never surfaced.
//!
//! ## Core Concepts
//!
//! ### Mutations
//!
//! Changes are expressed as [`Mutation`] values and committed in two phases:
//! optimistic local apply, then remote commit plus resync.
//!
//! ### Events
//!
//! The [`EventBus`] broadcasts [`BusEvent::CartChanged`] and
//! [`BusEvent::WishlistChanged`] after every change so independent views of
//! the same collection stay consistent. [`BusEvent::SessionEnded`] resets
//! both collections to guest mode.
//!
//! ## Quick Start
//!
//! ```rust
//! use basket_engine::{Cart, EventBus, MemoryStore, ProductSnapshot};
//! # use basket_engine::{Collection, CollectionGateway, CollectionKind, RemoteError};
//! # use std::sync::Arc;
//! # #[derive(Debug)]
//! # struct Offline;
//! # #[async_trait::async_trait]
//! # impl CollectionGateway for Offline {
//! #     fn kind(&self) -> CollectionKind { CollectionKind::Cart }
//! #     async fn list(&self, _: &str) -> Result<Collection, RemoteError> { Err(RemoteError::Transport("offline".into())) }
//! #     async fn add(&self, _: &str, _: &str, _: u32) -> Result<(), RemoteError> { Err(RemoteError::Transport("offline".into())) }
//! #     async fn remove(&self, _: &str, _: &str) -> Result<(), RemoteError> { Err(RemoteError::Transport("offline".into())) }
//! # }
//! # tokio_test_block(async {
//! let bus = EventBus::new();
//! let cart = Cart::new(Arc::new(MemoryStore::new()), Arc::new(Offline), bus);
//!
//! let mug = ProductSnapshot::new("p1", "Mug", 12.0);
//! cart.add(mug.clone(), 1).await.unwrap();
//! cart.add(mug, 1).await.unwrap();
//!
//! assert_eq!(cart.quantity_of("p1"), Some(2));
//! assert_eq!(cart.total_items(), 2);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! ## HTTP
//!
//! With the default `http` feature, [`HttpGateway`] talks to the user-states
//! REST API served by `basket-server`.

pub mod bus;
pub mod cart;
pub mod clock;
pub mod collection;
pub mod config;
pub mod error;
pub mod gateway;
pub mod item;
pub mod operation;
pub mod reconcile;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod wire;
pub mod wishlist;

// Re-export main types at crate root
pub use bus::{BusEvent, EventBus, Subscription};
pub use cart::Cart;
pub use clock::{Clock, ManualClock, SystemClock};
pub use collection::{Collection, CollectionKind};
pub use config::{ClientConfig, ConfigError};
pub use error::{CheckoutError, Error, RemoteError};
#[cfg(feature = "http")]
pub use gateway::HttpGateway;
pub use gateway::{CollectionGateway, Receipt};
pub use item::{CollectionItem, ProductSnapshot};
pub use operation::Mutation;
pub use reconcile::{CommitOutcome, Reconciler, SyncState};
pub use session::{follow_session, AuthProvider, Session, SessionFollower, SessionListener};
pub use snapshot::CollectionSnapshot;
pub use storage::{FileStore, LocalStore, MemoryStore};
pub use wishlist::{MoveOutcome, Wishlist};

/// Type aliases for clarity
pub type ProductId = String;
pub type UserId = String;
pub type Timestamp = u64;
