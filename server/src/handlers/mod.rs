//! Request handlers for the user-states and catalog APIs.
//!
//! Handlers validate request bodies and call into the tables; the axum
//! extractors live in `routes`.

mod cart;
mod products;
mod purchases;
mod wishlist;

pub use cart::*;
pub use products::*;
pub use purchases::*;
pub use wishlist::*;
