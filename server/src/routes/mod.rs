//! HTTP route definitions.

mod health;
mod products;
mod user_states;

use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .nest("/api/user-states", user_states::routes())
        .merge(products::routes())
}
