//! Basket Server binary.

use basket_server::config::Config;
use basket_server::db::{self, Database};
use basket_server::{app, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "basket_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Basket Server on {}:{}", config.host, config.port);

    // Load the product catalog
    let database = match &config.catalog_path {
        Some(path) => {
            let products = db::load_catalog(path)?;
            tracing::info!("Loaded {} products from {}", products.len(), path.display());
            Database::with_catalog(products)
        }
        None => {
            tracing::warn!("CATALOG_PATH not set, starting with an empty catalog");
            Database::new()
        }
    };

    let addr = config.bind_addr();
    let state = AppState::new(config, database);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
