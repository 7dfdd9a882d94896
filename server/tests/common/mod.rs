//! Shared helpers for server integration tests.

#![allow(dead_code)]

use basket_server::config::Config;
use basket_server::db::{Database, Product};
use basket_server::{app, AppState};

/// A running in-process server.
pub struct TestServer {
    pub base_url: String,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub fn product(id: &str, price: f64, discount_percent: f64) -> Product {
    Product {
        product_id: id.to_string(),
        name: format!("Product {id}"),
        price,
        discount_percent,
        image_url: Some(format!("https://cdn.example.com/{id}.png")),
    }
}

/// Catalog used by every test: p1 10.0, p2 5.0, p3 40.0 at 25% off.
pub fn catalog() -> Vec<Product> {
    vec![
        product("p1", 10.0, 0.0),
        product("p2", 5.0, 0.0),
        product("p3", 40.0, 25.0),
    ]
}

/// Start a server on an ephemeral port.
pub async fn spawn_server(auth_secret: Option<&str>) -> TestServer {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        auth_secret: auth_secret.map(str::to_string),
        catalog_path: None,
    };
    let state = AppState::new(config, Database::with_catalog(catalog()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}"),
    }
}
