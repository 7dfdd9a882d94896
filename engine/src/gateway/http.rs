//! HTTP gateway for the user-states REST API.

use super::{CollectionGateway, Receipt};
use crate::error::RemoteResult;
use crate::wire::{
    AddCartItem, AddWishlistItem, CartListing, CheckoutRequest, ErrorBody, OrderResponse,
    UpdateCartItem, WishlistListing,
};
use crate::{AuthProvider, ClientConfig, Collection, CollectionKind, RemoteError};
use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Payment method sent with checkout requests.
const DEFAULT_PAYMENT_METHOD: &str = "credit_card";

/// Gateway for one collection kind, backed by `reqwest`.
///
/// Requests carry the session token of the attached [`AuthProvider`] as a
/// bearer token. Every request is bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    kind: CollectionKind,
    auth: Option<AuthProvider>,
}

fn map_transport(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout
    } else if e.is_decode() {
        RemoteError::Decode(e.to_string())
    } else {
        RemoteError::Transport(e.to_string())
    }
}

impl HttpGateway {
    /// Create a gateway for `kind` talking to `base_url`.
    pub fn new(kind: CollectionKind, base_url: &str, timeout: Duration) -> RemoteResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RemoteError::Transport(format!("invalid base url {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::Transport(format!(
                "base url cannot carry a path: {base_url}"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(map_transport)?;

        Ok(Self {
            client,
            base_url,
            kind,
            auth: None,
        })
    }

    /// Create a gateway from client configuration.
    pub fn from_config(kind: CollectionKind, config: &ClientConfig) -> RemoteResult<Self> {
        Self::new(kind, &config.api_url, config.request_timeout)
    }

    /// Send the session token of `auth` with every request.
    pub fn with_auth(mut self, auth: AuthProvider) -> Self {
        self.auth = Some(auth);
        self
    }

    fn endpoint(&self, segments: &[&str]) -> RemoteResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::Transport(format!("base url cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "user-states"])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match self.auth.as_ref().and_then(AuthProvider::token) {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> RemoteResult<Response> {
        let response = request.send().await.map_err(map_transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        tracing::debug!(kind = %self.kind, status = status.as_u16(), %message, "remote call failed");
        Err(RemoteError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> RemoteResult<T> {
        self.execute(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn cart_listing(&self, user_id: &str) -> RemoteResult<CartListing> {
        let url = self.endpoint(&["cart", user_id])?;
        self.fetch(self.request(Method::GET, url)).await
    }

    fn unsupported(&self, operation: &'static str) -> RemoteError {
        RemoteError::Unsupported {
            kind: self.kind,
            operation,
        }
    }
}

#[async_trait]
impl CollectionGateway for HttpGateway {
    fn kind(&self) -> CollectionKind {
        self.kind
    }

    async fn list(&self, user_id: &str) -> RemoteResult<Collection> {
        match self.kind {
            CollectionKind::Cart => Ok(self.cart_listing(user_id).await?.into_collection()),
            CollectionKind::Wishlist => {
                let url = self.endpoint(&["wishlist", user_id])?;
                let listing: WishlistListing = self.fetch(self.request(Method::GET, url)).await?;
                Ok(listing.into_collection())
            }
        }
    }

    async fn add(&self, user_id: &str, product_id: &str, quantity: u32) -> RemoteResult<()> {
        let request = match self.kind {
            CollectionKind::Cart => {
                let url = self.endpoint(&["cart", user_id, "add"])?;
                self.request(Method::POST, url).json(&AddCartItem {
                    product_id: product_id.to_string(),
                    quantity,
                })
            }
            CollectionKind::Wishlist => {
                let url = self.endpoint(&["wishlist", user_id, "add"])?;
                self.request(Method::POST, url).json(&AddWishlistItem {
                    product_id: product_id.to_string(),
                })
            }
        };
        self.execute(request).await?;
        Ok(())
    }

    async fn remove(&self, user_id: &str, product_id: &str) -> RemoteResult<()> {
        let url = self.endpoint(&[self.kind.storage_key(), user_id, "remove", product_id])?;
        self.execute(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn update_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> RemoteResult<()> {
        if self.kind != CollectionKind::Cart {
            return Err(self.unsupported("update_quantity"));
        }

        // The API addresses cart rows by row id, not product id.
        let listing = self.cart_listing(user_id).await?;
        let row = listing
            .items
            .iter()
            .find(|row| row.product_id == product_id)
            .ok_or_else(|| RemoteError::Status {
                status: 404,
                message: format!("product {product_id} is not in the remote cart"),
            })?;

        let item_id = row.id.to_string();
        let url = self.endpoint(&["cart", user_id, "update", &item_id])?;
        let request = self
            .request(Method::PUT, url)
            .json(&UpdateCartItem { quantity });
        self.execute(request).await?;
        Ok(())
    }

    async fn checkout(&self, user_id: &str) -> RemoteResult<Receipt> {
        if self.kind != CollectionKind::Cart {
            return Err(self.unsupported("checkout"));
        }

        let url = self.endpoint(&["purchases", user_id, "checkout"])?;
        let request = self.request(Method::POST, url).json(&CheckoutRequest {
            payment_method: Some(DEFAULT_PAYMENT_METHOD.to_string()),
            payment_status: None,
        });
        let order: OrderResponse = self.fetch(request).await?;
        Ok(order.into())
    }
}
