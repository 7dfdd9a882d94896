//! Bearer token extraction.
//!
//! Tokens are issued by an external auth backend. When `AUTH_SECRET` is
//! configured the bearer token must match it; otherwise anonymous access is
//! allowed for local development.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::AppState;

/// Authenticated caller extracted from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// The bearer token, or `"anonymous"` when auth is disabled
    pub token: String,
}

impl AuthUser {
    pub fn is_anonymous(&self) -> bool {
        self.token == "anonymous"
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                let token = header.trim_start_matches("Bearer ").trim().to_string();
                if token.is_empty() {
                    return Err(AppError::Unauthorized("Empty bearer token"));
                }

                match state.config.auth_secret.as_deref() {
                    Some(secret) if secret != token => {
                        tracing::debug!("rejected request with unknown bearer token");
                        Err(AppError::Unauthorized("Invalid bearer token"))
                    }
                    _ => Ok(AuthUser { token }),
                }
            }
            Some(_) => Err(AppError::Unauthorized("Invalid authorization header format")),
            None => {
                if state.config.auth_secret.is_none() {
                    Ok(AuthUser {
                        token: "anonymous".to_string(),
                    })
                } else {
                    Err(AppError::Unauthorized("Missing authorization header"))
                }
            }
        }
    }
}
