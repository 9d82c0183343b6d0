//! Session authentication extractors.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, USER_AGENT},
        request::Parts,
    },
};
use std::sync::Arc;

use super::client_ip::TrustedProxies;
use crate::auth::RequestOrigin;
use crate::db::Account;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Extractor for authenticated accounts.
///
/// Reads `Authorization: Bearer <token>` and resolves it through
/// [`AuthService::authenticate`](crate::auth::AuthService::authenticate),
/// so deactivated, locked and stale sessions are rejected here.
#[derive(Debug, Clone)]
pub struct AuthAccount(pub Account);

/// Bearer token from the `Authorization` header, if any.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::unauthorized("Not authorized, no token"))?;

        let account = state.auth.authenticate(token).await.map_err(|e| {
            tracing::debug!("Session rejected: {}", e);
            ApiError::from(e)
        })?;

        Ok(AuthAccount(account))
    }
}

/// Extractor for the caller's IP and user agent, used for audit records.
///
/// The IP is resolved through the [`TrustedProxies`] request extension
/// installed by the router; without it only the socket peer counts.
#[derive(Debug, Clone, Default)]
pub struct ClientOrigin(pub RequestOrigin);

#[async_trait]
impl<S> FromRequestParts<S> for ClientOrigin
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let proxies = parts
            .extensions
            .get::<TrustedProxies>()
            .cloned()
            .unwrap_or_default();
        let ip = proxies.client_ip(&parts.headers, &parts.extensions);
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(ClientOrigin(RequestOrigin::new(ip, user_agent)))
    }
}
