//! In-memory session token storage with expiry tracking.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::ports::AccessTokenProvider;

/// A bearer token and when it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    /// Raw access token.
    pub access_token: String,
    /// Expiry, if the server reported one.
    pub expires_at: Option<Instant>,
}

impl SessionToken {
    /// A token without known expiry.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
        }
    }

    /// A token valid for `lifetime` from now.
    #[must_use]
    pub fn expiring_in(access_token: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: Some(Instant::now() + lifetime),
        }
    }

    /// Returns true if the token is expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Thread-safe holder of the signed-in session.
#[derive(Debug, Clone, Default)]
pub struct SessionTokenStore {
    token: Arc<RwLock<Option<SessionToken>>>,
}

impl SessionTokenStore {
    /// Creates an empty (signed-out) store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the token after sign-in.
    pub async fn store(&self, token: SessionToken) {
        *self.token.write().await = Some(token);
    }

    /// Forgets the token on sign-out.
    pub async fn clear(&self) {
        *self.token.write().await = None;
    }

    /// Returns true if a non-expired token is stored.
    pub async fn is_signed_in(&self) -> bool {
        self.token
            .read()
            .await
            .as_ref()
            .is_some_and(|token| !token.is_expired())
    }
}

#[async_trait]
impl AccessTokenProvider for SessionTokenStore {
    async fn access_token(&self) -> Option<String> {
        let token = self.token.read().await;
        token
            .as_ref()
            .filter(|token| !token.is_expired())
            .map(|token| token.access_token.clone())
    }
}
