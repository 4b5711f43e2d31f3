//! Access token port

use async_trait::async_trait;

/// Supplies the bearer token for authenticated requests.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Current access token, or `None` when signed out.
    async fn access_token(&self) -> Option<String>;
}
