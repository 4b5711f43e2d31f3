//! Client settings domain model.
//!
//! Endpoints, paging and retry preferences for the Gather client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pagination::DEFAULT_PAGE_SIZE;

/// Retry preferences for network operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Upper bound for any single delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl RetrySettings {
    /// Delay before the first retry.
    #[must_use]
    pub const fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Upper bound for any single delay.
    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 5000,
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// GraphQL endpoint.
    pub api_url: String,
    /// Base URL of the storage service.
    pub upload_base_url: String,
    /// Host accepted for universal links.
    pub web_host: String,
    /// Items requested per page.
    pub page_size: u32,
    /// Per-request HTTP timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Retry preferences.
    pub retry: RetrySettings,
}

impl ClientSettings {
    /// Per-request HTTP timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.gather.events/graphql".to_string(),
            upload_base_url: "https://api.gather.events".to_string(),
            web_host: "gather.events".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_ms: 30_000,
            retry: RetrySettings::default(),
        }
    }
}
