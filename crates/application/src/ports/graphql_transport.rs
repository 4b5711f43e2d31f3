//! GraphQL transport port

use async_trait::async_trait;
use gather_domain::{GraphQlRequest, GraphQlResponse};
use thiserror::Error;

/// Failure to obtain a GraphQL response envelope.
///
/// Application-level errors inside a well-formed envelope are not
/// transport errors; they travel in `GraphQlResponse::errors`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not reach the server.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The request exceeded its deadline.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// The server answered with a non-success status and no envelope.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The body could not be decoded as a GraphQL envelope.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request was aborted by its owner.
    #[error("operation cancelled")]
    Cancelled,
}

/// Port for executing GraphQL operations.
///
/// The transport owns HTTP details (headers, auth, timeouts). Callers
/// only see the response envelope.
#[async_trait]
pub trait GraphQlTransport: Send + Sync {
    /// Sends one operation and returns the raw envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if no envelope could be obtained.
    async fn execute(&self, request: &GraphQlRequest) -> Result<GraphQlResponse, TransportError>;
}
