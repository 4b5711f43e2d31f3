//! Shared plumbing for GraphQL-backed repositories.

use std::sync::Arc;

use gather_domain::{GraphQlRequest, PageRequest};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::executor::{ExecutionResult, OperationExecutor};
use crate::ports::GraphQlTransport;

/// Runs GraphQL operations through the executor and decodes their data.
///
/// Queries are retried on network failures; mutations run once.
#[derive(Clone)]
pub struct GraphQlRepository {
    transport: Arc<dyn GraphQlTransport>,
    executor: OperationExecutor,
}

impl GraphQlRepository {
    /// Creates a repository over the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn GraphQlTransport>, executor: OperationExecutor) -> Self {
        Self {
            transport,
            executor,
        }
    }

    /// Returns the executor used for every operation.
    #[must_use]
    pub const fn executor(&self) -> &OperationExecutor {
        &self.executor
    }

    /// Runs a query with retry, decoding `data` as `W` before `transform`.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn query<W, T, X>(&self, request: GraphQlRequest, transform: X) -> ExecutionResult<T>
    where
        W: DeserializeOwned,
        X: Fn(W) -> Option<T>,
    {
        let name = request.name().to_string();
        self.executor
            .execute_graphql_with_retry(
                &name,
                || self.transport.execute(&request),
                |data| decode::<W>(&name, data).and_then(&transform),
            )
            .await
    }

    /// Runs a mutation once, decoding `data` as `W` before `transform`.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn mutate<W, T, X>(&self, request: GraphQlRequest, transform: X) -> ExecutionResult<T>
    where
        W: DeserializeOwned,
        X: FnOnce(W) -> Option<T>,
    {
        let name = request.name().to_string();
        self.executor
            .execute_graphql(&name, self.transport.execute(&request), |data| {
                decode::<W>(&name, data).and_then(transform)
            })
            .await
    }
}

impl std::fmt::Debug for GraphQlRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQlRepository")
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

/// Adds Relay `first`/`after` variables to a request.
#[must_use]
pub fn paginate(request: GraphQlRequest, page: &PageRequest) -> GraphQlRequest {
    request
        .variable("first", page.first)
        .variable("after", page.after.clone())
}

fn decode<W: DeserializeOwned>(operation: &str, data: Value) -> Option<W> {
    serde_json::from_value(data)
        .inspect_err(|e| tracing::warn!(operation, error = %e, "response data has unexpected shape"))
        .ok()
}

/// Wire shape of `{ me { ... } }` queries.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct Viewer<T> {
    pub me: Option<T>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use gather_domain::{ErrorKind, GraphQlResponse, OperationError, OperationResult};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::executor::{DATA_NOT_FOUND, RetryPolicy};
    use crate::ports::TransportError;

    /// Always answers with the same envelope and records requests.
    struct FixedTransport {
        response: Result<GraphQlResponse, TransportError>,
        calls: AtomicU32,
        last: Mutex<Option<GraphQlRequest>>,
    }

    impl FixedTransport {
        fn new(response: Result<GraphQlResponse, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: AtomicU32::new(0),
                last: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl GraphQlTransport for FixedTransport {
        async fn execute(&self, request: &GraphQlRequest) -> Result<GraphQlResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request.clone());
            self.response.clone()
        }
    }

    fn envelope(data: Value) -> GraphQlResponse {
        GraphQlResponse {
            data: Some(data),
            errors: None,
        }
    }

    fn repository(transport: &Arc<FixedTransport>) -> GraphQlRepository {
        let transport: Arc<dyn GraphQlTransport> = transport.clone();
        GraphQlRepository::new(transport, OperationExecutor::new(RetryPolicy::no_retry()))
    }

    #[derive(Debug, serde::Deserialize)]
    struct Named {
        name: String,
    }

    #[tokio::test]
    async fn test_query_decodes_wrapper() {
        let transport = FixedTransport::new(Ok(envelope(json!({ "me": { "name": "ada" } }))));
        let result = repository(&transport)
            .query(GraphQlRequest::new("Me", "query Me { me { name } }"), |data: Viewer<Named>| {
                data.me.map(|me| me.name)
            })
            .await
            .unwrap();

        assert_eq!(result, OperationResult::Success("ada".to_string()));
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_data_not_found() {
        let transport = FixedTransport::new(Ok(envelope(json!({ "me": { "name": 7 } }))));
        let result = repository(&transport)
            .query(GraphQlRequest::new("Me", "query Me { me { name } }"), |data: Viewer<Named>| {
                data.me.map(|me| me.name)
            })
            .await
            .unwrap();

        assert_eq!(
            result,
            OperationResult::Error(OperationError::client(DATA_NOT_FOUND))
        );
    }

    #[tokio::test]
    async fn test_mutation_runs_once_on_network_error() {
        let transport = FixedTransport::new(Err(TransportError::Connection("reset".to_string())));
        let repository = GraphQlRepository::new(
            transport.clone(),
            OperationExecutor::new(RetryPolicy {
                max_attempts: 3,
                initial_delay: std::time::Duration::from_millis(1),
                max_delay: std::time::Duration::from_millis(1),
            }),
        );

        let result = repository
            .mutate(GraphQlRequest::new("Ping", "mutation Ping { ping }"), |data: Value| {
                Some(data)
            })
            .await
            .unwrap();

        assert_eq!(result.error_ref().map(|e| e.kind), Some(ErrorKind::Network));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_paginate_adds_relay_variables() {
        let request = paginate(
            GraphQlRequest::new("Friends", "query Friends { x }"),
            &PageRequest::after(20, "c1"),
        );

        assert_eq!(request.variables.get("first"), Some(&json!(20)));
        assert_eq!(request.variables.get("after"), Some(&json!("c1")));
    }

    #[test]
    fn test_first_page_sends_null_cursor() {
        let request = paginate(
            GraphQlRequest::new("Friends", "query Friends { x }"),
            &PageRequest::first_page(20),
        );

        assert_eq!(request.variables.get("after"), Some(&Value::Null));
    }
}
