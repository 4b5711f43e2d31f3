//! Resilient operation executor.
//!
//! Runs a single network operation, classifies its failure into
//! `Network`, `Server` or `Client`, and optionally retries network
//! failures with exponential backoff.

use std::future::Future;
use std::time::Duration;

use gather_domain::{ErrorKind, GraphQlResponse, OperationError, OperationResult, RetrySettings};

use crate::cancellation::{CancellationReceiver, Cancelled};
use crate::ports::TransportError;

/// Message for an envelope with neither data nor errors.
pub const NO_DATA_RETURNED: &str = "No data returned";

/// Message for a transform that found nothing in the data.
pub const DATA_NOT_FOUND: &str = "Data not found";

/// Outcome of an executor call. `Err` only ever means cancellation.
pub type ExecutionResult<T> = Result<OperationResult<T>, Cancelled>;

/// Backoff policy for retried operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (0-based): doubles each time,
    /// capped at `max_delay`.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(RetrySettings::default())
    }
}

impl From<RetrySettings> for RetryPolicy {
    fn from(settings: RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            initial_delay: settings.initial_delay(),
            max_delay: settings.max_delay(),
        }
    }
}

/// Executes network operations with uniform error classification.
///
/// # Example
///
/// ```ignore
/// let executor = OperationExecutor::new(RetryPolicy::default());
/// let result = executor
///     .execute_graphql_with_retry("Friends", || transport.execute(&request), decode)
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct OperationExecutor {
    policy: RetryPolicy,
    cancellation: Option<CancellationReceiver>,
}

impl OperationExecutor {
    /// Creates an executor with the given retry policy.
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            cancellation: None,
        }
    }

    /// Binds the executor to a cancellation signal.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationReceiver) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Runs `future` unless the bound cancellation signal fires first.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if cancellation wins the race.
    pub async fn guard<F>(&self, future: F) -> Result<F::Output, Cancelled>
    where
        F: Future,
    {
        let Some(cancellation) = &self.cancellation else {
            return Ok(future.await);
        };
        if cancellation.is_cancelled() {
            return Err(Cancelled);
        }

        let mut cancellation = cancellation.clone();
        tokio::select! {
            biased;
            () = cancellation.cancelled() => Err(Cancelled),
            output = future => Ok(output),
        }
    }

    /// Executes an operation once.
    ///
    /// Any transport failure other than cancellation becomes
    /// `Error(Network, message)`.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn execute<T, F>(&self, name: &str, operation: F) -> ExecutionResult<T>
    where
        F: Future<Output = Result<T, TransportError>>,
    {
        match self.guard(operation).await? {
            Ok(value) => {
                tracing::debug!(operation = name, "operation succeeded");
                Ok(OperationResult::Success(value))
            }
            Err(TransportError::Cancelled) => Err(Cancelled),
            Err(error) => Ok(Self::network_failure(name, &error)),
        }
    }

    /// Executes a GraphQL operation once and transforms its data.
    ///
    /// Inspection order: application errors (`Server`), missing data
    /// (`Client`, "No data returned"), then the transform (`Client`,
    /// "Data not found" when it yields `None`).
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn execute_graphql<D, T, F, X>(
        &self,
        name: &str,
        operation: F,
        transform: X,
    ) -> ExecutionResult<T>
    where
        F: Future<Output = Result<GraphQlResponse<D>, TransportError>>,
        X: FnOnce(D) -> Option<T>,
    {
        let response = match self.guard(operation).await? {
            Ok(response) => response,
            Err(TransportError::Cancelled) => return Err(Cancelled),
            Err(error) => return Ok(Self::network_failure(name, &error)),
        };

        if let Some(error) = response.first_error() {
            tracing::warn!(operation = name, error = %error.message, "server returned errors");
            return Ok(OperationResult::error(
                ErrorKind::Server,
                error.message.clone(),
            ));
        }

        let Some(data) = response.data else {
            tracing::warn!(operation = name, "response carried no data");
            return Ok(OperationResult::error(ErrorKind::Client, NO_DATA_RETURNED));
        };

        match transform(data) {
            Some(value) => {
                tracing::debug!(operation = name, "operation succeeded");
                Ok(OperationResult::Success(value))
            }
            None => {
                tracing::warn!(operation = name, "transform found no data");
                Ok(OperationResult::error(ErrorKind::Client, DATA_NOT_FOUND))
            }
        }
    }

    /// Retries `attempt` while it fails with a retryable error.
    ///
    /// Makes up to `max_attempts - 1` guarded attempts, each followed by a
    /// backoff when it fails with a `Network` error, then one final
    /// attempt whose result is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if an attempt or a backoff sleep was cancelled.
    pub async fn retry<T, A, F>(&self, name: &str, mut attempt: A) -> ExecutionResult<T>
    where
        A: FnMut() -> F,
        F: Future<Output = ExecutionResult<T>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);

        for retry in 0..max_attempts - 1 {
            let result = attempt().await?;
            match &result {
                OperationResult::Error(error) if error.is_retryable() => {
                    let delay = self.policy.delay_for(retry);
                    tracing::info!(
                        operation = name,
                        attempt = retry + 1,
                        max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error.message,
                        "retrying after network error"
                    );
                    self.backoff(delay).await?;
                }
                _ => return Ok(result),
            }
        }

        let result = attempt().await?;
        if let OperationResult::Error(error) = &result {
            tracing::warn!(operation = name, kind = ?error.kind, error = %error.message, "operation failed");
        }
        Ok(result)
    }

    /// `execute` wrapped in the retry loop.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn execute_with_retry<T, O, F>(&self, name: &str, mut operation: O) -> ExecutionResult<T>
    where
        O: FnMut() -> F,
        F: Future<Output = Result<T, TransportError>>,
    {
        self.retry(name, || self.execute(name, operation())).await
    }

    /// `execute_graphql` wrapped in the retry loop.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn execute_graphql_with_retry<D, T, O, F, X>(
        &self,
        name: &str,
        mut operation: O,
        transform: X,
    ) -> ExecutionResult<T>
    where
        O: FnMut() -> F,
        F: Future<Output = Result<GraphQlResponse<D>, TransportError>>,
        X: Fn(D) -> Option<T>,
    {
        self.retry(name, || self.execute_graphql(name, operation(), &transform))
            .await
    }

    async fn backoff(&self, delay: Duration) -> Result<(), Cancelled> {
        self.guard(tokio::time::sleep(delay)).await
    }

    fn network_failure<T>(name: &str, error: &TransportError) -> OperationResult<T> {
        tracing::warn!(operation = name, error = %error, "network failure");
        OperationResult::Error(OperationError::network(error.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use gather_domain::GraphQlError;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tokio::time::Instant;

    use crate::cancellation::CancellationToken;

    fn offline() -> TransportError {
        TransportError::Connection("offline".to_string())
    }

    fn lookup(data: Value) -> Option<String> {
        data.get("name").and_then(Value::as_str).map(String::from)
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let executor = OperationExecutor::default();
        let result: OperationResult<u8> = executor
            .execute("Probe", async { Err(offline()) })
            .await
            .unwrap();

        assert_eq!(
            result,
            OperationResult::Error(OperationError::network("connection failed: offline"))
        );
    }

    #[tokio::test]
    async fn test_transport_cancellation_propagates() {
        let executor = OperationExecutor::default();
        let result: ExecutionResult<u8> = executor
            .execute("Probe", async { Err(TransportError::Cancelled) })
            .await;
        assert_eq!(result, Err(Cancelled));
    }

    #[tokio::test]
    async fn test_server_errors_win_over_data() {
        let executor = OperationExecutor::default();
        let response = GraphQlResponse {
            data: Some(json!({"name": "ada"})),
            errors: Some(vec![GraphQlError::new("Not allowed"), GraphQlError::new("Second")]),
        };

        let result = executor
            .execute_graphql("Probe", async { Ok(response) }, lookup)
            .await
            .unwrap();

        assert_eq!(result, OperationResult::error(ErrorKind::Server, "Not allowed"));
    }

    #[tokio::test]
    async fn test_empty_error_list_is_not_a_server_error() {
        let executor = OperationExecutor::default();
        let response = GraphQlResponse {
            data: Some(json!({"name": "ada"})),
            errors: Some(Vec::new()),
        };

        let result = executor
            .execute_graphql("Probe", async { Ok(response) }, lookup)
            .await
            .unwrap();

        assert_eq!(result, OperationResult::Success("ada".to_string()));
    }

    #[tokio::test]
    async fn test_missing_data_is_client_error() {
        let executor = OperationExecutor::default();
        let response: GraphQlResponse = GraphQlResponse {
            data: None,
            errors: None,
        };

        let result = executor
            .execute_graphql("Probe", async { Ok(response) }, lookup)
            .await
            .unwrap();

        assert_eq!(result, OperationResult::error(ErrorKind::Client, NO_DATA_RETURNED));
    }

    #[tokio::test]
    async fn test_empty_transform_is_data_not_found() {
        let executor = OperationExecutor::default();
        let response = GraphQlResponse::data(json!({"other": 1}));

        let result = executor
            .execute_graphql("Probe", async { Ok(response) }, lookup)
            .await
            .unwrap();

        assert_eq!(result, OperationResult::error(ErrorKind::Client, DATA_NOT_FOUND));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_after_network_failures() {
        let executor = OperationExecutor::new(RetryPolicy::default());
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let counter = Arc::clone(&calls);
        let result = executor
            .execute_with_retry("Flaky", || {
                let counter = Arc::clone(&counter);
                async move {
                    let call = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    if call <= 2 { Err(offline()) } else { Ok(call) }
                }
            })
            .await
            .unwrap();

        assert_eq!(result, OperationResult::Success(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(1000 + 2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_after_max_attempts() {
        let executor = OperationExecutor::new(RetryPolicy::default());
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let counter = Arc::clone(&calls);
        let result: OperationResult<u8> = executor
            .execute_with_retry("Down", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(offline()) }
            })
            .await
            .unwrap();

        assert!(result.is_error());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two backoffs; nothing after the final attempt.
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_errors_are_not_retried() {
        let executor = OperationExecutor::new(RetryPolicy::default());
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        let result = executor
            .execute_graphql_with_retry(
                "Rejected",
                || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Ok(GraphQlResponse::<Value>::errors(vec![GraphQlError::new("nope")])) }
                },
                lookup,
            )
            .await
            .unwrap();

        assert_eq!(result, OperationResult::error(ErrorKind::Server, "nope"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(3000),
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(3000));
        assert_eq!(policy.delay_for(40), Duration::from_millis(3000));

        let executor = OperationExecutor::new(policy);
        let started = Instant::now();
        let result: OperationResult<u8> = executor
            .execute_with_retry("Down", || async { Err(offline()) })
            .await
            .unwrap();

        assert!(result.is_error());
        assert_eq!(started.elapsed(), Duration::from_millis(1000 + 2000 + 3000 + 3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_policy() {
        let executor = OperationExecutor::new(RetryPolicy::no_retry());
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        let result: OperationResult<u8> = executor
            .execute_with_retry("Once", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(offline()) }
            })
            .await
            .unwrap();

        assert!(result.is_error());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_backoff() {
        let token = CancellationToken::new();
        let executor = OperationExecutor::new(RetryPolicy::default()).with_cancellation(token.receiver());
        let calls = Arc::new(AtomicU32::new(0));

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            canceller.cancel();
        });

        let counter = Arc::clone(&calls);
        let result: ExecutionResult<u8> = executor
            .execute_with_retry("Down", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(offline()) }
            })
            .await;

        assert_eq!(result, Err(Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let executor = OperationExecutor::default().with_cancellation(token.receiver());

        let result = executor.execute("Probe", async { Ok::<_, TransportError>(1) }).await;
        assert_eq!(result, Err(Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_aborts_in_flight_operation() {
        let token = CancellationToken::new();
        let executor = OperationExecutor::default().with_cancellation(token.receiver());

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = executor
            .execute("Slow", async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, TransportError>(1)
            })
            .await;
        assert_eq!(result, Err(Cancelled));
    }
}
