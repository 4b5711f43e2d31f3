//! GraphQL transport using reqwest.
//!
//! Posts `{ query, operationName, variables }` to the API endpoint with
//! the current bearer token and returns the decoded envelope.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gather_application::ports::{AccessTokenProvider, GraphQlTransport, TransportError};
use gather_domain::{ClientSettings, GraphQlRequest, GraphQlResponse};
use reqwest::{Client, StatusCode, Url};

use super::millis;
use crate::error::{ClientBuildError, build_client, parse_url};

/// GraphQL transport over HTTPS.
pub struct ReqwestGraphQlClient {
    client: Client,
    endpoint: Url,
    timeout: Duration,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl ReqwestGraphQlClient {
    /// Creates a client for `settings.api_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the client cannot be created.
    pub fn new(
        settings: &ClientSettings,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, ClientBuildError> {
        Ok(Self::with_client(
            build_client()?,
            parse_url(&settings.api_url)?,
            settings.request_timeout(),
            tokens,
        ))
    }

    /// Creates a client with a custom reqwest client.
    #[must_use]
    pub fn with_client(
        client: Client,
        endpoint: Url,
        timeout: Duration,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            client,
            endpoint,
            timeout,
            tokens,
        }
    }

    /// Maps reqwest errors to `TransportError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }
        if error.is_decode() {
            return TransportError::InvalidResponse(error.to_string());
        }
        TransportError::Connection(error.to_string())
    }

    /// Interprets a response body.
    ///
    /// A parseable envelope is returned even on a non-success status, so
    /// that GraphQL errors reach the executor as `Server` failures.
    fn decode(status: StatusCode, body: &[u8]) -> Result<GraphQlResponse, TransportError> {
        match serde_json::from_slice::<GraphQlResponse>(body) {
            Ok(envelope) if status.is_success() => Ok(envelope),
            Ok(envelope) if envelope.data.is_some() || envelope.errors.is_some() => Ok(envelope),
            Err(error) if status.is_success() => {
                Err(TransportError::InvalidResponse(error.to_string()))
            }
            _ => {
                let text = String::from_utf8_lossy(body).trim().to_string();
                let message = if text.is_empty() {
                    status.canonical_reason().unwrap_or("unknown status").to_string()
                } else {
                    text
                };
                Err(TransportError::Status {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

impl std::fmt::Debug for ReqwestGraphQlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestGraphQlClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl GraphQlTransport for ReqwestGraphQlClient {
    async fn execute(&self, request: &GraphQlRequest) -> Result<GraphQlResponse, TransportError> {
        let timeout_ms = millis(self.timeout);
        let mut builder = self
            .client
            .post(self.endpoint.clone())
            .timeout(self.timeout)
            .json(request);

        if let Some(token) = self.tokens.access_token().await {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(operation = request.name(), endpoint = %self.endpoint, "sending GraphQL operation");
        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let result = Self::decode(status, &body);
        if let Err(error) = &result {
            tracing::debug!(operation = request.name(), status = status.as_u16(), error = %error, "GraphQL transport failed");
        }
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use axum::Json;
    use axum::Router;
    use axum::extract::State;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use gather_application::{SessionToken, SessionTokenStore};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    #[derive(Clone, Default)]
    struct Recorded {
        bodies: Arc<Mutex<Vec<Value>>>,
        authorization: Arc<Mutex<Option<String>>>,
    }

    async fn spawn(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{address}/graphql")).unwrap()
    }

    fn client(endpoint: Url, tokens: Arc<dyn AccessTokenProvider>) -> ReqwestGraphQlClient {
        ReqwestGraphQlClient::with_client(Client::new(), endpoint, Duration::from_secs(5), tokens)
    }

    #[tokio::test]
    async fn test_posts_operation_with_bearer_token() {
        let recorded = Recorded::default();
        let router = Router::new()
            .route(
                "/graphql",
                post(
                    |State(recorded): State<Recorded>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        *recorded.authorization.lock().unwrap() = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(String::from);
                        recorded.bodies.lock().unwrap().push(body);
                        Json(json!({ "data": { "me": { "id": "1" } } }))
                    },
                ),
            )
            .with_state(recorded.clone());
        let endpoint = spawn(router).await;

        let tokens = SessionTokenStore::new();
        tokens.store(SessionToken::new("secret")).await;
        let transport = client(endpoint, Arc::new(tokens));

        let request = GraphQlRequest::new("Me", "query Me { me { id } }").variable("first", 20);
        let response = transport.execute(&request).await.unwrap();

        assert_eq!(response.data, Some(json!({ "me": { "id": "1" } })));
        assert_eq!(
            recorded.authorization.lock().unwrap().as_deref(),
            Some("Bearer secret")
        );
        let body = recorded.bodies.lock().unwrap()[0].clone();
        assert_eq!(body["operationName"], json!("Me"));
        assert_eq!(body["variables"]["first"], json!(20));
    }

    #[tokio::test]
    async fn test_error_envelope_on_bad_status_is_returned() {
        let router = Router::new().route(
            "/graphql",
            post(|| async {
                (
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(json!({ "errors": [{ "message": "bad variables" }] })),
                )
            }),
        );
        let transport = client(spawn(router).await, Arc::new(SessionTokenStore::new()));

        let response = transport
            .execute(&GraphQlRequest::new("Me", "query Me { me { id } }"))
            .await
            .unwrap();

        assert_eq!(response.first_error().map(|e| e.message.as_str()), Some("bad variables"));
    }

    #[tokio::test]
    async fn test_plain_error_status_is_status_error() {
        let router = Router::new().route(
            "/graphql",
            post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let transport = client(spawn(router).await, Arc::new(SessionTokenStore::new()));

        let error = transport
            .execute(&GraphQlRequest::new("Me", "query Me { me { id } }"))
            .await
            .unwrap_err();

        assert_eq!(
            error,
            TransportError::Status {
                status: 502,
                message: "upstream down".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        let endpoint = Url::parse(&format!("http://{address}/graphql")).unwrap();
        let transport = client(endpoint, Arc::new(SessionTokenStore::new()));

        let error = transport
            .execute(&GraphQlRequest::new("Me", "query Me { me { id } }"))
            .await
            .unwrap_err();

        assert!(matches!(error, TransportError::Connection(_)));
    }

    #[test]
    fn test_garbage_success_body_is_invalid_response() {
        let result = ReqwestGraphQlClient::decode(StatusCode::OK, b"<html>");
        assert!(matches!(result, Err(TransportError::InvalidResponse(_))));
    }
}
