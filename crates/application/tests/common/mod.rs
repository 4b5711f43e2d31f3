//! Scripted GraphQL transport shared by the integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gather_application::{GraphQlRepository, GraphQlTransport, OperationExecutor, RetryPolicy, TransportError};
use gather_domain::{GraphQlRequest, GraphQlResponse};
use serde_json::{Value, json};

/// Answers each operation from its own queue and logs every request.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<Result<GraphQlResponse, TransportError>>>>,
    requests: Mutex<Vec<GraphQlRequest>>,
    latency: Option<Duration>,
}

impl MockTransport {
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub fn push(&self, operation: &str, response: Result<GraphQlResponse, TransportError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.name() == operation)
            .count()
    }

    pub fn last(&self, operation: &str) -> GraphQlRequest {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|request| request.name() == operation)
            .cloned()
            .expect("operation was never sent")
    }
}

#[async_trait]
impl GraphQlTransport for MockTransport {
    async fn execute(&self, request: &GraphQlRequest) -> Result<GraphQlResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.responses
            .lock()
            .unwrap()
            .get_mut(request.name())
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(TransportError::Connection("unscripted".to_string())))
    }
}

/// Repository over `transport` with short backoff delays.
pub fn repository(transport: &Arc<MockTransport>) -> GraphQlRepository {
    let transport: Arc<dyn GraphQlTransport> = transport.clone();
    let executor = OperationExecutor::new(RetryPolicy {
        max_attempts: 3,
        initial_delay: Duration::from_millis(100),
        max_delay: Duration::from_millis(500),
    });
    GraphQlRepository::new(transport, executor)
}

pub fn user(id: usize) -> Value {
    json!({ "id": format!("u{id}"), "username": format!("user{id}"), "displayName": null })
}

pub fn event(id: usize) -> Value {
    json!({
        "id": format!("e{id}"),
        "slug": format!("event-{id}"),
        "title": format!("Event {id}"),
        "startsAt": "2026-11-01T18:00:00Z"
    })
}

/// A Relay connection over `nodes`.
pub fn connection(nodes: Vec<Value>, cursor: Option<&str>) -> Value {
    let edges: Vec<Value> = nodes.into_iter().map(|node| json!({ "node": node })).collect();
    json!({
        "edges": edges,
        "pageInfo": { "hasNextPage": cursor.is_some(), "endCursor": cursor },
        "totalCount": null
    })
}

pub fn data(value: Value) -> Result<GraphQlResponse, TransportError> {
    Ok(GraphQlResponse::data(value))
}

pub fn server_error(message: &str) -> Result<GraphQlResponse, TransportError> {
    Ok(GraphQlResponse::errors(vec![gather_domain::GraphQlError::new(message)]))
}
