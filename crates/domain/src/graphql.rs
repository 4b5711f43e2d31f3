//! GraphQL request and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A GraphQL operation ready to be sent over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    /// The query or mutation document.
    pub query: String,
    /// Name of the operation inside the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// Operation variables.
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub variables: Map<String, Value>,
}

impl GraphQlRequest {
    /// Creates a named operation with no variables.
    #[must_use]
    pub fn new(operation_name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation_name: Some(operation_name.into()),
            variables: Map::new(),
        }
    }

    /// Adds a variable. `None`-like values are still sent as `null`.
    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Returns the operation name, or `"anonymous"`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.operation_name.as_deref().unwrap_or("anonymous")
    }
}

/// The standard GraphQL response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct GraphQlResponse<T = Value> {
    /// Response payload, absent on fatal errors.
    #[serde(default)]
    pub data: Option<T>,
    /// Application-level errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphQlError>>,
}

impl<T> GraphQlResponse<T> {
    /// Creates a response carrying only data.
    #[must_use]
    pub const fn data(data: T) -> Self {
        Self {
            data: Some(data),
            errors: None,
        }
    }

    /// Creates a response carrying only errors.
    #[must_use]
    pub const fn errors(errors: Vec<GraphQlError>) -> Self {
        Self {
            data: None,
            errors: Some(errors),
        }
    }

    /// Returns the first application error, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<&GraphQlError> {
        self.errors.as_ref().and_then(|errors| errors.first())
    }

    /// Converts the payload type.
    pub fn map_data<U, F>(self, f: F) -> GraphQlResponse<U>
    where
        F: FnOnce(T) -> U,
    {
        GraphQlResponse {
            data: self.data.map(f),
            errors: self.errors,
        }
    }
}

/// A single GraphQL error entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    /// Error message.
    pub message: String,
    /// Path of the failing field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
    /// Server-specific extensions (error codes and the like).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQlError {
    /// Creates an error with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
            extensions: None,
        }
    }

    /// Returns `extensions.code` if the server supplied one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(Value::as_str)
    }
}
