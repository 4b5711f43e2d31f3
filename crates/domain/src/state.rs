//! Operation result types for UI binding.
//!
//! This module defines the state of a single network operation,
//! enabling the UI to display appropriate feedback at each stage.

use serde::{Deserialize, Serialize};

/// Represents the outcome of a network operation as the UI sees it.
///
/// - `Idle`: nothing requested yet
/// - `Loading`: operation in flight, show a spinner
/// - `Success`: data available
/// - `Error`: operation failed, show a message and a retry affordance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum OperationResult<T> {
    /// No operation has been started yet.
    #[default]
    Idle,

    /// Operation is in progress.
    Loading,

    /// Operation completed successfully.
    Success(T),

    /// Operation failed.
    Error(OperationError),
}

impl<T> OperationResult<T> {
    /// Creates an Error state.
    #[must_use]
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error(OperationError::new(kind, message))
    }

    /// Returns true if the state is Idle.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true if an operation is in progress.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns true if the operation succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true if the operation failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the value if in Success state.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value if in Success state.
    pub const fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the error if in Error state.
    #[must_use]
    pub const fn error_ref(&self) -> Option<&OperationError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Consumes the state and returns the value if in Success state.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Maps the success value, leaving other states untouched.
    pub fn map<U, F>(self, f: F) -> OperationResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Idle => OperationResult::Idle,
            Self::Loading => OperationResult::Loading,
            Self::Success(value) => OperationResult::Success(f(value)),
            Self::Error(error) => OperationResult::Error(error),
        }
    }

    /// Converts a finished operation into a `Result`.
    ///
    /// `Idle` and `Loading` are not outcomes and yield `None`.
    pub fn into_result(self) -> Option<Result<T, OperationError>> {
        match self {
            Self::Idle | Self::Loading => None,
            Self::Success(value) => Some(Ok(value)),
            Self::Error(error) => Some(Err(error)),
        }
    }
}

impl<T> From<Result<T, OperationError>> for OperationResult<T> {
    fn from(result: Result<T, OperationError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Error(error),
        }
    }
}

/// A classified operation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{}: {message}", .kind.title())]
pub struct OperationError {
    /// Error category.
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
}

impl OperationError {
    /// Creates a new error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a `Network` error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// Creates a `Server` error.
    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Server, message)
    }

    /// Creates a `Client` error.
    #[must_use]
    pub fn client(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Client, message)
    }

    /// Returns true if retrying the operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Categories of operation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transport or connectivity failure.
    Network,

    /// The GraphQL response carried application-level errors.
    Server,

    /// Missing data or a failed transform.
    Client,
}

impl ErrorKind {
    /// Only network failures are transient.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Returns a human-readable title for this error type.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Network => "Network Error",
            Self::Server => "Server Error",
            Self::Client => "Unexpected Response",
        }
    }
}
