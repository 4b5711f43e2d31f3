//! Collaboration invitations screen state.

use std::sync::Arc;

use gather_domain::CollaborationRequest;
use tokio::sync::watch;

use crate::cancellation::Cancelled;
use crate::executor::ExecutionResult;
use crate::pagination::{Accumulator, CollectionState};
use crate::repositories::CollaborationRepository;

/// State behind the collaboration inbox.
#[derive(Debug)]
pub struct CollaborationRequestsModel {
    repository: Arc<CollaborationRepository>,
    requests: Accumulator<CollaborationRequest>,
}

impl CollaborationRequestsModel {
    /// Creates the model with an idle inbox.
    #[must_use]
    pub fn new(repository: Arc<CollaborationRepository>, page_size: u32) -> Self {
        Self {
            requests: Accumulator::new(
                "collaboration_requests",
                page_size,
                repository.requests_source(),
            ),
            repository,
        }
    }

    /// Loads the first page.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the fetch was cancelled.
    pub async fn load(&self) -> Result<(), Cancelled> {
        self.requests.load().await
    }

    /// Appends the next page.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the fetch was cancelled.
    pub async fn load_more(&self) -> Result<bool, Cancelled> {
        self.requests.load_more().await
    }

    /// Accepts an invitation, removing it from the inbox optimistically.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the call was cancelled.
    pub async fn accept(&self, request_id: &str) -> ExecutionResult<String> {
        self.requests
            .remove_optimistically(
                |request| request.id == request_id,
                self.repository.accept_collaboration_request(request_id),
            )
            .await
    }

    /// Declines an invitation, removing it from the inbox optimistically.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the call was cancelled.
    pub async fn reject(&self, request_id: &str) -> ExecutionResult<String> {
        self.requests
            .remove_optimistically(
                |request| request.id == request_id,
                self.repository.reject_collaboration_request(request_id),
            )
            .await
    }

    /// Current inbox state.
    #[must_use]
    pub fn requests(&self) -> CollectionState<CollaborationRequest> {
        self.requests.snapshot()
    }

    /// Subscribes to inbox changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CollectionState<CollaborationRequest>> {
        self.requests.subscribe()
    }
}
