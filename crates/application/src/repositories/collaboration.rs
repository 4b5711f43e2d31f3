//! Event collaboration invitations.

use std::sync::Arc;

use gather_domain::{CollaborationRequest, Connection, GraphQlRequest, Page, PageRequest};
use serde::Deserialize;

use super::base::{GraphQlRepository, Viewer, paginate};
use crate::executor::ExecutionResult;
use crate::pagination::{PageFuture, PageSource};

const REQUESTS_QUERY: &str = "query CollaborationRequests($first: Int!, $after: String) { me { \
     collaborationRequests(first: $first, after: $after) { edges { node { \
     id eventId eventTitle role createdAt invitedBy { id username displayName avatarUrl } } } \
     pageInfo { hasNextPage endCursor } totalCount } } }";

const RESPOND_MUTATION: &str = "mutation RespondToCollaborationRequest($requestId: ID!, $accept: Boolean!) { \
     respondToCollaborationRequest(requestId: $requestId, accept: $accept) { id status } }";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestsNode {
    collaboration_requests: Connection<CollaborationRequest>,
}

#[derive(Deserialize)]
struct Responded {
    status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RespondData {
    respond_to_collaboration_request: Option<Responded>,
}

/// Repository for collaboration invitations.
#[derive(Debug, Clone)]
pub struct CollaborationRepository {
    graphql: GraphQlRepository,
}

impl CollaborationRepository {
    /// Creates the repository.
    #[must_use]
    pub const fn new(graphql: GraphQlRepository) -> Self {
        Self { graphql }
    }

    /// One page of pending invitations.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn collaboration_requests(
        &self,
        page: PageRequest,
    ) -> ExecutionResult<Page<CollaborationRequest>> {
        let request = paginate(GraphQlRequest::new("CollaborationRequests", REQUESTS_QUERY), &page);
        self.graphql
            .query(request, |data: Viewer<RequestsNode>| {
                data.me
                    .map(|me| me.collaboration_requests.into_page(|request| request))
            })
            .await
    }

    /// Accepts an invitation. Succeeds with the new request status.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn accept_collaboration_request(&self, request_id: &str) -> ExecutionResult<String> {
        self.respond(request_id, true).await
    }

    /// Declines an invitation. Succeeds with the new request status.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn reject_collaboration_request(&self, request_id: &str) -> ExecutionResult<String> {
        self.respond(request_id, false).await
    }

    async fn respond(&self, request_id: &str, accept: bool) -> ExecutionResult<String> {
        let request = GraphQlRequest::new("RespondToCollaborationRequest", RESPOND_MUTATION)
            .variable("requestId", request_id)
            .variable("accept", accept);
        self.graphql
            .mutate(request, |data: RespondData| {
                data.respond_to_collaboration_request.map(|r| r.status)
            })
            .await
    }

    /// Pending invitations as a page source.
    #[must_use]
    pub fn requests_source(self: &Arc<Self>) -> impl PageSource<CollaborationRequest> + 'static {
        let repository = Arc::clone(self);
        move |page: PageRequest| -> PageFuture<'static, CollaborationRequest> {
            let repository = Arc::clone(&repository);
            Box::pin(async move { repository.collaboration_requests(page).await })
        }
    }
}
