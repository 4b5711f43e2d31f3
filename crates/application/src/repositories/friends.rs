//! Friends and friend requests.

use std::sync::Arc;

use gather_domain::{Connection, FriendRequest, GraphQlRequest, Page, PageRequest, UserSummary};
use serde::Deserialize;

use super::base::{GraphQlRepository, Viewer, paginate};
use crate::executor::ExecutionResult;
use crate::pagination::{PageFuture, PageSource};

const USER_FIELDS: &str = "id username displayName avatarUrl";

fn friends_query() -> String {
    format!(
        "query Friends($first: Int!, $after: String) {{ me {{ friends(first: $first, after: $after) {{ \
         edges {{ node {{ {USER_FIELDS} }} }} pageInfo {{ hasNextPage endCursor }} totalCount }} }} }}"
    )
}

fn incoming_requests_query() -> String {
    format!(
        "query IncomingFriendRequests($first: Int!, $after: String) {{ me {{ \
         incomingFriendRequests(first: $first, after: $after) {{ \
         edges {{ node {{ id createdAt from {{ {USER_FIELDS} }} }} }} \
         pageInfo {{ hasNextPage endCursor }} totalCount }} }} }}"
    )
}

fn accept_mutation() -> String {
    format!(
        "mutation AcceptFriendRequest($requestId: ID!) {{ \
         acceptFriendRequest(requestId: $requestId) {{ friend {{ {USER_FIELDS} }} }} }}"
    )
}

const REJECT_MUTATION: &str = "mutation RejectFriendRequest($requestId: ID!) { \
     rejectFriendRequest(requestId: $requestId) { id } }";

const SEND_MUTATION: &str = "mutation SendFriendRequest($userId: ID!) { \
     sendFriendRequest(userId: $userId) { id } }";

const REMOVE_MUTATION: &str = "mutation RemoveFriend($userId: ID!) { \
     removeFriend(userId: $userId) { id } }";

#[derive(Deserialize)]
struct FriendsNode {
    friends: Connection<UserSummary>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomingNode {
    incoming_friend_requests: Connection<FriendRequest>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AcceptData {
    accept_friend_request: Option<AcceptPayload>,
}

#[derive(Deserialize)]
struct AcceptPayload {
    friend: UserSummary,
}

#[derive(Deserialize)]
struct Identified {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RejectData {
    reject_friend_request: Option<Identified>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendData {
    send_friend_request: Option<Identified>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveData {
    remove_friend: Option<Identified>,
}

/// Repository for the current user's friendships.
#[derive(Debug, Clone)]
pub struct FriendsRepository {
    graphql: GraphQlRepository,
}

impl FriendsRepository {
    /// Creates the repository.
    #[must_use]
    pub const fn new(graphql: GraphQlRepository) -> Self {
        Self { graphql }
    }

    /// One page of the current user's friends.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn friends(&self, page: PageRequest) -> ExecutionResult<Page<UserSummary>> {
        let request = paginate(GraphQlRequest::new("Friends", friends_query()), &page);
        self.graphql
            .query(request, |data: Viewer<FriendsNode>| {
                data.me.map(|me| me.friends.into_page(|user| user))
            })
            .await
    }

    /// One page of friend requests addressed to the current user.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn incoming_friend_requests(
        &self,
        page: PageRequest,
    ) -> ExecutionResult<Page<FriendRequest>> {
        let request = paginate(
            GraphQlRequest::new("IncomingFriendRequests", incoming_requests_query()),
            &page,
        );
        self.graphql
            .query(request, |data: Viewer<IncomingNode>| {
                data.me
                    .map(|me| me.incoming_friend_requests.into_page(|request| request))
            })
            .await
    }

    /// Accepts a request and returns the new friend.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn accept_friend_request(&self, request_id: &str) -> ExecutionResult<UserSummary> {
        let request = GraphQlRequest::new("AcceptFriendRequest", accept_mutation())
            .variable("requestId", request_id);
        self.graphql
            .mutate(request, |data: AcceptData| {
                data.accept_friend_request.map(|payload| payload.friend)
            })
            .await
    }

    /// Rejects a request and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn reject_friend_request(&self, request_id: &str) -> ExecutionResult<String> {
        let request = GraphQlRequest::new("RejectFriendRequest", REJECT_MUTATION)
            .variable("requestId", request_id);
        self.graphql
            .mutate(request, |data: RejectData| {
                data.reject_friend_request.map(|r| r.id)
            })
            .await
    }

    /// Sends a friend request and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn send_friend_request(&self, user_id: &str) -> ExecutionResult<String> {
        let request =
            GraphQlRequest::new("SendFriendRequest", SEND_MUTATION).variable("userId", user_id);
        self.graphql
            .mutate(request, |data: SendData| data.send_friend_request.map(|r| r.id))
            .await
    }

    /// Removes a friend and returns their user ID.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn remove_friend(&self, user_id: &str) -> ExecutionResult<String> {
        let request =
            GraphQlRequest::new("RemoveFriend", REMOVE_MUTATION).variable("userId", user_id);
        self.graphql
            .mutate(request, |data: RemoveData| data.remove_friend.map(|r| r.id))
            .await
    }

    /// Friends list as a page source.
    #[must_use]
    pub fn friends_source(self: &Arc<Self>) -> impl PageSource<UserSummary> + 'static {
        let repository = Arc::clone(self);
        move |page: PageRequest| -> PageFuture<'static, UserSummary> {
            let repository = Arc::clone(&repository);
            Box::pin(async move { repository.friends(page).await })
        }
    }

    /// Incoming requests as a page source.
    #[must_use]
    pub fn incoming_requests_source(self: &Arc<Self>) -> impl PageSource<FriendRequest> + 'static {
        let repository = Arc::clone(self);
        move |page: PageRequest| -> PageFuture<'static, FriendRequest> {
            let repository = Arc::clone(&repository);
            Box::pin(async move { repository.incoming_friend_requests(page).await })
        }
    }
}
