//! User profiles and per-user counters.

use gather_domain::{GraphQlRequest, UserProfile};
use serde::Deserialize;

use super::base::{GraphQlRepository, Viewer};
use crate::executor::ExecutionResult;

const PROFILE_QUERY: &str = "query UserProfile($username: String!) { user(username: $username) { \
     id username displayName avatarUrl bio friendCount isFriend } }";

const UNREAD_QUERY: &str = "query UnreadMessageCount { me { unreadMessageCount } }";

#[derive(Deserialize)]
struct ProfileData {
    user: Option<UserProfile>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnreadNode {
    unread_message_count: u32,
}

/// Repository for user-level data.
#[derive(Debug, Clone)]
pub struct UserRepository {
    graphql: GraphQlRepository,
}

impl UserRepository {
    /// Creates the repository.
    #[must_use]
    pub const fn new(graphql: GraphQlRepository) -> Self {
        Self { graphql }
    }

    /// Profile by username. An unknown user is `Client` "Data not found".
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn profile(&self, username: &str) -> ExecutionResult<UserProfile> {
        let request =
            GraphQlRequest::new("UserProfile", PROFILE_QUERY).variable("username", username);
        self.graphql
            .query(request, |data: ProfileData| data.user)
            .await
    }

    /// Number of unread chat messages for the viewer.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn unread_message_count(&self) -> ExecutionResult<u32> {
        let request = GraphQlRequest::new("UnreadMessageCount", UNREAD_QUERY);
        self.graphql
            .query(request, |data: Viewer<UnreadNode>| {
                data.me.map(|me| me.unread_message_count)
            })
            .await
    }
}
