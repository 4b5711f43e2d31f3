//! Friends screen state.

use std::sync::Arc;

use gather_domain::{FriendRequest, UserSummary};
use tokio::sync::watch;

use crate::cancellation::Cancelled;
use crate::executor::ExecutionResult;
use crate::pagination::{Accumulator, CollectionState};
use crate::repositories::FriendsRepository;

/// State behind the friends screen: the friends list and the inbox of
/// incoming friend requests.
#[derive(Debug)]
pub struct FriendsListModel {
    repository: Arc<FriendsRepository>,
    friends: Accumulator<UserSummary>,
    requests: Accumulator<FriendRequest>,
}

impl FriendsListModel {
    /// Creates the model with both lists idle.
    #[must_use]
    pub fn new(repository: Arc<FriendsRepository>, page_size: u32) -> Self {
        Self {
            friends: Accumulator::new("friends", page_size, repository.friends_source()),
            requests: Accumulator::new(
                "friend_requests",
                page_size,
                repository.incoming_requests_source(),
            ),
            repository,
        }
    }

    /// Loads the first page of friends.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the fetch was cancelled.
    pub async fn load_friends(&self) -> Result<(), Cancelled> {
        self.friends.load().await
    }

    /// Appends the next page of friends. Returns whether a fetch was issued.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the fetch was cancelled.
    pub async fn load_more(&self) -> Result<bool, Cancelled> {
        self.friends.load_more().await
    }

    /// Reloads the friends list from the first page.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the fetch was cancelled.
    pub async fn refresh(&self) -> Result<(), Cancelled> {
        self.friends.refresh().await
    }

    /// Loads the first page of incoming requests.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the fetch was cancelled.
    pub async fn load_requests(&self) -> Result<(), Cancelled> {
        self.requests.load().await
    }

    /// Appends the next page of incoming requests.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the fetch was cancelled.
    pub async fn load_more_requests(&self) -> Result<bool, Cancelled> {
        self.requests.load_more().await
    }

    /// Accepts a request: it disappears from the inbox immediately and
    /// comes back if the server call fails. On success the new friend is
    /// placed at the top of the friends list.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the call was cancelled.
    pub async fn accept_friend_request(&self, request_id: &str) -> ExecutionResult<UserSummary> {
        let result = self
            .requests
            .remove_optimistically(
                |request| request.id == request_id,
                self.repository.accept_friend_request(request_id),
            )
            .await?;

        if let Some(friend) = result.value() {
            let friend = friend.clone();
            self.friends.modify(|friends| friends.prepend(friend));
        }
        Ok(result)
    }

    /// Rejects a request with the same optimistic removal as accepting.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the call was cancelled.
    pub async fn reject_friend_request(&self, request_id: &str) -> ExecutionResult<String> {
        self.requests
            .remove_optimistically(
                |request| request.id == request_id,
                self.repository.reject_friend_request(request_id),
            )
            .await
    }

    /// Removes a friend optimistically.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the call was cancelled.
    pub async fn remove_friend(&self, user_id: &str) -> ExecutionResult<String> {
        self.friends
            .remove_optimistically(
                |friend| friend.id == user_id,
                self.repository.remove_friend(user_id),
            )
            .await
    }

    /// Current friends list.
    #[must_use]
    pub fn friends(&self) -> CollectionState<UserSummary> {
        self.friends.snapshot()
    }

    /// Current request inbox.
    #[must_use]
    pub fn requests(&self) -> CollectionState<FriendRequest> {
        self.requests.snapshot()
    }

    /// Subscribes to friends list changes.
    #[must_use]
    pub fn subscribe_friends(&self) -> watch::Receiver<CollectionState<UserSummary>> {
        self.friends.subscribe()
    }

    /// Subscribes to request inbox changes.
    #[must_use]
    pub fn subscribe_requests(&self) -> watch::Receiver<CollectionState<FriendRequest>> {
        self.requests.subscribe()
    }
}
