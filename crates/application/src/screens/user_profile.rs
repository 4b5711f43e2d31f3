//! Profile screen state.

use std::sync::Arc;

use gather_domain::{EventSummary, OperationResult, UserProfile};
use tokio::sync::watch;

use crate::cancellation::Cancelled;
use crate::executor::ExecutionResult;
use crate::pagination::{Accumulator, CollectionState};
use crate::repositories::{EventsRepository, FriendsRepository, UserRepository};

/// State behind a user's profile: the profile itself and the events
/// that user is attending.
#[derive(Debug)]
pub struct UserProfileModel {
    username: String,
    users: Arc<UserRepository>,
    friends: Arc<FriendsRepository>,
    profile: watch::Sender<OperationResult<UserProfile>>,
    attending: Accumulator<EventSummary>,
}

impl UserProfileModel {
    /// Creates the model for `username`.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        users: Arc<UserRepository>,
        events: &Arc<EventsRepository>,
        friends: Arc<FriendsRepository>,
        page_size: u32,
    ) -> Self {
        let username = username.into();
        let (profile, _) = watch::channel(OperationResult::Idle);
        Self {
            attending: Accumulator::new(
                "profile_attending",
                page_size,
                events.user_attending_source(username.clone()),
            ),
            username,
            users,
            friends,
            profile,
        }
    }

    /// Whose profile this is.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Loads the profile and the first page of attended events together.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if either fetch was cancelled.
    pub async fn load(&self) -> Result<(), Cancelled> {
        let (profile, attending) = tokio::join!(self.load_profile(), self.attending.load());
        profile.and(attending)
    }

    async fn load_profile(&self) -> Result<(), Cancelled> {
        let previous = self.profile.send_replace(OperationResult::Loading);
        match self.users.profile(&self.username).await {
            Ok(result) => {
                self.profile.send_replace(result);
                Ok(())
            }
            Err(Cancelled) => {
                self.profile.send_replace(previous);
                Err(Cancelled)
            }
        }
    }

    /// Appends the next page of attended events.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the fetch was cancelled.
    pub async fn load_more_events(&self) -> Result<bool, Cancelled> {
        self.attending.load_more().await
    }

    /// Sends a friend request to this user.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the call was cancelled.
    pub async fn send_friend_request(&self) -> ExecutionResult<String> {
        let Some(user_id) = self.profile.borrow().value().map(|p| p.user.id.clone()) else {
            return Ok(OperationResult::error(
                gather_domain::ErrorKind::Client,
                "profile not loaded",
            ));
        };
        self.friends.send_friend_request(&user_id).await
    }

    /// Current profile state.
    #[must_use]
    pub fn profile(&self) -> OperationResult<UserProfile> {
        self.profile.borrow().clone()
    }

    /// Current attended-events state.
    #[must_use]
    pub fn attending(&self) -> CollectionState<EventSummary> {
        self.attending.snapshot()
    }

    /// Subscribes to profile changes.
    #[must_use]
    pub fn subscribe_profile(&self) -> watch::Receiver<OperationResult<UserProfile>> {
        self.profile.subscribe()
    }
}
