//! Unread chat message counter shared across screens.

use std::sync::Arc;

use gather_domain::OperationResult;
use tokio::sync::watch;

use crate::cancellation::Cancelled;
use crate::repositories::UserRepository;

/// Tracks the viewer's unread message count.
///
/// Construct one per process and hand out clones of the `Arc`; screens
/// subscribe to render badges.
#[derive(Debug)]
pub struct UnreadMessagesTracker {
    users: Arc<UserRepository>,
    count: watch::Sender<u32>,
}

impl UnreadMessagesTracker {
    /// Creates a tracker starting at zero.
    #[must_use]
    pub fn new(users: Arc<UserRepository>) -> Arc<Self> {
        let (count, _) = watch::channel(0);
        Arc::new(Self { users, count })
    }

    /// Current unread count.
    #[must_use]
    pub fn count(&self) -> u32 {
        *self.count.borrow()
    }

    /// Subscribes to count changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.count.subscribe()
    }

    /// Overwrites the count, notifying only on change.
    pub fn set(&self, count: u32) {
        self.count.send_if_modified(|current| {
            let changed = *current != count;
            *current = count;
            changed
        });
    }

    /// Records one more unread message.
    pub fn increment(&self) {
        self.count.send_modify(|current| *current = current.saturating_add(1));
    }

    /// Clears the badge.
    pub fn mark_all_read(&self) {
        self.set(0);
    }

    /// Fetches the count from the server. On failure the last known
    /// count is kept and the failure returned.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the fetch was cancelled.
    pub async fn refresh(&self) -> Result<OperationResult<u32>, Cancelled> {
        let result = self.users.unread_message_count().await?;
        if let Some(count) = result.value() {
            self.set(*count);
        }
        Ok(result)
    }
}
