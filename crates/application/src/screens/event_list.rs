//! Event list screens (saved, attending, subscribed).

use std::sync::Arc;

use gather_domain::{ErrorKind, EventSummary, OperationResult};
use tokio::sync::watch;

use crate::cancellation::Cancelled;
use crate::executor::ExecutionResult;
use crate::pagination::{Accumulator, CollectionState};
use crate::repositories::{EventListKind, EventsRepository};

/// State behind one of the viewer's event lists.
#[derive(Debug)]
pub struct EventListModel {
    kind: EventListKind,
    repository: Arc<EventsRepository>,
    events: Accumulator<EventSummary>,
}

impl EventListModel {
    /// Creates the model for the given list.
    #[must_use]
    pub fn new(repository: Arc<EventsRepository>, kind: EventListKind, page_size: u32) -> Self {
        let name = match kind {
            EventListKind::Saved => "saved_events",
            EventListKind::Attending => "attending_events",
            EventListKind::Subscribed => "subscribed_events",
        };
        Self {
            kind,
            events: Accumulator::new(name, page_size, repository.events_source(kind)),
            repository,
        }
    }

    /// Which list this model shows.
    #[must_use]
    pub const fn kind(&self) -> EventListKind {
        self.kind
    }

    /// Loads the first page.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the fetch was cancelled.
    pub async fn load(&self) -> Result<(), Cancelled> {
        self.events.load().await
    }

    /// Appends the next page.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the fetch was cancelled.
    pub async fn load_more(&self) -> Result<bool, Cancelled> {
        self.events.load_more().await
    }

    /// Reloads from the first page.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the fetch was cancelled.
    pub async fn refresh(&self) -> Result<(), Cancelled> {
        self.events.refresh().await
    }

    /// Removes a bookmark; the event leaves the saved list immediately and
    /// returns if the server call fails. Only valid on the saved list.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the call was cancelled.
    pub async fn unsave_event(&self, event_id: &str) -> ExecutionResult<bool> {
        if self.kind != EventListKind::Saved {
            return Ok(OperationResult::error(
                ErrorKind::Client,
                "only saved events can be unsaved from this list",
            ));
        }

        self.events
            .remove_optimistically(
                |event| event.id == event_id,
                self.repository.unsave_event(event_id),
            )
            .await
    }

    /// Current list state.
    #[must_use]
    pub fn events(&self) -> CollectionState<EventSummary> {
        self.events.snapshot()
    }

    /// Subscribes to list changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CollectionState<EventSummary>> {
        self.events.subscribe()
    }
}
