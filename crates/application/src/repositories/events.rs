//! Events: details, saved/attending/subscribed lists and saving.

use std::sync::Arc;

use gather_domain::{Connection, EventDetail, EventSummary, GraphQlRequest, Page, PageRequest};
use serde::Deserialize;

use super::base::{GraphQlRepository, Viewer, paginate};
use crate::executor::ExecutionResult;
use crate::pagination::{PageFuture, PageSource};

const SUMMARY_FIELDS: &str = "id slug title startsAt venueName coverImageUrl";

const DETAIL_FIELDS: &str = "id slug title startsAt venueName coverImageUrl description endsAt \
     attendeeCount isSaved organizer { id username displayName avatarUrl }";

/// Which of the viewer's event lists to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventListKind {
    /// Events the viewer bookmarked.
    Saved,
    /// Events the viewer RSVP'd to.
    Attending,
    /// Events from organizers the viewer follows.
    Subscribed,
}

impl EventListKind {
    const fn field(self) -> &'static str {
        match self {
            Self::Saved => "savedEvents",
            Self::Attending => "attendingEvents",
            Self::Subscribed => "subscribedEvents",
        }
    }

    const fn operation(self) -> &'static str {
        match self {
            Self::Saved => "SavedEvents",
            Self::Attending => "AttendingEvents",
            Self::Subscribed => "SubscribedEvents",
        }
    }

    fn query(self) -> String {
        format!(
            "query {op}($first: Int!, $after: String) {{ me {{ events: {field}(first: $first, after: $after) {{ \
             edges {{ node {{ {SUMMARY_FIELDS} }} }} pageInfo {{ hasNextPage endCursor }} totalCount }} }} }}",
            op = self.operation(),
            field = self.field(),
        )
    }
}

fn user_attending_query() -> String {
    format!(
        "query UserAttendingEvents($username: String!, $first: Int!, $after: String) {{ \
         user(username: $username) {{ events: attendingEvents(first: $first, after: $after) {{ \
         edges {{ node {{ {SUMMARY_FIELDS} }} }} pageInfo {{ hasNextPage endCursor }} totalCount }} }} }}"
    )
}

#[derive(Deserialize)]
struct EventsNode {
    events: Connection<EventSummary>,
}

#[derive(Deserialize)]
struct UserEventsData {
    user: Option<EventsNode>,
}

#[derive(Deserialize)]
struct EventData {
    event: Option<EventDetail>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventBySlugData {
    event_by_slug: Option<EventDetail>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedFlag {
    is_saved: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveData {
    #[serde(alias = "unsaveEvent")]
    save_event: Option<SavedFlag>,
}

/// Repository for events.
#[derive(Debug, Clone)]
pub struct EventsRepository {
    graphql: GraphQlRepository,
}

impl EventsRepository {
    /// Creates the repository.
    #[must_use]
    pub const fn new(graphql: GraphQlRepository) -> Self {
        Self { graphql }
    }

    /// Event details by ID. A missing event is `Client` "Data not found".
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn event(&self, id: &str) -> ExecutionResult<EventDetail> {
        let request = GraphQlRequest::new(
            "Event",
            format!("query Event($id: ID!) {{ event(id: $id) {{ {DETAIL_FIELDS} }} }}"),
        )
        .variable("id", id);
        self.graphql
            .query(request, |data: EventData| data.event)
            .await
    }

    /// Event details by URL slug.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn event_by_slug(&self, slug: &str) -> ExecutionResult<EventDetail> {
        let request = GraphQlRequest::new(
            "EventBySlug",
            format!(
                "query EventBySlug($slug: String!) {{ eventBySlug(slug: $slug) {{ {DETAIL_FIELDS} }} }}"
            ),
        )
        .variable("slug", slug);
        self.graphql
            .query(request, |data: EventBySlugData| data.event_by_slug)
            .await
    }

    /// One page of one of the viewer's event lists.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn events(
        &self,
        kind: EventListKind,
        page: PageRequest,
    ) -> ExecutionResult<Page<EventSummary>> {
        let request = paginate(GraphQlRequest::new(kind.operation(), kind.query()), &page);
        self.graphql
            .query(request, |data: Viewer<EventsNode>| {
                data.me.map(|me| me.events.into_page(|event| event))
            })
            .await
    }

    /// One page of events another user is attending.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn user_attending_events(
        &self,
        username: &str,
        page: PageRequest,
    ) -> ExecutionResult<Page<EventSummary>> {
        let request = paginate(
            GraphQlRequest::new("UserAttendingEvents", user_attending_query())
                .variable("username", username),
            &page,
        );
        self.graphql
            .query(request, |data: UserEventsData| {
                data.user.map(|user| user.events.into_page(|event| event))
            })
            .await
    }

    /// Bookmarks an event. Succeeds with the new saved flag.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn save_event(&self, event_id: &str) -> ExecutionResult<bool> {
        self.set_saved("SaveEvent", "saveEvent", event_id).await
    }

    /// Removes a bookmark. Succeeds with the new saved flag.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn unsave_event(&self, event_id: &str) -> ExecutionResult<bool> {
        self.set_saved("UnsaveEvent", "unsaveEvent", event_id).await
    }

    async fn set_saved(&self, operation: &str, field: &str, event_id: &str) -> ExecutionResult<bool> {
        let request = GraphQlRequest::new(
            operation,
            format!(
                "mutation {operation}($eventId: ID!) {{ {field}(eventId: $eventId) {{ id isSaved }} }}"
            ),
        )
        .variable("eventId", event_id);
        self.graphql
            .mutate(request, |data: SaveData| data.save_event.map(|e| e.is_saved))
            .await
    }

    /// One of the viewer's event lists as a page source.
    #[must_use]
    pub fn events_source(self: &Arc<Self>, kind: EventListKind) -> impl PageSource<EventSummary> + 'static {
        let repository = Arc::clone(self);
        move |page: PageRequest| -> PageFuture<'static, EventSummary> {
            let repository = Arc::clone(&repository);
            Box::pin(async move { repository.events(kind, page).await })
        }
    }

    /// Another user's attending events as a page source.
    #[must_use]
    pub fn user_attending_source(
        self: &Arc<Self>,
        username: String,
    ) -> impl PageSource<EventSummary> + 'static {
        let repository = Arc::clone(self);
        move |page: PageRequest| -> PageFuture<'static, EventSummary> {
            let repository = Arc::clone(&repository);
            let username = username.clone();
            Box::pin(async move { repository.user_attending_events(&username, page).await })
        }
    }
}
