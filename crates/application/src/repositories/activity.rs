//! Activity feed.

use std::sync::Arc;

use gather_domain::{ActivityItem, Connection, GraphQlRequest, Page, PageRequest};
use serde::Deserialize;

use super::base::{GraphQlRepository, paginate};
use crate::executor::ExecutionResult;
use crate::pagination::{PageFuture, PageSource};

const FEED_QUERY: &str = "query ActivityFeed($first: Int!, $after: String) { \
     activityFeed(first: $first, after: $after) { edges { node { id kind occurredAt \
     actor { id username displayName avatarUrl } \
     event { id slug title startsAt venueName coverImageUrl } } } \
     pageInfo { hasNextPage endCursor } totalCount } }";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedData {
    activity_feed: Option<Connection<ActivityItem>>,
}

/// Repository for the friends activity feed.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    graphql: GraphQlRepository,
}

impl ActivityRepository {
    /// Creates the repository.
    #[must_use]
    pub const fn new(graphql: GraphQlRepository) -> Self {
        Self { graphql }
    }

    /// One page of the feed, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled.
    pub async fn feed(&self, page: PageRequest) -> ExecutionResult<Page<ActivityItem>> {
        let request = paginate(GraphQlRequest::new("ActivityFeed", FEED_QUERY), &page);
        self.graphql
            .query(request, |data: FeedData| {
                data.activity_feed.map(|feed| feed.into_page(|item| item))
            })
            .await
    }

    /// The feed as a page source.
    #[must_use]
    pub fn feed_source(self: &Arc<Self>) -> impl PageSource<ActivityItem> + 'static {
        let repository = Arc::clone(self);
        move |page: PageRequest| -> PageFuture<'static, ActivityItem> {
            let repository = Arc::clone(&repository);
            Box::pin(async move { repository.feed(page).await })
        }
    }
}
