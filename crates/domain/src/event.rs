//! Events and activity feed entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::social::UserSummary;

/// Event as shown in lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    /// Event ID.
    pub id: String,
    /// URL slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Title.
    pub title: String,
    /// Start time.
    pub starts_at: DateTime<Utc>,
    /// Venue name, if any.
    #[serde(default)]
    pub venue_name: Option<String>,
    /// Cover image URL.
    #[serde(default)]
    pub cover_image_url: Option<String>,
}

/// Full event details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    /// List fields.
    #[serde(flatten)]
    pub summary: EventSummary,
    /// Long description.
    #[serde(default)]
    pub description: Option<String>,
    /// End time.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Organizer.
    pub organizer: UserSummary,
    /// Number of attendees.
    #[serde(default)]
    pub attendee_count: u32,
    /// Whether the viewer saved this event.
    #[serde(default)]
    pub is_saved: bool,
}

/// Kind of activity feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    /// A friend is attending an event.
    Attending,
    /// A friend saved an event.
    Saved,
    /// A friend created an event.
    Created,
    /// Two users became friends.
    Friended,
}

/// One entry in the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    /// Entry ID.
    pub id: String,
    /// What happened.
    pub kind: ActivityKind,
    /// Who did it.
    pub actor: UserSummary,
    /// Related event, if any.
    #[serde(default)]
    pub event: Option<EventSummary>,
    /// When it happened.
    pub occurred_at: DateTime<Utc>,
}
