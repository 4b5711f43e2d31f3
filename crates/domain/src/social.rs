//! People, friendships and collaboration requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Compact user representation used in lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User ID.
    pub id: String,
    /// Unique handle.
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UserSummary {
    /// Name to show in the UI, falling back to the username.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// A pending friend request addressed to the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    /// Request ID.
    pub id: String,
    /// Who sent the request.
    pub from: UserSummary,
    /// When the request was sent.
    pub created_at: DateTime<Utc>,
}

/// Role offered in a collaboration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollaboratorRole {
    /// Can edit event details.
    Editor,
    /// Full control over the event.
    CoHost,
    /// Read-only access to drafts.
    Viewer,
}

/// An invitation to collaborate on an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationRequest {
    /// Request ID.
    pub id: String,
    /// Event the invitation is for.
    pub event_id: String,
    /// Event title for display.
    pub event_title: String,
    /// Who sent the invitation.
    pub invited_by: UserSummary,
    /// Offered role.
    pub role: CollaboratorRole,
    /// When the invitation was sent.
    pub created_at: DateTime<Utc>,
}

/// Full profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Basic identity.
    #[serde(flatten)]
    pub user: UserSummary,
    /// Free-form bio.
    #[serde(default)]
    pub bio: Option<String>,
    /// Number of friends.
    #[serde(default)]
    pub friend_count: u32,
    /// Whether the viewer is friends with this user.
    #[serde(default)]
    pub is_friend: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_label_falls_back_to_username() {
        let mut user = UserSummary {
            id: "1".to_string(),
            username: "ada".to_string(),
            display_name: None,
            avatar_url: None,
        };
        assert_eq!(user.label(), "ada");

        user.display_name = Some("Ada L.".to_string());
        assert_eq!(user.label(), "Ada L.");
    }

    #[test]
    fn test_profile_deserializes_flattened_user() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": "7",
            "username": "grace",
            "displayName": "Grace",
            "friendCount": 12,
            "isFriend": true
        }))
        .unwrap();

        assert_eq!(profile.user.username, "grace");
        assert_eq!(profile.friend_count, 12);
        assert!(profile.is_friend);
        assert!(profile.bio.is_none());
    }

    #[test]
    fn test_collaborator_role_wire_format() {
        let role: CollaboratorRole = serde_json::from_value(json!("CO_HOST")).unwrap();
        assert_eq!(role, CollaboratorRole::CoHost);
    }
}
