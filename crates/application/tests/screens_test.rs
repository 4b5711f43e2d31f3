//! Event, profile and collaboration screens over a scripted transport.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use common::{MockTransport, connection, data, event, repository, server_error, user};
use gather_application::{
    Accumulator, ActivityRepository, CollaborationRepository, CollaborationRequestsModel,
    EventListKind, EventListModel, EventsRepository, FriendsRepository, UnreadMessagesTracker,
    UserProfileModel, UserRepository, DATA_NOT_FOUND,
};
use gather_domain::{ActivityKind, ErrorKind, OperationError, OperationResult};
use pretty_assertions::assert_eq;
use serde_json::json;

fn events_response(ids: std::ops::Range<usize>, cursor: Option<&str>) -> serde_json::Value {
    json!({ "me": { "events": connection(ids.map(event).collect(), cursor) } })
}

#[tokio::test(start_paused = true)]
async fn test_saved_list_unsave_is_optimistic() {
    let transport = Arc::new(MockTransport::default());
    transport.push("SavedEvents", data(events_response(0..3, None)));
    transport.push(
        "UnsaveEvent",
        data(json!({ "unsaveEvent": { "id": "e1", "isSaved": false } })),
    );
    let events = Arc::new(EventsRepository::new(repository(&transport)));
    let model = EventListModel::new(events, EventListKind::Saved, 20);

    model.load().await.unwrap();
    let result = model.unsave_event("e1").await.unwrap();

    assert_eq!(result, OperationResult::Success(false));
    let ids: Vec<String> = model
        .events()
        .into_value()
        .unwrap()
        .items
        .into_iter()
        .map(|event| event.id)
        .collect();
    assert_eq!(ids, vec!["e0".to_string(), "e2".to_string()]);
    assert_eq!(transport.last("UnsaveEvent").variables.get("eventId"), Some(&json!("e1")));
}

#[tokio::test(start_paused = true)]
async fn test_unsave_outside_saved_list_is_refused() {
    let transport = Arc::new(MockTransport::default());
    let events = Arc::new(EventsRepository::new(repository(&transport)));
    let model = EventListModel::new(events, EventListKind::Attending, 20);

    let result = model.unsave_event("e1").await.unwrap();

    assert_eq!(result.error_ref().map(|e| e.kind), Some(ErrorKind::Client));
    assert_eq!(transport.calls("UnsaveEvent"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_event_lists_use_their_own_operation() {
    let transport = Arc::new(MockTransport::default());
    transport.push("SubscribedEvents", data(events_response(0..2, Some("s1"))));
    let events = Arc::new(EventsRepository::new(repository(&transport)));
    let model = EventListModel::new(events, EventListKind::Subscribed, 2);

    model.load().await.unwrap();

    let request = transport.last("SubscribedEvents");
    assert!(request.query.contains("events: subscribedEvents("));
    assert_eq!(request.variables.get("first"), Some(&json!(2)));
    assert!(model.events().into_value().unwrap().has_more);
}

#[tokio::test(start_paused = true)]
async fn test_missing_event_is_data_not_found() {
    let transport = Arc::new(MockTransport::default());
    transport.push("Event", data(json!({ "event": null })));
    let events = EventsRepository::new(repository(&transport));

    let result = events.event("404").await.unwrap();

    assert_eq!(result, OperationResult::Error(OperationError::client(DATA_NOT_FOUND)));
}

#[tokio::test(start_paused = true)]
async fn test_profile_loads_with_attending_events() {
    let transport = Arc::new(MockTransport::default());
    let mut profile = user(7);
    profile["bio"] = json!("Climber");
    profile["friendCount"] = json!(12);
    profile["isFriend"] = json!(false);
    transport.push("UserProfile", data(json!({ "user": profile })));
    transport.push(
        "UserAttendingEvents",
        data(json!({ "user": { "events": connection(vec![event(1)], None) } })),
    );
    transport.push("SendFriendRequest", data(json!({ "sendFriendRequest": { "id": "fr9" } })));

    let graphql = repository(&transport);
    let model = UserProfileModel::new(
        "user7",
        Arc::new(UserRepository::new(graphql.clone())),
        &Arc::new(EventsRepository::new(graphql.clone())),
        Arc::new(FriendsRepository::new(graphql)),
        20,
    );

    model.load().await.unwrap();

    let loaded = model.profile().into_value().unwrap();
    assert_eq!(loaded.user.username, "user7");
    assert_eq!(loaded.friend_count, 12);
    assert_eq!(model.attending().into_value().unwrap().len(), 1);
    assert_eq!(
        transport.last("UserAttendingEvents").variables.get("username"),
        Some(&json!("user7"))
    );

    let sent = model.send_friend_request().await.unwrap();
    assert_eq!(sent, OperationResult::Success("fr9".to_string()));
    assert_eq!(transport.last("SendFriendRequest").variables.get("userId"), Some(&json!("u7")));
}

#[tokio::test(start_paused = true)]
async fn test_friend_request_needs_loaded_profile() {
    let transport = Arc::new(MockTransport::default());
    let graphql = repository(&transport);
    let model = UserProfileModel::new(
        "user7",
        Arc::new(UserRepository::new(graphql.clone())),
        &Arc::new(EventsRepository::new(graphql.clone())),
        Arc::new(FriendsRepository::new(graphql)),
        20,
    );

    let result = model.send_friend_request().await.unwrap();

    assert_eq!(result.error_ref().map(|e| e.kind), Some(ErrorKind::Client));
    assert_eq!(transport.calls("SendFriendRequest"), 0);
}

fn invitation(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "eventId": "e1",
        "eventTitle": "Launch party",
        "role": "CO_HOST",
        "createdAt": "2026-03-01T12:00:00Z",
        "invitedBy": user(3)
    })
}

#[tokio::test(start_paused = true)]
async fn test_collaboration_decline_failure_rolls_back() {
    let transport = Arc::new(MockTransport::default());
    transport.push(
        "CollaborationRequests",
        data(json!({ "me": { "collaborationRequests": connection(
            vec![invitation("c1"), invitation("c2")],
            None
        ) } })),
    );
    transport.push("RespondToCollaborationRequest", server_error("already answered"));
    let model = CollaborationRequestsModel::new(
        Arc::new(CollaborationRepository::new(repository(&transport))),
        20,
    );
    model.load().await.unwrap();
    let before = model.requests();

    let result = model.reject("c1").await.unwrap();

    assert_eq!(result.error_ref().map(|e| e.message.as_str()), Some("already answered"));
    assert_eq!(model.requests(), before);
    let request = transport.last("RespondToCollaborationRequest");
    assert_eq!(request.variables.get("accept"), Some(&json!(false)));
}

#[tokio::test(start_paused = true)]
async fn test_activity_feed_accumulates() {
    let transport = Arc::new(MockTransport::default());
    transport.push(
        "ActivityFeed",
        data(json!({ "activityFeed": connection(
            vec![json!({
                "id": "a1",
                "kind": "ATTENDING",
                "actor": user(1),
                "event": event(5),
                "occurredAt": "2026-03-02T09:30:00Z"
            })],
            None
        ) })),
    );
    let activity = Arc::new(ActivityRepository::new(repository(&transport)));
    let feed = Accumulator::new("activity_feed", 20, activity.feed_source());

    feed.load().await.unwrap();

    let items = feed.snapshot().into_value().unwrap().items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].kind, ActivityKind::Attending);
    assert_eq!(items[0].event.as_ref().map(|e| e.id.as_str()), Some("e5"));
}

#[tokio::test(start_paused = true)]
async fn test_unread_tracker_keeps_count_on_failure() {
    let transport = Arc::new(MockTransport::default());
    transport.push("UnreadMessageCount", data(json!({ "me": { "unreadMessageCount": 4 } })));
    transport.push("UnreadMessageCount", server_error("unavailable"));
    let tracker = UnreadMessagesTracker::new(Arc::new(UserRepository::new(repository(&transport))));
    let mut badge = tracker.subscribe();

    tracker.refresh().await.unwrap();
    assert_eq!(tracker.count(), 4);
    assert!(badge.has_changed().unwrap());
    badge.borrow_and_update();

    let failed = tracker.refresh().await.unwrap();
    assert!(failed.is_error());
    assert_eq!(tracker.count(), 4);

    tracker.increment();
    assert_eq!(tracker.count(), 5);
    tracker.mark_all_read();
    assert_eq!(tracker.count(), 0);

    tracker.set(0);
    badge.borrow_and_update();
    tracker.set(0);
    assert!(!badge.has_changed().unwrap());
}
