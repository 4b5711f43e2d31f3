//! Process-wide services, constructed once and injected where needed.

mod unread_messages;

pub use unread_messages::UnreadMessagesTracker;
