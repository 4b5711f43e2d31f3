//! Per-screen list state.
//!
//! Each model is the single owner of its lists; the UI only reads
//! snapshots or subscribes to changes.

mod collaboration_requests;
mod event_list;
mod friends_list;
mod user_profile;

pub use collaboration_requests::CollaborationRequestsModel;
pub use event_list::EventListModel;
pub use friends_list::FriendsListModel;
pub use user_profile::UserProfileModel;
