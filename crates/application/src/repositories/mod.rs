//! GraphQL repositories.
//!
//! Each repository builds the operations for one area of the API, runs
//! them through the shared `GraphQlRepository` and maps the response
//! data into domain models.

mod activity;
mod base;
mod collaboration;
mod events;
mod friends;
mod users;

pub use activity::ActivityRepository;
pub use base::{GraphQlRepository, paginate};
pub use collaboration::CollaborationRepository;
pub use events::{EventListKind, EventsRepository};
pub use friends::FriendsRepository;
pub use users::UserRepository;
