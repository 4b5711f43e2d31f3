//! Gather Application - Operation execution, list state and ports
//!
//! This crate defines the application layer with:
//! - Port traits (GraphQL transport, image storage, access tokens)
//! - The operation executor with retry and cancellation
//! - The cursor-paginated list accumulator
//! - GraphQL repositories and per-screen list models

pub mod auth;
pub mod cancellation;
pub mod executor;
pub mod pagination;
pub mod ports;
pub mod repositories;
pub mod screens;
pub mod services;
pub mod use_cases;

pub use auth::{SessionToken, SessionTokenStore};
pub use cancellation::{CancellationReceiver, CancellationToken, Cancelled};
pub use executor::{DATA_NOT_FOUND, ExecutionResult, NO_DATA_RETURNED, OperationExecutor, RetryPolicy};
pub use pagination::{Accumulated, Accumulator, CollectionState, PageFuture, PageSource};
pub use ports::{AccessTokenProvider, GraphQlTransport, ImageUploader, TransportError, UploadError};
pub use repositories::{
    ActivityRepository, CollaborationRepository, EventListKind, EventsRepository,
    FriendsRepository, GraphQlRepository, UserRepository,
};
pub use screens::{CollaborationRequestsModel, EventListModel, FriendsListModel, UserProfileModel};
pub use services::UnreadMessagesTracker;
pub use use_cases::UploadImage;
