//! Gather Domain - Core business types
//!
//! This crate defines the domain model for the Gather client.
//! All types here are pure Rust with no I/O dependencies.

pub mod deeplink;
pub mod error;
pub mod event;
pub mod graphql;
pub mod pagination;
pub mod settings;
pub mod social;
pub mod state;
pub mod upload;

pub use deeplink::{DeepLink, EntityRef};
pub use error::{DomainError, DomainResult};
pub use event::{ActivityItem, ActivityKind, EventDetail, EventSummary};
pub use graphql::{GraphQlError, GraphQlRequest, GraphQlResponse};
pub use pagination::{Connection, DEFAULT_PAGE_SIZE, Edge, Page, PageInfo, PageRequest};
pub use settings::{ClientSettings, RetrySettings};
pub use social::{CollaborationRequest, CollaboratorRole, FriendRequest, UserProfile, UserSummary};
pub use state::{ErrorKind, OperationError, OperationResult};
pub use upload::{ImageUpload, UploadEntityType, UploadedImage};
