//! Gather Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod error;
pub mod http;
pub mod persistence;
pub mod serialization;

pub use adapters::{ReqwestGraphQlClient, ReqwestImageUploader};
pub use error::ClientBuildError;
pub use http::{ImageFileError, load_image};
pub use persistence::{SettingsError, SettingsRepository};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
