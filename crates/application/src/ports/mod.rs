//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod access_token;
mod graphql_transport;
mod image_uploader;

pub use access_token::AccessTokenProvider;
pub use graphql_transport::{GraphQlTransport, TransportError};
pub use image_uploader::{ImageUploader, UploadError};
