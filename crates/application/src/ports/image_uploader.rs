//! Image upload port

use async_trait::async_trait;
use gather_domain::{DomainError, ImageUpload, OperationError, UploadedImage};
use thiserror::Error;

/// Errors returned by the storage endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// The endpoint answered 401.
    #[error("authentication required")]
    AuthenticationRequired,

    /// The endpoint refused the upload.
    #[error("upload rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Short error code from the body.
        error: String,
        /// Human-readable message from the body.
        message: String,
    },

    /// Could not reach the endpoint.
    #[error("network error: {0}")]
    Network(String),

    /// The success body did not match `{ url, path }`.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The payload failed local validation.
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

impl From<UploadError> for OperationError {
    fn from(error: UploadError) -> Self {
        match error {
            UploadError::Network(message) => Self::network(message),
            UploadError::AuthenticationRequired | UploadError::Rejected { .. } => {
                Self::server(error.to_string())
            }
            UploadError::InvalidResponse(_) | UploadError::Invalid(_) => {
                Self::client(error.to_string())
            }
        }
    }
}

/// Port for the image storage service.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Uploads one image.
    ///
    /// # Errors
    ///
    /// Returns an `UploadError` describing why the upload failed.
    async fn upload(&self, upload: &ImageUpload) -> Result<UploadedImage, UploadError>;
}
