//! Image upload types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Largest image accepted by the storage endpoint.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// What the uploaded image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadEntityType {
    /// Event cover image.
    Event,
    /// User avatar.
    User,
    /// Venue photo.
    Venue,
    /// Group banner.
    Group,
}

impl UploadEntityType {
    /// Value sent in the `entityType` form field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::User => "user",
            Self::Venue => "venue",
            Self::Group => "group",
        }
    }

    /// Parses the form-field value.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "event" => Some(Self::Event),
            "user" => Some(Self::User),
            "venue" => Some(Self::Venue),
            "group" => Some(Self::Group),
            _ => None,
        }
    }
}

impl fmt::Display for UploadEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image ready to be uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Raw image bytes.
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `image/png`.
    pub content_type: String,
    /// File name sent with the part.
    pub filename: String,
    /// Owning entity type.
    pub entity_type: UploadEntityType,
    /// Owning entity ID, when it already exists.
    pub entity_id: Option<String>,
}

impl ImageUpload {
    /// Creates a validated upload.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUpload` for empty or oversized payloads
    /// and for content types that are not images.
    pub fn new(
        bytes: Vec<u8>,
        content_type: impl Into<String>,
        filename: impl Into<String>,
        entity_type: UploadEntityType,
    ) -> DomainResult<Self> {
        let content_type = content_type.into();
        if bytes.is_empty() {
            return Err(DomainError::InvalidUpload("image is empty".to_string()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(DomainError::InvalidUpload(format!(
                "image is {} bytes, limit is {MAX_IMAGE_BYTES}",
                bytes.len()
            )));
        }
        if !content_type.starts_with("image/") {
            return Err(DomainError::InvalidUpload(format!(
                "unsupported content type '{content_type}'"
            )));
        }

        Ok(Self {
            bytes,
            content_type,
            filename: filename.into(),
            entity_type,
            entity_id: None,
        })
    }

    /// Attaches the owning entity ID.
    #[must_use]
    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("bytes", &self.bytes.len())
            .field("content_type", &self.content_type)
            .field("filename", &self.filename)
            .field("entity_type", &self.entity_type)
            .field("entity_id", &self.entity_id)
            .finish()
    }
}

/// Storage response for a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    /// Public URL of the image.
    pub url: String,
    /// Storage path.
    pub path: String,
}
