//! Reading images from disk into upload payloads.

use std::path::Path;

use gather_domain::{DomainError, ImageUpload, UploadEntityType};

/// Failure to prepare an image file for upload.
#[derive(Debug, thiserror::Error)]
pub enum ImageFileError {
    /// Failed to read file.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that could not be read.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file is not an acceptable image.
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Reads `path` and builds an upload for `entity_type`.
///
/// The content type is guessed from the file extension; anything that is
/// not `image/*` is rejected before any bytes leave the machine.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid image.
pub async fn load_image(
    path: &Path,
    entity_type: UploadEntityType,
) -> Result<ImageUpload, ImageFileError> {
    let content_type = mime_guess::from_path(path).first_or_octet_stream();
    if content_type.type_() != mime::IMAGE {
        return Err(DomainError::InvalidUpload(format!(
            "{} is not an image ({content_type})",
            path.display()
        ))
        .into());
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ImageFileError::Read {
            path: path.display().to_string(),
            source,
        })?;

    let filename = path
        .file_name()
        .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().into_owned());

    tracing::debug!(path = %path.display(), bytes = bytes.len(), %content_type, "image loaded");
    Ok(ImageUpload::new(
        bytes,
        content_type.essence_str(),
        filename,
        entity_type,
    )?)
}
