//! Image storage adapter using reqwest multipart uploads.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gather_application::ports::{AccessTokenProvider, ImageUploader, UploadError};
use gather_domain::{ClientSettings, DomainError, ImageUpload, UploadedImage};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::error::{ClientBuildError, build_client, parse_url};

const UPLOAD_PATH: &str = "storage/upload-image";

/// Error body returned by the storage endpoint.
#[derive(Debug, Default, Deserialize)]
struct Rejection {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Uploads images to `{upload_base_url}/storage/upload-image`.
pub struct ReqwestImageUploader {
    client: Client,
    endpoint: Url,
    timeout: Duration,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl ReqwestImageUploader {
    /// Creates an uploader for `settings.upload_base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the client cannot be created.
    pub fn new(
        settings: &ClientSettings,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, ClientBuildError> {
        Self::with_client(
            build_client()?,
            &settings.upload_base_url,
            settings.request_timeout(),
            tokens,
        )
    }

    /// Creates an uploader with a custom reqwest client.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is invalid.
    pub fn with_client(
        client: Client,
        base_url: &str,
        timeout: Duration,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, ClientBuildError> {
        let base = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = parse_url(&base)?
            .join(UPLOAD_PATH)
            .map_err(|source| ClientBuildError::InvalidUrl {
                url: base.clone(),
                source,
            })?;
        Ok(Self {
            client,
            endpoint,
            timeout,
            tokens,
        })
    }

    /// Endpoint the uploads are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn form(upload: &ImageUpload) -> Result<Form, UploadError> {
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.filename.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| DomainError::InvalidUpload(e.to_string()))?;

        let mut form = Form::new()
            .part("file", part)
            .text("entityType", upload.entity_type.as_str());
        if let Some(entity_id) = &upload.entity_id {
            form = form.text("entityId", entity_id.clone());
        }
        Ok(form)
    }

    fn rejection(status: StatusCode, body: &str) -> UploadError {
        let parsed: Rejection = serde_json::from_str(body).unwrap_or_default();
        let reason = status.canonical_reason().unwrap_or("upload failed");
        let message = parsed.message.unwrap_or_else(|| {
            let text = body.trim();
            if text.is_empty() { reason.to_string() } else { text.to_string() }
        });
        UploadError::Rejected {
            status: status.as_u16(),
            error: parsed.error.unwrap_or_else(|| reason.to_string()),
            message,
        }
    }
}

impl std::fmt::Debug for ReqwestImageUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestImageUploader")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ImageUploader for ReqwestImageUploader {
    async fn upload(&self, upload: &ImageUpload) -> Result<UploadedImage, UploadError> {
        let Some(token) = self.tokens.access_token().await else {
            return Err(UploadError::AuthenticationRequired);
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(token)
            .timeout(self.timeout)
            .multipart(Self::form(upload)?)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(UploadError::AuthenticationRequired);
        }
        if status.is_success() {
            let uploaded: UploadedImage = response
                .json()
                .await
                .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;
            tracing::info!(path = %uploaded.path, "image uploaded");
            return Ok(uploaded);
        }

        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;
        let error = Self::rejection(status, &body);
        tracing::warn!(status = status.as_u16(), error = %error, "image upload rejected");
        Err(error)
    }
}
