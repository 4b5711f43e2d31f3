//! Upload Image Use Case

use std::sync::Arc;

use gather_domain::{ImageUpload, OperationError, OperationResult, UploadedImage};

use crate::executor::{ExecutionResult, OperationExecutor};
use crate::ports::ImageUploader;

/// Uploads an image through the storage port with the executor's
/// cancellation and error classification.
///
/// An upload creates a stored object, so it runs once like any other
/// mutation. Failures are reported to the caller, who decides whether to
/// try again.
pub struct UploadImage<U: ImageUploader> {
    uploader: Arc<U>,
    executor: OperationExecutor,
}

impl<U: ImageUploader> UploadImage<U> {
    /// Creates the use case.
    pub const fn new(uploader: Arc<U>, executor: OperationExecutor) -> Self {
        Self { uploader, executor }
    }

    /// Uploads `upload` and returns its public URL and storage path.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the upload was cancelled.
    pub async fn execute(&self, upload: &ImageUpload) -> ExecutionResult<UploadedImage> {
        tracing::info!(
            entity_type = %upload.entity_type,
            bytes = upload.bytes.len(),
            "uploading image"
        );
        self.executor
            .guard(self.uploader.upload(upload))
            .await
            .map(|result| OperationResult::from(result.map_err(OperationError::from)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use gather_domain::{ErrorKind, UploadEntityType};

    use crate::executor::RetryPolicy;
    use crate::ports::UploadError;

    /// Replays scripted results, one per call.
    struct ScriptedUploader {
        results: Mutex<Vec<Result<UploadedImage, UploadError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedUploader {
        fn new(mut results: Vec<Result<UploadedImage, UploadError>>) -> Self {
            results.reverse();
            Self {
                results: Mutex::new(results),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
        }
    }

    #[async_trait]
    impl ImageUploader for ScriptedUploader {
        async fn upload(&self, _upload: &ImageUpload) -> Result<UploadedImage, UploadError> {
            *self.calls.lock().unwrap_or_else(std::sync::PoisonError::into_inner) += 1;
            self.results
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .pop()
                .unwrap_or(Err(UploadError::Network("script exhausted".to_string())))
        }
    }

    fn image() -> ImageUpload {
        ImageUpload::new(vec![0x89, 0x50], "image/png", "cover.png", UploadEntityType::Event)
            .map(|u| u.with_entity_id("42"))
            .unwrap_or_else(|e| unreachable!("valid fixture: {e}"))
    }

    fn uploaded() -> UploadedImage {
        UploadedImage {
            url: "https://cdn.example/cover.png".to_string(),
            path: "events/42/cover.png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upload_success() {
        let uploader = Arc::new(ScriptedUploader::new(vec![Ok(uploaded())]));
        let use_case = UploadImage::new(Arc::clone(&uploader), OperationExecutor::default());

        let result = use_case.execute(&image()).await;
        assert_eq!(result, Ok(OperationResult::Success(uploaded())));
        assert_eq!(uploader.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_is_reported_without_retry() {
        let uploader = Arc::new(ScriptedUploader::new(vec![
            Err(UploadError::Network("reset".to_string())),
            Ok(uploaded()),
        ]));
        let use_case = UploadImage::new(Arc::clone(&uploader), OperationExecutor::new(RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(10),
        }));

        let result = use_case.execute(&image()).await;
        let Ok(OperationResult::Error(error)) = result else {
            unreachable!("expected a classified error");
        };
        assert_eq!(error.kind, ErrorKind::Network);
        assert_eq!(uploader.calls(), 1);
    }

    #[tokio::test]
    async fn test_authentication_failure_is_not_retried() {
        let uploader = Arc::new(ScriptedUploader::new(vec![Err(
            UploadError::AuthenticationRequired,
        )]));
        let use_case = UploadImage::new(Arc::clone(&uploader), OperationExecutor::default());

        let result = use_case.execute(&image()).await;
        let Ok(OperationResult::Error(error)) = result else {
            unreachable!("expected a classified error");
        };
        assert_eq!(error.kind, ErrorKind::Server);
        assert_eq!(uploader.calls(), 1);
    }
}
