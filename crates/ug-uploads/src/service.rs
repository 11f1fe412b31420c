//! Upload Service
//!
//! Validates an upload, names it and hands it to the transfer backend.

use std::sync::Arc;

use tracing::{error, info, instrument};
use ug_core::error::{UploadError, UploadResult};
use ug_core::result::Outcome;

use crate::contract::UploadContract;
use crate::model::{UploadRequest, ValidatedUpload};
use crate::naming::generate_unique_name;
use crate::policy::UploadPolicy;
use crate::transfer::TransferClient;

/// Upload service
#[derive(Clone)]
pub struct UploadService {
    policy: Arc<UploadPolicy>,
    transfer: Arc<dyn TransferClient>,
}

impl UploadService {
    pub fn new(policy: Arc<UploadPolicy>, transfer: Arc<dyn TransferClient>) -> Self {
        Self { policy, transfer }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Name of the transfer backend in use
    pub fn transfer_backend(&self) -> &'static str {
        self.transfer.name()
    }

    pub fn transfer_available(&self) -> bool {
        self.transfer.is_available()
    }

    /// Upload a file
    ///
    /// Never fails: every rejection and transport failure is folded into the
    /// returned outcome, whose `data` is the relative path on success.
    #[instrument(skip(self, request))]
    pub async fn upload_file(&self, request: Option<UploadRequest>) -> Outcome<String> {
        Outcome::from(self.try_upload(request).await)
    }

    async fn try_upload(&self, request: Option<UploadRequest>) -> UploadResult<String> {
        let ValidatedUpload { route, file } = UploadContract::new(&self.policy).validate(request)?;

        let name = generate_unique_name(&file.name);
        let size = file.size();

        let path = self
            .transfer
            .send(file.data, &route.folder, &name)
            .await
            .map_err(|e| {
                error!(
                    backend = self.transfer.name(),
                    folder = %route.folder,
                    name = %name,
                    error = %e,
                    "Upload transfer failed"
                );
                UploadError::from(e)
            })?;

        info!(
            category = %route.category,
            original = %file.name,
            path = %path,
            size = size,
            "File uploaded"
        );

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::util::SubscriberInitExt;
    use ug_core::error::{ErrorKind, TRANSFER_FAILURE_PREFIX};
    use ug_core::result::UPLOAD_SUCCESS_MESSAGE;

    use super::*;
    use crate::model::UploadedFile;
    use crate::policy::TransferEndpoint;
    use crate::transfer::{relative_path, FtpTransferClient, MemoryTransferClient, MockTransferClient};

    fn policy_with(endpoint: TransferEndpoint) -> Arc<UploadPolicy> {
        Arc::new(
            UploadPolicy::new()
                .with_endpoint(endpoint)
                .with_accepted_extensions([".png", ".pdf"])
                .with_size_limits([(".png", 1_000_000), (".pdf", 5_000_000)])
                .with_categories([("Avatar", "Avatars"), ("Document", "Documents")]),
        )
    }

    fn policy() -> Arc<UploadPolicy> {
        policy_with(TransferEndpoint::new("ftp.example.com", "uploader", "secret"))
    }

    fn avatar(size: usize) -> Option<UploadRequest> {
        Some(UploadRequest::new("Avatar", UploadedFile::new("me.png", vec![7u8; size])))
    }

    #[tokio::test]
    async fn test_upload_success() {
        let transfer = Arc::new(MemoryTransferClient::new());
        let service = UploadService::new(policy(), transfer.clone());

        let outcome = service.upload_file(avatar(500)).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.message, UPLOAD_SUCCESS_MESSAGE);
        let path = outcome.data.unwrap();
        assert!(path.starts_with("/Uploads/Avatars/"));
        assert!(path.ends_with(".png"));

        let stored = transfer.get(&path).await.unwrap();
        assert_eq!(stored.len(), 500);
        assert_eq!(service.transfer_backend(), "memory");
    }

    #[tokio::test]
    async fn test_oversized_upload_is_not_transferred() {
        let transfer = Arc::new(MemoryTransferClient::new());
        let service = UploadService::new(policy(), transfer.clone());

        let outcome = service.upload_file(avatar(2_000_000)).await;

        assert!(outcome.is_failure());
        assert!(outcome.data.is_none());
        assert_eq!(outcome.error, Some(ErrorKind::PayloadTooLarge));
        assert!(transfer.is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_request() {
        let service = UploadService::new(policy(), Arc::new(MemoryTransferClient::new()));

        let outcome = service.upload_file(None).await;

        assert!(outcome.is_failure());
        assert_eq!(outcome.message, UploadError::MissingRequest.to_string());
    }

    #[tokio::test]
    async fn test_incomplete_policy() {
        let service = UploadService::new(
            Arc::new(UploadPolicy::new()),
            Arc::new(MemoryTransferClient::new()),
        );

        let outcome = service.upload_file(avatar(10)).await;

        assert_eq!(outcome.error, Some(ErrorKind::ConfigurationError));
        assert_eq!(outcome.message, "Configuration error");
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let service = UploadService::new(
            policy(),
            Arc::new(MemoryTransferClient::failing("550 Permission denied")),
        );

        let outcome = service.upload_file(avatar(500)).await;

        assert!(outcome.is_failure());
        assert!(outcome.data.is_none());
        assert_eq!(outcome.error, Some(ErrorKind::TransferError));
        assert!(outcome.message.starts_with(TRANSFER_FAILURE_PREFIX));
        assert!(outcome.message.contains("550 Permission denied"));
    }

    #[tokio::test]
    async fn test_unreachable_ftp_server() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let endpoint = TransferEndpoint::new(format!("127.0.0.1:{}", port), "uploader", "secret");
        let service = UploadService::new(
            policy_with(endpoint.clone()),
            Arc::new(FtpTransferClient::new(endpoint)),
        );

        let outcome = service.upload_file(avatar(500)).await;

        assert!(outcome.is_failure());
        assert_eq!(outcome.error, Some(ErrorKind::TransferError));
        assert!(outcome.message.starts_with(TRANSFER_FAILURE_PREFIX));
    }

    #[derive(Clone, Default)]
    struct ErrorCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test]
    async fn test_ftp_failure_logged_once() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let errors = ErrorCounter::default();
        let _guard = tracing_subscriber::registry()
            .with(errors.clone())
            .set_default();

        let endpoint = TransferEndpoint::new(format!("127.0.0.1:{}", port), "uploader", "secret");
        let service = UploadService::new(
            policy_with(endpoint.clone()),
            Arc::new(FtpTransferClient::new(endpoint)),
        );

        let outcome = service.upload_file(avatar(500)).await;

        assert!(outcome.is_failure());
        assert_eq!(errors.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_upload_never_reaches_transfer() {
        let mut transfer = MockTransferClient::new();
        transfer.expect_send().times(0);

        let service = UploadService::new(policy(), Arc::new(transfer));

        let exe = UploadedFile::new("setup.exe", Bytes::from_static(b"MZ"));
        let outcome = service
            .upload_file(Some(UploadRequest::new("Avatar", exe)))
            .await;

        assert_eq!(outcome.error, Some(ErrorKind::UnsupportedType));
    }

    #[tokio::test]
    async fn test_transfer_receives_resolved_folder() {
        let mut transfer = MockTransferClient::new();
        transfer
            .expect_send()
            .times(1)
            .returning(|_, folder, name| Ok(relative_path(folder, name)));

        let service = UploadService::new(policy(), Arc::new(transfer));

        let file = UploadedFile::new("cv.pdf", Bytes::from_static(b"%PDF-1.7"));
        let outcome = service
            .upload_file(Some(UploadRequest::new("Document", file)))
            .await;

        let path = outcome.data.unwrap();
        assert!(path.starts_with("/Uploads/Documents/"));
        assert!(path.ends_with(".pdf"));
    }
}
