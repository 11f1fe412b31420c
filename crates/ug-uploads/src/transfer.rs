//! Transfer Abstraction
//!
//! Moves a validated file to its destination. Every backend lays files out
//! as `Uploads/{folder}/{name}` and reports the stored file by its relative
//! path `/Uploads/{folder}/{name}`.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use suppaftp::types::FileType;
use suppaftp::FtpStream;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use ug_core::error::UploadError;

use crate::policy::TransferEndpoint;

/// Fixed root folder on the remote store
pub const UPLOAD_ROOT: &str = "Uploads";

/// Transfer errors
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("Store failed: {0}")]
    Store(String),
    #[error("Incomplete transfer: {written} of {expected} bytes stored")]
    Incomplete { written: u64, expected: u64 },
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Transfer task failed: {0}")]
    Task(String),
}

pub type TransferResult<T> = Result<T, TransferError>;

impl From<TransferError> for UploadError {
    fn from(err: TransferError) -> Self {
        UploadError::Transfer(err.to_string())
    }
}

/// Path of a file below the upload root, as sent to the store
pub fn remote_path(folder: &str, file_name: &str) -> String {
    format!("{}/{}/{}", UPLOAD_ROOT, folder, file_name)
}

/// Path reported back to the caller
pub fn relative_path(folder: &str, file_name: &str) -> String {
    format!("/{}", remote_path(folder, file_name))
}

/// Transfer trait - unified interface for destination backends
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransferClient: Send + Sync {
    /// Store the whole body as `Uploads/{folder}/{file_name}`, returning the relative path
    async fn send(&self, data: Bytes, folder: &str, file_name: &str) -> TransferResult<String>;

    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Whether the backend can accept transfers at all
    fn is_available(&self) -> bool {
        true
    }
}

/// FTP transfer
///
/// Opens one connection per call and never retries.
pub struct FtpTransferClient {
    endpoint: TransferEndpoint,
}

impl FtpTransferClient {
    pub fn new(endpoint: TransferEndpoint) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &TransferEndpoint {
        &self.endpoint
    }

    fn store_blocking(endpoint: &TransferEndpoint, path: &str, data: Bytes) -> TransferResult<u64> {
        let mut ftp = FtpStream::connect(endpoint.address())
            .map_err(|e| TransferError::Connection(e.to_string()))?;

        let result = Self::store_on(&mut ftp, endpoint, path, &data);

        if let Err(e) = ftp.quit() {
            debug!(error = %e, "FTP quit failed");
        }

        result
    }

    fn store_on(
        ftp: &mut FtpStream,
        endpoint: &TransferEndpoint,
        path: &str,
        data: &Bytes,
    ) -> TransferResult<u64> {
        ftp.login(endpoint.username.as_str(), endpoint.password.as_str())
            .map_err(|e| TransferError::Authentication(e.to_string()))?;
        ftp.transfer_type(FileType::Binary)
            .map_err(|e| TransferError::Store(e.to_string()))?;

        let mut reader = Cursor::new(data.as_ref());
        let written = ftp
            .put_file(path, &mut reader)
            .map_err(|e| TransferError::Store(e.to_string()))?;

        let expected = data.len() as u64;
        if written != expected {
            return Err(TransferError::Incomplete { written, expected });
        }

        Ok(written)
    }
}

#[async_trait]
impl TransferClient for FtpTransferClient {
    #[instrument(skip(self, data), fields(transfer = "ftp", host = %self.endpoint.host, size = data.len()))]
    async fn send(&self, data: Bytes, folder: &str, file_name: &str) -> TransferResult<String> {
        let path = remote_path(folder, file_name);
        let endpoint = self.endpoint.clone();
        let target = path.clone();

        let written = tokio::task::spawn_blocking(move || Self::store_blocking(&endpoint, &target, data))
            .await
            .map_err(|e| TransferError::Task(e.to_string()))?
            .map_err(|e| {
                debug!(path = %path, error = %e, "FTP transfer failed");
                e
            })?;

        debug!(path = %path, bytes = written, "File stored");

        Ok(relative_path(folder, file_name))
    }

    fn name(&self) -> &'static str {
        "ftp"
    }
}

/// Local filesystem transfer
///
/// Mirrors the remote layout below a local directory.
pub struct LocalTransferClient {
    root: PathBuf,
}

impl LocalTransferClient {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Create a client rooted in a fresh temp directory
    pub fn temp() -> std::io::Result<Self> {
        let dir = std::env::temp_dir().join(format!("upload-gateway-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir)?;
        Ok(Self::new(dir))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve_path(&self, folder: &str, file_name: &str) -> TransferResult<PathBuf> {
        for part in [folder, file_name] {
            if part.is_empty()
                || part.contains("..")
                || part.starts_with('/')
                || part.contains('\\')
            {
                return Err(TransferError::InvalidPath(part.to_string()));
            }
        }
        if file_name.contains('/') {
            return Err(TransferError::InvalidPath(file_name.to_string()));
        }

        Ok(self.root.join(remote_path(folder, file_name)))
    }
}

#[async_trait]
impl TransferClient for LocalTransferClient {
    #[instrument(skip(self, data), fields(transfer = "local", size = data.len()))]
    async fn send(&self, data: Bytes, folder: &str, file_name: &str) -> TransferResult<String> {
        let path = self.resolve_path(folder, file_name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;

        debug!(path = ?path, size = data.len(), "File stored");

        Ok(relative_path(folder, file_name))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// In-memory transfer for testing
pub struct MemoryTransferClient {
    files: RwLock<HashMap<String, Bytes>>,
    failure: Option<String>,
}

impl Default for MemoryTransferClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransferClient {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            failure: None,
        }
    }

    /// A client whose every transfer fails with `diagnostic`
    pub fn failing(diagnostic: impl Into<String>) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            failure: Some(diagnostic.into()),
        }
    }

    /// Contents stored under a relative path
    pub async fn get(&self, relative_path: &str) -> Option<Bytes> {
        self.files.read().await.get(relative_path).cloned()
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

#[async_trait]
impl TransferClient for MemoryTransferClient {
    async fn send(&self, data: Bytes, folder: &str, file_name: &str) -> TransferResult<String> {
        if let Some(diagnostic) = &self.failure {
            return Err(TransferError::Connection(diagnostic.clone()));
        }

        let path = relative_path(folder, file_name);
        let mut files = self.files.write().await;
        files.insert(path.clone(), data);
        Ok(path)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Stand-in for a backend that could not be set up
///
/// Reports the configured backend's name and fails every transfer with the
/// reason it is unavailable.
pub struct UnavailableTransferClient {
    backend: &'static str,
    reason: String,
}

impl UnavailableTransferClient {
    pub fn new(backend: &'static str, reason: impl Into<String>) -> Self {
        Self {
            backend,
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[async_trait]
impl TransferClient for UnavailableTransferClient {
    async fn send(&self, _data: Bytes, _folder: &str, _file_name: &str) -> TransferResult<String> {
        Err(TransferError::Connection(self.reason.clone()))
    }

    fn name(&self) -> &'static str {
        self.backend
    }

    fn is_available(&self) -> bool {
        false
    }
}
