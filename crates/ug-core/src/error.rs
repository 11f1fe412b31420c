//! Core error types for Upload Gateway
//!
//! Every way an upload can be refused or fail, grouped into a small set of
//! kinds that callers can match on.

use serde::Serialize;
use thiserror::Error;

/// Message prefix for failures reported by the transfer endpoint.
pub const TRANSFER_FAILURE_PREFIX: &str = "An unexpected error occurred while uploading the file!";

/// Error type for all upload operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Configuration error")]
    ConfigurationIncomplete { missing: Vec<&'static str> },

    #[error("Unexpected error! No size limit is configured for {extension} files")]
    SizeLimitMissing { extension: String },

    #[error("Unexpected error! The request must not be empty")]
    MissingRequest,

    #[error("Unexpected error! UploadType must not be empty")]
    MissingCategory,

    #[error("File must not be empty")]
    MissingFile,

    #[error("The file type you are trying to upload is not supported")]
    UnsupportedType { extension: String },

    #[error("File is too large, please upload a smaller file")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("Unexpected error! Please send a valid UploadType value")]
    UnknownCategory { category: String },

    #[error("{prefix} {0}", prefix = TRANSFER_FAILURE_PREFIX)]
    Transfer(String),
}

/// Coarse failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigurationError,
    InvalidRequest,
    UnsupportedType,
    PayloadTooLarge,
    TransferError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConfigurationError => "configuration_error",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::UnsupportedType => "unsupported_type",
            ErrorKind::PayloadTooLarge => "payload_too_large",
            ErrorKind::TransferError => "transfer_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl UploadError {
    pub fn transfer(diagnostic: impl Into<String>) -> Self {
        UploadError::Transfer(diagnostic.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::ConfigurationIncomplete { .. } | UploadError::SizeLimitMissing { .. } => {
                ErrorKind::ConfigurationError
            }
            UploadError::MissingRequest
            | UploadError::MissingCategory
            | UploadError::MissingFile
            | UploadError::UnknownCategory { .. } => ErrorKind::InvalidRequest,
            UploadError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            UploadError::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            UploadError::Transfer(_) => ErrorKind::TransferError,
        }
    }

    pub fn error_code(&self) -> &'static str {
        self.kind().as_str()
    }
}

/// Standard Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;
