//! Outcome envelope
//!
//! The uniform `{ success, message, data }` shape returned for every upload,
//! successful or not.

use serde::Serialize;

use crate::error::{ErrorKind, UploadError, UploadResult};

/// Message returned with every completed upload
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";

/// Response envelope
///
/// A failed outcome never carries `data`; the constructors are the only way
/// to build one so that invariant holds everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human-readable message
    pub message: String,
    /// Payload (only on success)
    pub data: Option<T>,
    /// Failure classification, not part of the wire format
    #[serde(skip)]
    pub error: Option<ErrorKind>,
}

impl<T> Outcome<T> {
    /// Create a successful outcome
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    /// Create a failed outcome from an error
    pub fn failure(error: &UploadError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            data: None,
            error: Some(error.kind()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_failure(&self) -> bool {
        !self.success
    }

    /// Map the payload
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        Outcome {
            success: self.success,
            message: self.message,
            data: self.data.map(f),
            error: self.error,
        }
    }
}

impl<T> From<UploadResult<T>> for Outcome<T> {
    fn from(result: UploadResult<T>) -> Self {
        match result {
            Ok(value) => Outcome::success(value, UPLOAD_SUCCESS_MESSAGE),
            Err(e) => Outcome::failure(&e),
        }
    }
}
