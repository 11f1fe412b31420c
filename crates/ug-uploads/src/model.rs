//! Upload Model

use bytes::Bytes;
use serde::Serialize;

use crate::naming::file_extension;

/// A file received from the caller
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original filename as sent by the client
    pub name: String,
    /// MIME content type, if the client sent one
    pub content_type: Option<String>,
    /// File contents
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Extension including the dot, lower-cased for policy lookups
    pub fn normalized_extension(&self) -> String {
        file_extension(&self.name).to_lowercase()
    }
}

/// An incoming upload: a category label plus the file
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub category: Option<String>,
    pub file: Option<UploadedFile>,
}

impl UploadRequest {
    pub fn new(category: impl Into<String>, file: UploadedFile) -> Self {
        Self {
            category: Some(category.into()),
            file: Some(file),
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn file(mut self, file: UploadedFile) -> Self {
        self.file = Some(file);
        self
    }
}

/// A category label resolved to its destination folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRoute {
    pub category: String,
    pub folder: String,
}

/// An upload that passed every policy check
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub route: CategoryRoute,
    pub file: UploadedFile,
}
