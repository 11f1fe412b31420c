//! Shared handler state

use std::sync::Arc;

use ug_uploads::UploadService;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub uploads: Arc<UploadService>,
}

impl AppState {
    pub fn new(uploads: UploadService) -> Self {
        Self {
            uploads: Arc::new(uploads),
        }
    }
}
