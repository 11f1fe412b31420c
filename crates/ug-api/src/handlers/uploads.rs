//! Upload handlers

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        State,
    },
    Json,
};
use tracing::debug;
use ug_core::result::Outcome;
use ug_uploads::{UploadRequest, UploadedFile};

use crate::error::ApiResult;
use crate::extractors::AppState;

/// Form field carrying the category label (lower-cased)
pub const CATEGORY_FIELD: &str = "uploadtype";
/// Accepted alias for [`CATEGORY_FIELD`]
pub const CATEGORY_ALIAS: &str = "category";
/// Form field carrying the file (lower-cased)
pub const FILE_FIELD: &str = "file";

/// Upload a file
///
/// POST /api/Uploads/UploadFile
///
/// Answers 200 with the outcome envelope for every pipeline result. A body
/// that is not multipart reaches the pipeline as an absent request.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Outcome<String>>> {
    let request = match multipart {
        Ok(multipart) => Some(read_upload_request(multipart).await?),
        Err(rejection) => {
            debug!(error = %rejection, "Request body is not multipart");
            None
        }
    };

    Ok(Json(state.uploads.upload_file(request).await))
}

/// Collect the category and file parts; field names match case-insensitively
async fn read_upload_request(mut multipart: Multipart) -> ApiResult<UploadRequest> {
    let mut request = UploadRequest::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_ascii_lowercase();

        match name.as_str() {
            CATEGORY_FIELD | CATEGORY_ALIAS => {
                request.category = Some(field.text().await?);
            }
            FILE_FIELD => {
                let Some(file_name) = field.file_name().filter(|n| !n.is_empty()).map(str::to_string)
                else {
                    debug!("Ignoring file part without a file name");
                    continue;
                };
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;

                let mut file = UploadedFile::new(file_name, data);
                if let Some(content_type) = content_type {
                    file = file.with_content_type(content_type);
                }
                request.file = Some(file);
            }
            _ => {}
        }
    }

    Ok(request)
}
