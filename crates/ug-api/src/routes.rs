//! API routes

use axum::{routing::post, Router};

use crate::extractors::AppState;
use crate::handlers::uploads;

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/Uploads", uploads_router())
}

fn uploads_router() -> Router<AppState> {
    Router::new().route("/UploadFile", post(uploads::upload_file))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        extract::DefaultBodyLimit,
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;
    use ug_uploads::{MemoryTransferClient, TransferEndpoint, UploadPolicy, UploadService};

    use super::*;

    const BOUNDARY: &str = "upload-gateway-boundary";

    fn app() -> Router {
        let policy = UploadPolicy::new()
            .with_endpoint(TransferEndpoint::new("ftp.example.com", "uploader", "secret"))
            .with_accepted_extensions([".png"])
            .with_size_limits([(".png", 1_000_000)])
            .with_categories([("Avatar", "Avatars")]);
        let service = UploadService::new(Arc::new(policy), Arc::new(MemoryTransferClient::new()));

        router().with_state(AppState::new(service))
    }

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, Option<&'a str>, &'a [u8]),
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", name, value)
                            .as_bytes(),
                    );
                }
                Part::File(name, file_name, data) => {
                    let disposition = match file_name {
                        Some(file_name) => format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                            name, file_name
                        ),
                        None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", name),
                    };
                    body.extend_from_slice(disposition.as_bytes());
                    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
                    body.extend_from_slice(data);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    async fn post_upload(content_type: &str, body: Vec<u8>) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/Uploads/UploadFile")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_multipart(parts: &[Part<'_>]) -> (StatusCode, Value) {
        post_upload(
            &format!("multipart/form-data; boundary={}", BOUNDARY),
            multipart_body(parts),
        )
        .await
    }

    #[tokio::test]
    async fn test_upload_success() {
        let data = vec![1u8; 500];
        let (status, json) = post_multipart(&[
            Part::Text("UploadType", "Avatar"),
            Part::File("File", Some("me.png"), &data),
        ])
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "File uploaded successfully");
        let path = json["data"].as_str().unwrap();
        assert!(path.starts_with("/Uploads/Avatars/"));
        assert!(path.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_field_names_ignore_case() {
        let (status, json) = post_multipart(&[
            Part::Text("category", "Avatar"),
            Part::File("file", Some("me.png"), b"png"),
        ])
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let (status, json) = post_multipart(&[Part::Text("UploadType", "Avatar")]).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "File must not be empty");
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn test_file_part_without_name_is_ignored() {
        let (status, json) = post_multipart(&[
            Part::Text("UploadType", "Avatar"),
            Part::File("File", None, b"png"),
        ])
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "File must not be empty");
    }

    #[tokio::test]
    async fn test_unknown_category() {
        let (status, json) = post_multipart(&[
            Part::Text("UploadType", "Banner"),
            Part::File("File", Some("me.png"), b"png"),
        ])
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], false);
        assert_eq!(
            json["message"],
            "Unexpected error! Please send a valid UploadType value"
        );
    }

    #[tokio::test]
    async fn test_non_multipart_body_is_absent_request() {
        let (status, json) = post_upload("application/json", b"{}".to_vec()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Unexpected error! The request must not be empty");
    }

    #[tokio::test]
    async fn test_body_limit_keeps_envelope() {
        let data = vec![0u8; 4096];
        let response = app()
            .layer(DefaultBodyLimit::max(1024))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/Uploads/UploadFile")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", BOUNDARY),
                    )
                    .body(Body::from(multipart_body(&[
                        Part::Text("UploadType", "Avatar"),
                        Part::File("File", Some("me.png"), &data),
                    ])))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn test_broken_multipart_stream() {
        let (status, json) = post_upload(
            &format!("multipart/form-data; boundary={}", BOUNDARY),
            b"this is not a multipart body".to_vec(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert!(json["data"].is_null());
    }
}
