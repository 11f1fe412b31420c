//! # ug-api
//!
//! HTTP handlers for Upload Gateway.
//!
//! Exposes the upload pipeline as a multipart endpoint that always answers
//! with the `{ success, message, data }` envelope.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use extractors::AppState;
pub use routes::router;
